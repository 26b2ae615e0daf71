use axum::{http::StatusCode, response::IntoResponse};
use log::error;
use rust_decimal::Decimal;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::{db_utils::DbUtilsError, response::{error_response, internal_server_error_response}};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("An error occurred while connecting to the database: {0}")]
    DbErr(#[from] DbErr),
    #[error(transparent)]
    DbUtilsError(#[from] DbUtilsError),
    #[error("Spending limit with ID '{0}' not found")]
    LimitNotFound(Uuid),
    #[error("Spending limit already exists for this category")]
    LimitAlreadyExists,
    #[error("Limit amount must be greater than zero, got {0}")]
    InvalidLimitAmount(Decimal),
    #[error("Notification threshold must be between 0 and 1, got {0}")]
    InvalidThreshold(Decimal),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        return match self {
            Error::DbErr(_) | Error::DbUtilsError(DbUtilsError::DbErr(_)) => {
                error!("{}", self);
                internal_server_error_response()
            },
            Error::LimitNotFound(_) => error_response(StatusCode::NOT_FOUND, self.to_string()),
            Error::DbUtilsError(DbUtilsError::CategoryNotVisible(_, _)) |
            Error::LimitAlreadyExists | Error::InvalidLimitAmount(_) | 
            Error::InvalidThreshold(_) => {
                error_response(StatusCode::BAD_REQUEST, self.to_string())
            },
        };
    }
}
