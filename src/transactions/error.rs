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
    #[error("Transaction with ID '{0}' not found")]
    TransactionNotFound(Uuid),
    #[error("Transaction amount must be greater than zero, got {0}")]
    InvalidAmount(Decimal),
    #[error("Invalid month {1} of year {0}")]
    InvalidMonth(i32, u32),
    #[error("No transaction IDs were provided")]
    NoTransactionIds,
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        return match self {
            Error::DbErr(_) | Error::DbUtilsError(DbUtilsError::DbErr(_)) => {
                error!("{}", self);
                internal_server_error_response()
            },
            Error::TransactionNotFound(_) => error_response(StatusCode::NOT_FOUND, self.to_string()),
            Error::DbUtilsError(DbUtilsError::CategoryNotVisible(_, _)) |
            Error::InvalidAmount(_) | Error::InvalidMonth(_, _) | Error::NoTransactionIds => {
                error_response(StatusCode::BAD_REQUEST, self.to_string())
            },
        };
    }
}
