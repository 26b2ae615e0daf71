use axum::{http::StatusCode, response::IntoResponse};
use log::error;
use rust_decimal::Decimal;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::response::{error_response, internal_server_error_response};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("An error occurred while connecting to the database: {0}")]
    DbErr(#[from] DbErr),
    #[error("Goal with ID '{0}' not found")]
    GoalNotFound(Uuid),
    #[error("Goal name cannot be empty")]
    EmptyName,
    #[error("Target amount must be greater than zero, got {0}")]
    InvalidTargetAmount(Decimal),
    #[error("Progress amount {0} is invalid for this goal")]
    InvalidProgressAmount(Decimal),
    #[error("Deadline cannot be before the start date")]
    DeadlineBeforeStart,
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        return match self {
            Error::DbErr(_) => {
                error!("{}", self);
                internal_server_error_response()
            },
            Error::GoalNotFound(_) => error_response(StatusCode::NOT_FOUND, self.to_string()),
            Error::EmptyName | Error::InvalidTargetAmount(_) | 
            Error::InvalidProgressAmount(_) | Error::DeadlineBeforeStart => {
                error_response(StatusCode::BAD_REQUEST, self.to_string())
            },
        };
    }
}
