use axum::{http::StatusCode, response::IntoResponse};
use chrono::NaiveDate;
use log::error;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::{db_utils::DbUtilsError, response::{error_response, internal_server_error_response}, transactions};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("An error occurred while connecting to the database: {0}")]
    DbErr(#[from] DbErr),
    #[error(transparent)]
    DbUtilsError(#[from] DbUtilsError),
    #[error(transparent)]
    TransactionError(#[from] transactions::error::Error),
    #[error("Report start date {0} is after its end date {1}")]
    InvalidDateRange(NaiveDate, NaiveDate),
    #[error("User not found: {0}")]
    UserNotFound(Uuid),
    #[error("Could not render the report PDF: {0}")]
    PdfError(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        return match self {
            Error::DbErr(_) | Error::DbUtilsError(DbUtilsError::DbErr(_)) | Error::PdfError(_) => {
                error!("{}", self);
                internal_server_error_response()
            },
            Error::TransactionError(e) => e.into_response(),
            Error::UserNotFound(_) => error_response(StatusCode::NOT_FOUND, self.to_string()),
            Error::DbUtilsError(DbUtilsError::CategoryNotVisible(_, _)) | Error::InvalidDateRange(_, _) => {
                error_response(StatusCode::BAD_REQUEST, self.to_string())
            },
        };
    }
}
