use axum::{extract::multipart::MultipartError, http::StatusCode, response::IntoResponse};
use log::{error, warn};
use sea_orm::DbErr;
use thiserror::Error;

use crate::response::{error_response, internal_server_error_response};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("An error occurred while connecting to the database: {0}")]
    DbErr(#[from] DbErr),
    #[error("Could not read the uploaded form: {0}")]
    MultipartError(#[from] MultipartError),
    #[error("No statement file was uploaded")]
    MissingFile,
    #[error("Could not read the statement PDF: {0}")]
    UnreadableStatement(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        return match self {
            Error::DbErr(_) => {
                error!("{}", self);
                internal_server_error_response()
            },
            Error::MultipartError(ref e) => {
                warn!("{}", self);
                error_response(e.status(), self.to_string())
            },
            Error::UnreadableStatement(_) => {
                warn!("{}", self);
                error_response(StatusCode::BAD_REQUEST, "Could not read the statement PDF")
            },
            Error::MissingFile => error_response(StatusCode::BAD_REQUEST, self.to_string()),
        };
    }
}
