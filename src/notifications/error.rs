use axum::{http::StatusCode, response::IntoResponse};
use log::error;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

use crate::response::{error_response, internal_server_error_response};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("An error occurred while connecting to the database: {0}")]
    DbErr(#[from] DbErr),
    #[error("Notification with ID '{0}' not found")]
    NotificationNotFound(Uuid),
    #[error("Notification title cannot be empty")]
    EmptyTitle,
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        return match self {
            Error::DbErr(_) => {
                error!("{}", self);
                internal_server_error_response()
            },
            Error::NotificationNotFound(_) => error_response(StatusCode::NOT_FOUND, self.to_string()),
            Error::EmptyTitle => error_response(StatusCode::BAD_REQUEST, self.to_string()),
        };
    }
}
