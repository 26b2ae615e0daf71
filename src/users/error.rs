use axum::{http::StatusCode, response::IntoResponse};
use log::error;
use thiserror::Error;
use uuid::Uuid;

use crate::{response::{error_response, internal_server_error_response}, tokens::password_hasher, validations};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("A database error occurred: {0}")]
    DbErr(#[from] sea_orm::DbErr),
    #[error("An error occurred while using the password hasher: {0}")]
    PasswordHasherError(#[from] password_hasher::error::Error),
    #[error(transparent)]
    ValidationError(#[from] validations::error::Error),
    #[error("Email {0} already in use")]
    EmailInUse(String), 
    #[error("User not found: {0}")]
    UserNotFound(Uuid),
    #[error("Current password is incorrect")]
    IncorrectPassword,
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Unsupported currency code '{0}'")]
    InvalidCurrency(String),
    #[error("Unsupported date format '{0}'")]
    InvalidDateFormat(String),
    #[error("Could not read the uploaded image: {0}")]
    InvalidImage(String),
    #[error("No photo was uploaded")]
    MissingPhoto,
    #[error("User {0} has no profile photo")]
    PhotoNotFound(Uuid),
    #[error("Could not read the uploaded form: {0}")]
    MultipartError(#[from] axum::extract::multipart::MultipartError),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        return match self {
            Error::DbErr(_) | Error::PasswordHasherError(_) => {
                error!("{}", self);
                internal_server_error_response()
            },
            Error::MultipartError(ref e) => error_response(e.status(), self.to_string()),
            Error::UserNotFound(_) | Error::PhotoNotFound(_) => error_response(StatusCode::NOT_FOUND, self.to_string()),
            Error::ValidationError(_) | Error::EmailInUse(_) | Error::IncorrectPassword | 
            Error::EmptyName | Error::InvalidCurrency(_) | Error::InvalidDateFormat(_) | 
            Error::InvalidImage(_) | Error::MissingPhoto => {
                error_response(StatusCode::BAD_REQUEST, self.to_string())
            },
        };
    }
}
