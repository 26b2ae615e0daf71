use axum::{http::StatusCode, response::IntoResponse};
use log::{error, warn};
use thiserror::Error;

use crate::{response::{error_response, internal_server_error_response}, tokens::{password_hasher, token_service}, users, validations};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("A database error occurred: {0}")]
    DbErr(#[from] sea_orm::DbErr),
    #[error(transparent)]
    UserError(#[from] users::error::Error),
    #[error(transparent)]
    ValidationError(#[from] validations::error::Error),
    #[error("An error occurred while using the password hasher: {0}")]
    PasswordHasherError(#[from] password_hasher::error::Error),
    #[error("TokenService error while attempting to authorize JWT: {0}")]
    TokenServiceError(#[from] token_service::error::Error),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Unauthorized. Please use the `Authorization` header with JWT bearer token format")]
    Unauthorized,
    #[error("Could not parse authorization header")]
    ParseHeaderError
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        return match self {
            Error::UserError(e) => e.into_response(),
            Error::ValidationError(_) => error_response(StatusCode::BAD_REQUEST, self.to_string()),
            Error::Unauthorized | Error::ParseHeaderError | Error::InvalidCredentials
                => error_response(StatusCode::UNAUTHORIZED, self.to_string()),
            Error::TokenServiceError(ref e) => {
                warn!("Rejected access token: {}", e);
                error_response(StatusCode::UNAUTHORIZED, "Invalid or expired token")
            },
            Error::DbErr(_) | Error::PasswordHasherError(_) => {
                error!("{}", self);
                internal_server_error_response()
            }
        };
    }
}
