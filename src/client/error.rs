use reqwest::StatusCode;
use thiserror::Error;

use crate::validations;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request could not be sent: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Server responded with {0}: {1}")]
    StatusError(StatusCode, String),
    #[error("Could not parse response body: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error(transparent)]
    ValidationError(#[from] validations::error::Error),
    #[error("Session expired, redirecting to {redirect}")]
    SessionExpired { redirect: String },
}
