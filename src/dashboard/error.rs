use axum::response::IntoResponse;
use log::error;
use sea_orm::DbErr;
use thiserror::Error;

use crate::{response::internal_server_error_response, spending_limits, transactions};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("An error occurred while connecting to the database: {0}")]
    DbErr(#[from] DbErr),
    #[error(transparent)]
    TransactionError(#[from] transactions::error::Error),
    #[error(transparent)]
    SpendingLimitError(#[from] spending_limits::error::Error),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        return match self {
            Error::DbErr(_) => {
                error!("{}", self);
                internal_server_error_response()
            },
            Error::TransactionError(e) => e.into_response(),
            Error::SpendingLimitError(e) => e.into_response(),
        };
    }
}
