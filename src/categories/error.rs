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
    #[error("Category name '{0}' already taken")]
    NameReuse(String),
    #[error("Category name cannot be empty")]
    EmptyName,
    #[error("Category with ID '{0}' not found")]
    CategoryNotFound(Uuid),
    #[error("Default categories cannot be modified or deleted")]
    DefaultCategoryImmutable(Uuid),
    #[error("No category IDs provided")]
    NoCategoryIds,
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        return match self {
            Error::DbErr(_) => { 
                error!("{}", self);
                internal_server_error_response()
            },
            Error::CategoryNotFound(_) => error_response(StatusCode::NOT_FOUND, self.to_string()),
            Error::NameReuse(_) | Error::EmptyName |
            Error::DefaultCategoryImmutable(_) | Error::NoCategoryIds => {
                error_response(StatusCode::BAD_REQUEST, self.to_string())
            }
        };
    }
}
