use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not hash password: {0}")]
    HashError(String),
    #[error("Stored password hash could not be parsed: {0}")]
    ParseHashError(String),
}
