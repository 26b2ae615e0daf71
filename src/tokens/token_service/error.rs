use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Token is not a well-formed JWT")]
    Malformed,
    #[error("Token signature does not match")]
    InvalidSignature,
    #[error("Token issued by unexpected issuer")]
    InvalidIssuer,
    #[error("Token expired")]
    Expired,
    #[error("JWT error: {0}")]
    JwtError(jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_)
                => Error::Malformed,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => Error::InvalidSignature,
            ErrorKind::InvalidIssuer => Error::InvalidIssuer,
            ErrorKind::ExpiredSignature => Error::Expired,
            _ => Error::JwtError(e),
        }
    }
}
