use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Email cannot be empty")]
    EmptyEmail,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Password cannot be empty")]
    EmptyPassword,
    #[error("Password must be at least {0} characters long")]
    PasswordTooShort(usize),
    #[error("Password must contain at least one uppercase letter")]
    PasswordMissingUppercase,
    #[error("Password must contain at least one digit")]
    PasswordMissingDigit,
}
