pub mod error;

use lazy_static::lazy_static;
use regex::Regex;

use error::*;

pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(
        r"^[a-zA-Z0-9_+&*-]+(?:\.[a-zA-Z0-9_+&*-]+)*@(?:[a-zA-Z0-9-]+\.)+[a-zA-Z]{2,7}$"
    ).unwrap();
}

pub fn validate_email(email: &str) -> Result<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(Error::EmptyEmail);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(Error::InvalidEmail);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.trim().is_empty() {
        return Err(Error::EmptyPassword);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::PasswordTooShort(MIN_PASSWORD_LEN));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(Error::PasswordMissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(Error::PasswordMissingDigit);
    }
    Ok(())
}
