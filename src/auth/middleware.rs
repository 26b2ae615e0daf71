use axum::{extract::FromRequestParts, http::{header, request::Parts}};
use axum_extra::extract::cookie::CookieJar;
use lazy_static::lazy_static;
use regex::Regex;
use uuid::Uuid;

use crate::state::AppState;

use super::error::*;

pub const TOKEN_COOKIE_NAME: &str = "jwt_token";

lazy_static! {
    static ref AUTH_RE: Regex =
        Regex::new(r"^(?i)bearer\s+([\w-]+\.[\w-]+\.[\w-]+)$").unwrap();
}

///
/// The authenticated caller, taken from a bearer token in the
/// `Authorization` header or from the `jwt_token` cookie
/// 
pub struct AuthUser { 
    pub id: Uuid, 
    pub email: String,
}

impl FromRequestParts<AppState> for AuthUser 
{
    type Rejection = Error;
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> std::result::Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;

        let claims = state.token_svc.verify_access_token(&token)?;
        Ok(AuthUser { id: claims.sub, email: claims.email })
    }
}

fn extract_token(parts: &Parts) -> Result<String> {
    if let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) {
        let contents = auth_header.to_str().map_err(|_| Error::ParseHeaderError)?;
        return if let Some(token) = AUTH_RE.captures(contents.trim()) {
            Ok(token[1].to_string())
        } else {
            Err(Error::ParseHeaderError)
        };
    }

    token_from_cookies(parts).ok_or(Error::Unauthorized)
}

fn token_from_cookies(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    jar.get(TOKEN_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}
