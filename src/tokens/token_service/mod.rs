pub mod config;
pub mod error;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date_time_provider::DynDateTimeProvider;

use {config::*, error::*};

pub type DynTokenService = Arc<dyn TokenService + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub contents: String,
    pub expires_on_utc: DateTime<Utc>,
}

#[cfg_attr(test, automock)]
pub trait TokenService {
    fn generate_access_token(&self, user_id: Uuid, email: &str) -> Result<Token>;
    fn verify_access_token(&self, token: &str) -> Result<Claims>;
}

///
/// Issues and verifies HS256 JSON Web Tokens
/// 
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    dt_provider: DynDateTimeProvider,
    config: TokenServiceConfig,
}

impl JwtTokenService {
    pub fn new(
        secret: impl AsRef<[u8]>,
        dt_provider: DynDateTimeProvider,
        config: TokenServiceConfig,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            dt_provider,
            config,
        }
    }

    pub fn new_dyn(
        secret: impl AsRef<[u8]>,
        dt_provider: DynDateTimeProvider,
        config: TokenServiceConfig,
    ) -> DynTokenService {
        Arc::new(Self::new(secret, dt_provider, config))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock instead
        validation.validate_exp = false;
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation
    }
}

impl TokenService for JwtTokenService {
    fn generate_access_token(&self, user_id: Uuid, email: &str) -> Result<Token> {
        let now = self.dt_provider.utc_now();
        let expires_on_utc = now + Duration::seconds(self.config.access_token_lt_s);

        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_on_utc.timestamp(),
        };

        let contents = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(Token { contents, expires_on_utc })
    }

    fn verify_access_token(&self, token: &str) -> Result<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation())?.claims;
        if self.dt_provider.utc_now().timestamp() >= claims.exp {
            return Err(Error::Expired);
        }

        Ok(claims)
    }
}
