use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenServiceConfig {
    pub issuer: String,
    /// Lifetime of issued access tokens, in seconds
    pub access_token_lt_s: i64,
}
