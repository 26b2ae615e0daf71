use serde::Deserialize;

use crate::tokens::token_service::config::TokenServiceConfig;

#[derive(Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub token_svc_config: TokenServiceConfig,
}
