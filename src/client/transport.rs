use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::{Client, Method, StatusCode};

use super::error::Result;

pub type DynApiTransport = Arc<dyn ApiTransport + Send + Sync>;

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ApiTransport {
    async fn send(
        &self, 
        method: Method, 
        path: &str, 
        token: Option<String>, 
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse>;
}

pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    pub fn new_dyn(client: Client, base_url: impl Into<String>) -> DynApiTransport {
        Arc::new(ReqwestTransport { client, base_url: base_url.into() })
    }
}

#[async_trait]
impl ApiTransport for ReqwestTransport {
    async fn send(
        &self, 
        method: Method, 
        path: &str, 
        token: Option<String>, 
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse> {
        let mut req = self.client.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }

        let res = req.send().await?;
        let status = res.status();
        Ok(ApiResponse { status, body: res.text().await? })
    }
}
