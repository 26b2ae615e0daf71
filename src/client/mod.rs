//! Typed client for the REST API, plus the view-model helpers a front end
//! needs to render spending limits and notifications.

use async_trait::async_trait;
use log::warn;
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::{
    auth::models::{LoginModel, LoginResponseModel}, 
    categories::models::{BulkDeleteCategoriesModel, CategoryModel}, 
    notifications::models::{MarkReadResponseModel, NotificationModel}, 
    spending_limits::models::{CreateSpendingLimitModel, SpendingLimitModel, UpdateSpendingLimitModel}, 
    users::models::PreferencesModel, 
    validations::{self, validate_email},
};

use {error::*, poller::UnreadCountSource, preferences::PreferenceCache, store::*, transport::*};

pub mod error;
pub mod poller;
pub mod preferences;
pub mod store;
pub mod transport;
pub mod views;


pub const SESSION_EXPIRED_REDIRECT: &str = "/auth/login?error=session_expired";

pub struct ApiClient {
    transport: DynApiTransport,
    store: DynKeyValueStore,
    prefs: PreferenceCache,
}

impl ApiClient {
    pub fn new(transport: DynApiTransport, store: DynKeyValueStore) -> Self {
        let prefs = PreferenceCache::new(store.clone());
        Self { transport, store, prefs }
    }

    /// Client talking to `base_url` over HTTP, keeping its session in memory
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(ReqwestTransport::new_dyn(Client::new(), base_url), MemoryStore::new_dyn())
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.get(JWT_TOKEN_KEY).is_some()
    }

    ///
    /// Validates the credentials locally before contacting the server.
    /// On success the token and email are kept in the store.
    /// 
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponseModel> {
        validate_email(email)?;
        if password.is_empty() {
            return Err(validations::error::Error::EmptyPassword.into());
        }

        let body = to_body(&LoginModel { 
            email: email.trim().to_string(), 
            password: password.to_string(),
        })?;
        let res = self.transport.send(Method::POST, "/api/auth/login", None, Some(body)).await?;
        let login: LoginResponseModel = parse(&check_status(res)?)?;

        self.store.set(JWT_TOKEN_KEY, login.token.clone());
        self.store.set(USER_EMAIL_KEY, login.email.clone());
        Ok(login)
    }

    pub fn logout(&self) {
        self.store.remove(JWT_TOKEN_KEY);
        self.store.remove(USER_EMAIL_KEY);
    }

    pub async fn get_limits(&self) -> Result<Vec<SpendingLimitModel>> {
        parse(&self.send_authed(Method::GET, "/api/spending-limits", None).await?)
    }

    pub async fn create_limit(&self, req: &CreateSpendingLimitModel) -> Result<SpendingLimitModel> {
        parse(&self.send_authed(Method::POST, "/api/spending-limits", Some(to_body(req)?)).await?)
    }

    pub async fn update_limit(&self, limit_id: Uuid, req: &UpdateSpendingLimitModel) -> Result<SpendingLimitModel> {
        let path = format!("/api/spending-limits/{}", limit_id);
        parse(&self.send_authed(Method::PUT, &path, Some(to_body(req)?)).await?)
    }

    pub async fn delete_limit(&self, limit_id: Uuid) -> Result<()> {
        let path = format!("/api/spending-limits/{}", limit_id);
        self.send_authed(Method::DELETE, &path, None).await?;
        Ok(())
    }

    pub async fn get_notifications(&self) -> Result<Vec<NotificationModel>> {
        parse(&self.send_authed(Method::GET, "/api/notifications", None).await?)
    }

    pub async fn get_unread_count(&self) -> Result<u64> {
        parse(&self.send_authed(Method::GET, "/api/notifications/unread/count", None).await?)
    }

    pub async fn mark_read(&self, notification_id: Uuid) -> Result<()> {
        let path = format!("/api/notifications/{}/mark-read", notification_id);
        self.send_authed(Method::POST, &path, None).await?;
        Ok(())
    }

    /// Returns the number of notifications marked
    pub async fn mark_all_read(&self) -> Result<u64> {
        let res: MarkReadResponseModel = parse(
            &self.send_authed(Method::POST, "/api/notifications/mark-all-read", None).await?
        )?;
        Ok(res.updated)
    }

    pub async fn get_categories(&self) -> Result<Vec<CategoryModel>> {
        parse(&self.send_authed(Method::GET, "/api/categories", None).await?)
    }

    pub async fn delete_categories(&self, ids: Vec<Uuid>) -> Result<()> {
        let body = to_body(&BulkDeleteCategoriesModel { ids })?;
        self.send_authed(Method::DELETE, "/api/categories", Some(body)).await?;
        Ok(())
    }

    /// Server preferences, overridden by any locally cached values
    pub async fn get_preferences(&self) -> Result<PreferencesModel> {
        let server: PreferencesModel = parse(&self.send_authed(Method::GET, "/api/user/preferences", None).await?)?;
        let prefs = self.prefs.resolve(server);
        self.prefs.save(&prefs);
        Ok(prefs)
    }

    ///
    /// Caches the preferences before sending them, so the local choice
    /// stands even when the server rejects or fails the update
    /// 
    pub async fn update_preferences(&self, prefs: PreferencesModel) -> Result<PreferencesModel> {
        self.prefs.save(&prefs);
        parse(&self.send_authed(Method::POST, "/api/user/preferences", Some(to_body(&prefs)?)).await?)
    }

    async fn send_authed(&self, method: Method, path: &str, body: Option<serde_json::Value>) -> Result<String> {
        let token = self.store.get(JWT_TOKEN_KEY);
        let res = self.transport.send(method, path, token, body).await?;

        if res.status == StatusCode::UNAUTHORIZED || res.status == StatusCode::FORBIDDEN {
            warn!("Session rejected with {} on {}, clearing stored credentials", res.status, path);
            self.logout();
            return Err(ClientError::SessionExpired { redirect: SESSION_EXPIRED_REDIRECT.to_string() });
        }

        check_status(res)
    }
}

#[async_trait]
impl UnreadCountSource for ApiClient {
    async fn unread_count(&self) -> Result<u64> {
        self.get_unread_count().await
    }
}

fn to_body(value: &impl Serialize) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(value)?)
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

///
/// Returns the body of a successful response. Failures carry the server's
/// `error` message when there is one.
/// 
fn check_status(res: ApiResponse) -> Result<String> {
    if res.status.is_success() {
        return Ok(res.body);
    }

    let message = serde_json::from_str::<serde_json::Value>(&res.body).ok()
        .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or(res.body);
    Err(ClientError::StatusError(res.status, message))
}
