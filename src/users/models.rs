use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::users;

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_DATE_FORMAT: &str = "MM/DD/YYYY";
pub const PHOTO_URL: &str = "/api/user/photo";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequestModel {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequestModel {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequestModel {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesModel {
    pub currency: String,
    pub date_format: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponseModel {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub currency: String,
    pub date_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for UserResponseModel {
    fn from(value: users::Model) -> Self {
        UserResponseModel { 
            id: value.id, 
            first_name: value.first_name, 
            last_name: value.last_name, 
            email: value.email, 
            currency: value.currency, 
            date_format: value.date_format, 
            photo_url: value.photo.as_ref().map(|_| String::from(PHOTO_URL)),
            created_at: value.created_on_utc,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SuccessResponseModel {
    pub success: bool,
}
