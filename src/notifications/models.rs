use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{notifications, sea_orm_active_enums::NotificationType};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationModel {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub related_entity_id: Option<Uuid>,
    pub related_entity_type: Option<String>,
}

impl From<notifications::Model> for NotificationModel {
    fn from(value: notifications::Model) -> Self {
        NotificationModel {
            id: value.id,
            notification_type: value.notification_type,
            title: value.title,
            message: value.message,
            is_read: value.is_read,
            created_at: value.created_on_utc,
            related_entity_id: value.related_entity_id,
            related_entity_type: value.related_entity_type,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationModel {
    #[serde(rename = "type", default = "default_notification_type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub related_entity_id: Option<Uuid>,
    #[serde(default)]
    pub related_entity_type: Option<String>,
}

fn default_notification_type() -> NotificationType {
    NotificationType::General
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponseModel {
    pub success: bool,
    pub message: String,
    pub updated: u64,
}
