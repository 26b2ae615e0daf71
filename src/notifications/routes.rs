use axum::{extract::{Path, State}, routing::{get, post}, Json, Router};
use uuid::Uuid;

use crate::{auth::middleware::AuthUser, state::AppState};

use super::{error::Result, models::{CreateNotificationModel, MarkReadResponseModel, NotificationModel}, DynNotificationService};

pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(get_notifications).post(post_notification))
        .route("/unread", get(get_unread_notifications))
        .route("/unread/count", get(get_unread_count))
        .route("/mark-all-read", post(mark_all_read))
        .route("/{notification_id}/mark-read", post(mark_read))
        .with_state(app_state)
}

pub async fn get_notifications(
    State(notif_svc): State<DynNotificationService>,
    user: AuthUser,
) -> Result<Json<Vec<NotificationModel>>> {
    Ok(Json(notif_svc.get_notifications(user.id).await?))
}

pub async fn post_notification(
    State(notif_svc): State<DynNotificationService>,
    user: AuthUser,
    Json(body): Json<CreateNotificationModel>,
) -> Result<Json<NotificationModel>> {
    Ok(Json(notif_svc.create_notification(user.id, body).await?))
}

pub async fn get_unread_notifications(
    State(notif_svc): State<DynNotificationService>,
    user: AuthUser,
) -> Result<Json<Vec<NotificationModel>>> {
    Ok(Json(notif_svc.get_unread_notifications(user.id).await?))
}

pub async fn get_unread_count(
    State(notif_svc): State<DynNotificationService>,
    user: AuthUser,
) -> Result<Json<u64>> {
    Ok(Json(notif_svc.get_unread_count(user.id).await?))
}

pub async fn mark_read(
    State(notif_svc): State<DynNotificationService>,
    user: AuthUser,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<MarkReadResponseModel>> {
    notif_svc.mark_read(user.id, notification_id).await?;
    Ok(Json(MarkReadResponseModel { 
        success: true, 
        message: String::from("Notification marked as read"), 
        updated: 1,
    }))
}

pub async fn mark_all_read(
    State(notif_svc): State<DynNotificationService>,
    user: AuthUser,
) -> Result<Json<MarkReadResponseModel>> {
    let updated = notif_svc.mark_all_read(user.id).await?;
    Ok(Json(MarkReadResponseModel { 
        success: true, 
        message: String::from("All notifications marked as read"), 
        updated,
    }))
}
