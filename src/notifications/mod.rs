use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{prelude::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::{date_time_provider::DynDateTimeProvider, entities::{notifications, prelude::*}};

use {error::*, models::*};

pub mod error;
pub mod models;
pub mod routes;


pub type DynNotificationService = Arc<dyn NotificationService + Send + Sync>;

#[async_trait]
pub trait NotificationService {
    async fn create_notification(&self, user_id: Uuid, req: CreateNotificationModel) -> Result<NotificationModel>;
    async fn get_notifications(&self, user_id: Uuid) -> Result<Vec<NotificationModel>>;
    async fn get_unread_notifications(&self, user_id: Uuid) -> Result<Vec<NotificationModel>>;
    async fn get_unread_count(&self, user_id: Uuid) -> Result<u64>;
    async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<()>;
    /// Returns the number of notifications that were unread
    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64>;
}

///
/// Inserts a notification on the given connection, so callers
/// can emit notifications inside their own database transaction
/// 
pub async fn insert_notification(
    conn: &impl ConnectionTrait,
    user_id: Uuid,
    created_on_utc: DateTime<Utc>,
    req: CreateNotificationModel,
) -> std::result::Result<notifications::Model, DbErr> {
    let new_notification = notifications::ActiveModel {
        id: Set(Uuid::now_v7()),
        user_id: Set(user_id),
        title: Set(req.title),
        message: Set(req.message),
        notification_type: Set(req.notification_type),
        is_read: Set(false),
        related_entity_id: Set(req.related_entity_id),
        related_entity_type: Set(req.related_entity_type),
        created_on_utc: Set(created_on_utc),
    };

    new_notification.insert(conn).await
}

pub struct DbConnNotificationService {
    db: DbConn,
    dt_provider: DynDateTimeProvider,
}

impl DbConnNotificationService {
    pub fn new_dyn(db: DbConn, dt_provider: DynDateTimeProvider) -> DynNotificationService {
        Arc::new(Self { db, dt_provider })
    }
}

#[async_trait]
impl NotificationService for DbConnNotificationService {
    async fn create_notification(&self, user_id: Uuid, req: CreateNotificationModel) -> Result<NotificationModel> {
        if req.title.trim().is_empty() {
            return Err(Error::EmptyTitle);
        }
        let created = insert_notification(&self.db, user_id, self.dt_provider.utc_now(), req).await?;
        Ok(created.into())
    }

    async fn get_notifications(&self, user_id: Uuid) -> Result<Vec<NotificationModel>> {
        let notifs = Notifications::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .order_by_desc(notifications::Column::CreatedOnUtc)
            .all(&self.db).await?;

        Ok(notifs.into_iter().map(|n| n.into()).collect())
    }

    async fn get_unread_notifications(&self, user_id: Uuid) -> Result<Vec<NotificationModel>> {
        let notifs = Notifications::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .order_by_desc(notifications::Column::CreatedOnUtc)
            .all(&self.db).await?;

        Ok(notifs.into_iter().map(|n| n.into()).collect())
    }

    async fn get_unread_count(&self, user_id: Uuid) -> Result<u64> {
        Ok(
            Notifications::find()
                .filter(notifications::Column::UserId.eq(user_id))
                .filter(notifications::Column::IsRead.eq(false))
                .count(&self.db).await?
        )
    }

    async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<()> {
        // Filtering on the owner turns foreign notifications into a not-found
        let res = Notifications::update_many()
            .filter(notifications::Column::Id.eq(notification_id))
            .filter(notifications::Column::UserId.eq(user_id))
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .exec(&self.db).await?;

        if res.rows_affected == 0 {
            return Err(Error::NotificationNotFound(notification_id));
        }
        Ok(())
    }

    async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let res = Notifications::update_many()
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .exec(&self.db).await?;

        Ok(res.rows_affected)
    }
}
