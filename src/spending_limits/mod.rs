use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::NaiveDate;
use log::info;
#[cfg(test)]
use mockall::automock;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, DbConn, EntityTrait, FromQueryResult, IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    date_time_provider::DynDateTimeProvider, 
    db_utils::find_visible_category, 
    entities::{categories, prelude::*, sea_orm_active_enums::{NotificationType, TransactionType}, spending_limits, transactions}, 
    money::{from_minor, to_minor}, 
    notifications::{insert_notification, models::CreateNotificationModel},
};

use {error::*, evaluator::*, models::*, period::PeriodWindow};

pub mod error;
pub mod evaluator;
pub mod models;
pub mod period;
pub mod routes;

#[cfg(test)]
mod test;

pub const SPENDING_LIMIT_ENTITY_TYPE: &str = "SPENDING_LIMIT";

pub type DynSpendingLimitService = Arc<dyn SpendingLimitService + Send + Sync>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpendingLimitService {
    async fn get_limits(&self, user_id: Uuid) -> Result<Vec<SpendingLimitModel>>;
    async fn get_limit(&self, user_id: Uuid, limit_id: Uuid) -> Result<SpendingLimitModel>;
    async fn create_limit(&self, user_id: Uuid, req: CreateSpendingLimitModel) -> Result<SpendingLimitModel>;
    async fn update_limit(&self, user_id: Uuid, limit_id: Uuid, req: UpdateSpendingLimitModel) -> Result<SpendingLimitModel>;
    async fn delete_limit(&self, user_id: Uuid, limit_id: Uuid) -> Result<()>;
    ///
    /// Re-evaluates every active limit of the user after their transactions changed,
    /// storing the new spend and emitting notifications for limits that crossed
    /// their threshold or amount since the last evaluation
    /// 
    async fn evaluate_limits(&self, user_id: Uuid) -> Result<Vec<SpendingLimitModel>>;
}

pub struct DbConnSpendingLimitService {
    db: DbConn,
    dt_provider: DynDateTimeProvider,
}

impl DbConnSpendingLimitService {
    pub fn new_dyn(db: DbConn, dt_provider: DynDateTimeProvider) -> DynSpendingLimitService {
        Arc::new(Self { db, dt_provider })
    }

    fn today(&self) -> NaiveDate {
        self.dt_provider.utc_now().date_naive()
    }
}

#[async_trait]
impl SpendingLimitService for DbConnSpendingLimitService {
    async fn get_limits(&self, user_id: Uuid) -> Result<Vec<SpendingLimitModel>> {
        let today = self.today();
        let limits = SpendingLimits::find()
            .filter(spending_limits::Column::UserId.eq(user_id))
            .filter(spending_limits::Column::IsActive.eq(true))
            .order_by_asc(spending_limits::Column::CreatedOnUtc)
            .all(&self.db).await?;

        let names = category_names(&self.db, &limits).await?;

        let mut models = Vec::with_capacity(limits.len());
        for limit in limits {
            let window = PeriodWindow::containing(limit.period, today);
            let spent = current_spent(&self.db, user_id, limit.category_id, &window, today).await?;
            let usage = evaluate_limit(&limit, spent);
            let name = name_for(&names, limit.category_id);
            models.push(to_model(&limit, name, &window, &usage));
        }

        Ok(models)
    }

    async fn get_limit(&self, user_id: Uuid, limit_id: Uuid) -> Result<SpendingLimitModel> {
        let limit = find_owned_limit(&self.db, user_id, limit_id).await?;
        let today = self.today();
        let window = PeriodWindow::containing(limit.period, today);
        let spent = current_spent(&self.db, user_id, limit.category_id, &window, today).await?;
        let name = category_name(&self.db, limit.category_id).await?;

        Ok(to_model(&limit, name, &window, &evaluate_limit(&limit, spent)))
    }

    async fn create_limit(&self, user_id: Uuid, req: CreateSpendingLimitModel) -> Result<SpendingLimitModel> {
        let (limit_amount, threshold) = validate_limit(req.limit_amount, req.notification_threshold)?;
        let now = self.dt_provider.utc_now();
        let window = PeriodWindow::containing(req.period, now.date_naive());

        let tx = self.db.begin().await?;

        let name = if let Some(cat_id) = req.category_id {
            find_visible_category(&tx, user_id, cat_id).await?.name
        } else {
            GLOBAL_LIMIT_NAME.to_string()
        };

        // Only one active limit may exist per category, and one global limit per user
        let existing = SpendingLimits::find()
            .filter(spending_limits::Column::UserId.eq(user_id))
            .filter(spending_limits::Column::IsActive.eq(true))
            .filter(match req.category_id {
                Some(cat_id) => spending_limits::Column::CategoryId.eq(cat_id),
                None => spending_limits::Column::CategoryId.is_null(),
            })
            .one(&tx).await?;
        if existing.is_some() {
            return Err(Error::LimitAlreadyExists);
        }

        let spent = current_spent(&tx, user_id, req.category_id, &window, now.date_naive()).await?;
        let limit = spending_limits::Model {
            id: Uuid::now_v7(),
            user_id,
            category_id: req.category_id,
            limit_amount,
            period: req.period,
            notification_threshold: threshold,
            current_spent: spent,
            evaluated_from: Some(window.start),
            is_active: true,
            created_on_utc: now,
            updated_on_utc: now,
        };
        SpendingLimits::insert(new_limit_active_model(&limit)).exec(&tx).await?;

        let usage = evaluate_limit(&limit, spent);
        if let Some(crossing) = detect_crossing(None, &usage) {
            notify_crossing(&tx, &limit, &name, &usage, crossing, now).await?;
        }
        tx.commit().await?;

        info!("Created spending limit {} for user {}", limit.id, user_id);
        Ok(to_model(&limit, name, &window, &usage))
    }

    async fn update_limit(&self, user_id: Uuid, limit_id: Uuid, req: UpdateSpendingLimitModel) -> Result<SpendingLimitModel> {
        let (limit_amount, threshold) = validate_limit(req.limit_amount, req.notification_threshold)?;
        let now = self.dt_provider.utc_now();
        let window = PeriodWindow::containing(req.period, now.date_naive());

        let tx = self.db.begin().await?;
        let ex_limit = find_owned_limit(&tx, user_id, limit_id).await?;
        let name = category_name(&tx, ex_limit.category_id).await?;

        // Crossing is measured against the last evaluation under the old settings
        let previous = previous_usage(&ex_limit, now.date_naive());

        let spent = current_spent(&tx, user_id, ex_limit.category_id, &window, now.date_naive()).await?;
        let mut updated = ex_limit.clone();
        updated.limit_amount = limit_amount;
        updated.period = req.period;
        updated.notification_threshold = threshold;
        updated.current_spent = spent;
        updated.evaluated_from = Some(window.start);
        updated.updated_on_utc = now;

        let mut active = ex_limit.into_active_model();
        active.limit_amount = Set(updated.limit_amount);
        active.period = Set(updated.period);
        active.notification_threshold = Set(updated.notification_threshold);
        active.current_spent = Set(updated.current_spent);
        active.evaluated_from = Set(updated.evaluated_from);
        active.updated_on_utc = Set(updated.updated_on_utc);
        SpendingLimits::update(active).exec(&tx).await?;

        let usage = evaluate_limit(&updated, spent);
        if let Some(crossing) = detect_crossing(Some(&previous), &usage) {
            notify_crossing(&tx, &updated, &name, &usage, crossing, now).await?;
        }
        tx.commit().await?;

        Ok(to_model(&updated, name, &window, &usage))
    }

    async fn delete_limit(&self, user_id: Uuid, limit_id: Uuid) -> Result<()> {
        let limit = find_owned_limit(&self.db, user_id, limit_id).await?;

        let mut active = limit.into_active_model();
        active.is_active = Set(false);
        active.updated_on_utc = Set(self.dt_provider.utc_now());
        SpendingLimits::update(active).exec(&self.db).await?;

        Ok(())
    }

    async fn evaluate_limits(&self, user_id: Uuid) -> Result<Vec<SpendingLimitModel>> {
        let now = self.dt_provider.utc_now();
        let today = now.date_naive();

        let tx = self.db.begin().await?;
        let limits = SpendingLimits::find()
            .filter(spending_limits::Column::UserId.eq(user_id))
            .filter(spending_limits::Column::IsActive.eq(true))
            .order_by_asc(spending_limits::Column::CreatedOnUtc)
            .all(&tx).await?;
        let names = category_names(&tx, &limits).await?;

        let mut models = Vec::with_capacity(limits.len());
        for limit in limits {
            let window = PeriodWindow::containing(limit.period, today);
            let spent = current_spent(&tx, user_id, limit.category_id, &window, today).await?;
            let previous = previous_usage(&limit, today);
            let name = name_for(&names, limit.category_id);

            let mut evaluated = limit.clone();
            evaluated.current_spent = spent;
            evaluated.evaluated_from = Some(window.start);
            let usage = evaluate_limit(&evaluated, spent);

            if let Some(crossing) = detect_crossing(Some(&previous), &usage) {
                notify_crossing(&tx, &evaluated, &name, &usage, crossing, now).await?;
            }

            if limit.current_spent != spent || limit.evaluated_from != Some(window.start) {
                evaluated.updated_on_utc = now;
                let mut active = limit.into_active_model();
                active.current_spent = Set(spent);
                active.evaluated_from = Set(Some(window.start));
                active.updated_on_utc = Set(now);
                SpendingLimits::update(active).exec(&tx).await?;
            }

            models.push(to_model(&evaluated, name, &window, &usage));
        }
        tx.commit().await?;

        Ok(models)
    }
}

fn validate_limit(limit_amount: Decimal, threshold: Decimal) -> Result<(i64, i64)> {
    if limit_amount <= Decimal::ZERO {
        return Err(Error::InvalidLimitAmount(limit_amount));
    }
    if threshold < Decimal::ZERO || threshold > Decimal::ONE {
        return Err(Error::InvalidThreshold(threshold));
    }
    let amount_minor = to_minor(limit_amount)
        .filter(|am| *am > 0)
        .ok_or(Error::InvalidLimitAmount(limit_amount))?;
    let threshold_minor = to_minor(threshold).ok_or(Error::InvalidThreshold(threshold))?;

    Ok((amount_minor, threshold_minor))
}

fn evaluate_limit(limit: &spending_limits::Model, spent: i64) -> LimitUsage {
    evaluate(
        from_minor(limit.limit_amount), 
        from_minor(limit.notification_threshold), 
        from_minor(spent)
    )
}

///
/// Usage recorded by the limit's last evaluation. A snapshot taken in an
/// earlier period window no longer applies, so it counts as no spend.
/// 
fn previous_usage(limit: &spending_limits::Model, today: NaiveDate) -> LimitUsage {
    let window = PeriodWindow::containing(limit.period, today);
    let spent = if limit.evaluated_from == Some(window.start) { limit.current_spent } else { 0 };
    evaluate_limit(limit, spent)
}

///
/// Sum of the user's expenses from the window start up to and including
/// `today`, in minor units. Expenses dated later in the window are not spent yet.
/// A `None` category sums over every category.
/// 
async fn current_spent(
    conn: &impl ConnectionTrait, 
    user_id: Uuid, 
    category_id: Option<Uuid>, 
    window: &PeriodWindow,
    today: NaiveDate,
) -> Result<i64> {
    #[derive(FromQueryResult)]
    struct SpentQuery { spent: Option<i64> }

    let mut query = Transactions::find().select_only()
        .filter(transactions::Column::UserId.eq(user_id))
        .filter(transactions::Column::TxType.eq(TransactionType::Expense))
        .filter(transactions::Column::Date.between(window.start, window.spent_until(today)));
    if let Some(cat_id) = category_id {
        query = query.filter(transactions::Column::CategoryId.eq(cat_id));
    }

    let spent = query
        .column_as(transactions::Column::Amount.sum(), "spent")
        .into_model::<SpentQuery>().one(conn).await?
        .and_then(|q| q.spent)
        .unwrap_or(0);

    Ok(spent)
}

async fn find_owned_limit(conn: &impl ConnectionTrait, user_id: Uuid, limit_id: Uuid) -> Result<spending_limits::Model> {
    SpendingLimits::find_by_id(limit_id)
        .filter(spending_limits::Column::UserId.eq(user_id))
        .filter(spending_limits::Column::IsActive.eq(true))
        .one(conn).await?
        .ok_or(Error::LimitNotFound(limit_id))
}

async fn category_name(conn: &impl ConnectionTrait, category_id: Option<Uuid>) -> Result<String> {
    return match category_id {
        Some(cat_id) => Ok(
            Categories::find_by_id(cat_id).one(conn).await?
                .map(|cat| cat.name)
                .unwrap_or_else(|| GLOBAL_LIMIT_NAME.to_string())
        ),
        None => Ok(GLOBAL_LIMIT_NAME.to_string()),
    };
}

async fn category_names(conn: &impl ConnectionTrait, limits: &[spending_limits::Model]) -> Result<HashMap<Uuid, String>> {
    let ids: Vec<Uuid> = limits.iter().filter_map(|l| l.category_id).collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let cats = Categories::find()
        .filter(categories::Column::Id.is_in(ids))
        .all(conn).await?;

    Ok(cats.into_iter().map(|cat| (cat.id, cat.name)).collect())
}

fn name_for(names: &HashMap<Uuid, String>, category_id: Option<Uuid>) -> String {
    category_id
        .and_then(|id| names.get(&id).cloned())
        .unwrap_or_else(|| GLOBAL_LIMIT_NAME.to_string())
}

async fn notify_crossing(
    conn: &impl ConnectionTrait,
    limit: &spending_limits::Model,
    name: &str,
    usage: &LimitUsage,
    crossing: Crossing,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<()> {
    let subject = if limit.category_id.is_some() { name.to_string() } else { String::from("total spending") };
    let limit_amount = from_minor(limit.limit_amount);

    let (notification_type, title, message) = match crossing {
        Crossing::Exceeded => (
            NotificationType::SpendingLimitExceeded,
            String::from("Spending Limit Exceeded!"),
            format!(
                "You've exceeded your spending limit for {}. Limit: ${:.2}, Current spending: ${:.2}",
                subject, limit_amount, usage.current_spent
            ),
        ),
        Crossing::Warning => (
            NotificationType::SpendingLimitWarning,
            String::from("Spending Limit Warning"),
            format!(
                "You're approaching your spending limit for {}. Limit: ${:.2}, Current spending: ${:.2}",
                subject, limit_amount, usage.current_spent
            ),
        ),
    };

    insert_notification(conn, limit.user_id, now, CreateNotificationModel {
        notification_type,
        title,
        message,
        related_entity_id: Some(limit.id),
        related_entity_type: Some(SPENDING_LIMIT_ENTITY_TYPE.to_string()),
    }).await?;

    info!("Spending limit {} crossed {:?} for user {}", limit.id, crossing, limit.user_id);
    Ok(())
}

fn new_limit_active_model(limit: &spending_limits::Model) -> spending_limits::ActiveModel {
    spending_limits::ActiveModel {
        id: Set(limit.id),
        user_id: Set(limit.user_id),
        category_id: Set(limit.category_id),
        limit_amount: Set(limit.limit_amount),
        period: Set(limit.period),
        notification_threshold: Set(limit.notification_threshold),
        current_spent: Set(limit.current_spent),
        evaluated_from: Set(limit.evaluated_from),
        is_active: Set(limit.is_active),
        created_on_utc: Set(limit.created_on_utc),
        updated_on_utc: Set(limit.updated_on_utc),
    }
}

fn to_model(limit: &spending_limits::Model, category_name: String, window: &PeriodWindow, usage: &LimitUsage) -> SpendingLimitModel {
    SpendingLimitModel {
        id: limit.id,
        category_id: limit.category_id,
        category_name,
        limit_amount: from_minor(limit.limit_amount),
        current_spent: usage.current_spent,
        period: limit.period,
        notification_threshold: from_minor(limit.notification_threshold),
        is_active: limit.is_active,
        remaining_amount: usage.remaining_amount,
        usage_percentage: usage.usage_percentage,
        is_threshold_exceeded: usage.is_threshold_exceeded,
        is_limit_exceeded: usage.is_limit_exceeded,
        period_start: window.start,
        period_end: window.end,
    }
}
