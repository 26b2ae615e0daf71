use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, DbConn, EntityTrait, QueryFilter};

use crate::{
    db_utils::DbUtilsError, 
    entities::{notifications, prelude::*, sea_orm_active_enums::{LimitPeriod, NotificationType, TransactionType}}, 
    test_utils::*,
};

use super::{error::Error, models::*, DbConnSpendingLimitService, SpendingLimitService, SPENDING_LIMIT_ENTITY_TYPE};

async fn create_test_service() -> anyhow::Result<(DbConnSpendingLimitService, DbConn)> {
    let db = create_test_db().await?;
    let svc = service_at(&db, 2024, 11, 10);
    Ok((svc, db))
}

fn service_at(db: &DbConn, y: i32, m: u32, d: u32) -> DbConnSpendingLimitService {
    DbConnSpendingLimitService { 
        db: db.clone(), 
        dt_provider: fixed_dt_provider(test_now(y, m, d)),
    }
}

fn food_limit(period: LimitPeriod) -> CreateSpendingLimitModel {
    CreateSpendingLimitModel { 
        category_id: Some(*TEST_CAT_1_ID), 
        limit_amount: dec!(500), 
        period, 
        notification_threshold: dec!(0.8),
    }
}

async fn user_notifications(db: &DbConn) -> anyhow::Result<Vec<notifications::Model>> {
    Ok(
        Notifications::find()
            .filter(notifications::Column::UserId.eq(*TEST_USER_1_ID))
            .all(db).await?
    )
}

async fn add_food_expense(db: &DbConn, cents: i64, d: u32) -> anyhow::Result<()> {
    insert_test_tx(db, *TEST_USER_1_ID, Some(*TEST_CAT_1_ID), cents, test_date(2024, 11, d), TransactionType::Expense).await?;
    Ok(())
}

#[tokio::test]
async fn test_create_limit_reports_usage() -> anyhow::Result<()> {
    let (svc, db) = create_test_service().await?;
    add_food_expense(&db, 45000, 5).await?;

    let limit = svc.create_limit(*TEST_USER_1_ID, food_limit(LimitPeriod::Monthly)).await?;

    assert_eq!("Food", limit.category_name);
    assert_eq!(dec!(450), limit.current_spent);
    assert_eq!(dec!(90), limit.usage_percentage);
    assert_eq!(dec!(50), limit.remaining_amount);
    assert!(limit.is_threshold_exceeded);
    assert!(!limit.is_limit_exceeded);
    assert_eq!(test_date(2024, 11, 1), limit.period_start);
    assert_eq!(test_date(2024, 11, 30), limit.period_end);

    // Already over the threshold when created
    let notifs = user_notifications(&db).await?;
    assert_eq!(1, notifs.len());
    assert_eq!(NotificationType::SpendingLimitWarning, notifs[0].notification_type);
    assert_eq!(Some(limit.id), notifs[0].related_entity_id);
    assert_eq!(Some(SPENDING_LIMIT_ENTITY_TYPE.to_string()), notifs[0].related_entity_type);
    assert_eq!(
        "You're approaching your spending limit for Food. Limit: $500.00, Current spending: $450.00",
        notifs[0].message
    );

    Ok(())
}

#[tokio::test]
async fn test_warning_notified_once_per_window() -> anyhow::Result<()> {
    let (svc, db) = create_test_service().await?;
    svc.create_limit(*TEST_USER_1_ID, food_limit(LimitPeriod::Monthly)).await?;
    assert!(user_notifications(&db).await?.is_empty());

    add_food_expense(&db, 40000, 8).await?;
    let limits = svc.evaluate_limits(*TEST_USER_1_ID).await?;
    assert_eq!(dec!(80), limits[0].usage_percentage);

    let notifs = user_notifications(&db).await?;
    assert_eq!(1, notifs.len());
    assert_eq!(NotificationType::SpendingLimitWarning, notifs[0].notification_type);

    // Still above the threshold, no new notification
    add_food_expense(&db, 1000, 9).await?;
    svc.evaluate_limits(*TEST_USER_1_ID).await?;
    assert_eq!(1, user_notifications(&db).await?.len());

    Ok(())
}

#[tokio::test]
async fn test_exceeded_notified_without_warning() -> anyhow::Result<()> {
    let (svc, db) = create_test_service().await?;
    svc.create_limit(*TEST_USER_1_ID, food_limit(LimitPeriod::Monthly)).await?;

    add_food_expense(&db, 60000, 10).await?;
    let limits = svc.evaluate_limits(*TEST_USER_1_ID).await?;
    assert!(limits[0].is_limit_exceeded);
    assert_eq!(dec!(-100), limits[0].remaining_amount);
    assert_eq!(dec!(120), limits[0].usage_percentage);

    let notifs = user_notifications(&db).await?;
    assert_eq!(1, notifs.len());
    assert_eq!(NotificationType::SpendingLimitExceeded, notifs[0].notification_type);
    assert_eq!("Spending Limit Exceeded!", notifs[0].title);

    Ok(())
}

#[tokio::test]
async fn test_warning_then_exceeded() -> anyhow::Result<()> {
    let (svc, db) = create_test_service().await?;
    svc.create_limit(*TEST_USER_1_ID, food_limit(LimitPeriod::Monthly)).await?;

    add_food_expense(&db, 42000, 3).await?;
    svc.evaluate_limits(*TEST_USER_1_ID).await?;
    add_food_expense(&db, 8000, 4).await?;
    svc.evaluate_limits(*TEST_USER_1_ID).await?;

    let types: Vec<_> = user_notifications(&db).await?.into_iter().map(|n| n.notification_type).collect();
    assert_eq!(2, types.len());
    assert!(types.contains(&NotificationType::SpendingLimitWarning));
    assert!(types.contains(&NotificationType::SpendingLimitExceeded));

    Ok(())
}

#[tokio::test]
async fn test_new_window_rearms_notifications() -> anyhow::Result<()> {
    let (svc, db) = create_test_service().await?;
    svc.create_limit(*TEST_USER_1_ID, food_limit(LimitPeriod::Weekly)).await?;

    // Sunday, last day of the week
    add_food_expense(&db, 45000, 10).await?;
    svc.evaluate_limits(*TEST_USER_1_ID).await?;
    assert_eq!(1, user_notifications(&db).await?.len());

    // Monday starts a new window
    let svc = service_at(&db, 2024, 11, 11);
    add_food_expense(&db, 45000, 11).await?;
    let limits = svc.evaluate_limits(*TEST_USER_1_ID).await?;
    assert_eq!(dec!(450), limits[0].current_spent);
    assert_eq!(test_date(2024, 11, 11), limits[0].period_start);
    assert_eq!(test_date(2024, 11, 17), limits[0].period_end);

    assert_eq!(2, user_notifications(&db).await?.len());

    Ok(())
}

#[tokio::test]
async fn test_global_limit_sums_all_expense_categories() -> anyhow::Result<()> {
    let (svc, db) = create_test_service().await?;
    add_food_expense(&db, 10000, 2).await?;
    insert_test_tx(&db, *TEST_USER_1_ID, Some(*TEST_CAT_2_ID), 20000, test_date(2024, 11, 3), TransactionType::Expense).await?;
    insert_test_tx(&db, *TEST_USER_1_ID, None, 5000, test_date(2024, 11, 4), TransactionType::Expense).await?;
    // Ignored: income, other month, other user
    insert_test_tx(&db, *TEST_USER_1_ID, Some(*TEST_CAT_1_ID), 100000, test_date(2024, 11, 4), TransactionType::Income).await?;
    insert_test_tx(&db, *TEST_USER_1_ID, Some(*TEST_CAT_1_ID), 30000, test_date(2024, 10, 31), TransactionType::Expense).await?;
    insert_test_tx(&db, *TEST_USER_2_ID, Some(*TEST_USER_2_CAT_ID), 30000, test_date(2024, 11, 4), TransactionType::Expense).await?;

    let limit = svc.create_limit(*TEST_USER_1_ID, CreateSpendingLimitModel { 
        category_id: None, 
        limit_amount: dec!(1000), 
        period: LimitPeriod::Monthly, 
        notification_threshold: dec!(0.8),
    }).await?;

    assert_eq!(GLOBAL_LIMIT_NAME, limit.category_name);
    assert_eq!(dec!(350), limit.current_spent);
    assert_eq!(dec!(35), limit.usage_percentage);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_active_limit_rejected() -> anyhow::Result<()> {
    let (svc, _db) = create_test_service().await?;
    let limit = svc.create_limit(*TEST_USER_1_ID, food_limit(LimitPeriod::Monthly)).await?;

    let res = svc.create_limit(*TEST_USER_1_ID, food_limit(LimitPeriod::Weekly)).await;
    assert!(matches!(res, Err(Error::LimitAlreadyExists)));

    let global = CreateSpendingLimitModel { 
        category_id: None, 
        limit_amount: dec!(2000), 
        period: LimitPeriod::Monthly, 
        notification_threshold: dec!(0.9),
    };
    svc.create_limit(*TEST_USER_1_ID, global.clone()).await?;
    let res = svc.create_limit(*TEST_USER_1_ID, global).await;
    assert!(matches!(res, Err(Error::LimitAlreadyExists)));

    // A deleted limit no longer blocks a new one
    svc.delete_limit(*TEST_USER_1_ID, limit.id).await?;
    svc.create_limit(*TEST_USER_1_ID, food_limit(LimitPeriod::Weekly)).await?;

    Ok(())
}

#[tokio::test]
async fn test_invalid_limit_values_rejected() -> anyhow::Result<()> {
    let (svc, _db) = create_test_service().await?;

    let mut req = food_limit(LimitPeriod::Monthly);
    req.limit_amount = dec!(0);
    let res = svc.create_limit(*TEST_USER_1_ID, req).await;
    assert!(matches!(res, Err(Error::InvalidLimitAmount(_))));

    let mut req = food_limit(LimitPeriod::Monthly);
    req.notification_threshold = dec!(1.5);
    let res = svc.create_limit(*TEST_USER_1_ID, req).await;
    assert!(matches!(res, Err(Error::InvalidThreshold(_))));

    let mut req = food_limit(LimitPeriod::Monthly);
    req.notification_threshold = dec!(-0.1);
    let res = svc.create_limit(*TEST_USER_1_ID, req).await;
    assert!(matches!(res, Err(Error::InvalidThreshold(_))));

    // Too large to store in minor units
    let mut req = food_limit(LimitPeriod::Monthly);
    req.limit_amount = dec!(1e28);
    let res = svc.create_limit(*TEST_USER_1_ID, req).await;
    assert!(matches!(res, Err(Error::InvalidLimitAmount(_))));

    Ok(())
}

#[tokio::test]
async fn test_category_must_be_visible() -> anyhow::Result<()> {
    let (svc, _db) = create_test_service().await?;

    let mut req = food_limit(LimitPeriod::Monthly);
    req.category_id = Some(*TEST_USER_2_CAT_ID);
    let res = svc.create_limit(*TEST_USER_1_ID, req).await;
    assert!(matches!(res, Err(Error::DbUtilsError(DbUtilsError::CategoryNotVisible(_, id))) if id == *TEST_USER_2_CAT_ID));

    // Defaults are usable by everyone
    let mut req = food_limit(LimitPeriod::Monthly);
    req.category_id = Some(*TEST_DEFAULT_CAT_ID);
    let limit = svc.create_limit(*TEST_USER_1_ID, req).await?;
    assert_eq!("Utilities", limit.category_name);

    Ok(())
}

#[tokio::test]
async fn test_delete_is_soft() -> anyhow::Result<()> {
    let (svc, db) = create_test_service().await?;
    let limit = svc.create_limit(*TEST_USER_1_ID, food_limit(LimitPeriod::Monthly)).await?;

    svc.delete_limit(*TEST_USER_1_ID, limit.id).await?;

    assert!(svc.get_limits(*TEST_USER_1_ID).await?.is_empty());
    let res = svc.get_limit(*TEST_USER_1_ID, limit.id).await;
    assert!(matches!(res, Err(Error::LimitNotFound(id)) if id == limit.id));

    let db_limit = SpendingLimits::find_by_id(limit.id).one(&db).await?;
    assert!(db_limit.is_some_and(|l| !l.is_active));

    Ok(())
}

#[tokio::test]
async fn test_foreign_limit_not_found() -> anyhow::Result<()> {
    let (svc, _db) = create_test_service().await?;
    let limit = svc.create_limit(*TEST_USER_1_ID, food_limit(LimitPeriod::Monthly)).await?;

    let res = svc.get_limit(*TEST_USER_2_ID, limit.id).await;
    assert!(matches!(res, Err(Error::LimitNotFound(_))));

    let res = svc.delete_limit(*TEST_USER_2_ID, limit.id).await;
    assert!(matches!(res, Err(Error::LimitNotFound(_))));

    assert!(svc.get_limits(*TEST_USER_2_ID).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_lowering_limit_notifies() -> anyhow::Result<()> {
    let (svc, db) = create_test_service().await?;
    add_food_expense(&db, 30000, 6).await?;
    let limit = svc.create_limit(*TEST_USER_1_ID, food_limit(LimitPeriod::Monthly)).await?;
    assert!(user_notifications(&db).await?.is_empty());

    let updated = svc.update_limit(*TEST_USER_1_ID, limit.id, UpdateSpendingLimitModel { 
        limit_amount: dec!(350), 
        period: LimitPeriod::Monthly, 
        notification_threshold: dec!(0.8),
    }).await?;

    assert_eq!(dec!(85.71), updated.usage_percentage);
    assert!(updated.is_threshold_exceeded);
    assert_eq!(Some(*TEST_CAT_1_ID), updated.category_id);

    let notifs = user_notifications(&db).await?;
    assert_eq!(1, notifs.len());
    assert_eq!(NotificationType::SpendingLimitWarning, notifs[0].notification_type);

    Ok(())
}

#[tokio::test]
async fn test_future_dated_expense_not_spent_yet() -> anyhow::Result<()> {
    let (svc, db) = create_test_service().await?;
    add_food_expense(&db, 12000, 28).await?;

    let mut req = food_limit(LimitPeriod::Monthly);
    req.limit_amount = dec!(100);
    let limit = svc.create_limit(*TEST_USER_1_ID, req).await?;

    assert_eq!(dec!(0), limit.current_spent);
    assert!(!limit.is_limit_exceeded);
    assert!(!limit.is_threshold_exceeded);
    assert_eq!(test_date(2024, 11, 30), limit.period_end);
    assert!(user_notifications(&db).await?.is_empty());

    let limits = svc.evaluate_limits(*TEST_USER_1_ID).await?;
    assert_eq!(dec!(0), limits[0].current_spent);
    assert!(user_notifications(&db).await?.is_empty());

    // Counts once its date arrives
    let svc = service_at(&db, 2024, 11, 28);
    let limits = svc.evaluate_limits(*TEST_USER_1_ID).await?;
    assert_eq!(dec!(120), limits[0].current_spent);
    assert!(limits[0].is_limit_exceeded);

    let notifs = user_notifications(&db).await?;
    assert_eq!(1, notifs.len());
    assert_eq!(NotificationType::SpendingLimitExceeded, notifs[0].notification_type);

    Ok(())
}

#[tokio::test]
async fn test_expenses_outside_window_ignored() -> anyhow::Result<()> {
    let db = create_test_db().await?;
    insert_test_tx(&db, *TEST_USER_1_ID, Some(*TEST_CAT_1_ID), 20000, test_date(2024, 10, 20), TransactionType::Expense).await?;
    insert_test_tx(&db, *TEST_USER_1_ID, Some(*TEST_CAT_1_ID), 30000, test_date(2024, 10, 31), TransactionType::Expense).await?;
    add_food_expense(&db, 5000, 2).await?;

    let october = service_at(&db, 2024, 10, 25);
    let limit = october.create_limit(*TEST_USER_1_ID, food_limit(LimitPeriod::Monthly)).await?;
    assert_eq!(dec!(200), limit.current_spent);
    assert_eq!(test_date(2024, 10, 1), limit.period_start);

    let month_end = service_at(&db, 2024, 10, 31);
    assert_eq!(dec!(500), month_end.get_limit(*TEST_USER_1_ID, limit.id).await?.current_spent);

    // October no longer counts in November
    let november = service_at(&db, 2024, 11, 10);
    let limit = november.get_limit(*TEST_USER_1_ID, limit.id).await?;
    assert_eq!(dec!(50), limit.current_spent);
    assert_eq!(test_date(2024, 11, 1), limit.period_start);

    Ok(())
}

#[test]
fn test_period_defaults_to_monthly() -> anyhow::Result<()> {
    let req: CreateSpendingLimitModel = serde_json::from_str(r#"{"categoryId":null,"limitAmount":250}"#)?;
    assert_eq!(LimitPeriod::Monthly, req.period);
    assert_eq!(dec!(0.8), req.notification_threshold);
    assert_eq!(dec!(250), req.limit_amount);

    let req: UpdateSpendingLimitModel = serde_json::from_str(r#"{"limitAmount":250,"notificationThreshold":0.5}"#)?;
    assert_eq!(LimitPeriod::Monthly, req.period);
    assert_eq!(dec!(0.5), req.notification_threshold);

    let req: CreateSpendingLimitModel = serde_json::from_str(r#"{"limitAmount":250,"period":"WEEKLY"}"#)?;
    assert_eq!(LimitPeriod::Weekly, req.period);

    Ok(())
}
