use std::sync::Arc;

use rust_decimal_macros::dec;
use sea_orm::{DbConn, DbErr, EntityTrait};
use uuid::Uuid;

use crate::{
    db_utils::DbUtilsError, 
    entities::{prelude::*, sea_orm_active_enums::{LimitPeriod, NotificationType, TransactionType}}, 
    spending_limits::{self, models::CreateSpendingLimitModel, DbConnSpendingLimitService, MockSpendingLimitService}, 
    test_utils::*,
};

use super::{error::Error, models::*, DbConnTransactionService, TransactionService};

async fn create_test_service() -> anyhow::Result<(DbConnTransactionService, DbConn)> {
    let db = create_test_db().await?;
    let dt_provider = fixed_dt_provider(test_now(2024, 11, 10));
    let svc = DbConnTransactionService {
        db: db.clone(),
        dt_provider: dt_provider.clone(),
        limit_svc: DbConnSpendingLimitService::new_dyn(db.clone(), dt_provider),
    };

    Ok((svc, db))
}

fn expense(amount: rust_decimal::Decimal, day: u32, category_id: Option<Uuid>) -> CreateTransactionModel {
    CreateTransactionModel { 
        category_id, 
        date: test_date(2024, 11, day), 
        amount, 
        description: String::from("  Groceries "), 
        tx_type: TransactionType::Expense,
    }
}

#[tokio::test]
async fn test_new_transaction() -> anyhow::Result<()> {
    let (svc, db) = create_test_service().await?;

    let created = svc.create_transaction(*TEST_USER_1_ID, expense(dec!(12.5), 4, Some(*TEST_CAT_1_ID))).await?;
    assert_eq!(Some(String::from("Food")), created.category_name);
    assert_eq!(dec!(12.5), created.amount);
    assert_eq!("Groceries", created.description);

    let tx = Transactions::find_by_id(created.id).one(&db).await?;
    assert!(tx.is_some());

    let tx = tx.unwrap();
    assert_eq!(*TEST_USER_1_ID, tx.user_id);
    assert_eq!(1250, tx.amount);
    assert_eq!(test_date(2024, 11, 4), tx.date);
    assert_eq!(TransactionType::Expense, tx.tx_type);
    assert_eq!(test_now(2024, 11, 10), tx.created_on_utc);

    // Default categories and no category are both allowed
    let created = svc.create_transaction(*TEST_USER_1_ID, expense(dec!(3), 4, Some(*TEST_DEFAULT_CAT_ID))).await?;
    assert_eq!(Some(String::from("Utilities")), created.category_name);
    let created = svc.create_transaction(*TEST_USER_1_ID, expense(dec!(3), 4, None)).await?;
    assert_eq!(None, created.category_name);

    Ok(())
}

#[tokio::test]
async fn test_invalid_amount_rejected() -> anyhow::Result<()> {
    let (svc, _db) = create_test_service().await?;

    let res = svc.create_transaction(*TEST_USER_1_ID, expense(dec!(0), 4, None)).await;
    assert!(matches!(res, Err(Error::InvalidAmount(_))));

    let res = svc.create_transaction(*TEST_USER_1_ID, expense(dec!(-20), 4, None)).await;
    assert!(matches!(res, Err(Error::InvalidAmount(_))));

    // Rounds to zero cents
    let res = svc.create_transaction(*TEST_USER_1_ID, expense(dec!(0.001), 4, None)).await;
    assert!(matches!(res, Err(Error::InvalidAmount(_))));

    // Too large to store in minor units
    let res = svc.create_transaction(*TEST_USER_1_ID, expense(dec!(1e28), 4, None)).await;
    assert!(matches!(res, Err(Error::InvalidAmount(_))));

    Ok(())
}

#[tokio::test]
async fn test_foreign_category_rejected() -> anyhow::Result<()> {
    let (svc, _db) = create_test_service().await?;

    let res = svc.create_transaction(*TEST_USER_1_ID, expense(dec!(10), 4, Some(*TEST_USER_2_CAT_ID))).await;
    assert!(
        matches!(
            res, 
            Err(Error::DbUtilsError(DbUtilsError::CategoryNotVisible(user_id, cat_id)))
                if user_id == *TEST_USER_1_ID && cat_id == *TEST_USER_2_CAT_ID
        )
    );

    Ok(())
}

#[tokio::test]
async fn test_transactions_listed_newest_first() -> anyhow::Result<()> {
    let (svc, _db) = create_test_service().await?;
    for day in [3, 9, 1] {
        svc.create_transaction(*TEST_USER_1_ID, expense(dec!(10), day, None)).await?;
    }
    svc.create_transaction(*TEST_USER_2_ID, expense(dec!(10), 5, None)).await?;

    let txs = svc.get_transactions(*TEST_USER_1_ID).await?;
    let days: Vec<_> = txs.iter().map(|tx| tx.date).collect();
    assert_eq!(vec![test_date(2024, 11, 9), test_date(2024, 11, 3), test_date(2024, 11, 1)], days);

    Ok(())
}

#[tokio::test]
async fn test_update_and_delete_transaction() -> anyhow::Result<()> {
    let (svc, db) = create_test_service().await?;
    let created = svc.create_transaction(*TEST_USER_1_ID, expense(dec!(10), 4, Some(*TEST_CAT_1_ID))).await?;

    let updated = svc.update_transaction(*TEST_USER_1_ID, created.id, UpdateTransactionModel { 
        category_id: Some(*TEST_CAT_2_ID), 
        date: test_date(2024, 11, 6), 
        amount: dec!(25.75), 
        description: String::from("Bus pass"), 
        tx_type: TransactionType::Expense,
    }).await?;
    assert_eq!(Some(String::from("Transport")), updated.category_name);
    assert_eq!(dec!(25.75), updated.amount);
    assert_eq!(created.id, updated.id);

    // Other users can neither see, update nor delete it
    let res = svc.get_transaction(*TEST_USER_2_ID, created.id).await;
    assert!(matches!(res, Err(Error::TransactionNotFound(id)) if id == created.id));
    let res = svc.delete_transaction(*TEST_USER_2_ID, created.id).await;
    assert!(matches!(res, Err(Error::TransactionNotFound(id)) if id == created.id));

    svc.delete_transaction(*TEST_USER_1_ID, created.id).await?;
    assert!(Transactions::find_by_id(created.id).one(&db).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_monthly_transactions() -> anyhow::Result<()> {
    let (svc, db) = create_test_service().await?;
    insert_test_tx(&db, *TEST_USER_1_ID, None, 1000, test_date(2024, 10, 31), TransactionType::Expense).await?;
    insert_test_tx(&db, *TEST_USER_1_ID, None, 1000, test_date(2024, 11, 1), TransactionType::Income).await?;
    insert_test_tx(&db, *TEST_USER_1_ID, None, 1000, test_date(2024, 11, 30), TransactionType::Expense).await?;

    let txs = svc.get_monthly_transactions(*TEST_USER_1_ID, Some(2024), Some(10)).await?;
    assert_eq!(1, txs.len());

    // Defaults to the current month
    let txs = svc.get_monthly_transactions(*TEST_USER_1_ID, None, None).await?;
    assert_eq!(2, txs.len());
    assert_eq!(test_date(2024, 11, 30), txs[0].date);

    let res = svc.get_monthly_transactions(*TEST_USER_1_ID, Some(2024), Some(13)).await;
    assert!(matches!(res, Err(Error::InvalidMonth(2024, 13))));

    Ok(())
}

#[tokio::test]
async fn test_get_txs_with_filters() -> anyhow::Result<()> {
    let (svc, db) = create_test_service().await?;
    insert_test_tx(&db, *TEST_USER_1_ID, Some(*TEST_CAT_1_ID), 1000, test_date(2024, 11, 1), TransactionType::Expense).await?;
    insert_test_tx(&db, *TEST_USER_1_ID, Some(*TEST_CAT_1_ID), 5000, test_date(2024, 11, 2), TransactionType::Expense).await?;
    insert_test_tx(&db, *TEST_USER_1_ID, Some(*TEST_CAT_2_ID), 3000, test_date(2024, 11, 3), TransactionType::Expense).await?;
    insert_test_tx(&db, *TEST_USER_1_ID, None, 90000, test_date(2024, 11, 4), TransactionType::Income).await?;

    let cat_1_txs = svc.query_transactions(
        *TEST_USER_1_ID,
        GetTransactionReqModel {
            page_size: Some(25), 
            page_idx: Some(0), 
            filters: Some(vec![TransactionFilter::CategoryEq { id: *TEST_CAT_1_ID }]),
        }
    ).await?;
    assert_eq!(2, cat_1_txs.len());
    assert!(cat_1_txs.iter().all(|tx| tx.category_name == Some(String::from("Food"))));

    let large = svc.query_transactions(
        *TEST_USER_1_ID,
        GetTransactionReqModel {
            page_size: None, 
            page_idx: None, 
            filters: Some(vec![
                TransactionFilter::TypeEq { tx_type: TransactionType::Expense },
                TransactionFilter::Cmp { cmp: Cmp::Gte, val: dec!(30) },
            ]),
        }
    ).await?;
    assert_eq!(2, large.len());
    assert_eq!(dec!(30), large[0].amount);
    assert_eq!(dec!(50), large[1].amount);

    let page = svc.query_transactions(
        *TEST_USER_1_ID,
        GetTransactionReqModel {
            page_size: Some(3), 
            page_idx: Some(1), 
            filters: None,
        }
    ).await?;
    assert_eq!(1, page.len());
    assert_eq!(test_date(2024, 11, 1), page[0].date);

    Ok(())
}

#[tokio::test]
async fn test_bulk_categorize() -> anyhow::Result<()> {
    let (svc, db) = create_test_service().await?;
    let tx_1 = insert_test_tx(&db, *TEST_USER_1_ID, None, 1000, test_date(2024, 11, 1), TransactionType::Expense).await?;
    let tx_2 = insert_test_tx(&db, *TEST_USER_1_ID, Some(*TEST_CAT_2_ID), 1000, test_date(2024, 11, 2), TransactionType::Expense).await?;
    let foreign = insert_test_tx(&db, *TEST_USER_2_ID, None, 1000, test_date(2024, 11, 2), TransactionType::Expense).await?;

    let updated = svc.bulk_categorize(*TEST_USER_1_ID, BulkCategorizeModel { 
        transaction_ids: vec![tx_1, tx_2], 
        category_id: Some(*TEST_CAT_1_ID),
    }).await?;
    assert_eq!(2, updated);
    for id in [tx_1, tx_2] {
        let tx = Transactions::find_by_id(id).one(&db).await?;
        assert_eq!(Some(*TEST_CAT_1_ID), tx.and_then(|tx| tx.category_id));
    }

    // Nothing changes when any transaction is not owned
    let res = svc.bulk_categorize(*TEST_USER_1_ID, BulkCategorizeModel { 
        transaction_ids: vec![tx_1, foreign], 
        category_id: None,
    }).await;
    assert!(matches!(res, Err(Error::TransactionNotFound(id)) if id == foreign));
    let tx = Transactions::find_by_id(tx_1).one(&db).await?;
    assert_eq!(Some(*TEST_CAT_1_ID), tx.and_then(|tx| tx.category_id));

    let res = svc.bulk_categorize(*TEST_USER_1_ID, BulkCategorizeModel { 
        transaction_ids: vec![], 
        category_id: None,
    }).await;
    assert!(matches!(res, Err(Error::NoTransactionIds)));

    // Clearing the category
    svc.bulk_categorize(*TEST_USER_1_ID, BulkCategorizeModel { 
        transaction_ids: vec![tx_2], 
        category_id: None,
    }).await?;
    let tx = Transactions::find_by_id(tx_2).one(&db).await?;
    assert!(tx.is_some_and(|tx| tx.category_id.is_none()));

    Ok(())
}

#[tokio::test]
async fn test_transaction_write_evaluates_limits() -> anyhow::Result<()> {
    let (svc, db) = create_test_service().await?;
    svc.limit_svc.create_limit(*TEST_USER_1_ID, CreateSpendingLimitModel { 
        category_id: Some(*TEST_CAT_1_ID), 
        limit_amount: dec!(100), 
        period: LimitPeriod::Monthly, 
        notification_threshold: dec!(0.8),
    }).await?;

    svc.create_transaction(*TEST_USER_1_ID, expense(dec!(85), 5, Some(*TEST_CAT_1_ID))).await?;
    let notifs = Notifications::find().all(&db).await?;
    assert_eq!(1, notifs.len());
    assert_eq!(NotificationType::SpendingLimitWarning, notifs[0].notification_type);

    let created = svc.create_transaction(*TEST_USER_1_ID, expense(dec!(20), 6, Some(*TEST_CAT_1_ID))).await?;
    let notifs = Notifications::find().all(&db).await?;
    assert_eq!(2, notifs.len());
    assert!(notifs.iter().any(|n| n.notification_type == NotificationType::SpendingLimitExceeded));

    // Dropping back below and crossing again in the same window notifies again
    svc.delete_transaction(*TEST_USER_1_ID, created.id).await?;
    svc.create_transaction(*TEST_USER_1_ID, expense(dec!(20), 7, Some(*TEST_CAT_1_ID))).await?;
    assert_eq!(3, Notifications::find().all(&db).await?.len());

    Ok(())
}

#[tokio::test]
async fn test_failed_evaluation_keeps_write() -> anyhow::Result<()> {
    let db = create_test_db().await?;
    let mut limit_svc = MockSpendingLimitService::new();
    limit_svc.expect_evaluate_limits()
        .times(1)
        .returning(|_| Err(spending_limits::error::Error::DbErr(DbErr::Custom(String::from("unavailable")))));

    let svc = DbConnTransactionService {
        db: db.clone(),
        dt_provider: fixed_dt_provider(test_now(2024, 11, 10)),
        limit_svc: Arc::new(limit_svc),
    };

    let created = svc.create_transaction(*TEST_USER_1_ID, expense(dec!(10), 4, None)).await?;
    assert!(Transactions::find_by_id(created.id).one(&db).await?.is_some());

    Ok(())
}

async fn warning_count(db: &DbConn) -> anyhow::Result<usize> {
    let notifs = Notifications::find().all(db).await?;
    assert!(notifs.iter().all(|n| n.notification_type == NotificationType::SpendingLimitWarning));
    Ok(notifs.len())
}

#[tokio::test]
async fn test_lowered_spend_rearms_warning() -> anyhow::Result<()> {
    let (svc, db) = create_test_service().await?;
    let limit = svc.limit_svc.create_limit(*TEST_USER_1_ID, CreateSpendingLimitModel { 
        category_id: Some(*TEST_CAT_1_ID), 
        limit_amount: dec!(100), 
        period: LimitPeriod::Monthly, 
        notification_threshold: dec!(0.8),
    }).await?;

    let created = svc.create_transaction(*TEST_USER_1_ID, expense(dec!(85), 3, Some(*TEST_CAT_1_ID))).await?;
    assert_eq!(1, warning_count(&db).await?);

    // Deleting drops the stored spend back to zero
    svc.delete_transaction(*TEST_USER_1_ID, created.id).await?;
    let stored = SpendingLimits::find_by_id(limit.id).one(&db).await?;
    assert_eq!(Some(0), stored.map(|l| l.current_spent));
    assert_eq!(dec!(0), svc.limit_svc.get_limit(*TEST_USER_1_ID, limit.id).await?.current_spent);

    let created = svc.create_transaction(*TEST_USER_1_ID, expense(dec!(90), 8, Some(*TEST_CAT_1_ID))).await?;
    assert_eq!(2, warning_count(&db).await?);

    // Moving the expense to another category lowers the spend
    svc.bulk_categorize(*TEST_USER_1_ID, BulkCategorizeModel { 
        transaction_ids: vec![created.id], 
        category_id: Some(*TEST_CAT_2_ID),
    }).await?;
    let stored = SpendingLimits::find_by_id(limit.id).one(&db).await?;
    assert_eq!(Some(0), stored.map(|l| l.current_spent));
    assert_eq!(2, warning_count(&db).await?);

    // and moving it back crosses the threshold again
    svc.bulk_categorize(*TEST_USER_1_ID, BulkCategorizeModel { 
        transaction_ids: vec![created.id], 
        category_id: Some(*TEST_CAT_1_ID),
    }).await?;
    let stored = SpendingLimits::find_by_id(limit.id).one(&db).await?;
    assert_eq!(Some(9000), stored.map(|l| l.current_spent));
    assert_eq!(3, warning_count(&db).await?);

    Ok(())
}
