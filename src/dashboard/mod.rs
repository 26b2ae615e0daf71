use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, DbConn, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::{
    date_time_provider::DynDateTimeProvider, 
    entities::{prelude::*, sea_orm_active_enums::{LimitPeriod, TransactionType}, transactions}, 
    money::from_minor, 
    spending_limits::{period::PeriodWindow, DynSpendingLimitService}, 
    transactions::{models::TransactionModel, with_category_names},
};

use {error::*, models::*};

pub mod error;
pub mod models;
pub mod routes;


pub const RECENT_TRANSACTIONS_COUNT: u64 = 10;

pub type DynDashboardService = Arc<dyn DashboardService + Send + Sync>;

#[async_trait]
pub trait DashboardService {
    async fn get_summary(&self, user_id: Uuid) -> Result<DashboardSummaryModel>;
    async fn get_recent_transactions(&self, user_id: Uuid) -> Result<Vec<TransactionModel>>;
}

pub struct DbConnDashboardService {
    db: DbConn,
    dt_provider: DynDateTimeProvider,
    limit_svc: DynSpendingLimitService,
}

impl DbConnDashboardService {
    pub fn new_dyn(
        db: DbConn, 
        dt_provider: DynDateTimeProvider, 
        limit_svc: DynSpendingLimitService,
    ) -> DynDashboardService {
        Arc::new(Self { db, dt_provider, limit_svc })
    }
}

#[async_trait]
impl DashboardService for DbConnDashboardService {
    async fn get_summary(&self, user_id: Uuid) -> Result<DashboardSummaryModel> {
        let today = self.dt_provider.utc_now().date_naive();
        let this_month = PeriodWindow::containing(LimitPeriod::Monthly, today);
        let last_month = PeriodWindow::containing(LimitPeriod::Monthly, this_month.start - Duration::days(1));

        let total_income = sum_amount(&self.db, user_id, TransactionType::Income, None).await?;
        let total_expenses = sum_amount(&self.db, user_id, TransactionType::Expense, None).await?;
        let monthly_income = sum_amount(&self.db, user_id, TransactionType::Income, Some(&this_month)).await?;
        let monthly_expenses = sum_amount(&self.db, user_id, TransactionType::Expense, Some(&this_month)).await?;
        let prev_income = sum_amount(&self.db, user_id, TransactionType::Income, Some(&last_month)).await?;
        let prev_expenses = sum_amount(&self.db, user_id, TransactionType::Expense, Some(&last_month)).await?;

        let spending_limits = self.limit_svc.get_limits(user_id).await?;

        Ok(DashboardSummaryModel { 
            total_income: from_minor(total_income), 
            total_expenses: from_minor(total_expenses), 
            income_change: percentage_change(prev_income, monthly_income), 
            expense_change: percentage_change(prev_expenses, monthly_expenses), 
            monthly_income: from_minor(monthly_income), 
            monthly_expenses: from_minor(monthly_expenses), 
            balance: from_minor(total_income) - from_minor(total_expenses), 
            spending_limits,
        })
    }

    async fn get_recent_transactions(&self, user_id: Uuid) -> Result<Vec<TransactionModel>> {
        let txs = Transactions::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedOnUtc)
            .limit(RECENT_TRANSACTIONS_COUNT)
            .all(&self.db).await?;

        Ok(with_category_names(&self.db, txs).await?)
    }
}

async fn sum_amount(
    conn: &impl ConnectionTrait, 
    user_id: Uuid, 
    tx_type: TransactionType, 
    window: Option<&PeriodWindow>,
) -> Result<i64> {
    #[derive(FromQueryResult)]
    struct SumQuery { total: Option<i64> }

    let mut query = Transactions::find().select_only()
        .filter(transactions::Column::UserId.eq(user_id))
        .filter(transactions::Column::TxType.eq(tx_type));
    if let Some(window) = window {
        query = query.filter(transactions::Column::Date.between(window.start, window.end));
    }

    let total = query
        .column_as(transactions::Column::Amount.sum(), "total")
        .into_model::<SumQuery>().one(conn).await?
        .and_then(|q| q.total)
        .unwrap_or(0);

    Ok(total)
}

///
/// Change from `previous` to `current` in percent, rounded to two places.
/// Growing from nothing counts as 100%.
/// 
pub fn percentage_change(previous: i64, current: i64) -> Decimal {
    if previous == 0 {
        return if current == 0 { Decimal::ZERO } else { Decimal::ONE_HUNDRED };
    }

    let previous = Decimal::from(previous);
    ((Decimal::from(current) - previous) / previous * Decimal::ONE_HUNDRED).round_dp(2)
}
