use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use log::info;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DbConn, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    date_time_provider::DynDateTimeProvider, 
    db_utils::find_visible_category, 
    entities::{prelude::*, sea_orm_active_enums::TransactionType, transactions}, 
    transactions::{models::TransactionModel, with_category_names},
};

use {error::*, models::*, pdf::*};

pub mod error;
pub mod models;
pub mod pdf;
pub mod routes;


pub type DynReportService = Arc<dyn ReportService + Send + Sync>;

#[async_trait]
pub trait ReportService {
    async fn generate_report(&self, user_id: Uuid, filter: ReportFilterModel) -> Result<ReportDataModel>;
    /// The same report as `generate_report`, rendered as a PDF document
    async fn generate_report_pdf(&self, user_id: Uuid, filter: ReportFilterModel) -> Result<Vec<u8>>;
}

pub struct DbConnReportService {
    db: DbConn,
    dt_provider: DynDateTimeProvider,
}

impl DbConnReportService {
    pub fn new_dyn(db: DbConn, dt_provider: DynDateTimeProvider) -> DynReportService {
        Arc::new(Self { db, dt_provider })
    }
}

#[async_trait]
impl ReportService for DbConnReportService {
    async fn generate_report(&self, user_id: Uuid, filter: ReportFilterModel) -> Result<ReportDataModel> {
        let today = self.dt_provider.utc_now().date_naive();
        let end_date = filter.end_date.unwrap_or(today);
        let start_date = filter.start_date
            .unwrap_or(today.checked_sub_months(Months::new(1)).unwrap_or(today));
        if start_date > end_date {
            return Err(Error::InvalidDateRange(start_date, end_date));
        }

        let mut query = Transactions::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Date.between(start_date, end_date));
        if let Some(cat_id) = filter.category_id {
            find_visible_category(&self.db, user_id, cat_id).await?;
            query = query.filter(transactions::Column::CategoryId.eq(cat_id));
        }
        match filter.report_type {
            ReportType::Income => query = query.filter(transactions::Column::TxType.eq(TransactionType::Income)),
            ReportType::Expense => query = query.filter(transactions::Column::TxType.eq(TransactionType::Expense)),
            ReportType::Both => {},
        }

        let txs = query
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedOnUtc)
            .all(&self.db).await?;
        let txs = with_category_names(&self.db, txs).await?;

        Ok(build_report(start_date, end_date, filter.group_by, txs))
    }

    async fn generate_report_pdf(&self, user_id: Uuid, filter: ReportFilterModel) -> Result<Vec<u8>> {
        let user = Users::find_by_id(user_id).one(&self.db).await?
            .ok_or(Error::UserNotFound(user_id))?;
        let report = self.generate_report(user_id, filter).await?;

        let owner = ReportOwner { 
            name: format!("{} {}", user.first_name, user.last_name), 
            email: user.email,
        };
        let pdf = render_pdf("Financial Report", &report_lines(&owner, &report))?;

        info!("Rendered report PDF of {} bytes for user {}", pdf.len(), user_id);
        Ok(pdf)
    }
}

///
/// Aggregates transactions already sorted newest first into a report.
/// Time series periods are ordered oldest first.
/// 
pub fn build_report(
    start_date: NaiveDate, 
    end_date: NaiveDate, 
    group_by: GroupBy, 
    txs: Vec<TransactionModel>,
) -> ReportDataModel {
    let mut total_income = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;
    let mut category_breakdown = BTreeMap::new();
    let mut series = BTreeMap::new();

    for tx in txs.iter() {
        let (income, expense) = match tx.tx_type {
            TransactionType::Income => (tx.amount, Decimal::ZERO),
            TransactionType::Expense => (Decimal::ZERO, tx.amount),
        };
        total_income += income;
        total_expense += expense;

        if let Some(name) = &tx.category_name {
            *category_breakdown.entry(name.clone()).or_insert(Decimal::ZERO) += tx.amount;
        }

        let bucket = series.entry(group_by.period_start(tx.date)).or_insert((Decimal::ZERO, Decimal::ZERO));
        bucket.0 += income;
        bucket.1 += expense;
    }

    let time_series_data = series.into_iter()
        .map(|(start, (income, expense))| TimeSeriesDataModel { 
            period: group_by.label(start), 
            income, 
            expense,
        })
        .collect();

    let transactions = txs.into_iter()
        .map(|tx| TransactionSummaryModel { 
            date: tx.date, 
            description: tx.description, 
            category: tx.category_name.unwrap_or(UNCATEGORIZED_LABEL.to_string()), 
            tx_type: tx.tx_type, 
            amount: tx.amount,
        })
        .collect();

    ReportDataModel { 
        start_date, 
        end_date, 
        total_income, 
        total_expense, 
        net_savings: total_income - total_expense, 
        transactions, 
        category_breakdown, 
        time_series_data,
    }
}
