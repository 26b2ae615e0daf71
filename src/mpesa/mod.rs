use std::sync::Arc;

use async_trait::async_trait;
use log::{error, info, warn};
use rust_decimal::Decimal;
use sea_orm::{sea_query::Func, prelude::Expr, ColumnTrait, ConnectionTrait, DbConn, EntityTrait, QueryFilter, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    date_time_provider::DynDateTimeProvider, 
    db_utils::visible_categories, 
    entities::{categories, prelude::*, sea_orm_active_enums::TransactionType, transactions}, 
    money::to_minor, 
    spending_limits::DynSpendingLimitService,
};

use {error::*, models::*, parser::*};

pub mod error;
pub mod models;
pub mod parser;
pub mod routes;


pub type DynMpesaService = Arc<dyn MpesaService + Send + Sync>;

#[async_trait]
pub trait MpesaService {
    ///
    /// Imports the transactions of an M-Pesa statement PDF. Files that are
    /// not PDFs are accepted but import nothing.
    /// 
    async fn import_statement(
        &self, 
        user_id: Uuid, 
        upload: StatementUploadModel,
    ) -> Result<StatementImportModel>;

    /// Saves parsed entries, skipping the ones already recorded
    async fn import_entries(
        &self, 
        user_id: Uuid, 
        entries: Vec<StatementEntry>,
    ) -> Result<StatementImportModel>;
}

pub struct DbConnMpesaService {
    db: DbConn,
    dt_provider: DynDateTimeProvider,
    limit_svc: DynSpendingLimitService,
}

impl DbConnMpesaService {
    pub fn new_dyn(
        db: DbConn, 
        dt_provider: DynDateTimeProvider, 
        limit_svc: DynSpendingLimitService,
    ) -> DynMpesaService {
        Arc::new(Self { db, dt_provider, limit_svc })
    }
}

#[async_trait]
impl MpesaService for DbConnMpesaService {
    async fn import_statement(
        &self, 
        user_id: Uuid, 
        upload: StatementUploadModel,
    ) -> Result<StatementImportModel> {
        if upload.contents.is_empty() || !upload.file_name.to_lowercase().ends_with(".pdf") {
            warn!("Ignoring statement upload '{}' from user {}", upload.file_name, user_id);
            return Ok(StatementImportModel::nothing_imported("File uploaded successfully"));
        }

        let text = extract_text(upload.contents).await?;
        let entries = parse_statement(&text, self.dt_provider.utc_now().date_naive());

        self.import_entries(user_id, entries).await
    }

    async fn import_entries(
        &self, 
        user_id: Uuid, 
        entries: Vec<StatementEntry>,
    ) -> Result<StatementImportModel> {
        if entries.is_empty() {
            return Ok(StatementImportModel::nothing_imported(
                "Statement processed successfully - no new transactions found"
            ));
        }

        let db_tx = self.db.begin().await?;
        let category_id = find_mpesa_category(&db_tx, user_id).await?;
        let now = self.dt_provider.utc_now();

        let mut saved = 0;
        let (mut total_income, mut total_expense) = (Decimal::ZERO, Decimal::ZERO);
        for entry in entries.iter() {
            let Some(amount) = to_minor(entry.amount).filter(|am| *am > 0) else {
                warn!("Skipping statement entry '{}' with amount {}", entry.description, entry.amount);
                continue;
            };

            let existing = Transactions::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .filter(transactions::Column::Date.eq(entry.date))
                .filter(transactions::Column::Description.eq(entry.description.as_str()))
                .filter(transactions::Column::Amount.eq(amount))
                .filter(transactions::Column::TxType.eq(entry.tx_type))
                .one(&db_tx).await?;
            if existing.is_some() {
                continue;
            }

            Transactions::insert(transactions::ActiveModel {
                id: Set(Uuid::now_v7()),
                user_id: Set(user_id),
                category_id: Set(category_id),
                description: Set(entry.description.clone()),
                amount: Set(amount),
                date: Set(entry.date),
                tx_type: Set(entry.tx_type),
                created_on_utc: Set(now),
            }).exec(&db_tx).await?;

            saved += 1;
            match entry.tx_type {
                TransactionType::Income => total_income += entry.amount,
                TransactionType::Expense => total_expense += entry.amount,
            }
        }
        db_tx.commit().await?;

        if saved > 0 {
            if let Err(e) = self.limit_svc.evaluate_limits(user_id).await {
                error!("Could not evaluate spending limits for user {}: {}", user_id, e);
            }
        }

        info!("Imported {} of {} statement entries for user {}", saved, entries.len(), user_id);
        Ok(StatementImportModel {
            success: true,
            message: format!("Statement processed successfully! Imported {} transactions", saved),
            total_transactions: entries.len(),
            saved_transactions: saved,
            skipped_transactions: entries.len() - saved,
            total_income,
            total_expense,
        })
    }
}

/// The "M-Pesa" category visible to the user, if there is one
async fn find_mpesa_category(conn: &impl ConnectionTrait, user_id: Uuid) -> Result<Option<Uuid>> {
    let cat = Categories::find()
        .filter(visible_categories(user_id))
        .filter(
            Expr::expr(Func::lower(Expr::col(categories::Column::Name)))
                .eq(MPESA_CATEGORY_NAME.to_lowercase())
        )
        .one(conn).await?;

    Ok(cat.map(|cat| cat.id))
}
