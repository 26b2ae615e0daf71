use std::{collections::{HashMap, HashSet}, sync::Arc};

use async_trait::async_trait;
use chrono::NaiveDate;
use log::error;
use rust_decimal::Decimal;
use sea_orm::{prelude::Expr, ColumnTrait, ConnectionTrait, DbConn, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use uuid::Uuid;

use crate::{
    date_time_provider::DynDateTimeProvider, 
    db_utils::find_visible_category, 
    entities::{categories, prelude::*, sea_orm_active_enums::LimitPeriod, transactions}, 
    money::to_minor, 
    spending_limits::{period::PeriodWindow, DynSpendingLimitService},
};

use {error::*, models::*};

pub mod error;
pub mod models;
pub mod routes;

pub type DynTransactionService = Arc<dyn TransactionService + Send + Sync>;

#[cfg(test)]
mod test;

#[async_trait]
pub trait TransactionService {
    /// All of the user's transactions, newest first
    async fn get_transactions(&self, user_id: Uuid) -> Result<Vec<TransactionModel>>;

    async fn query_transactions(
        &self, 
        user_id: Uuid, 
        get_req: GetTransactionReqModel,
    ) -> Result<Vec<TransactionModel>>;

    async fn get_transaction(&self, user_id: Uuid, tx_id: Uuid) -> Result<TransactionModel>;

    /// Transactions of the given month, or the current month when either part is missing
    async fn get_monthly_transactions(
        &self, 
        user_id: Uuid, 
        year: Option<i32>, 
        month: Option<u32>,
    ) -> Result<Vec<TransactionModel>>;

    async fn create_transaction(
        &self, 
        user_id: Uuid, 
        create_req: CreateTransactionModel,
    ) -> Result<TransactionModel>;

    async fn update_transaction(
        &self, 
        user_id: Uuid, 
        tx_id: Uuid, 
        update_req: UpdateTransactionModel,
    ) -> Result<TransactionModel>;

    async fn delete_transaction(&self, user_id: Uuid, tx_id: Uuid) -> Result<()>;

    /// Returns the number of transactions updated
    async fn bulk_categorize(
        &self,
        user_id: Uuid,
        bulk_req: BulkCategorizeModel,
    ) -> Result<u64>;
}

pub struct DbConnTransactionService {
    db: DbConn,
    dt_provider: DynDateTimeProvider,
    limit_svc: DynSpendingLimitService,
}

impl DbConnTransactionService {
    pub fn new_dyn(
        db: DbConn, 
        dt_provider: DynDateTimeProvider, 
        limit_svc: DynSpendingLimitService,
    ) -> DynTransactionService {
        Arc::new(Self {
            db, dt_provider, limit_svc
        })
    }

    ///
    /// Spending limits are re-evaluated after every write. A failing evaluation
    /// does not undo the write that triggered it.
    /// 
    async fn reevaluate_limits(&self, user_id: Uuid) {
        if let Err(e) = self.limit_svc.evaluate_limits(user_id).await {
            error!("Could not evaluate spending limits for user {}: {}", user_id, e);
        }
    }
}

#[async_trait]
impl TransactionService for DbConnTransactionService {
    async fn get_transactions(&self, user_id: Uuid) -> Result<Vec<TransactionModel>> {
        let txs = Transactions::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedOnUtc)
            .all(&self.db).await?;

        with_category_names(&self.db, txs).await
    }

    async fn query_transactions(
        &self, 
        user_id: Uuid, 
        get_req: GetTransactionReqModel,
    ) -> Result<Vec<TransactionModel>> {
        let filters = get_req.filters.unwrap_or(vec![]);
        let page_size = get_req.page_size.unwrap_or(15);
        let page_idx = get_req.page_idx.unwrap_or(0);

        // Create the query for the particular user, and apply each filter
        let mut query = Transactions::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedOnUtc);

        for filter in filters {
            query = filter.into_select_query(query);
        }

        // Paginate the results, and fetch the current page
        let pagination = query.paginate(&self.db, page_size);
        let page = pagination.fetch_page(page_idx).await?;

        with_category_names(&self.db, page).await
    }

    async fn get_transaction(&self, user_id: Uuid, tx_id: Uuid) -> Result<TransactionModel> {
        let tx = find_owned_tx(&self.db, user_id, tx_id).await?;
        let mut models = with_category_names(&self.db, vec![tx]).await?;
        models.pop().ok_or(Error::TransactionNotFound(tx_id))
    }

    async fn get_monthly_transactions(
        &self, 
        user_id: Uuid, 
        year: Option<i32>, 
        month: Option<u32>,
    ) -> Result<Vec<TransactionModel>> {
        let day = match (year, month) {
            (Some(year), Some(month)) => NaiveDate::from_ymd_opt(year, month, 1)
                .ok_or(Error::InvalidMonth(year, month))?,
            _ => self.dt_provider.utc_now().date_naive(),
        };
        let window = PeriodWindow::containing(LimitPeriod::Monthly, day);

        let txs = Transactions::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Date.between(window.start, window.end))
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::CreatedOnUtc)
            .all(&self.db).await?;

        with_category_names(&self.db, txs).await
    }

    async fn create_transaction(
        &self, 
        user_id: Uuid, 
        create_req: CreateTransactionModel,
    ) -> Result<TransactionModel> {
        let amount = validate_amount(create_req.amount)?;
        let category_name = match create_req.category_id {
            Some(cat_id) => Some(find_visible_category(&self.db, user_id, cat_id).await?.name),
            None => None,
        };

        let new_tx = transactions::Model {
            id: Uuid::now_v7(),
            user_id,
            category_id: create_req.category_id,
            description: create_req.description.trim().to_string(),
            amount,
            date: create_req.date,
            tx_type: create_req.tx_type,
            created_on_utc: self.dt_provider.utc_now(),
        };
        Transactions::insert(transactions::ActiveModel {
            id: Set(new_tx.id),
            user_id: Set(new_tx.user_id),
            category_id: Set(new_tx.category_id),
            description: Set(new_tx.description.clone()),
            amount: Set(new_tx.amount),
            date: Set(new_tx.date),
            tx_type: Set(new_tx.tx_type),
            created_on_utc: Set(new_tx.created_on_utc),
        }).exec(&self.db).await?;

        self.reevaluate_limits(user_id).await;
        Ok(TransactionModel::from_entity(new_tx, category_name))
    }

    async fn update_transaction(
        &self, 
        user_id: Uuid, 
        tx_id: Uuid, 
        update_req: UpdateTransactionModel,
    ) -> Result<TransactionModel> {
        let amount = validate_amount(update_req.amount)?;

        let tx = self.db.begin().await?;
        let ex_tx = find_owned_tx(&tx, user_id, tx_id).await?;
        let category_name = match update_req.category_id {
            Some(cat_id) => Some(find_visible_category(&tx, user_id, cat_id).await?.name),
            None => None,
        };

        let mut ex_tx = ex_tx.into_active_model();
        ex_tx.category_id = Set(update_req.category_id);
        ex_tx.description = Set(update_req.description.trim().to_string());
        ex_tx.amount = Set(amount);
        ex_tx.date = Set(update_req.date);
        ex_tx.tx_type = Set(update_req.tx_type);

        let updated = Transactions::update(ex_tx).exec(&tx).await?;
        tx.commit().await?;

        self.reevaluate_limits(user_id).await;
        Ok(TransactionModel::from_entity(updated, category_name))
    }

    async fn delete_transaction(&self, user_id: Uuid, tx_id: Uuid) -> Result<()> {
        let res = Transactions::delete_many()
            .filter(transactions::Column::Id.eq(tx_id))
            .filter(transactions::Column::UserId.eq(user_id))
            .exec(&self.db).await?;

        if res.rows_affected == 0 {
            return Err(Error::TransactionNotFound(tx_id));
        }

        self.reevaluate_limits(user_id).await;
        Ok(())
    }

    async fn bulk_categorize(
        &self,
        user_id: Uuid,
        bulk_req: BulkCategorizeModel,
    ) -> Result<u64> {
        if bulk_req.transaction_ids.is_empty() {
            return Err(Error::NoTransactionIds);
        }
        let tx_ids: HashSet<Uuid> = bulk_req.transaction_ids.into_iter().collect();

        let tx = self.db.begin().await?;
        if let Some(cat_id) = bulk_req.category_id {
            find_visible_category(&tx, user_id, cat_id).await?;
        }

        // Every listed transaction must belong to the user
        let owned = Transactions::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Id.is_in(tx_ids.iter().copied()))
            .all(&tx).await?;
        if let Some(tx_id) = tx_ids.iter().find(|id| !owned.iter().any(|db_tx| db_tx.id == **id)) {
            return Err(Error::TransactionNotFound(*tx_id));
        }

        let res = Transactions::update_many()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Id.is_in(tx_ids))
            .col_expr(transactions::Column::CategoryId, Expr::value(bulk_req.category_id))
            .exec(&tx).await?;
        tx.commit().await?;

        self.reevaluate_limits(user_id).await;
        Ok(res.rows_affected)
    }
}

fn validate_amount(amount: Decimal) -> Result<i64> {
    to_minor(amount)
        .filter(|am| *am > 0)
        .ok_or(Error::InvalidAmount(amount))
}

async fn find_owned_tx(conn: &impl ConnectionTrait, user_id: Uuid, tx_id: Uuid) -> Result<transactions::Model> {
    Transactions::find_by_id(tx_id)
        .filter(transactions::Column::UserId.eq(user_id))
        .one(conn).await?
        .ok_or(Error::TransactionNotFound(tx_id))
}

///
/// Maps transactions to their API model, resolving every referenced
/// category name with a single query
/// 
pub async fn with_category_names(
    conn: &impl ConnectionTrait, 
    txs: Vec<transactions::Model>,
) -> Result<Vec<TransactionModel>> {
    let cat_ids: HashSet<Uuid> = txs.iter().filter_map(|tx| tx.category_id).collect();
    let names: HashMap<Uuid, String> = if cat_ids.is_empty() {
        HashMap::new()
    } else {
        Categories::find()
            .filter(categories::Column::Id.is_in(cat_ids))
            .all(conn).await?
            .into_iter()
            .map(|cat| (cat.id, cat.name))
            .collect()
    };

    Ok(
        txs.into_iter()
            .map(|tx| {
                let name = tx.category_id.and_then(|id| names.get(&id).cloned());
                TransactionModel::from_entity(tx, name)
            })
            .collect()
    )
}
