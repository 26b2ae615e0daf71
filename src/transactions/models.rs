use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, QueryFilter, Select};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{entities::{sea_orm_active_enums::TransactionType, transactions}, money::{from_minor, to_minor}};

///
/// Model representing a single transaction
/// 
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionModel {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub created_at: DateTime<Utc>,
}

impl TransactionModel {
    pub fn from_entity(value: transactions::Model, category_name: Option<String>) -> Self {
        TransactionModel { 
            id: value.id, 
            category_id: value.category_id, 
            category_name, 
            date: value.date, 
            amount: from_minor(value.amount), 
            description: value.description, 
            tx_type: value.tx_type, 
            created_at: value.created_on_utc,
        }
    }
}

///
/// Body for both creating and updating a transaction.
/// A `None` category leaves the transaction uncategorized.
/// 
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionModel {
    #[serde(default)]
    pub category_id: Option<Uuid>,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
}

pub type UpdateTransactionModel = CreateTransactionModel;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionReqModel {
    pub page_size: Option<u64>, 
    pub page_idx: Option<u64>, 
    pub filters: Option<Vec<TransactionFilter>>
}

#[derive(Debug, Deserialize)]
pub struct MonthlyQueryParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCategorizeModel {
    pub transaction_ids: Vec<Uuid>,
    /// `None` removes the category from every listed transaction
    #[serde(default)]
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCategorizeResponseModel {
    pub success: bool,
    pub updated: u64,
}

pub trait ToSelectQuery {
    fn into_select_query(self, query: Select<transactions::Entity>) -> Select<transactions::Entity>;
}

#[derive(Debug, Deserialize)]
pub enum Cmp { Lt, Lte, Eq, Gte, Gt, }

#[derive(Debug, Deserialize)]
#[serde(tag = "filter")]
pub enum TransactionFilter {
    CategoryEq { id: Uuid },
    Uncategorized,
    TypeEq { tx_type: TransactionType },
    DateBetween { start: NaiveDate, end: NaiveDate },
    Cmp { cmp: Cmp, val: Decimal },
}

impl ToSelectQuery for TransactionFilter {
    fn into_select_query(self, query: Select<transactions::Entity>) -> Select<transactions::Entity> {
        match self {
            TransactionFilter::CategoryEq { id } => query.filter(transactions::Column::CategoryId.eq(id)),
            TransactionFilter::Uncategorized => query.filter(transactions::Column::CategoryId.is_null()),
            TransactionFilter::TypeEq { tx_type } => query.filter(transactions::Column::TxType.eq(tx_type)),
            TransactionFilter::DateBetween { start, end } => query.filter(transactions::Column::Date.between(start, end)),
            TransactionFilter::Cmp { cmp, val } => {
                // Amounts too large for i64 are clamped to its bounds
                let val = to_minor(val)
                    .unwrap_or(if val.is_sign_negative() { i64::MIN } else { i64::MAX });
                query.filter(
                    match cmp {
                        Cmp::Gt => transactions::Column::Amount.gt(val),
                        Cmp::Gte => transactions::Column::Amount.gte(val),
                        Cmp::Eq => transactions::Column::Amount.eq(val),
                        Cmp::Lt => transactions::Column::Amount.lt(val),
                        Cmp::Lte => transactions::Column::Amount.lte(val),
                    }
                )
            }
        }
    }
}
