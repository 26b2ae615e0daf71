use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::LimitPeriod;

pub const GLOBAL_LIMIT_NAME: &str = "Total Spending";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingLimitModel {
    pub id: Uuid,
    pub category_id: Option<Uuid>,
    pub category_name: String,
    pub limit_amount: Decimal,
    pub current_spent: Decimal,
    pub period: LimitPeriod,
    pub notification_threshold: Decimal,
    pub is_active: bool,
    pub remaining_amount: Decimal,
    pub usage_percentage: Decimal,
    pub is_threshold_exceeded: bool,
    pub is_limit_exceeded: bool,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpendingLimitModel {
    /// `None` creates a limit over all categories
    #[serde(default)]
    pub category_id: Option<Uuid>,
    pub limit_amount: Decimal,
    #[serde(default = "default_period")]
    pub period: LimitPeriod,
    #[serde(default = "default_threshold")]
    pub notification_threshold: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSpendingLimitModel {
    pub limit_amount: Decimal,
    #[serde(default = "default_period")]
    pub period: LimitPeriod,
    #[serde(default = "default_threshold")]
    pub notification_threshold: Decimal,
}

fn default_period() -> LimitPeriod {
    LimitPeriod::Monthly
}

fn default_threshold() -> Decimal {
    Decimal::new(80, 2)
}
