use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::sea_orm_active_enums::TransactionType;

pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    Income,
    Expense,
    #[default]
    Both,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupBy {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl GroupBy {
    /// First day of the group `date` falls into; weeks start on Monday
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            GroupBy::Daily => date,
            GroupBy::Weekly => date - Duration::days(date.weekday().num_days_from_monday() as i64),
            GroupBy::Monthly => date - Duration::days(date.day0() as i64),
        }
    }

    pub fn label(&self, period_start: NaiveDate) -> String {
        match self {
            GroupBy::Daily => period_start.format("%b %d").to_string(),
            GroupBy::Weekly => {
                let week = period_start.iso_week();
                format!("Week {} {}", week.week(), week.year())
            },
            GroupBy::Monthly => period_start.format("%b %Y").to_string(),
        }
    }
}

///
/// Missing dates default to the month leading up to today
/// 
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilterModel {
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub report_type: ReportType,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub group_by: GroupBy,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummaryModel {
    pub date: NaiveDate,
    pub description: String,
    pub category: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesDataModel {
    pub period: String,
    pub income: Decimal,
    pub expense: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDataModel {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_savings: Decimal,
    pub transactions: Vec<TransactionSummaryModel>,
    /// Summed amounts per category name, uncategorized transactions excluded
    pub category_breakdown: BTreeMap<String, Decimal>,
    pub time_series_data: Vec<TimeSeriesDataModel>,
}
