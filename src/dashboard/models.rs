use rust_decimal::Decimal;
use serde::Serialize;

use crate::spending_limits::models::SpendingLimitModel;

///
/// Totals are all-time, the monthly figures cover the current calendar
/// month and the changes compare it with the previous one, in percent.
/// 
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummaryModel {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub income_change: Decimal,
    pub expense_change: Decimal,
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
    pub balance: Decimal,
    pub spending_limits: Vec<SpendingLimitModel>,
}
