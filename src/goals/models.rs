use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{entities::goals, money::from_minor};

pub const DEFAULT_GOAL_ICON: &str = "piggy-bank";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalModel {
    pub id: Uuid,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub start_date: NaiveDate,
    pub deadline: Option<NaiveDate>,
    pub icon: String,
    pub created_at: DateTime<Utc>,
    pub is_completed: bool,
    pub progress_percentage: Decimal,
    pub remaining_amount: Decimal,
    /// Negative once the deadline has passed
    pub days_remaining: Option<i64>,
}

impl GoalModel {
    pub fn from_entity(value: goals::Model, today: NaiveDate) -> Self {
        let target_amount = from_minor(value.target_amount);
        let current_amount = from_minor(value.current_amount);
        let progress_percentage = if target_amount > Decimal::ZERO {
            (current_amount / target_amount * Decimal::ONE_HUNDRED).round_dp(2)
        } else {
            Decimal::ZERO
        };

        GoalModel { 
            id: value.id, 
            name: value.name, 
            target_amount, 
            current_amount, 
            start_date: value.start_date, 
            deadline: value.deadline, 
            icon: value.icon, 
            created_at: value.created_on_utc, 
            is_completed: current_amount >= target_amount, 
            progress_percentage, 
            remaining_amount: target_amount - current_amount, 
            days_remaining: value.deadline.map(|deadline| (deadline - today).num_days()),
        }
    }
}

///
/// Body for both creating and updating a goal.
/// The start date defaults to today, the icon to a piggy bank.
/// 
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalModel {
    pub name: String,
    pub target_amount: Decimal,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub icon: Option<String>,
}

pub type UpdateGoalModel = CreateGoalModel;

#[derive(Debug, Deserialize)]
pub struct GoalProgressModel {
    pub amount: Decimal,
}
