use std::{collections::{BTreeMap, HashSet}, sync::Arc};

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate};
use log::debug;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{ColumnTrait, DbConn, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    date_time_provider::DynDateTimeProvider, 
    entities::{prelude::*, sea_orm_active_enums::{LimitPeriod, TransactionType}, transactions}, 
    reports::models::UNCATEGORIZED_LABEL, 
    spending_limits::period::PeriodWindow, 
    transactions::{models::TransactionModel, with_category_names},
};

use {error::*, models::*};

pub mod error;
pub mod models;
pub mod routes;


pub const MAX_SUGGESTIONS: usize = 5;
/// Days of history searched for recurring payments
pub const RECURRING_LOOKBACK_DAYS: i64 = 90;

pub type DynSuggestionService = Arc<dyn SuggestionService + Send + Sync>;

#[async_trait]
pub trait SuggestionService {
    ///
    /// Spending insights for the current month, most confident first.
    /// Never empty: without any insight a single `INFO` suggestion is returned.
    /// 
    async fn get_suggestions(&self, user_id: Uuid) -> Result<Vec<SuggestionModel>>;
}

pub struct DbConnSuggestionService {
    db: DbConn,
    dt_provider: DynDateTimeProvider,
}

impl DbConnSuggestionService {
    pub fn new_dyn(db: DbConn, dt_provider: DynDateTimeProvider) -> DynSuggestionService {
        Arc::new(Self { db, dt_provider })
    }

    async fn transactions_between(&self, user_id: Uuid, start: NaiveDate, end: NaiveDate) -> Result<Vec<TransactionModel>> {
        let txs = Transactions::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Date.between(start, end))
            .order_by_asc(transactions::Column::Date)
            .all(&self.db).await?;

        Ok(with_category_names(&self.db, txs).await?)
    }
}

#[async_trait]
impl SuggestionService for DbConnSuggestionService {
    async fn get_suggestions(&self, user_id: Uuid) -> Result<Vec<SuggestionModel>> {
        let today = self.dt_provider.utc_now().date_naive();
        let this_month = PeriodWindow::containing(LimitPeriod::Monthly, today);
        let last_month = PeriodWindow::containing(LimitPeriod::Monthly, this_month.start - Duration::days(1));

        let current = self.transactions_between(user_id, this_month.start, this_month.end).await?;
        let previous = self.transactions_between(user_id, last_month.start, last_month.end).await?;
        let recent = self.transactions_between(user_id, today - Duration::days(RECURRING_LOOKBACK_DAYS), today).await?;

        let suggestions = build_suggestions(&current, &previous, &recent);
        debug!("Built {} suggestions for user {}", suggestions.len(), user_id);

        Ok(suggestions)
    }
}

///
/// Runs every rule over the current month, the previous month and the
/// recurring-payment lookback, keeping the `MAX_SUGGESTIONS` most confident
/// 
pub fn build_suggestions(
    current: &[TransactionModel], 
    previous: &[TransactionModel], 
    recent: &[TransactionModel],
) -> Vec<SuggestionModel> {
    let cur_income = sum_of(current, TransactionType::Income);
    let cur_expense = sum_of(current, TransactionType::Expense);
    let cur_by_category = expenses_by_category(current);

    let mut suggestions = Vec::new();
    suggestions.extend(budget_rule(cur_income, cur_expense));
    suggestions.extend(spike_rule(&cur_by_category, &expenses_by_category(previous)));
    suggestions.extend(overview_rule(&cur_by_category, cur_expense));
    suggestions.extend(subscription_rule(recent));
    suggestions.extend(hygiene_rule(current, cur_expense));
    suggestions.extend(get_started_rule(current, previous));

    // Stable, so equally confident suggestions keep rule order
    suggestions.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    suggestions.truncate(MAX_SUGGESTIONS);

    if suggestions.is_empty() {
        suggestions.push(SuggestionModel::new(
            SuggestionType::Info, 
            "Looking good", 
            "No pressing insights this month. Keep tracking your spending to get more tailored suggestions.", 
            Decimal::new(50, 2),
        ));
    }

    suggestions
}

fn budget_rule(income: Decimal, expense: Decimal) -> Option<SuggestionModel> {
    if income > Decimal::ZERO {
        if expense <= income {
            return None;
        }
        let diff = expense - income;
        return Some(
            SuggestionModel::new(
                SuggestionType::Budget, 
                "Spending exceeds income", 
                format!(
                    "Your expenses this month exceed your income by {}. Consider reducing discretionary spending or setting a category budget.", 
                    fmt_amount(diff)
                ), 
                Decimal::new(90, 2),
            )
            .with_savings(diff)
            .with_metric("monthlyIncome", income)
            .with_metric("monthlyExpenses", expense)
        );
    }

    if expense > Decimal::ONE_HUNDRED {
        return Some(
            SuggestionModel::new(
                SuggestionType::Budget, 
                "Set a monthly budget", 
                format!(
                    "We couldn't detect income this month, but you've spent {}. Consider setting targets to keep spending in check.", 
                    fmt_amount(expense)
                ), 
                Decimal::new(60, 2),
            )
            .with_metric("monthlyExpenses", expense)
        );
    }

    None
}

fn spike_rule(current: &BTreeMap<String, Decimal>, previous: &BTreeMap<String, Decimal>) -> Vec<SuggestionModel> {
    let min_spend = Decimal::from(50);
    let min_increase = Decimal::from(40);

    current.iter()
        .filter(|(_, cur)| **cur >= min_spend)
        .filter_map(|(cat, cur)| {
            let prev = previous.get(cat).copied().unwrap_or(Decimal::ZERO);
            let pct = change_percent(prev, *cur);
            if pct < min_increase {
                return None;
            }

            let confidence = (Decimal::new(50, 2) + pct / Decimal::from(200)).min(Decimal::new(95, 2));
            Some(
                SuggestionModel::new(
                    SuggestionType::Spike, 
                    format!("Higher spend in {}", cat), 
                    format!(
                        "Spending in {} is up {}% vs last month. Consider setting a limit or looking for savings.", 
                        cat, whole(pct)
                    ), 
                    confidence,
                )
                .with_category(cat)
                .with_metric("current", *cur)
                .with_metric("previous", prev)
            )
        })
        .collect()
}

fn overview_rule(current: &BTreeMap<String, Decimal>, expense: Decimal) -> Option<SuggestionModel> {
    if expense <= Decimal::ZERO {
        return None;
    }

    let (cat, total) = current.iter().max_by(|a, b| a.1.cmp(b.1))?;
    let share = (*total / expense).round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero) * Decimal::ONE_HUNDRED;
    if share < Decimal::from(35) || *total < Decimal::ONE_HUNDRED {
        return None;
    }

    Some(
        SuggestionModel::new(
            SuggestionType::Overview, 
            format!("{} dominates spending", cat), 
            format!(
                "{} accounts for {}% of your expenses this month ({}). You may trim this category to boost savings.", 
                cat, whole(share), fmt_amount(*total)
            ), 
            Decimal::new(70, 2),
        )
        .with_category(cat)
        .with_metric("sharePercent", whole(share))
        .with_metric("categoryTotal", *total)
        .with_metric("monthlyExpenses", expense)
    )
}

fn subscription_rule(recent: &[TransactionModel]) -> Vec<SuggestionModel> {
    let mut by_description: BTreeMap<String, Vec<&TransactionModel>> = BTreeMap::new();
    for tx in recent.iter().filter(|tx| tx.tx_type == TransactionType::Expense) {
        by_description.entry(normalize_description(&tx.description)).or_default().push(tx);
    }

    by_description.into_iter()
        .filter(|(_, txs)| txs.len() >= 3 && distinct_weeks(txs) >= 3)
        .filter_map(|(description, txs)| {
            let total: Decimal = txs.iter().map(|tx| tx.amount).sum();
            let avg = (total / Decimal::from(txs.len()))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            if avg < Decimal::from(5) {
                return None;
            }

            let min = txs.iter().map(|tx| tx.amount).min()?;
            let max = txs.iter().map(|tx| tx.amount).max()?;
            // Amounts must stay within a fifth of the average
            if max - min > avg * Decimal::new(2, 1) {
                return None;
            }

            let label = prettify_description(&description);
            Some(
                SuggestionModel::new(
                    SuggestionType::Subscription, 
                    format!("Recurring payment: {}", label), 
                    format!(
                        "We detected a recurring expense (~{}) for '{}'. If it's not essential, consider canceling or switching to a cheaper plan.", 
                        fmt_amount(avg), label
                    ), 
                    Decimal::new(75, 2),
                )
                .with_savings(avg)
                .with_metric("occurrences", Decimal::from(txs.len()))
                .with_metric("avgAmount", avg)
            )
        })
        .collect()
}

fn hygiene_rule(current: &[TransactionModel], expense: Decimal) -> Option<SuggestionModel> {
    let uncategorized = current.iter()
        .filter(|tx| tx.tx_type == TransactionType::Expense && tx.category_id.is_none())
        .count();

    // More than a fifth of the month's transactions
    let large_share = expense > Decimal::ZERO && uncategorized * 5 > current.len().max(1);
    if uncategorized < 5 && !large_share {
        return None;
    }

    Some(
        SuggestionModel::new(
            SuggestionType::Hygiene, 
            "Categorize your expenses", 
            format!(
                "You have {} uncategorized expenses this month. Categorizing them improves reports and future suggestions.", 
                uncategorized
            ), 
            Decimal::new(60, 2),
        )
        .with_metric("uncategorizedCount", Decimal::from(uncategorized))
    )
}

fn get_started_rule(current: &[TransactionModel], previous: &[TransactionModel]) -> Option<SuggestionModel> {
    if !current.is_empty() || !previous.is_empty() {
        return None;
    }

    Some(SuggestionModel::new(
        SuggestionType::GetStarted, 
        "Start tracking", 
        "Add your first transactions to unlock personalized spending insights and suggestions.", 
        Decimal::new(80, 2),
    ))
}

fn sum_of(txs: &[TransactionModel], tx_type: TransactionType) -> Decimal {
    txs.iter().filter(|tx| tx.tx_type == tx_type).map(|tx| tx.amount).sum()
}

fn expenses_by_category(txs: &[TransactionModel]) -> BTreeMap<String, Decimal> {
    let mut totals = BTreeMap::new();
    for tx in txs.iter().filter(|tx| tx.tx_type == TransactionType::Expense) {
        let name = tx.category_name.clone().unwrap_or(UNCATEGORIZED_LABEL.to_string());
        *totals.entry(name).or_insert(Decimal::ZERO) += tx.amount;
    }
    totals
}

/// Change from `previous` to `current` in percent; 100 when starting from nothing
pub fn change_percent(previous: Decimal, current: Decimal) -> Decimal {
    if previous.is_zero() {
        return if current > Decimal::ZERO { Decimal::ONE_HUNDRED } else { Decimal::ZERO };
    }

    ((current - previous) / previous).round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero) 
        * Decimal::ONE_HUNDRED
}

///
/// Signature of a description for grouping recurring payments: lowercase,
/// digits dropped, punctuation as spaces, first four words
/// 
pub fn normalize_description(description: &str) -> String {
    let cleaned: String = description.to_lowercase().chars()
        .filter(|c| !c.is_ascii_digit())
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect();

    cleaned.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}

fn prettify_description(normalized: &str) -> String {
    if normalized.trim().is_empty() {
        return String::from("Recurring payment");
    }

    normalized.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Number of distinct (month, ISO week) pairs the transactions fall into
fn distinct_weeks(txs: &[&TransactionModel]) -> usize {
    txs.iter()
        .map(|tx| (tx.date.year(), tx.date.month(), tx.date.iso_week().week()))
        .collect::<HashSet<_>>()
        .len()
}

fn whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

fn fmt_amount(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}
