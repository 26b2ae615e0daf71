use std::collections::BTreeSet;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{categories::models::CategoryModel, spending_limits::models::SpendingLimitModel};

pub const BADGE_MAX: u64 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitCardState {
    Normal,
    Warning,
    Exceeded,
}

impl LimitCardState {
    pub fn of(limit: &SpendingLimitModel) -> Self {
        if limit.is_limit_exceeded {
            LimitCardState::Exceeded
        } else if limit.is_threshold_exceeded {
            LimitCardState::Warning
        } else {
            LimitCardState::Normal
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            LimitCardState::Normal => "",
            LimitCardState::Warning => "warning",
            LimitCardState::Exceeded => "exceeded",
        }
    }
}

///
/// Everything a spending limit card displays
/// 
#[derive(Debug, Clone, PartialEq)]
pub struct LimitCardView {
    pub limit_id: Uuid,
    pub title: String,
    pub state: LimitCardState,
    /// Progress bar fill, in percent of its width
    pub fill_width: Decimal,
    pub remaining_text: String,
}

impl From<&SpendingLimitModel> for LimitCardView {
    fn from(limit: &SpendingLimitModel) -> Self {
        LimitCardView { 
            limit_id: limit.id, 
            title: limit.category_name.clone(), 
            state: LimitCardState::of(limit), 
            fill_width: progress_width(limit.usage_percentage), 
            remaining_text: remaining_text(limit.remaining_amount),
        }
    }
}

pub fn progress_width(usage_percentage: Decimal) -> Decimal {
    usage_percentage.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

pub fn remaining_text(remaining: Decimal) -> String {
    if remaining < Decimal::ZERO {
        format!("${:.2} over limit", remaining.abs())
    } else {
        format!("${:.2} remaining", remaining)
    }
}

/// Text of the unread notifications badge, `None` when it is hidden
pub fn badge_text(unread_count: u64) -> Option<String> {
    match unread_count {
        0 => None,
        count if count > BADGE_MAX => Some(format!("{}+", BADGE_MAX)),
        count => Some(count.to_string()),
    }
}

///
/// Bulk selection on the categories page. The bulk-delete control is
/// only shown while something is selected.
/// 
#[derive(Debug, Default)]
pub struct CategorySelection {
    selected: BTreeSet<Uuid>,
}

impl CategorySelection {
    /// Toggles a category, returning whether it is now selected
    pub fn toggle(&mut self, cat_id: Uuid) -> bool {
        if !self.selected.remove(&cat_id) {
            self.selected.insert(cat_id);
            return true;
        }
        false
    }

    /// Selects every category that can be deleted
    pub fn select_all(&mut self, cats: &[CategoryModel]) {
        self.selected = cats.iter()
            .filter(|cat| !cat.is_default)
            .map(|cat| cat.id)
            .collect();
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, cat_id: Uuid) -> bool {
        self.selected.contains(&cat_id)
    }

    pub fn selected_ids(&self) -> Vec<Uuid> {
        self.selected.iter().copied().collect()
    }

    pub fn show_bulk_delete(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Drops selections that no longer exist after a re-fetch
    pub fn retain_existing(&mut self, cats: &[CategoryModel]) {
        self.selected.retain(|id| cats.iter().any(|cat| cat.id == *id));
    }
}
