use rust_decimal::Decimal;

///
/// Usage of a spending limit derived from its amount, threshold
/// and the spend accumulated in the current period window
/// 
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitUsage {
    pub current_spent: Decimal,
    /// Not clamped; may exceed 100
    pub usage_percentage: Decimal,
    /// Negative once the limit is overspent
    pub remaining_amount: Decimal,
    pub is_threshold_exceeded: bool,
    pub is_limit_exceeded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    Warning,
    Exceeded,
}

pub fn evaluate(limit_amount: Decimal, notification_threshold: Decimal, current_spent: Decimal) -> LimitUsage {
    let usage_percentage = if limit_amount.is_zero() {
        Decimal::ZERO
    } else {
        (current_spent / limit_amount * Decimal::ONE_HUNDRED).round_dp(2)
    };

    LimitUsage {
        current_spent,
        usage_percentage,
        remaining_amount: limit_amount - current_spent,
        is_threshold_exceeded: usage_percentage / Decimal::ONE_HUNDRED >= notification_threshold,
        is_limit_exceeded: current_spent >= limit_amount,
    }
}

///
/// Determines which notification, if any, an evaluation should emit.
/// Only upward crossings notify; `previous` is `None` for a limit
/// that has never been evaluated.
/// 
pub fn detect_crossing(previous: Option<&LimitUsage>, current: &LimitUsage) -> Option<Crossing> {
    let (was_at_threshold, was_exceeded) = previous
        .map(|prev| (prev.is_threshold_exceeded, prev.is_limit_exceeded))
        .unwrap_or((false, false));

    if current.is_limit_exceeded && !was_exceeded {
        Some(Crossing::Exceeded)
    } else if current.is_threshold_exceeded && !current.is_limit_exceeded && !was_at_threshold {
        Some(Crossing::Warning)
    } else {
        None
    }
}
