//! Conversions between API decimals and the minor units (hundredths)
//! stored in the database.

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};

const MINOR_SCALE: u32 = 2;

/// Converts a decimal into hundredths, rounding to two fractional digits.
/// Returns `None` when the value does not fit into an `i64`.
pub fn to_minor(value: Decimal) -> Option<i64> {
    value.round_dp_with_strategy(MINOR_SCALE, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::ONE_HUNDRED)?
        .to_i64()
}

pub fn from_minor(value: i64) -> Decimal {
    Decimal::new(value, MINOR_SCALE)
}
