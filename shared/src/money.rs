//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts live in memory as [`Decimal`] and in storage as integer minor
//! units (cents). Conversions round half away from zero to two places.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
pub const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price (1,000,000.00)
pub const MAX_PRICE: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 2);

/// Round an amount to the storefront's currency precision
#[inline]
pub fn round(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert an amount to integer cents for storage
///
/// Returns `None` when the value does not fit in an `i64`.
pub fn to_cents(amount: Decimal) -> Option<i64> {
    (round(amount) * Decimal::ONE_HUNDRED).to_i64()
}

/// Convert stored integer cents back into an amount
#[inline]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, DECIMAL_PLACES)
}

/// Price of a single line: unit price times quantity
#[inline]
pub fn line_total(unit_price: Decimal, quantity: i64) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Sum of `unit_price * quantity` over every line
pub fn sum_lines<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, i64)>,
{
    lines
        .into_iter()
        .map(|(price, qty)| line_total(price, qty))
        .sum()
}
