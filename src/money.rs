// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for monetary amounts.
//!
//! Amounts are stored as REAL and compared as two-place decimals.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Convert a stored amount into a two-place decimal. `NaN` and infinities yield `None`.
pub fn to_money(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value).map(|d| d.round_dp(2))
}

/// Like [`to_money`], for nullable columns.
pub fn opt_money(value: Option<f64>) -> Option<Decimal> {
    value.and_then(to_money)
}

/// Nullable amount as a decimal, with missing values counting as zero.
pub fn money_or_zero(value: Option<f64>) -> Decimal {
    opt_money(value).unwrap_or(Decimal::ZERO)
}

/// Round an amount to two places (ties to even).
pub fn round2(value: f64) -> Option<f64> {
    to_money(value).and_then(|d| d.to_f64())
}
