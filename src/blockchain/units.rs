// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Conversion between human-readable decimal amounts and base units.

use alloy::primitives::U256;

/// Errors produced while parsing a decimal amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("Invalid amount format: {0}")]
    Invalid(String),

    #[error("Too many decimal places (max {0})")]
    TooPrecise(u8),

    #[error("Amount overflow")]
    Overflow,

    #[error("Amount must be greater than zero")]
    NotPositive,
}

/// Parse a non-negative decimal amount into base units.
///
/// Accepts `"1"`, `"1.5"`, `".5"` and `"2."`. Signs, exponents and
/// separators are rejected.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, AmountError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }

    let (whole_str, frac_str) = match amount.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (amount, ""),
    };

    if whole_str.is_empty() && frac_str.is_empty() {
        return Err(AmountError::Invalid(amount.to_string()));
    }
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole_str) || !all_digits(frac_str) {
        return Err(AmountError::Invalid(amount.to_string()));
    }
    if frac_str.len() > decimals as usize {
        return Err(AmountError::TooPrecise(decimals));
    }

    let whole = if whole_str.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole_str, 10).map_err(|_| AmountError::Overflow)?
    };

    // Pad with zeros to match decimals
    let padded = format!("{:0<width$}", frac_str, width = decimals as usize);
    let fraction = if padded.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(&padded, 10).map_err(|_| AmountError::Overflow)?
    };

    let multiplier = U256::from(10u64).pow(U256::from(decimals));
    whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(fraction))
        .ok_or(AmountError::Overflow)
}

/// Format base units as a trimmed decimal string (`"1.5"`, `"0"`).
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        format!("{}.{}", whole, trimmed)
    }
}

/// Format base units with exactly `places` fractional digits, rounding half up.
pub fn format_fixed(amount: U256, decimals: u8, places: u8) -> String {
    let places = places.min(decimals);
    let step = U256::from(10u64).pow(U256::from(decimals - places));
    let half = step / U256::from(2u64);
    let rounded = amount.saturating_add(half) / step;

    if places == 0 {
        return rounded.to_string();
    }

    let scale = U256::from(10u64).pow(U256::from(places));
    let whole = rounded / scale;
    let fraction = rounded % scale;
    format!("{}.{:0>width$}", whole, fraction.to_string(), width = places as usize)
}
