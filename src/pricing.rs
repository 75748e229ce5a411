// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixed-rate DCRX pricing.
//!
//! The price is a constant 0.1 ETH per DCRX, held as a ratio so the cost of
//! any token amount is exact in wei.

use alloy::primitives::U256;

use crate::blockchain::{
    format_amount, format_fixed, parse_amount, AmountError, PurchaseOrder, NATIVE_SYMBOL,
    TOKEN_DECIMALS,
};

/// Price numerator: wei per token base unit is `NUMERATOR / DENOMINATOR`.
pub const PRICE_NUMERATOR: u64 = 1;
pub const PRICE_DENOMINATOR: u64 = 10;

/// Places shown in the estimated cost.
pub const COST_DISPLAY_PLACES: u8 = 4;

/// Shown while the amount field is empty.
pub const EMPTY_COST_DISPLAY: &str = "0.00 ETH";

/// Token amount and the ETH it costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub tokens: U256,
    pub cost: U256,
}

impl Quote {
    /// Quote a token amount given in base units.
    pub fn for_tokens(tokens: U256) -> Self {
        Self {
            tokens,
            cost: cost_of(tokens),
        }
    }

    /// Quote decimal amount text as typed into the amount field.
    pub fn for_input(input: &str) -> Result<Self, AmountError> {
        parse_amount(input, TOKEN_DECIMALS).map(Self::for_tokens)
    }

    pub fn tokens_display(&self) -> String {
        format_amount(self.tokens, TOKEN_DECIMALS)
    }

    pub fn cost_display(&self) -> String {
        format!(
            "{} {}",
            format_fixed(self.cost, TOKEN_DECIMALS, COST_DISPLAY_PLACES),
            NATIVE_SYMBOL
        )
    }

    pub fn order(&self) -> PurchaseOrder {
        PurchaseOrder {
            amount: self.tokens,
            value: self.cost,
        }
    }
}

/// Cost in wei of `tokens` base units.
pub fn cost_of(tokens: U256) -> U256 {
    tokens.saturating_mul(U256::from(PRICE_NUMERATOR)) / U256::from(PRICE_DENOMINATOR)
}

/// Estimated cost text for the amount field's current contents.
///
/// Recomputed from scratch on every call.
pub fn estimated_cost_display(input: &str) -> Result<String, AmountError> {
    if input.trim().is_empty() {
        return Ok(EMPTY_COST_DISPLAY.to_string());
    }
    Quote::for_input(input).map(|quote| quote.cost_display())
}
