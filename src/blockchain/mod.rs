// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration for the DCRX token sale.
//!
//! This module provides:
//! - The [`ChainGateway`] capability trait consumed by the session controller
//! - The alloy-backed [`EvmGateway`] implementation
//! - The DCRX contract binding and wallet key loading
//! - Decimal amount parsing and formatting

pub mod client;
pub mod gateway;
pub mod signing;
pub mod token;
pub mod types;
pub mod units;

pub use client::EvmGateway;
pub use gateway::{ChainGateway, GatewayError, WalletEventSender};
pub use types::*;
pub use units::{format_amount, format_fixed, parse_amount, AmountError};
