// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! DecryptoX dApp - DCRX Token Sale Back End
//!
//! This crate owns a single wallet session for the DCRX token sale and
//! exposes it over HTTP: connect or disconnect a wallet, quote and submit
//! purchases at the fixed price, and show the latest transaction.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - Chain gateway, EVM client and DCRX contract binding
//! - `pricing` - Fixed-price cost computation
//! - `session` - Wallet session state and controller
//! - `view` - Display projections of the session

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod pricing;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod view;
