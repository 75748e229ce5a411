// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Session
//!
//! The single mutable record of wallet-connection state, and the controller
//! that owns it.
//!
//! ## States
//!
//! | Status | Condition |
//! |--------|-----------|
//! | `Disconnected` | no account, no connect in flight |
//! | `Connecting` | a connect is in flight |
//! | `Connected` | an account is present |
//!
//! `error` is an overlay on any status; it is cleared when a new action
//! starts, never by a disconnect.

pub mod controller;

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::blockchain::{AmountError, GatewayError};

pub use controller::{SessionController, SessionEvents};

/// Errors surfaced by session actions.
///
/// Connector errors come from `connect`; action errors from purchases and
/// balance queries. Both are stored on the [`Session`] and returned to the
/// caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    Connector(GatewayError),

    #[error("{0}")]
    Action(GatewayError),

    #[error("Wallet not connected")]
    NotConnected,

    #[error("{0}")]
    InvalidAmount(AmountError),
}

impl SessionError {
    /// Error category: `connector` or `action`.
    pub fn category(&self) -> &'static str {
        match self {
            SessionError::Connector(_) => "connector",
            SessionError::Action(_) | SessionError::NotConnected | SessionError::InvalidAmount(_) => {
                "action"
            }
        }
    }

    /// Specific reason within the category.
    pub fn code(&self) -> &'static str {
        match self {
            SessionError::Connector(e) | SessionError::Action(e) => e.code(),
            SessionError::NotConnected => "not_connected",
            SessionError::InvalidAmount(_) => "invalid_amount",
        }
    }
}

/// Action currently awaiting the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PendingAction {
    Connect,
    Purchase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Disconnected,
    Connecting,
    Connected,
}

/// The most recent confirmed purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub transaction_id: String,
    /// Tokens bought, decimal text
    pub tokens: String,
    /// ETH paid, decimal text
    pub cost: String,
    pub submitted_at: DateTime<Utc>,
}

/// Wallet session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account: Option<Address>,
    pub chain_id: Option<u64>,
    /// Token balance as decimal text; `"0"` while disconnected
    pub balance: String,
    pub error: Option<SessionError>,
    pub loading: bool,
    pub pending: Option<PendingAction>,
    pub last_transaction: Option<TransactionRecord>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            account: None,
            chain_id: None,
            balance: "0".to_string(),
            error: None,
            loading: false,
            pending: None,
            last_transaction: None,
        }
    }
}

impl Session {
    pub fn status(&self) -> SessionStatus {
        match (self.pending, self.account) {
            (Some(PendingAction::Connect), _) => SessionStatus::Connecting,
            (_, Some(_)) => SessionStatus::Connected,
            (_, None) => SessionStatus::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    /// Whether a purchase may be submitted for the given amount text.
    pub fn can_submit(&self, amount_text: &str) -> bool {
        self.is_connected() && !amount_text.trim().is_empty() && !self.loading
    }

    fn begin(&mut self, action: PendingAction) {
        self.loading = true;
        self.pending = Some(action);
        self.error = None;
    }

    fn finish(&mut self) {
        self.loading = false;
        self.pending = None;
    }

    fn clear_identity(&mut self) {
        self.account = None;
        self.chain_id = None;
        self.balance = "0".to_string();
    }
}
