// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # View Models
//!
//! Read-only projections of the [`Session`] for the purchase page: labels,
//! formatted amounts, control gating, and the static wallet catalog. Nothing
//! here mutates state.

use alloy::primitives::Address;
use serde::Serialize;
use utoipa::ToSchema;

use crate::blockchain::{
    network_name, parse_amount, NetworkConfig, TOKEN_DECIMALS, TOKEN_SYMBOL,
};
use crate::blockchain::units::format_fixed;
use crate::session::{PendingAction, Session, SessionStatus, TransactionRecord};

pub const CONNECT_LABEL: &str = "Connect Wallet";
pub const DISCONNECT_LABEL: &str = "Disconnect Wallet";
pub const CONNECTING_LABEL: &str = "Connecting...";
pub const PURCHASE_LABEL: &str = "Purchase Tokens";
pub const PROCESSING_LABEL: &str = "Processing...";

/// Static wallet descriptor shown in the wallet picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletOption {
    pub name: &'static str,
    pub kind: &'static str,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WalletOptionView {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<&WalletOption> for WalletOptionView {
    fn from(option: &WalletOption) -> Self {
        Self {
            name: option.name.to_string(),
            kind: option.kind.to_string(),
        }
    }
}

/// Wallets offered in the picker.
pub const WALLET_OPTIONS: [WalletOption; 4] = [
    WalletOption {
        name: "MetaMask",
        kind: "Web3",
    },
    WalletOption {
        name: "WalletConnect",
        kind: "Multi-Chain",
    },
    WalletOption {
        name: "Ledger",
        kind: "Hardware",
    },
    WalletOption {
        name: "Trezor",
        kind: "Hardware",
    },
];

/// `0x1234...abcd` form of an address.
pub fn short_address(address: &Address) -> String {
    let full = address.to_checksum(None);
    format!("{}...{}", &full[..6], &full[full.len() - 4..])
}

/// Balance text rendered with four decimals and the token symbol.
pub fn balance_display(balance: &str) -> String {
    let fixed = parse_amount(balance, TOKEN_DECIMALS)
        .map(|units| format_fixed(units, TOKEN_DECIMALS, 4))
        .unwrap_or_else(|_| balance.to_string());
    format!("{fixed} {TOKEN_SYMBOL}")
}

/// Label of the connect/disconnect toggle.
pub fn connect_label(session: &Session) -> &'static str {
    if session.loading {
        CONNECTING_LABEL
    } else if session.is_connected() {
        DISCONNECT_LABEL
    } else {
        CONNECT_LABEL
    }
}

/// Label of the purchase button.
pub fn purchase_label(session: &Session) -> &'static str {
    if session.loading {
        PROCESSING_LABEL
    } else {
        PURCHASE_LABEL
    }
}

/// Session as rendered by the page.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionView {
    pub status: SessionStatus,
    /// Checksummed account address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_short: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    /// Raw decimal balance
    pub balance: String,
    /// Balance with four decimals and symbol
    pub balance_display: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorView>,
    pub loading: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingAction>,
    pub connect_label: String,
    pub purchase_label: String,
    /// Whether the toggle control is enabled
    pub can_toggle: bool,
    /// Whether the amount field is enabled
    pub can_enter_amount: bool,
}

/// Tagged error shown in the session error banner.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorView {
    pub category: String,
    pub code: String,
    pub message: String,
}

impl SessionView {
    pub fn from_session(session: &Session) -> Self {
        Self {
            status: session.status(),
            account: session.account.map(|a| a.to_checksum(None)),
            account_short: session.account.as_ref().map(short_address),
            chain_id: session.chain_id,
            network: session.chain_id.map(|id| network_name(id).to_string()),
            balance: session.balance.clone(),
            balance_display: balance_display(&session.balance),
            error: session.error.as_ref().map(|e| ErrorView {
                category: e.category().to_string(),
                code: e.code().to_string(),
                message: e.to_string(),
            }),
            loading: session.loading,
            pending: session.pending,
            connect_label: connect_label(session).to_string(),
            purchase_label: purchase_label(session).to_string(),
            can_toggle: !session.loading,
            can_enter_amount: session.is_connected() && !session.loading,
        }
    }
}

/// Recent transaction slot.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionView {
    pub transaction_id: String,
    pub tokens: String,
    pub cost: String,
    pub explorer_url: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

impl TransactionView {
    pub fn from_record(record: &TransactionRecord, network: &NetworkConfig) -> Self {
        Self {
            transaction_id: record.transaction_id.clone(),
            tokens: record.tokens.clone(),
            cost: record.cost.clone(),
            explorer_url: network.explorer_tx_url(&record.transaction_id),
            submitted_at: record.submitted_at,
        }
    }
}
