// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The capability surface the session controller consumes.
//!
//! A gateway hides the wallet connector, the RPC provider and the contract
//! binding behind four calls plus an event subscription. The production
//! implementation is [`super::client::EvmGateway`].

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::types::{PurchaseOrder, WalletEvent, WalletHandle};

/// Sender side of the controller's wallet event channel.
pub type WalletEventSender = mpsc::UnboundedSender<WalletEvent>;

#[async_trait]
pub trait ChainGateway: Send + Sync {
    /// Open a wallet connection.
    async fn connect(&self) -> Result<WalletHandle, GatewayError>;

    /// Drop the current connection and clear the connection cache.
    ///
    /// Best effort; never fails.
    async fn disconnect(&self);

    /// Token balance of `address`, in base units.
    async fn balance_of(
        &self,
        handle: &WalletHandle,
        address: Address,
    ) -> Result<U256, GatewayError>;

    /// Submit a purchase and wait for it to be mined. Returns the
    /// transaction id.
    async fn purchase(
        &self,
        handle: &WalletHandle,
        order: &PurchaseOrder,
    ) -> Result<String, GatewayError>;

    /// Register `events` as the listener for `handle`'s wallet events.
    fn subscribe(&self, handle: &WalletHandle, events: WalletEventSender);

    /// Whether a previous connection is cached and may be restored.
    fn has_cached_connection(&self) -> bool {
        false
    }
}

/// Failures reported by a gateway. All calls fail atomically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The user (or wallet) refused the request.
    #[error("{0}")]
    Rejected(String),

    #[error("No wallet available: {0}")]
    NoWallet(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Please connect to {expected_name} (chain {expected}); wallet is on chain {actual}")]
    WrongNetwork {
        expected: u64,
        expected_name: &'static str,
        actual: u64,
    },

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Wallet connection is no longer active")]
    StaleHandle,
}

impl GatewayError {
    /// Stable machine-readable kind.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Rejected(_) => "rejected",
            GatewayError::NoWallet(_) => "no_wallet",
            GatewayError::Transport(_) => "transport",
            GatewayError::WrongNetwork { .. } => "wrong_network",
            GatewayError::Contract(_) => "contract",
            GatewayError::TransactionFailed(_) => "transaction_failed",
            GatewayError::StaleHandle => "stale_handle",
        }
    }
}
