// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use alloy::primitives::{Address, U256};
use uuid::Uuid;

/// Decimals of both ETH and the DCRX token.
pub const TOKEN_DECIMALS: u8 = 18;

/// Display symbol of the purchased token.
pub const TOKEN_SYMBOL: &str = "DCRX";

/// Display symbol of the native currency used to pay.
pub const NATIVE_SYMBOL: &str = "ETH";

/// Network configuration for the target chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: String,
    /// Block explorer URL (no trailing slash)
    pub explorer_url: String,
}

impl NetworkConfig {
    /// Build the configuration for a chain id with the default explorer.
    pub fn for_chain(chain_id: u64, rpc_url: impl Into<String>) -> Self {
        Self {
            name: network_name(chain_id),
            chain_id,
            rpc_url: rpc_url.into(),
            explorer_url: default_explorer_url(chain_id).to_string(),
        }
    }

    /// Explorer link for a transaction.
    pub fn explorer_tx_url(&self, transaction_id: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, transaction_id)
    }
}

/// Human-readable network name for a chain id.
pub fn network_name(chain_id: u64) -> &'static str {
    match chain_id {
        1 => "Ethereum Mainnet",
        3 => "Ropsten Testnet",
        4 => "Rinkeby Testnet",
        5 => "Goerli Testnet",
        42 => "Kovan Testnet",
        11155111 => "Sepolia Testnet",
        _ => "Unknown Network",
    }
}

/// Infura host prefix for a chain id, if Infura serves it.
pub fn infura_network_slug(chain_id: u64) -> Option<&'static str> {
    match chain_id {
        1 => Some("mainnet"),
        3 => Some("ropsten"),
        4 => Some("rinkeby"),
        5 => Some("goerli"),
        42 => Some("kovan"),
        11155111 => Some("sepolia"),
        _ => None,
    }
}

fn default_explorer_url(chain_id: u64) -> &'static str {
    match chain_id {
        3 => "https://ropsten.etherscan.io",
        4 => "https://rinkeby.etherscan.io",
        5 => "https://goerli.etherscan.io",
        42 => "https://kovan.etherscan.io",
        11155111 => "https://sepolia.etherscan.io",
        _ => "https://etherscan.io",
    }
}

/// Live connection returned by a successful gateway connect.
///
/// The `id` tags every event the connection emits, so events from a
/// replaced connection can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletHandle {
    pub id: Uuid,
    pub account: Address,
    pub chain_id: u64,
}

impl WalletHandle {
    pub fn new(account: Address, chain_id: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            account,
            chain_id,
        }
    }
}

/// Event pushed by the gateway for a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletEvent {
    pub handle: Uuid,
    pub kind: WalletEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEventKind {
    /// The wallet's exposed accounts changed. Empty means the wallet locked
    /// or revoked access.
    AccountsChanged(Vec<Address>),
    /// The wallet switched to another chain.
    ChainChanged(u64),
    /// The connection was dropped by the wallet or transport.
    Disconnected,
}

/// Purchase submitted to the sale contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseOrder {
    /// Token amount in base units.
    pub amount: U256,
    /// Native value sent with the call, in wei.
    pub value: U256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_names_match_known_chains() {
        assert_eq!(network_name(1), "Ethereum Mainnet");
        assert_eq!(network_name(5), "Goerli Testnet");
        assert_eq!(network_name(42), "Kovan Testnet");
        assert_eq!(network_name(999), "Unknown Network");
    }

    #[test]
    fn explorer_url_is_templated() {
        let network = NetworkConfig::for_chain(1, "https://mainnet.infura.io/v3/x");
        assert_eq!(network.explorer_tx_url("0xabc"), "https://etherscan.io/tx/0xabc");

        let sepolia = NetworkConfig::for_chain(11155111, "https://sepolia.infura.io/v3/x");
        assert_eq!(
            sepolia.explorer_tx_url("0xabc"),
            "https://sepolia.etherscan.io/tx/0xabc"
        );
    }

    #[test]
    fn handles_get_distinct_ids() {
        let a = WalletHandle::new(Address::ZERO, 1);
        let b = WalletHandle::new(Address::ZERO, 1);
        assert_ne!(a.id, b.id);
    }
}
