// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! DCRX token sale contract interactions.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    sol,
};

use super::gateway::GatewayError;

// Define the DCRX interface using alloy's sol! macro
sol! {
    #[sol(rpc)]
    interface IDecryptoToken {
        event Transfer(address indexed from, address indexed to, uint256 value);

        function balanceOf(address owner) external view returns (uint256);
        function approve(address spender, uint256 value) external returns (bool);
        function transfer(address to, uint256 value) external returns (bool);
        function purchase(uint256 amount) external payable;
    }
}

/// DCRX contract wrapper.
pub struct TokenContract<P> {
    contract: IDecryptoToken::IDecryptoTokenInstance<P>,
}

impl<P: Provider + Clone> TokenContract<P> {
    pub fn new(provider: &P, address: Address) -> Self {
        Self {
            contract: IDecryptoToken::new(address, provider.clone()),
        }
    }

    /// Token balance of `owner` in base units.
    pub async fn balance_of(&self, owner: Address) -> Result<U256, GatewayError> {
        self.contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| GatewayError::Contract(e.to_string()))
    }

    /// Send `purchase(amount)` with `value` attached and wait for the receipt.
    ///
    /// Returns the transaction hash once the transaction is mined.
    pub async fn purchase(&self, amount: U256, value: U256) -> Result<String, GatewayError> {
        let pending = self
            .contract
            .purchase(amount)
            .value(value)
            .send()
            .await
            .map_err(|e| GatewayError::TransactionFailed(format!("Failed to send: {}", e)))?;

        let tx_hash = format!("{:#x}", pending.tx_hash());
        tracing::debug!(tx_hash = %tx_hash, "Purchase submitted, awaiting receipt");

        let receipt = pending.get_receipt().await.map_err(|e| {
            GatewayError::TransactionFailed(format!("Failed to confirm {}: {}", tx_hash, e))
        })?;

        if !receipt.status() {
            return Err(GatewayError::TransactionFailed(format!(
                "Transaction {} reverted",
                tx_hash
            )));
        }

        Ok(tx_hash)
    }
}
