// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM gateway: alloy HTTP provider + local wallet + DCRX contract binding.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use alloy::{
    network::EthereumWallet,
    primitives::{Address, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::gateway::{ChainGateway, GatewayError, WalletEventSender};
use super::signing::load_signer;
use super::token::TokenContract;
use super::types::*;
use crate::config::{AppConfig, WalletSource};

/// Default interval between `eth_chainId` polls of the chain watcher.
const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(4);

struct ActiveConnection {
    handle: WalletHandle,
    provider: DynProvider,
    watcher: CancellationToken,
}

/// Production [`ChainGateway`] talking JSON-RPC to the configured network.
pub struct EvmGateway {
    network: NetworkConfig,
    contract_address: Address,
    wallet: WalletSource,
    cached: AtomicBool,
    active: Mutex<Option<ActiveConnection>>,
    watch_interval: Duration,
}

impl EvmGateway {
    pub fn new(config: &AppConfig) -> Self {
        let cached = config.auto_connect && config.wallet != WalletSource::None;
        Self {
            network: config.network.clone(),
            contract_address: config.contract_address,
            wallet: config.wallet.clone(),
            cached: AtomicBool::new(cached),
            active: Mutex::new(None),
            watch_interval: DEFAULT_WATCH_INTERVAL,
        }
    }

    fn active(&self) -> MutexGuard<'_, Option<ActiveConnection>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Provider of the connection `handle` refers to.
    fn provider_for(&self, handle: &WalletHandle) -> Result<DynProvider, GatewayError> {
        match self.active().as_ref() {
            Some(conn) if conn.handle.id == handle.id => Ok(conn.provider.clone()),
            _ => Err(GatewayError::StaleHandle),
        }
    }

    /// Drop the active connection, if any, and stop its chain watcher.
    fn release(&self) -> Option<WalletHandle> {
        let previous = self.active().take()?;
        previous.watcher.cancel();
        Some(previous.handle)
    }

    async fn open(&self) -> Result<ActiveConnection, GatewayError> {
        let signer = load_signer(&self.wallet).await?;
        let account = signer.address();

        let url: url::Url = self
            .network
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| GatewayError::Transport(e.to_string()))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if chain_id != self.network.chain_id {
            return Err(GatewayError::WrongNetwork {
                expected: self.network.chain_id,
                expected_name: self.network.name,
                actual: chain_id,
            });
        }

        Ok(ActiveConnection {
            handle: WalletHandle::new(account, chain_id),
            provider,
            watcher: CancellationToken::new(),
        })
    }
}

#[async_trait]
impl ChainGateway for EvmGateway {
    /// Every attempt replaces the current connection, so a failed reconnect
    /// leaves nothing active.
    async fn connect(&self) -> Result<WalletHandle, GatewayError> {
        if let Some(previous) = self.release() {
            debug!(account = %previous.account, "Releasing previous connection");
        }

        let conn = match self.open().await {
            Ok(conn) => conn,
            Err(e) => {
                self.cached.store(false, Ordering::SeqCst);
                return Err(e);
            }
        };

        let handle = conn.handle;
        if let Some(raced) = self.active().replace(conn) {
            raced.watcher.cancel();
        }
        self.cached.store(true, Ordering::SeqCst);

        info!(
            account = %handle.account,
            chain_id = handle.chain_id,
            network = %self.network.name,
            "Wallet connected"
        );
        Ok(handle)
    }

    async fn disconnect(&self) {
        let previous = self.release();
        self.cached.store(false, Ordering::SeqCst);
        if let Some(handle) = previous {
            info!(account = %handle.account, "Wallet disconnected");
        }
    }

    async fn balance_of(
        &self,
        handle: &WalletHandle,
        address: Address,
    ) -> Result<U256, GatewayError> {
        let provider = self.provider_for(handle)?;
        TokenContract::new(&provider, self.contract_address)
            .balance_of(address)
            .await
    }

    async fn purchase(
        &self,
        handle: &WalletHandle,
        order: &PurchaseOrder,
    ) -> Result<String, GatewayError> {
        let provider = self.provider_for(handle)?;
        let tx_hash = TokenContract::new(&provider, self.contract_address)
            .purchase(order.amount, order.value)
            .await?;

        info!(
            tx_hash = %tx_hash,
            amount = %order.amount,
            value = %order.value,
            "Purchase confirmed"
        );
        Ok(tx_hash)
    }

    fn subscribe(&self, handle: &WalletHandle, events: WalletEventSender) {
        let (provider, shutdown) = match self.active().as_ref() {
            Some(conn) if conn.handle.id == handle.id => {
                (conn.provider.clone(), conn.watcher.clone())
            }
            _ => {
                warn!(handle = %handle.id, "Subscribe on inactive connection ignored");
                return;
            }
        };

        let watcher = ChainWatcher {
            handle: *handle,
            provider,
            events,
            poll_interval: self.watch_interval,
        };
        tokio::spawn(watcher.run(shutdown));
    }

    fn has_cached_connection(&self) -> bool {
        self.cached.load(Ordering::SeqCst)
    }
}

/// Background task turning chain id changes and RPC loss into wallet events.
///
/// A local key never changes accounts on its own, so only `ChainChanged`
/// and `Disconnected` are produced here.
struct ChainWatcher {
    handle: WalletHandle,
    provider: DynProvider,
    events: WalletEventSender,
    poll_interval: Duration,
}

impl ChainWatcher {
    async fn run(self, shutdown: CancellationToken) {
        let mut current = self.handle.chain_id;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => return,
            }

            let kind = match self.provider.get_chain_id().await {
                Ok(chain_id) if chain_id != current => {
                    info!(from = current, to = chain_id, "Chain changed");
                    current = chain_id;
                    WalletEventKind::ChainChanged(chain_id)
                }
                Ok(_) => continue,
                Err(e) => {
                    warn!(error = %e, "Lost RPC connection, reporting disconnect");
                    WalletEventKind::Disconnected
                }
            };

            let stop = kind == WalletEventKind::Disconnected;
            let event = WalletEvent {
                handle: self.handle.id,
                kind,
            };
            if self.events.send(event).is_err() || stop {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(wallet: WalletSource, auto_connect: bool) -> AppConfig {
        AppConfig {
            // Nothing listens on port 1, so any RPC attempt fails fast.
            network: NetworkConfig::for_chain(1, "http://127.0.0.1:1"),
            contract_address: Address::repeat_byte(0xaa),
            wallet,
            auto_connect,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            tls: None,
            log_format: Default::default(),
        }
    }

    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[tokio::test]
    async fn connect_without_wallet_fails_before_rpc() {
        let gateway = EvmGateway::new(&config(WalletSource::None, false));
        let err = gateway.connect().await.unwrap_err();
        assert_eq!(err.code(), "no_wallet");
    }

    #[tokio::test]
    async fn connect_to_unreachable_rpc_is_transport_error() {
        let gateway = EvmGateway::new(&config(WalletSource::PrivateKey(DEV_KEY.into()), false));
        let err = gateway.connect().await.unwrap_err();
        assert_eq!(err.code(), "transport");
        assert!(!gateway.has_cached_connection());
    }

    #[tokio::test]
    async fn calls_with_unknown_handle_are_stale() {
        let gateway = EvmGateway::new(&config(WalletSource::PrivateKey(DEV_KEY.into()), false));
        let handle = WalletHandle::new(Address::repeat_byte(0x11), 1);

        let err = gateway.balance_of(&handle, handle.account).await.unwrap_err();
        assert_eq!(err, GatewayError::StaleHandle);

        let order = PurchaseOrder {
            amount: U256::from(1u64),
            value: U256::from(1u64),
        };
        let err = gateway.purchase(&handle, &order).await.unwrap_err();
        assert_eq!(err, GatewayError::StaleHandle);
    }

    #[tokio::test]
    async fn cache_is_seeded_from_auto_connect_and_cleared_on_disconnect() {
        let gateway = EvmGateway::new(&config(WalletSource::PrivateKey(DEV_KEY.into()), true));
        assert!(gateway.has_cached_connection());

        gateway.disconnect().await;
        assert!(!gateway.has_cached_connection());

        let no_wallet = EvmGateway::new(&config(WalletSource::None, true));
        assert!(!no_wallet.has_cached_connection());
    }

    fn offline_provider() -> DynProvider {
        ProviderBuilder::new()
            .connect_http("http://127.0.0.1:1".parse().unwrap())
            .erased()
    }

    #[tokio::test]
    async fn failed_reconnect_releases_previous_connection() {
        let gateway = EvmGateway::new(&config(WalletSource::PrivateKey(DEV_KEY.into()), true));
        let old = WalletHandle::new(Address::repeat_byte(0x11), 1);
        let old_watcher = CancellationToken::new();
        *gateway.active() = Some(ActiveConnection {
            handle: old,
            provider: offline_provider(),
            watcher: old_watcher.clone(),
        });

        let err = gateway.connect().await.unwrap_err();
        assert_eq!(err.code(), "transport");

        assert!(old_watcher.is_cancelled());
        assert!(gateway.active().is_none());
        assert!(!gateway.has_cached_connection());
        let err = gateway.balance_of(&old, old.account).await.unwrap_err();
        assert_eq!(err, GatewayError::StaleHandle);
    }

    #[tokio::test]
    async fn watcher_reports_disconnect_on_rpc_failure_and_stops() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let handle = WalletHandle::new(Address::repeat_byte(0x11), 1);
        let watcher = ChainWatcher {
            handle,
            provider: offline_provider(),
            events: tx,
            poll_interval: Duration::from_millis(10),
        };
        let task = tokio::spawn(watcher.run(CancellationToken::new()));

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            WalletEvent {
                handle: handle.id,
                kind: WalletEventKind::Disconnected,
            }
        );

        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        // The sender went away with the task; nothing else was queued.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn watcher_exits_when_cancelled() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let watcher = ChainWatcher {
            handle: WalletHandle::new(Address::repeat_byte(0x11), 1),
            provider: offline_provider(),
            events: tx,
            poll_interval: Duration::from_secs(3600),
        };
        let task = tokio::spawn(watcher.run(shutdown.clone()));

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert!(rx.recv().await.is_none());
    }
}
