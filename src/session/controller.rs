// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session controller: mediates between UI actions and the chain gateway.
//!
//! The session lock is never held across a gateway call. Wallet events are
//! delivered over a channel and applied one at a time by [`SessionController::run`].

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use chrono::Utc;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{PendingAction, Session, SessionError, TransactionRecord};
use crate::blockchain::{
    format_amount, AmountError, ChainGateway, GatewayError, WalletEvent, WalletEventKind,
    WalletEventSender, WalletHandle, TOKEN_DECIMALS,
};
use crate::pricing::Quote;

#[derive(Default)]
struct State {
    session: Session,
    handle: Option<WalletHandle>,
}

/// Receiving end of the controller's wallet event channel.
pub struct SessionEvents(mpsc::UnboundedReceiver<WalletEvent>);

impl SessionEvents {
    pub async fn recv(&mut self) -> Option<WalletEvent> {
        self.0.recv().await
    }
}

/// Owner of the single wallet [`Session`].
pub struct SessionController {
    gateway: Arc<dyn ChainGateway>,
    state: RwLock<State>,
    events: WalletEventSender,
}

impl SessionController {
    /// Create a controller and the event stream its loop must consume.
    pub fn new(gateway: Arc<dyn ChainGateway>) -> (Arc<Self>, SessionEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Arc::new(Self {
            gateway,
            state: RwLock::new(State::default()),
            events: tx,
        });
        (controller, SessionEvents(rx))
    }

    /// Copy of the current session.
    pub async fn snapshot(&self) -> Session {
        self.state.read().await.session.clone()
    }

    /// Connect the wallet and populate the session.
    ///
    /// On failure the session identity is cleared and the error recorded.
    pub async fn connect(&self) -> Result<(), SessionError> {
        self.state.write().await.session.begin(PendingAction::Connect);

        let result = self.open_connection().await;

        let mut state = self.state.write().await;
        state.session.finish();
        match result {
            Ok((handle, balance)) => {
                state.handle = Some(handle);
                state.session.account = Some(handle.account);
                state.session.chain_id = Some(handle.chain_id);
                state.session.balance = format_amount(balance, TOKEN_DECIMALS);
                drop(state);

                self.gateway.subscribe(&handle, self.events.clone());
                info!(
                    account = %handle.account,
                    chain_id = handle.chain_id,
                    "Session connected"
                );
                Ok(())
            }
            Err(e) => {
                state.handle = None;
                state.session.clear_identity();
                let err = SessionError::Connector(e);
                state.session.error = Some(err.clone());
                warn!(error = %err, code = err.code(), "Session connect failed");
                Err(err)
            }
        }
    }

    async fn open_connection(&self) -> Result<(WalletHandle, U256), GatewayError> {
        let handle = self.gateway.connect().await?;
        let balance = self.gateway.balance_of(&handle, handle.account).await?;
        Ok((handle, balance))
    }

    /// Disconnect the wallet. Always succeeds and keeps any recorded error.
    pub async fn disconnect(&self) {
        self.gateway.disconnect().await;

        let mut state = self.state.write().await;
        state.handle = None;
        state.session.clear_identity();
        info!("Session disconnected");
    }

    /// Connect when disconnected, disconnect otherwise.
    pub async fn toggle(&self) -> Result<(), SessionError> {
        let connected = self.state.read().await.session.is_connected();
        if connected {
            self.disconnect().await;
            Ok(())
        } else {
            self.connect().await
        }
    }

    /// Reconnect a cached wallet, if the gateway has one.
    ///
    /// Returns whether a reconnect was attempted.
    pub async fn restore(&self) -> Result<bool, SessionError> {
        if !self.gateway.has_cached_connection() {
            return Ok(false);
        }
        info!("Restoring cached wallet connection");
        self.connect().await.map(|_| true)
    }

    /// Buy `amount` DCRX (decimal text) at the fixed rate.
    ///
    /// Returns the transaction id once mined. Fails with
    /// [`SessionError::NotConnected`] without contacting the gateway when no
    /// wallet is connected.
    pub async fn purchase_tokens(&self, amount: &str) -> Result<String, SessionError> {
        let connection = {
            let mut state = self.state.write().await;
            state.session.begin(PendingAction::Purchase);
            match (state.handle, state.session.account) {
                (Some(handle), Some(account)) => Some((handle, account)),
                _ => None,
            }
        };

        let result = self.submit_purchase(connection, amount).await;

        let mut state = self.state.write().await;
        state.session.finish();
        match result {
            Ok(record) => {
                let transaction_id = record.transaction_id.clone();
                state.session.last_transaction = Some(record);
                Ok(transaction_id)
            }
            Err(err) => {
                warn!(error = %err, code = err.code(), "Purchase failed");
                state.session.error = Some(err.clone());
                Err(err)
            }
        }
    }

    async fn submit_purchase(
        &self,
        connection: Option<(WalletHandle, Address)>,
        amount: &str,
    ) -> Result<TransactionRecord, SessionError> {
        let (handle, account) = connection.ok_or(SessionError::NotConnected)?;

        let quote = Quote::for_input(amount).map_err(SessionError::InvalidAmount)?;
        if quote.tokens.is_zero() {
            return Err(SessionError::InvalidAmount(AmountError::NotPositive));
        }

        info!(
            account = %account,
            tokens = %quote.tokens_display(),
            cost = %quote.cost_display(),
            "Submitting purchase"
        );
        let transaction_id = self
            .gateway
            .purchase(&handle, &quote.order())
            .await
            .map_err(SessionError::Action)?;

        // The purchase is mined at this point; a failed refresh is recorded
        // on the session but does not fail the purchase.
        if let Err(e) = self.update_balance(account).await {
            warn!(error = %e, "Balance refresh after purchase failed");
        }

        Ok(TransactionRecord {
            transaction_id,
            tokens: quote.tokens_display(),
            cost: format_amount(quote.cost, TOKEN_DECIMALS),
            submitted_at: Utc::now(),
        })
    }

    /// Re-query the token balance of `address`.
    ///
    /// No-op when no wallet connection is held.
    pub async fn update_balance(&self, address: Address) -> Result<(), SessionError> {
        let Some(handle) = self.state.read().await.handle else {
            return Ok(());
        };

        let result = self.gateway.balance_of(&handle, address).await;

        let mut state = self.state.write().await;
        match result {
            Ok(balance) => {
                // The connection may have been replaced or dropped meanwhile.
                if state.handle.map(|h| h.id) == Some(handle.id) {
                    state.session.balance = format_amount(balance, TOKEN_DECIMALS);
                }
                Ok(())
            }
            Err(e) => {
                let err = SessionError::Action(e);
                state.session.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Apply one wallet event.
    ///
    /// Events from a connection other than the current one are dropped.
    pub async fn handle_event(&self, event: WalletEvent) {
        let current = self.state.read().await.handle.map(|h| h.id);
        if current != Some(event.handle) {
            debug!(handle = %event.handle, "Ignoring event from inactive connection");
            return;
        }

        match event.kind {
            WalletEventKind::AccountsChanged(accounts) => match accounts.first().copied() {
                Some(account) => {
                    {
                        let mut state = self.state.write().await;
                        state.session.account = Some(account);
                        if let Some(handle) = state.handle.as_mut() {
                            handle.account = account;
                        }
                    }
                    info!(account = %account, "Wallet account changed");
                    if let Err(e) = self.update_balance(account).await {
                        warn!(error = %e, "Balance refresh after account change failed");
                    }
                }
                None => {
                    info!("Wallet exposed no accounts");
                    self.disconnect().await;
                }
            },
            WalletEventKind::ChainChanged(chain_id) => {
                self.state.write().await.session.chain_id = Some(chain_id);
                info!(chain_id, "Chain changed, reconnecting");
                // Errors are recorded on the session by connect.
                let _ = self.connect().await;
            }
            WalletEventKind::Disconnected => {
                info!("Wallet reported disconnect");
                self.disconnect().await;
            }
        }
    }

    /// Run the event loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(controller.clone().run(events, shutdown.clone()));
    /// ```
    pub async fn run(self: Arc<Self>, mut events: SessionEvents, shutdown: CancellationToken) {
        info!("Session event loop starting");

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => return,
                },
                _ = shutdown.cancelled() => {
                    info!("Session event loop shutting down");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::gateway::mock::{MockGateway, ACCOUNT, OTHER_ACCOUNT};
    use crate::blockchain::parse_amount;
    use crate::session::SessionStatus;
    use std::time::Duration;
    use uuid::Uuid;

    fn ether(text: &str) -> U256 {
        parse_amount(text, TOKEN_DECIMALS).unwrap()
    }

    fn setup() -> (Arc<MockGateway>, Arc<SessionController>, SessionEvents) {
        let gateway = Arc::new(MockGateway::new());
        let (controller, events) = SessionController::new(gateway.clone());
        (gateway, controller, events)
    }

    async fn connected() -> (Arc<MockGateway>, Arc<SessionController>, SessionEvents) {
        let (gateway, controller, events) = setup();
        gateway.push_balance(Ok(ether("100")));
        controller.connect().await.unwrap();
        (gateway, controller, events)
    }

    #[tokio::test]
    async fn connect_populates_session() {
        let (gateway, controller, _events) = setup();
        gateway.push_balance(Ok(ether("1.5")));

        controller.connect().await.unwrap();

        let session = controller.snapshot().await;
        assert_eq!(session.account, Some(ACCOUNT));
        assert_eq!(session.chain_id, Some(1));
        assert_eq!(session.balance, "1.5");
        assert!(session.error.is_none());
        assert!(!session.loading);
        assert_eq!(session.status(), SessionStatus::Connected);
        assert_eq!(gateway.subscription_count(), 1);
    }

    #[tokio::test]
    async fn repeated_connects_stay_fully_populated() {
        let (gateway, controller, _events) = setup();
        for _ in 0..3 {
            controller.connect().await.unwrap();
            let session = controller.snapshot().await;
            assert!(session.account.is_some());
            assert!(session.chain_id.is_some());
            assert!(session.error.is_none());
        }
        assert_eq!(gateway.subscription_count(), 3);
    }

    #[tokio::test]
    async fn rejected_connect_records_error() {
        let (gateway, controller, _events) = setup();
        gateway.push_connect(Err(GatewayError::Rejected("User rejected".into())));

        let err = controller.connect().await.unwrap_err();
        assert_eq!(err.to_string(), "User rejected");

        let session = controller.snapshot().await;
        assert_eq!(session.error.map(|e| e.to_string()).as_deref(), Some("User rejected"));
        assert!(!session.loading);
        assert!(session.account.is_none());
        assert!(session.chain_id.is_none());
        assert_eq!(session.balance, "0");
        assert_eq!(gateway.subscription_count(), 0);
    }

    #[tokio::test]
    async fn failed_balance_query_leaves_session_cleared() {
        let (gateway, controller, _events) = setup();
        gateway.push_balance(Err(GatewayError::Contract("execution reverted".into())));

        let err = controller.connect().await.unwrap_err();
        assert_eq!(err.category(), "connector");

        let session = controller.snapshot().await;
        assert!(session.account.is_none());
        assert!(session.chain_id.is_none());
        assert_eq!(session.balance, "0");
        assert_eq!(gateway.subscription_count(), 0);
    }

    #[tokio::test]
    async fn failed_reconnect_clears_previous_connection() {
        let (gateway, controller, _events) = connected().await;
        gateway.push_connect(Err(GatewayError::Transport("connection refused".into())));

        assert!(controller.connect().await.is_err());

        let session = controller.snapshot().await;
        assert!(session.account.is_none());
        assert_eq!(session.balance, "0");
        assert!(session.error.is_some());
    }

    #[tokio::test]
    async fn disconnect_clears_identity_but_keeps_error() {
        let (gateway, controller, _events) = connected().await;
        gateway.push_purchase(Err(GatewayError::TransactionFailed("insufficient funds".into())));
        let _ = controller.purchase_tokens("1").await;

        controller.disconnect().await;

        let session = controller.snapshot().await;
        assert!(session.account.is_none());
        assert!(session.chain_id.is_none());
        assert_eq!(session.balance, "0");
        assert!(session.error.is_some());
        assert_eq!(gateway.disconnect_calls(), 1);
    }

    #[tokio::test]
    async fn toggle_switches_between_states() {
        let (gateway, controller, _events) = setup();

        controller.toggle().await.unwrap();
        assert!(controller.snapshot().await.is_connected());

        controller.toggle().await.unwrap();
        assert!(!controller.snapshot().await.is_connected());
        assert_eq!(gateway.connect_calls(), 1);
        assert_eq!(gateway.disconnect_calls(), 1);
    }

    #[tokio::test]
    async fn purchase_without_wallet_never_reaches_gateway() {
        let (gateway, controller, _events) = setup();

        let err = controller.purchase_tokens("10").await.unwrap_err();
        assert_eq!(err, SessionError::NotConnected);
        assert!(gateway.purchase_calls().is_empty());

        let session = controller.snapshot().await;
        assert_eq!(session.error, Some(SessionError::NotConnected));
        assert!(!session.loading);
    }

    #[tokio::test]
    async fn purchase_returns_transaction_and_refreshes_balance() {
        let (gateway, controller, _events) = connected().await;
        gateway.push_purchase(Ok("0xabc".into()));
        gateway.push_balance(Ok(ether("110")));

        let tx = controller.purchase_tokens("10").await.unwrap();
        assert_eq!(tx, "0xabc");

        let orders = gateway.purchase_calls();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].amount, ether("10"));
        assert_eq!(orders[0].value, ether("1"));

        let session = controller.snapshot().await;
        assert_eq!(session.balance, "110");
        assert!(!session.loading);
        let record = session.last_transaction.unwrap();
        assert_eq!(record.transaction_id, "0xabc");
        assert_eq!(record.tokens, "10");
        assert_eq!(record.cost, "1");
    }

    #[tokio::test]
    async fn failed_purchase_surfaces_error_and_keeps_account() {
        let (gateway, controller, _events) = connected().await;
        gateway.push_purchase(Err(GatewayError::TransactionFailed("insufficient funds".into())));

        let err = controller.purchase_tokens("10").await.unwrap_err();
        assert_eq!(err.category(), "action");
        assert_eq!(err.code(), "transaction_failed");

        let session = controller.snapshot().await;
        assert_eq!(session.account, Some(ACCOUNT));
        assert_eq!(session.chain_id, Some(1));
        assert_eq!(session.balance, "100");
        assert!(!session.loading);
        assert_eq!(session.error, Some(err));
        assert!(session.last_transaction.is_none());
    }

    #[tokio::test]
    async fn non_positive_or_invalid_amounts_are_rejected() {
        let (gateway, controller, _events) = connected().await;

        let err = controller.purchase_tokens("0").await.unwrap_err();
        assert_eq!(err, SessionError::InvalidAmount(AmountError::NotPositive));

        let err = controller.purchase_tokens("abc").await.unwrap_err();
        assert_eq!(err.code(), "invalid_amount");

        assert!(gateway.purchase_calls().is_empty());
    }

    #[tokio::test]
    async fn balance_refresh_failure_after_purchase_still_returns_transaction() {
        let (gateway, controller, _events) = connected().await;
        gateway.push_purchase(Ok("0xabc".into()));
        gateway.push_balance(Err(GatewayError::Transport("timeout".into())));

        let tx = controller.purchase_tokens("1").await.unwrap();
        assert_eq!(tx, "0xabc");

        let session = controller.snapshot().await;
        assert_eq!(session.balance, "100");
        assert!(session.error.is_some());
        assert!(session.last_transaction.is_some());
    }

    #[tokio::test]
    async fn update_balance_without_connection_is_noop() {
        let (gateway, controller, _events) = setup();
        controller.update_balance(ACCOUNT).await.unwrap();
        assert!(gateway.balance_calls().is_empty());
        assert_eq!(controller.snapshot().await.balance, "0");
    }

    #[tokio::test]
    async fn empty_accounts_changed_disconnects() {
        let (gateway, controller, mut events) = connected().await;
        gateway.emit(WalletEventKind::AccountsChanged(vec![]));

        let event = events.recv().await.unwrap();
        controller.handle_event(event).await;

        let session = controller.snapshot().await;
        assert_eq!(session.status(), SessionStatus::Disconnected);
        assert_eq!(session.balance, "0");
        assert_eq!(gateway.disconnect_calls(), 1);
    }

    #[tokio::test]
    async fn accounts_changed_switches_account_and_refreshes_balance() {
        let (gateway, controller, mut events) = connected().await;
        gateway.push_balance(Ok(ether("7")));
        gateway.emit(WalletEventKind::AccountsChanged(vec![OTHER_ACCOUNT, ACCOUNT]));

        let event = events.recv().await.unwrap();
        controller.handle_event(event).await;

        let session = controller.snapshot().await;
        assert_eq!(session.account, Some(OTHER_ACCOUNT));
        assert_eq!(session.balance, "7");
        assert_eq!(gateway.balance_calls().last(), Some(&OTHER_ACCOUNT));
    }

    #[tokio::test]
    async fn chain_changed_reconnects() {
        let (gateway, controller, mut events) = connected().await;
        gateway.push_connect(Ok((ACCOUNT, 5)));
        gateway.emit(WalletEventKind::ChainChanged(5));

        let event = events.recv().await.unwrap();
        controller.handle_event(event).await;

        assert_eq!(gateway.connect_calls(), 2);
        assert_eq!(gateway.subscription_count(), 2);
        let session = controller.snapshot().await;
        assert_eq!(session.chain_id, Some(5));
        assert_eq!(session.status(), SessionStatus::Connected);
    }

    #[tokio::test]
    async fn disconnect_event_disconnects() {
        let (gateway, controller, mut events) = connected().await;
        gateway.emit(WalletEventKind::Disconnected);

        let event = events.recv().await.unwrap();
        controller.handle_event(event).await;

        assert!(!controller.snapshot().await.is_connected());
    }

    #[tokio::test]
    async fn events_from_inactive_connections_are_ignored() {
        let (gateway, controller, _events) = connected().await;

        controller
            .handle_event(WalletEvent {
                handle: Uuid::new_v4(),
                kind: WalletEventKind::AccountsChanged(vec![]),
            })
            .await;

        assert!(controller.snapshot().await.is_connected());
        assert_eq!(gateway.disconnect_calls(), 0);
    }

    #[tokio::test]
    async fn restore_connects_only_when_cached() {
        let (gateway, controller, _events) = setup();
        assert!(!controller.restore().await.unwrap());
        assert_eq!(gateway.connect_calls(), 0);

        gateway.set_cached(true);
        assert!(controller.restore().await.unwrap());
        assert!(controller.snapshot().await.is_connected());
    }

    #[tokio::test]
    async fn event_loop_applies_events_until_shutdown() {
        let (gateway, controller, events) = connected().await;
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(controller.clone().run(events, shutdown.clone()));

        gateway.push_balance(Ok(ether("3")));
        gateway.emit(WalletEventKind::AccountsChanged(vec![OTHER_ACCOUNT]));

        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let session = controller.snapshot().await;
                if session.account == Some(OTHER_ACCOUNT) && session.balance == "3" {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("event was not applied");

        shutdown.cancel();
        task.await.unwrap();
    }
}
