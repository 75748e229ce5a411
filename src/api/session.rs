// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet session endpoints.
//!
//! Every endpoint answers with the session view as it stands after the
//! action, so the page can re-render from a single response.

use axum::{extract::State, Json};

use crate::{error::ApiError, state::AppState, view::SessionView};

/// Current wallet session.
#[utoipa::path(
    get,
    path = "/v1/session",
    tag = "Session",
    responses(
        (status = 200, description = "Session snapshot", body = SessionView)
    )
)]
pub async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    let session = state.controller.snapshot().await;
    Json(SessionView::from_session(&session))
}

/// Connect the configured wallet.
///
/// On failure the error is also recorded on the session.
#[utoipa::path(
    post,
    path = "/v1/session/connect",
    tag = "Session",
    responses(
        (status = 200, description = "Wallet connected", body = SessionView),
        (status = 403, description = "Connection rejected", body = crate::error::ErrorBody),
        (status = 409, description = "Wrong network or action in progress", body = crate::error::ErrorBody),
        (status = 503, description = "No wallet or RPC unavailable", body = crate::error::ErrorBody)
    )
)]
pub async fn connect(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    ensure_idle(&state).await?;
    state.controller.connect().await?;
    Ok(get_session(State(state)).await)
}

/// Disconnect the wallet.
///
/// Refused while a connect or purchase is in flight.
#[utoipa::path(
    post,
    path = "/v1/session/disconnect",
    tag = "Session",
    responses(
        (status = 200, description = "Wallet disconnected", body = SessionView),
        (status = 409, description = "Action in progress", body = crate::error::ErrorBody)
    )
)]
pub async fn disconnect(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    ensure_idle(&state).await?;
    state.controller.disconnect().await;
    Ok(get_session(State(state)).await)
}

/// Connect when disconnected, disconnect otherwise.
///
/// Refused while a connect or purchase is in flight.
#[utoipa::path(
    post,
    path = "/v1/session/toggle",
    tag = "Session",
    responses(
        (status = 200, description = "Session toggled", body = SessionView),
        (status = 409, description = "Action in progress", body = crate::error::ErrorBody)
    )
)]
pub async fn toggle(State(state): State<AppState>) -> Result<Json<SessionView>, ApiError> {
    ensure_idle(&state).await?;
    state.controller.toggle().await?;
    Ok(get_session(State(state)).await)
}

async fn ensure_idle(state: &AppState) -> Result<(), ApiError> {
    if state.controller.snapshot().await.loading {
        return Err(ApiError::conflict(
            "busy",
            "A wallet action is already in progress",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::api::testing::{get, post};
    use crate::blockchain::gateway::mock::ACCOUNT;
    use crate::blockchain::GatewayError;
    use crate::state::test_support::mock_state;

    #[tokio::test]
    async fn fresh_session_is_disconnected() {
        let (state, _gateway, _events) = mock_state();
        let (status, body) = get(state, "/v1/session").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "disconnected");
        assert_eq!(body["balance"], "0");
        assert_eq!(body["connect_label"], "Connect Wallet");
        assert!(body.get("account").is_none());
    }

    #[tokio::test]
    async fn connect_then_disconnect() {
        let (state, gateway, _events) = mock_state();

        let (status, body) = post(state.clone(), "/v1/session/connect", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "connected");
        assert_eq!(body["account"], ACCOUNT.to_checksum(None));
        assert_eq!(body["network"], "Ethereum Mainnet");
        assert_eq!(body["connect_label"], "Disconnect Wallet");

        let (status, body) = post(state, "/v1/session/disconnect", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "disconnected");
        assert_eq!(gateway.disconnect_calls(), 1);
    }

    #[tokio::test]
    async fn rejected_connect_returns_tagged_error() {
        let (state, gateway, _events) = mock_state();
        gateway.push_connect(Err(GatewayError::Rejected("User rejected".into())));

        let (status, body) = post(state.clone(), "/v1/session/connect", None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "User rejected");
        assert_eq!(body["error_code"], "rejected");

        let (_, body) = get(state, "/v1/session").await;
        assert_eq!(body["status"], "disconnected");
        assert_eq!(body["error"]["category"], "connector");
        assert_eq!(body["error"]["message"], "User rejected");
    }

    #[tokio::test]
    async fn actions_are_refused_while_connecting() {
        let (state, gateway, _events) = mock_state();
        let gate = gateway.hold_connect();

        let controller = state.controller.clone();
        let pending = tokio::spawn(async move { controller.connect().await });
        while !state.controller.snapshot().await.loading {
            tokio::task::yield_now().await;
        }

        for uri in [
            "/v1/session/disconnect",
            "/v1/session/connect",
            "/v1/session/toggle",
        ] {
            let (status, body) = post(state.clone(), uri, None).await;
            assert_eq!(status, StatusCode::CONFLICT, "{uri}");
            assert_eq!(body["error_code"], "busy");
        }
        assert_eq!(gateway.disconnect_calls(), 0);

        gate.notify_one();
        pending.await.unwrap().unwrap();

        let (_, body) = get(state, "/v1/session").await;
        assert_eq!(body["status"], "connected");
        assert_eq!(gateway.connect_calls(), 1);
    }

    #[tokio::test]
    async fn toggle_flips_connection() {
        let (state, gateway, _events) = mock_state();

        let (_, body) = post(state.clone(), "/v1/session/toggle", None).await;
        assert_eq!(body["status"], "connected");

        let (_, body) = post(state, "/v1/session/toggle", None).await;
        assert_eq!(body["status"], "disconnected");
        assert_eq!(gateway.connect_calls(), 1);
        assert_eq!(gateway.disconnect_calls(), 1);
    }
}
