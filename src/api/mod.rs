// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ErrorBody,
    session::{PendingAction, SessionStatus},
    state::AppState,
    view::{ErrorView, SessionView, TransactionView, WalletOptionView},
};

pub mod health;
pub mod purchase;
pub mod session;
pub mod transactions;
pub mod wallets;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/session", get(session::get_session))
        .route("/session/connect", post(session::connect))
        .route("/session/disconnect", post(session::disconnect))
        .route("/session/toggle", post(session::toggle))
        .route("/purchase", post(purchase::purchase))
        .route("/purchase/quote", get(purchase::quote))
        .route(
            "/transactions/recent",
            get(transactions::recent_transaction),
        )
        .route("/wallets/options", get(wallets::wallet_options));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/v1", v1_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        session::get_session,
        session::connect,
        session::disconnect,
        session::toggle,
        purchase::quote,
        purchase::purchase,
        transactions::recent_transaction,
        wallets::wallet_options
    ),
    components(
        schemas(
            ErrorBody,
            ErrorView,
            SessionView,
            SessionStatus,
            PendingAction,
            TransactionView,
            WalletOptionView,
            purchase::PurchaseRequest,
            purchase::PurchaseResponse,
            purchase::QuoteResponse,
            transactions::RecentTransactionResponse,
            wallets::WalletOptionsResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Session", description = "Wallet connection lifecycle"),
        (name = "Purchase", description = "DCRX purchases at the fixed sale price"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
