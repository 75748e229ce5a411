// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token purchase endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    blockchain::AmountError,
    error::ApiError,
    pricing::estimated_cost_display,
    session::{Session, SessionError},
    state::AppState,
};

/// Query parameters for a cost quote.
#[derive(Debug, Deserialize, IntoParams)]
pub struct QuoteQuery {
    /// DCRX amount as typed, e.g. `10` or `2.5`
    #[serde(default)]
    pub amount: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteResponse {
    pub amount: String,
    /// Cost in ETH with four decimals, e.g. `1.0000 ETH`
    pub estimated_cost: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchaseRequest {
    /// DCRX amount as decimal text
    pub amount: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseResponse {
    pub transaction_id: String,
    pub explorer_url: String,
}

/// Estimated ETH cost of a DCRX amount at the fixed sale price.
///
/// An empty amount quotes `0.00 ETH`.
#[utoipa::path(
    get,
    path = "/v1/purchase/quote",
    tag = "Purchase",
    params(QuoteQuery),
    responses(
        (status = 200, description = "Cost quote", body = QuoteResponse),
        (status = 400, description = "Amount is not a decimal number", body = crate::error::ErrorBody)
    )
)]
pub async fn quote(Query(query): Query<QuoteQuery>) -> Result<Json<QuoteResponse>, ApiError> {
    let estimated_cost = estimated_cost_display(&query.amount)?;
    Ok(Json(QuoteResponse {
        amount: query.amount,
        estimated_cost,
    }))
}

/// Buy DCRX with the connected wallet.
///
/// Waits for the transaction to be mined and returns its id. Refused while
/// no wallet is connected or another action is in flight.
#[utoipa::path(
    post,
    path = "/v1/purchase",
    tag = "Purchase",
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "Purchase mined", body = PurchaseResponse),
        (status = 400, description = "Empty or invalid amount", body = crate::error::ErrorBody),
        (status = 409, description = "Wallet not connected or busy", body = crate::error::ErrorBody),
        (status = 502, description = "Transaction failed", body = crate::error::ErrorBody)
    )
)]
pub async fn purchase(
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    let session = state.controller.snapshot().await;
    ensure_can_submit(&session, &request.amount)?;

    let transaction_id = state.controller.purchase_tokens(&request.amount).await?;
    tracing::info!(transaction_id = %transaction_id, "Purchase confirmed");

    Ok(Json(PurchaseResponse {
        explorer_url: state.network.explorer_tx_url(&transaction_id),
        transaction_id,
    }))
}

/// The purchase button's gating, applied server side.
fn ensure_can_submit(session: &Session, amount: &str) -> Result<(), ApiError> {
    if session.can_submit(amount) {
        return Ok(());
    }
    if session.loading {
        Err(ApiError::conflict(
            "busy",
            "A wallet action is already in progress",
        ))
    } else if !session.is_connected() {
        Err(SessionError::NotConnected.into())
    } else {
        Err(AmountError::Empty.into())
    }
}
