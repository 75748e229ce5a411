// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{state::AppState, view::TransactionView};

/// The recent-transaction slot. Holds at most the last confirmed purchase.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecentTransactionResponse {
    pub transaction: Option<TransactionView>,
}

/// Most recent confirmed purchase, if any.
#[utoipa::path(
    get,
    path = "/v1/transactions/recent",
    tag = "Purchase",
    responses(
        (status = 200, description = "Recent transaction slot", body = RecentTransactionResponse)
    )
)]
pub async fn recent_transaction(
    State(state): State<AppState>,
) -> Json<RecentTransactionResponse> {
    let session = state.controller.snapshot().await;
    Json(RecentTransactionResponse {
        transaction: session
            .last_transaction
            .as_ref()
            .map(|record| TransactionView::from_record(record, &state.network)),
    })
}
