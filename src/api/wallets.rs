// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet picker catalog.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::view::{WalletOptionView, WALLET_OPTIONS};

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletOptionsResponse {
    pub wallets: Vec<WalletOptionView>,
}

/// Wallets offered in the connect dialog.
#[utoipa::path(
    get,
    path = "/v1/wallets/options",
    tag = "Session",
    responses(
        (status = 200, description = "Wallet catalog", body = WalletOptionsResponse)
    )
)]
pub async fn wallet_options() -> Json<WalletOptionsResponse> {
    Json(WalletOptionsResponse {
        wallets: WALLET_OPTIONS.iter().map(Into::into).collect(),
    })
}
