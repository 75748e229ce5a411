// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::blockchain::{AmountError, GatewayError};
use crate::session::SessionError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error_code: &'static str,
}

/// JSON error body returned by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    pub error_code: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error_code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error_code,
        }
    }

    pub fn conflict(error_code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, error_code, message)
    }
}

impl From<AmountError> for ApiError {
    fn from(err: AmountError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_amount", err.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        let status = match &err {
            SessionError::NotConnected => StatusCode::CONFLICT,
            SessionError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            SessionError::Connector(e) | SessionError::Action(e) => gateway_status(e),
        };
        Self::new(status, err.code(), err.to_string())
    }
}

fn gateway_status(err: &GatewayError) -> StatusCode {
    match err {
        GatewayError::Rejected(_) => StatusCode::FORBIDDEN,
        GatewayError::WrongNetwork { .. } | GatewayError::StaleHandle => StatusCode::CONFLICT,
        GatewayError::NoWallet(_) | GatewayError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
        GatewayError::Contract(_) | GatewayError::TransactionFailed(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.error_code.to_string(),
        });
        (self.status, body).into_response()
    }
}
