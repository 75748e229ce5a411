// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet connector: resolves the configured key material into a signer.
//!
//! Signing itself is done by alloy's `PrivateKeySigner`; this module only
//! locates and decodes the key.

use alloy::signers::local::PrivateKeySigner;
use k256::{ecdsa::SigningKey, pkcs8::DecodePrivateKey, SecretKey};

use super::gateway::GatewayError;
use crate::config::WalletSource;

/// Create a signer from a hex private key (with or without `0x`).
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, GatewayError> {
    let trimmed = private_key_hex.trim();
    let key = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let key_bytes = alloy::hex::decode(key)
        .map_err(|e| GatewayError::NoWallet(format!("Invalid private key: {}", e)))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| GatewayError::NoWallet(format!("Invalid private key: {}", e)))
}

/// Create a signer from a PEM-encoded key, SEC1 (`EC PRIVATE KEY`) or
/// PKCS#8 (`PRIVATE KEY`).
pub fn signer_from_pem(pem_bytes: &[u8]) -> Result<PrivateKeySigner, GatewayError> {
    let pem = std::str::from_utf8(pem_bytes)
        .map_err(|e| GatewayError::NoWallet(format!("Invalid UTF-8 in key file: {}", e)))?;

    let secret = SecretKey::from_sec1_pem(pem)
        .or_else(|_| SecretKey::from_pkcs8_pem(pem))
        .map_err(|e| GatewayError::NoWallet(format!("Invalid key format: {}", e)))?;

    Ok(PrivateKeySigner::from_signing_key(SigningKey::from(secret)))
}

/// Resolve the configured wallet source into a signer.
///
/// A missing key is reported the same way a browser reports a missing
/// injected wallet.
pub async fn load_signer(source: &WalletSource) -> Result<PrivateKeySigner, GatewayError> {
    match source {
        WalletSource::None => Err(GatewayError::NoWallet(
            "No wallet configured; set WALLET_KEY_PATH or WALLET_PRIVATE_KEY".to_string(),
        )),
        WalletSource::PrivateKey(hex) => signer_from_hex(hex),
        WalletSource::PemFile(path) => {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                GatewayError::NoWallet(format!("Cannot read {}: {}", path.display(), e))
            })?;
            signer_from_pem(&bytes)
        }
    }
}
