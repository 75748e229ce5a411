// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! [`AppConfig`] loaded from the environment at startup. Required variables
//! are validated eagerly: a missing one aborts startup with the full list of
//! missing names.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `INFURA_ID` | Infura project id used to derive the RPC endpoint | Required |
//! | `CONTRACT_ADDRESS` | Deployed DCRX token sale contract | Required |
//! | `CHAIN_ID` | Chain the wallet must be connected to | Required |
//! | `RPC_URL` | Explicit RPC endpoint, overrides the Infura URL | Derived |
//! | `EXPLORER_URL` | Block explorer base URL | Etherscan for the chain |
//! | `WALLET_KEY_PATH` | PEM-encoded secp256k1 wallet key | Optional |
//! | `WALLET_PRIVATE_KEY` | Hex-encoded wallet key | Optional |
//! | `AUTO_CONNECT` | Reconnect the cached wallet at startup | `false` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` | PEM certificate chain; enables HTTPS with `TLS_KEY_PATH` | Optional |
//! | `TLS_KEY_PATH` | PEM private key for HTTPS | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use alloy::primitives::Address;

use crate::blockchain::types::{infura_network_slug, NetworkConfig};

/// Infura project identifier.
pub const INFURA_ID_ENV: &str = "INFURA_ID";

/// Address of the deployed DCRX contract.
pub const CONTRACT_ADDRESS_ENV: &str = "CONTRACT_ADDRESS";

/// Target chain id. Connections to any other chain are refused.
pub const CHAIN_ID_ENV: &str = "CHAIN_ID";

pub const RPC_URL_ENV: &str = "RPC_URL";
pub const EXPLORER_URL_ENV: &str = "EXPLORER_URL";
pub const WALLET_KEY_PATH_ENV: &str = "WALLET_KEY_PATH";
pub const WALLET_PRIVATE_KEY_ENV: &str = "WALLET_PRIVATE_KEY";
pub const AUTO_CONNECT_ENV: &str = "AUTO_CONNECT";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Variables that must be present (and non-empty) for the service to start.
pub const REQUIRED_ENV: [&str; 3] = [INFURA_ID_ENV, CONTRACT_ADDRESS_ENV, CHAIN_ID_ENV];

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Where the wallet connector loads its signing key from.
#[derive(Clone, PartialEq, Eq)]
pub enum WalletSource {
    /// No key configured. Connecting fails with a "no wallet" error.
    None,
    /// PEM file on disk (SEC1 or PKCS#8).
    PemFile(PathBuf),
    /// Hex-encoded private key, with or without `0x`.
    PrivateKey(String),
}

impl fmt::Debug for WalletSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletSource::None => f.write_str("None"),
            WalletSource::PemFile(path) => f.debug_tuple("PemFile").field(path).finish(),
            WalletSource::PrivateKey(_) => f.write_str("PrivateKey(<redacted>)"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// TLS certificate and key locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Fully validated application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub contract_address: Address,
    pub wallet: WalletSource,
    pub auto_connect: bool,
    pub bind_addr: SocketAddr,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
}

/// Configuration errors. These are fatal at startup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<&'static str> = REQUIRED_ENV
            .iter()
            .copied()
            .filter(|name| get(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let infura_id = get(INFURA_ID_ENV).unwrap_or_default();
        let contract_address = parse_var::<Address>(CONTRACT_ADDRESS_ENV, get(CONTRACT_ADDRESS_ENV))?;
        let chain_id = parse_var::<u64>(CHAIN_ID_ENV, get(CHAIN_ID_ENV))?;

        let rpc_url = match get(RPC_URL_ENV) {
            Some(url) => url,
            None => {
                let slug = infura_network_slug(chain_id).ok_or_else(|| ConfigError::Invalid {
                    name: CHAIN_ID_ENV,
                    reason: format!(
                        "no Infura endpoint known for chain {chain_id}; set {RPC_URL_ENV}"
                    ),
                })?;
                format!("https://{slug}.infura.io/v3/{infura_id}")
            }
        };
        url::Url::parse(&rpc_url).map_err(|e| ConfigError::Invalid {
            name: RPC_URL_ENV,
            reason: e.to_string(),
        })?;

        let mut network = NetworkConfig::for_chain(chain_id, rpc_url);
        if let Some(explorer) = get(EXPLORER_URL_ENV) {
            network.explorer_url = explorer.trim_end_matches('/').to_string();
        }

        let wallet = match (get(WALLET_KEY_PATH_ENV), get(WALLET_PRIVATE_KEY_ENV)) {
            (Some(path), _) => WalletSource::PemFile(PathBuf::from(path)),
            (None, Some(key)) => WalletSource::PrivateKey(key),
            (None, None) => WalletSource::None,
        };

        let auto_connect = match get(AUTO_CONNECT_ENV) {
            Some(raw) => parse_flag(AUTO_CONNECT_ENV, &raw)?,
            None => false,
        };

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get(PORT_ENV) {
            Some(raw) => parse_var::<u16>(PORT_ENV, Some(raw))?,
            None => DEFAULT_PORT,
        };
        let bind_addr: SocketAddr =
            format!("{host}:{port}")
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                    name: HOST_ENV,
                    reason: e.to_string(),
                })?;

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: PathBuf::from(cert),
                key: PathBuf::from(key),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(vec![TLS_KEY_PATH_ENV])),
            (None, Some(_)) => return Err(ConfigError::Missing(vec![TLS_CERT_PATH_ENV])),
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: LOG_FORMAT_ENV,
                    reason: format!("expected `json` or `pretty`, got `{other}`"),
                })
            }
        };

        Ok(Self {
            network,
            contract_address,
            wallet,
            auto_connect,
            bind_addr,
            tls,
            log_format,
        })
    }
}

fn parse_var<T>(name: &'static str, raw: Option<String>) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    let raw = raw.ok_or(ConfigError::Missing(vec![name]))?;
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("expected a boolean, got `{other}`"),
        }),
    }
}
