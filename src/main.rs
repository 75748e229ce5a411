// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process::ExitCode, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use decryptox_dapp::{
    api::router,
    blockchain::EvmGateway,
    config::AppConfig,
    session::SessionController,
    state::AppState,
    telemetry::init_tracing,
};

const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> ExitCode {
    // Required variables are checked before anything else starts.
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_format);

    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("A rustls crypto provider was already installed");
    }

    info!(
        network = config.network.name,
        chain_id = config.network.chain_id,
        contract = %config.contract_address,
        wallet = ?config.wallet,
        "Starting DecryptoX dApp service"
    );

    let gateway = Arc::new(EvmGateway::new(&config));
    let (controller, events) = SessionController::new(gateway);

    let shutdown = CancellationToken::new();
    let event_loop = tokio::spawn(controller.clone().run(events, shutdown.clone()));

    match controller.restore().await {
        Ok(true) => info!("Cached wallet connection restored"),
        Ok(false) => {}
        Err(e) => warn!(error = %e, "Cached wallet connection could not be restored"),
    }

    let app = router(AppState::new(controller, config.network.clone()));

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone(), shutdown.clone()));

    let addr = config.bind_addr;
    let served = match &config.tls {
        Some(tls) => {
            let tls_config = match RustlsConfig::from_pem_file(&tls.cert, &tls.key).await {
                Ok(tls_config) => tls_config,
                Err(e) => {
                    error!(error = %e, cert = %tls.cert.display(), "Failed to load TLS credentials");
                    return ExitCode::FAILURE;
                }
            };
            info!("Listening on https://{addr} (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
        None => {
            info!("Listening on http://{addr} (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
        }
    };

    shutdown.cancel();
    let _ = event_loop.await;

    match served {
        Ok(()) => {
            info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal(handle: Handle<std::net::SocketAddr>, shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
    shutdown.cancel();
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}
