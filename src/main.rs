// Staked Voting Ledger - Main Entry Point

use std::sync::Arc;
use tracing::{error, info};

use stakevote_ledger::{build_router, AppState, EngineConfig, SharedClock, SystemClock};

#[tokio::main]
async fn main() {
    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt().with_max_level(config.log_level).init();

    info!(
        stake = config.stake_amount,
        admin = %config.admin_address,
        vault = %config.vault_address,
        "starting staked voting ledger"
    );

    let clock: SharedClock = Arc::new(SystemClock);
    let state = match AppState::with_persistence(&config, clock) {
        Ok(state) => state.shared(),
        Err(e) => {
            error!(error = %e, "failed to restore state");
            std::process::exit(1);
        }
    };

    // Clone state for shutdown handler before moving into router
    let shutdown_state = state.clone();
    let app = build_router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    info!(addr = %config.bind_addr, "server running");

    let shutdown = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
        info!("shutdown signal received, saving state");
        let app_state = shutdown_state.lock().await;
        if let Err(e) = app_state.save_to_disk() {
            error!(error = %e, "failed to save state");
        }
    };

    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown).await {
        error!(error = %e, "server error");
    }
}
