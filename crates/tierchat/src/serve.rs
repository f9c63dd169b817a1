// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tierchat serve` command implementation.
//!
//! Wires the Gemini provider, the in-memory conversation store and the
//! orchestrator into the HTTP gateway, then serves until SIGINT or SIGTERM.

use std::sync::Arc;

use tierchat_agent::Orchestrator;
use tierchat_config::TierchatConfig;
use tierchat_core::TierchatError;
use tierchat_gateway::{AppState, start_server};
use tierchat_gemini::GeminiProvider;
use tierchat_store::InMemoryStore;
use tracing::{info, warn};

/// Runs the gateway. A missing API key is fatal here.
pub async fn run_serve(config: TierchatConfig) -> Result<(), TierchatError> {
    init_tracing(&config.agent.log_level);

    let provider = GeminiProvider::new(&config.gemini)?;
    let store = Arc::new(InMemoryStore::new(config.conversation.max_total_messages));
    let orchestrator = Arc::new(Orchestrator::new(&config, store, Arc::new(provider)));

    info!(
        policy = ?config.routing.policy,
        timeout_secs = config.orchestrator.timeout_secs,
        max_total_messages = config.conversation.max_total_messages,
        "orchestrator ready"
    );

    start_server(
        &config.gateway.host,
        config.gateway.port,
        AppState::new(orchestrator),
        shutdown_signal(),
    )
    .await?;

    info!("tierchat serve shutdown complete");
    Ok(())
}

/// Resolves on SIGINT (Ctrl+C) or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
        _ = terminate => info!("received SIGTERM, initiating shutdown"),
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides `agent.log_level`.
pub(crate) fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            EnvFilter::new(format!("tierchat={log_level},tower_http={log_level},warn"))
        });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
