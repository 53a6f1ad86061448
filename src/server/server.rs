use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::signal;
use tracing::info;

use crate::config::credentials::Credentials;
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::handlers::{token_router, TokenState};
use crate::token::TokenSigner;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub token_state: TokenState,
}

impl AppState {
    pub fn new(
        metrics: &Metrics,
        credentials: Arc<Credentials>,
        signer: Arc<dyn TokenSigner>,
        settings: &SettingsConfig,
    ) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            token_state: TokenState::new(
                credentials,
                signer,
                settings.token.default_expiry_seconds,
            ),
        }
    }
}

/// Token routes plus the metrics route when enabled.
pub fn build_router(state: AppState, settings: &SettingsConfig) -> Router {
    Router::new()
        .merge(state.metrics_state.router(&settings.metrics))
        .merge(token_router())
        .with_state(state)
}

/// Validate credentials, then serve. Nothing is bound when either value is missing.
pub async fn run(
    settings: &SettingsConfig,
    app_id: Option<String>,
    app_certificate: Option<String>,
    signer: Arc<dyn TokenSigner>,
) -> Result<()> {
    let credentials = Credentials::new(app_id, app_certificate)
        .inspect_err(|e| tracing::error!("FATAL ERROR: {}", e))
        .context("check APP_ID and APP_CERTIFICATE")?;
    info!(app_id = %credentials.app_id(), "credentials loaded");

    start(settings, Arc::new(credentials), signer).await
}

/// Bind the configured address and serve until Ctrl+C / SIGTERM.
pub async fn start(
    settings: &SettingsConfig,
    credentials: Arc<Credentials>,
    signer: Arc<dyn TokenSigner>,
) -> Result<()> {
    let metrics = get_metrics().await;
    let state = AppState::new(metrics, credentials, signer, settings);
    let app = build_router(state, settings);

    let bind_addr = settings.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!(addr = %bind_addr, "serving token routes");

    metrics.up.set(1);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;
    metrics.up.set(0);

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
