//! scribe-api server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scribe_api::{app, ApiConfig, AppState};
use scribe_inference::{Analyzer, DeepSeekBackend};
use scribe_store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading any configuration.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scribe_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(ApiConfig::from_env());

    // A missing credential disables the analyzer rather than failing startup.
    let analyzer = match DeepSeekBackend::from_env() {
        Ok(backend) => Some(Arc::new(Analyzer::new(Arc::new(backend)))),
        Err(err) => {
            warn!(error = %err, "analyzer disabled");
            None
        }
    };

    info!(
        deepseek = analyzer.is_some(),
        notion = config.notion_configured(),
        oauth = config.oauth.is_some(),
        "feature availability"
    );

    let state = AppState {
        store: Store::in_memory(),
        analyzer,
        config: config.clone(),
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(%addr, "scribe-api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
