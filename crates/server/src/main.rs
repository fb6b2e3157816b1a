mod config;
mod http;
mod state;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use config::Settings;
use http::router::build_router;
use moderation::{Analyzer, OpenAiAnalyzer, OpenAiSettings, RuleAnalyzer};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = Settings::new().context("Failed to load configuration")?;

    let store = storage::connect(&settings.storage)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect storage backend: {}", e))?;

    // 配了 API key 就用外部分析服务, 否则退回本地规则打分
    let analyzer: Arc<dyn Analyzer> = if settings.moderation.api_key.is_empty() {
        info!("Moderation: using the rule-based analyzer");
        Arc::new(RuleAnalyzer::default())
    } else {
        info!(model = %settings.moderation.model, "Moderation: using the external analyzer");
        Arc::new(
            OpenAiAnalyzer::new(OpenAiSettings {
                api_key: settings.moderation.api_key.clone(),
                model: settings.moderation.model.clone(),
                endpoint: settings.moderation.endpoint.clone(),
                timeout: Duration::from_secs(settings.moderation.timeout_secs),
            })
            .map_err(|e| anyhow::anyhow!("Failed to build external analyzer: {}", e))?,
        )
    };

    let state = AppState {
        store,
        analyzer,
        request_timeout: Duration::from_secs(settings.server.request_timeout_secs),
    };

    let app = build_router(state, &settings.server.cors_origins);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
