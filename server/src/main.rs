use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use brainblog_core::api::v1::{self, ApiState};
use brainblog_core::config::{ProviderConfig, ProviderFamily};
use brainblog_core::generate::GenerationEngine;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    brainblog_core::logging::init();

    let config = ProviderConfig::from_env();
    match config.active_family() {
        ProviderFamily::HuggingFace => tracing::info!("AI provider family: Hugging Face"),
        ProviderFamily::OpenAi => tracing::info!("AI provider family: OpenAI"),
        ProviderFamily::None => tracing::warn!(
            "no AI provider credential configured; generation endpoints will return 503"
        ),
    }

    let engine = GenerationEngine::new(&config)?;
    let app = v1::router(ApiState {
        engine: Arc::new(engine),
    })
    .layer(TraceLayer::new_for_http())
    .layer(TimeoutLayer::new(Duration::from_secs(120)))
    .layer(cors_layer());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(5000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "brainblog AI pipeline listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Resolve when the process is asked to stop, letting in-flight generation
/// requests drain before the listener closes.
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            tracing::error!("failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    tracing::info!("shutdown signal received, draining connections");
}

fn cors_layer() -> CorsLayer {
    let methods = [Method::GET, Method::POST];
    match std::env::var("CLIENT_URL")
        .ok()
        .and_then(|origin| origin.parse::<HeaderValue>().ok())
    {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any),
    }
}
