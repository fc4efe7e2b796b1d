use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use geography_frontend::{
    Aggregator, Config,
    clients::{HttpCodeListClient, HttpDatasetClient, HttpRenderClient},
    handlers::{AppState, PageSettings, create_router},
    health::{HealthCheck, VersionInfo},
    server,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| config.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(?config, "config on startup");

    let api_router_version = config
        .api_router_version()
        .context("invalid API router URL")?;

    // Upstream clients
    let code_lists = Arc::new(
        HttpCodeListClient::new(&config.effective_code_list_api_url(), config.request_timeout())
            .context("failed to create code-list API client")?,
    );
    let datasets = Arc::new(
        HttpDatasetClient::new(&config.effective_dataset_api_url(), config.request_timeout())
            .context("failed to create dataset API client")?,
    );
    let renderer = Arc::new(
        HttpRenderClient::new(&config.renderer_url, config.request_timeout())
            .context("failed to create renderer client")?,
    );

    let mut health = HealthCheck::new(
        VersionInfo::from_build(),
        config.health_check_critical_timeout(),
        config.health_check_interval(),
    );
    health.add_check("code-list API", code_lists.clone());
    health.add_check("dataset API", datasets.clone());
    health.add_check("frontend renderer", renderer.clone());
    let health = Arc::new(health);

    let state = AppState {
        code_lists,
        datasets,
        renderer,
        health: health.clone(),
        aggregator: Aggregator::new(config.max_fan_out),
        settings: PageSettings {
            api_router_version,
            taxonomy_domain: config.taxonomy_domain.clone(),
            enable_loop11: config.enable_loop11,
        },
    };

    let app = create_router(state);
    let health_task = health.start();

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Starting geography frontend on {}", config.bind_addr);

    // Health checks depend on everything else, so they stop first.
    let health_abort = health_task.abort_handle();
    let shutdown = async move {
        shutdown_signal().await;
        health_abort.abort();
    };

    let result = server::run(listener, app, shutdown, config.graceful_shutdown_timeout()).await;
    health_task.abort();
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("quitting after SIGINT received"),
        _ = terminate => tracing::info!("quitting after SIGTERM received"),
    }
}
