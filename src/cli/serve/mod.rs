//! Serve command - runs the HTTP API

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::api::{create_router, AppState};
use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::observability::init_metrics;
use crate::infrastructure::services::{Engine, QualityService};

/// Arguments for the serve command
#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    /// Port to listen on (overrides config)
    #[arg(long)]
    pub port: Option<u16>,
}

/// Run the API server
pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_logging(&config.logging);
    config.validate().context("Invalid configuration")?;

    let service = Arc::new(QualityService::uninitialized());
    load_engine(&config, &service).await;

    let metrics = init_metrics(&config.metrics);
    let app = create_router(AppState::new(service), &config, metrics);

    let addr = build_socket_addr(&config)?;
    info!("Starting API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server shutdown complete");

    Ok(())
}

/// A failed load leaves the service uninitialized; `/ready` reports it
async fn load_engine(config: &AppConfig, service: &QualityService) {
    let load_config = config.clone();

    match tokio::task::spawn_blocking(move || Engine::load(&load_config)).await {
        Ok(Ok(engine)) => {
            if let Err(e) = service.initialize(engine) {
                error!(error = %e, "Failed to install engine");
            }
        }
        Ok(Err(e)) => {
            error!(
                error = %e,
                model = %config.model.path.display(),
                dataset = %config.dataset.path.display(),
                "Engine failed to load; serving in uninitialized state"
            );
        }
        Err(e) => error!(error = %e, "Engine load task aborted"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

fn build_socket_addr(config: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .with_context(|| format!("Invalid server.host '{}'", config.server.host))?,
        config.server.port,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_socket_addr() {
        let config = AppConfig::default();
        let addr = build_socket_addr(&config).unwrap();
        assert_eq!(addr.port(), 8080);

        let mut config = AppConfig::default();
        config.server.host = "not-an-ip".to_string();
        assert!(build_socket_addr(&config).is_err());
    }

    #[tokio::test]
    async fn test_missing_artifacts_leave_service_uninitialized() {
        let mut config = AppConfig::default();
        config.model.path = "does/not/exist.json".into();

        let service = QualityService::uninitialized();
        load_engine(&config, &service).await;

        assert_eq!(
            service.state(),
            crate::infrastructure::services::ServiceState::Uninitialized
        );
    }
}
