//! Serve command - runs the HTTP API

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use super::{bootstrap, ServeArgs};
use crate::api::create_router;
use crate::config::ServerConfig;

pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = bootstrap();
    apply_overrides(&mut config.server, args);

    let state = crate::create_app_state(&config).await?;
    let app = create_router(state);

    let addr = build_socket_addr(&config.server)?;
    info!("Starting API server on {}", addr);

    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server shutdown complete");
    Ok(())
}

fn apply_overrides(server: &mut ServerConfig, args: ServeArgs) {
    if let Some(host) = args.host {
        server.host = host;
    }

    if let Some(port) = args.port {
        server.port = port;
    }
}

fn build_socket_addr(server: &ServerConfig) -> anyhow::Result<SocketAddr> {
    Ok(SocketAddr::from((
        server.host.parse::<std::net::IpAddr>()?,
        server.port,
    )))
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
