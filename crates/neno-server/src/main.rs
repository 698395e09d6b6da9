//! Neno Gateway - HTTP front door for Bedrock-style text generation

use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod error;
mod state;

use neno_core::GatewayConfig;
use state::AppState;

#[derive(Debug, Parser)]
#[command(
    name = "neno-server",
    about = "HTTP API gateway for Bedrock-style text generation",
    version = env!("CARGO_PKG_VERSION")
)]
struct ServerArgs {
    /// Host to bind to
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct BindConfig {
    host: String,
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neno_server=info,neno_core=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Neno Gateway");

    // A misconfigured deployment must fail here, before the listener binds,
    // rather than answer requests with best-effort values.
    let config = GatewayConfig::from_env()?;
    info!(
        model_id = %config.model_id,
        endpoint = %config.endpoint,
        "Gateway configuration loaded"
    );

    let state = AppState::new(config)?;

    // Build router
    let app = api::create_router(state.clone());

    // Start server
    let bind = resolve_bind_config(args);
    let addr = format!("{}:{}", bind.host, bind.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    info!("Server ready. Press Ctrl+C to stop.");
    server.await?;

    Ok(())
}

fn resolve_bind_config(args: ServerArgs) -> BindConfig {
    BindConfig {
        host: args.host.unwrap_or_else(host_from_env_or_default),
        port: args.port.unwrap_or_else(port_from_env_or_default),
    }
}

fn host_from_env_or_default() -> String {
    match std::env::var("NENO_HOST") {
        Ok(raw) => {
            let host = raw.trim();
            if host.is_empty() {
                warn!("Empty NENO_HOST, falling back to 0.0.0.0");
                "0.0.0.0".to_string()
            } else {
                host.to_string()
            }
        }
        Err(_) => "0.0.0.0".to_string(),
    }
}

fn port_from_env_or_default() -> u16 {
    match std::env::var("NENO_PORT") {
        Ok(raw) => match raw.trim().parse::<u16>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!("Invalid NENO_PORT='{}', falling back to 8080", raw);
                8080
            }
        },
        Err(_) => 8080,
    }
}

/// Wait for a shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        },
    }
}
