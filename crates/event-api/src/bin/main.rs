//! Event API entry point
//!
//! Serves the probe endpoints, or probes a running instance the way the
//! orchestrator would.

use clap::{Parser, Subcommand};
use event_api::{create_router, ApiConfig, AppState, ProbeClient, ProbeKind};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "event-api")]
#[command(about = "Event API - liveness, readiness and startup probes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve(ApiConfig),

    /// Probe a running instance; exits 1 when the probe fails
    Probe {
        /// Base URL of the instance
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,

        /// Probe to run
        #[arg(short, long, value_enum, default_value = "liveness")]
        kind: ProbeKind,

        /// Timeout in milliseconds
        #[arg(long, default_value = "1000")]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(config) => {
            let addr = config.bind_addr()?;
            let state = Arc::new(AppState::from_config(&config)?);
            let router = create_router(state);

            tracing::info!(
                service = %config.service_name,
                startup_delay_secs = config.startup_delay_secs,
                "Starting Event API on {}",
                addr
            );

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            tracing::info!("Event API stopped");
        }

        Commands::Probe { url, kind, timeout } => {
            let client = ProbeClient::new(url).with_timeout(Duration::from_millis(timeout));

            match client.probe(kind).await {
                Ok(outcome) => {
                    println!("{}", serde_json::to_string(&outcome)?);
                    if !outcome.passed {
                        std::process::exit(1);
                    }
                }
                Err(e) => {
                    eprintln!("Probe failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received");
}
