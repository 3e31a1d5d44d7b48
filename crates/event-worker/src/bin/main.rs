//! Event Worker entry point
//!
//! # Exit Codes
//!
//! - 0: stopped cleanly
//! - 1: queue store unreachable at startup, or the loop failed

use clap::{Parser, Subcommand};
use event_worker::{
    shutdown, OutputLog, RedisQueue, WorkQueue, Worker, WorkerConfig, WorkerSettings,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "event-worker")]
#[command(about = "Event Worker - drains the shared work queue")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the worker loop until interrupted
    Run(WorkerConfig),

    /// Push items onto the work queue
    Enqueue {
        #[command(flatten)]
        config: WorkerConfig,

        /// Items to push, in order
        #[arg(required = true)]
        items: Vec<String>,
    },

    /// Check connectivity to the queue store
    Ping(WorkerConfig),
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
        Commands::Run(config) => {
            config.validate()?;
            let queue = connect_or_exit(&config).await;
            let output = OutputLog::new(&config.output_dir);
            let worker = Worker::new(
                config.worker_name.clone(),
                queue,
                output,
                WorkerSettings::from(&config),
            );

            let shutdown_rx = shutdown::shutdown_on(shutdown::shutdown_signal());

            match worker.run(shutdown_rx).await {
                Ok(stats) => {
                    tracing::info!(
                        worker = %config.worker_name,
                        polls = stats.polls,
                        processed = stats.processed,
                        heartbeats = stats.heartbeats,
                        "Worker exiting"
                    );
                }
                Err(e) => {
                    tracing::error!(worker = %config.worker_name, "Worker loop failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Enqueue { config, items } => {
            let queue = connect_or_exit(&config).await;
            for item in &items {
                let len = queue.push(item).await?;
                tracing::info!(queue = %queue.key(), item = %item, len, "Enqueued");
            }
        }

        Commands::Ping(config) => {
            connect_or_exit(&config).await;
            println!("PONG");
        }
    }

    Ok(())
}

/// Startup connectivity check; failure ends the process
async fn connect_or_exit(config: &WorkerConfig) -> RedisQueue {
    tracing::info!(
        worker = %config.worker_name,
        "Connecting to Redis at {}:{}",
        config.redis_host,
        config.redis_port
    );

    match RedisQueue::connect(config).await {
        Ok(queue) => {
            tracing::info!(worker = %config.worker_name, "Connected to Redis successfully");
            queue
        }
        Err(e) => {
            tracing::error!(worker = %config.worker_name, "Failed to connect to Redis: {}", e);
            std::process::exit(1);
        }
    }
}
