//! Thin CLI front-end over `gce-core`: open a store, build (or reuse) its
//! graph, and either print the sanitized JSON to stdout or serve it over
//! a single `axum` route.

mod config;
mod serve;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gce_core::{GraphCache, Sanitize};

#[derive(Parser)]
#[command(name = "gce", version, about = "Graph Construction Engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the graph once and print the sanitized JSON response to stdout.
    Dump {
        /// Path to the SQLite intelligence store.
        #[arg(long)]
        store: PathBuf,
        /// Cosine-similarity cutoff for semantic edges (overrides
        /// `GCE_SIMILARITY_THRESHOLD`, default 0.55).
        #[arg(long)]
        threshold: Option<f32>,
        /// Bypass the cache and force a rebuild even if the store's mtime
        /// and threshold match the last build.
        #[arg(long)]
        refresh: bool,
    },
    /// Serve the graph over `GET /graph` (optionally `?refresh`/`?threshold=`).
    Serve {
        #[arg(long)]
        store: PathBuf,
        /// Listen address, default `127.0.0.1:8777`.
        #[arg(long)]
        addr: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Dump { store, threshold, refresh } => {
            let config = config::resolve_config(threshold);
            let cache = GraphCache::new(store);
            if refresh {
                cache.invalidate();
            }
            match cache.get_or_build(&config) {
                Ok(response) => {
                    let value = serde_json::to_value(&*response).expect("GraphResponse always serializes");
                    let sanitized = value.sanitize();
                    match serde_json::to_writer_pretty(std::io::stdout(), &sanitized) {
                        Ok(()) => {
                            println!();
                            ExitCode::SUCCESS
                        }
                        Err(e) => {
                            error!("failed to write graph JSON: {e}");
                            ExitCode::FAILURE
                        }
                    }
                }
                Err(e) => {
                    error!("failed to build graph: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Serve { store, addr } => {
            let addr = addr.unwrap_or_else(|| "127.0.0.1:8777".to_string());
            let config = config::resolve_config(None);
            info!(%addr, store = %store.display(), "starting gce server");
            match serve::run(store, config, &addr).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!("server error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
