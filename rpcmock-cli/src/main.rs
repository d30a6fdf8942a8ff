//! rpcmock CLI - Command-line tools for capture logs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rpcmock_core::document::Document;
use rpcmock_core::replay::{MatchIndex, Replayer};
use rpcmock_core::rpc::{CallContext, MockServer, ServiceMethod};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "rpcmock")]
#[command(about = "Inspect and dry-run rpcmock capture logs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every service/method in a log with its record count
    Inspect {
        /// Capture log
        #[arg(env = "RPCMOCK_REPLAY__LOG_PATH")]
        log: PathBuf,
    },
    /// Check that a log loads without errors
    Check {
        /// Capture log
        #[arg(env = "RPCMOCK_REPLAY__LOG_PATH")]
        log: PathBuf,
    },
    /// Match a request against a log and print the replayed result
    Match {
        /// Capture log
        #[arg(env = "RPCMOCK_REPLAY__LOG_PATH")]
        log: PathBuf,
        /// Full method path, e.g. /example.ExampleService/Echo
        #[arg(short, long)]
        method: String,
        /// Request as JSON
        #[arg(short, long, default_value = "{}")]
        request: String,
    },
    /// Version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("rpcmock {}", env!("CARGO_PKG_VERSION"));
            println!("rpcmock-core {}", rpcmock_core::VERSION);
        }
        Commands::Inspect { log } => {
            let index = load(&log)?;
            for key in index.keys() {
                let candidates = index.candidates(key).unwrap_or_default();
                let failures = candidates.iter().filter(|c| c.record.is_failure()).count();
                let wildcards = candidates.iter().filter(|c| c.record.is_wildcard()).count();
                println!(
                    "{}\t{} records\t{} errors\t{} wildcards",
                    key,
                    candidates.len(),
                    failures,
                    wildcards
                );
            }
            println!("{} records across {} keys", index.len(), index.key_count());
        }
        Commands::Check { log } => {
            let index = load(&log)?;
            println!("ok: {} records across {} keys", index.len(), index.key_count());
        }
        Commands::Match {
            log,
            method,
            request,
        } => {
            let replayer = Replayer::new(load(&log)?);
            let target = ServiceMethod::parse(&method);
            if target.is_unparsable() {
                tracing::warn!(method = %method, "method path did not parse, using error/error");
            }

            let result = replayer
                .serve(
                    &CallContext::new(),
                    target.service(),
                    target.method(),
                    request.as_bytes(),
                )
                .await;
            match result {
                Ok(response) => {
                    let response = Document::from_slice(&response)?;
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                Err(e) => anyhow::bail!("{}: {}", target, e),
            }
        }
    }

    Ok(())
}

fn load(log: &Path) -> Result<MatchIndex> {
    MatchIndex::load(log).with_context(|| format!("failed to load {}", log.display()))
}
