//! sessionward - log in to and out of the auth service from a terminal.
//!
//! The session token lives in the OS keychain; settings restored after
//! login live under the user's data directory.

mod commands;
mod terminal;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use sessionward_core::Config;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Command;

/// Set to any value to also write logs to a daily file
const LOG_FILE_ENV: &str = "SESSIONWARD_LOG_FILE";

/// Overrides the configured auth service URL
const BASE_URL_ENV: &str = "SESSIONWARD_BASE_URL";

const LOG_FILE_PREFIX: &str = "sessionward.log";

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn load_config() -> Config {
    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    if let Ok(url) = std::env::var(BASE_URL_ENV) {
        config.base_url = Some(url);
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let log_dir = std::env::var_os(LOG_FILE_ENV)
        .and_then(|_| Config::data_dir().ok())
        .map(|dir| dir.join("logs"));
    let _log_guard = init_tracing(log_dir);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;

    let mut config = load_config();
    info!(?command, "sessionward starting");

    commands::run(command, &mut config).await
}
