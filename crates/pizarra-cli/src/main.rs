//! pizarra: terminal client for shared whiteboard rooms.
//!
//! Lists and creates rooms through the directory service, and follows a
//! room live over the hub connection.

mod cli;
mod commands;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    // Config first: the log level may come from it.
    let loaded = match &args.config {
        Some(path) => pizarra_config::load_config_from(path),
        None => pizarra_config::load_config(),
    };

    let default_directive = loaded
        .as_ref()
        .map(|c| c.logging.level.filter_directive())
        .unwrap_or("pizarra=info");
    let log_directive = args
        .log_level
        .as_deref()
        .map(|level| format!("pizarra={level}"))
        .unwrap_or_else(|| default_directive.to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_directive)),
        )
        .init();

    tracing::info!("pizarra v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Config load failed");
            return ExitCode::FAILURE;
        }
    };

    match commands::run(args, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
