//! `taskboard`: sync a board into memory and print its summary.
//!
//! Seeds an in-memory store from a JSON board export, connects a board to
//! it, waits for the initial sync and prints the summary, the columns and
//! the contact list. Configuration via CLI flags, environment variables, or
//! config file (`~/.config/taskboard/config.toml`).
//!
//! ```bash
//! cargo run --bin taskboard -- --seed demos/seed.json
//! cargo run --bin taskboard -- --seed demos/seed.json --search login --json
//! ```

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use taskboard::board::Board;
use taskboard::config::{CliArgs, ClientConfig};
use taskboard::gateway::memory::MemoryGateway;
use taskboard::report::Report;
use taskboard::seed::SeedFile;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = ClientConfig::load(&cli)?;

    // Logs go to a file so stdout carries only the report.
    let _log_guard = init_logging(&config.log_level, config.log_file.as_deref());

    tracing::info!("taskboard starting");

    let gateway = Arc::new(MemoryGateway::new());
    if let Some(path) = &config.seed {
        SeedFile::load(path)?.install(&gateway)?;
    }

    let board = Board::connect(Arc::clone(&gateway), config.to_board_settings()).await?;
    board.ready().await;

    let report = Report::build(
        &board.tasks().current_snapshot(),
        &board.contacts().current_snapshot(),
        config.search.as_deref(),
    );
    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }

    tracing::info!("taskboard exiting");
    Ok(())
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskboard.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}
