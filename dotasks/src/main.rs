//! `doTasks`: single-list task keeper.
//!
//! Reads one intent per line from stdin and prints the list after each
//! change. The list is stored as JSON in the data directory and written a
//! moment after the last structural change. Configuration via CLI flags,
//! environment variables, or config file (`~/.config/dotasks/config.toml`).
//!
//! ```bash
//! cargo run --bin dotasks -- --seed-examples
//!
//! # Keep the list somewhere else, dark theme
//! DOTASKS_DATA_DIR=/tmp/lists cargo run --bin dotasks -- --appearance dark
//! ```

use std::io;
use std::path::Path;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_appender::non_blocking::WorkerGuard;

use dotasks::app::{App, Outcome};
use dotasks::config::{AppConfig, CliArgs};
use dotasks::intent::Intent;
use dotasks::persist::JsonFileStorage;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > config file > env > defaults).
    let config = match AppConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            AppConfig::default()
        }
    };

    // Logs go to a file; stdout belongs to the console.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(path = %config.document_path().display(), "dotasks starting");

    let storage = JsonFileStorage::in_dir(&config.data_dir, &config.file_name);
    let (app, warnings) = App::launch(storage, &config).await;

    let result = run_console(app, warnings).await;

    tracing::info!("dotasks exiting");
    result
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("dotasks.log");
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

/// Line loop: apply intents from stdin, surface persistence warnings.
///
/// End of input behaves like `quit`.
async fn run_console(
    mut app: App,
    mut warnings: tokio::sync::mpsc::Receiver<dotasks::persist::PersistWarning>,
) -> io::Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    write_out(&mut stdout, &app.render()).await?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "stdin read failed");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                let output = match line.parse::<Intent>() {
                    Ok(intent) => match app.apply(intent).await {
                        Outcome::Render => app.render(),
                        Outcome::Message(message) => format!("{message}\n"),
                        Outcome::Quit => break,
                    },
                    Err(e) => format!("{e} (try `help`)\n"),
                };
                write_out(&mut stdout, &output).await?;
            }
            Some(warning) = warnings.recv() => {
                write_out(&mut stdout, &format!("warning: {warning}\n")).await?;
            }
        }
    }

    app.shutdown().await;
    Ok(())
}

async fn write_out(stdout: &mut tokio::io::Stdout, text: &str) -> io::Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await
}
