//! procpause CLI
//!
//! Finds a running process by name, suspends it for a fixed window, then
//! resumes it. Useful for knocking a game client out of its online session
//! without closing it.

mod commands;
mod config;
mod display;
mod error;
mod interactive;
#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use procpause::{ProcessLocator, SystemProcessTable, TaskRunner};
use signal_hook_tokio::Signals;
use tracing::{debug, info};

use crate::commands::{TERMINATION_SIGNALS, exit_status};
use crate::config::Config;
use crate::display::display_event;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    /// (default: `$XDG_CONFIG_HOME/procpause/config.toml`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Suspend the first matching process for the pause window, then resume it
    Pause {
        /// Case-insensitive process name substring (default: configured target)
        query: Option<String>,

        /// Seconds to keep the process suspended
        #[arg(long)]
        pause_secs: Option<u64>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List running processes matching a query, in the order they are tried
    List {
        /// Case-insensitive process name substring (default: configured target)
        query: Option<String>,

        /// Print the matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Press Enter to pause the target, repeatedly (default)
    Interactive {
        /// Case-insensitive process name substring (default: configured target)
        query: Option<String>,

        /// Seconds to keep the process suspended
        #[arg(long)]
        pause_secs: Option<u64>,
    },
}

/// Initializes structured logging with tracing.
///
/// Supports two output formats via `PROCPAUSE_LOG_FORMAT` environment variable:
/// - `json`: Machine-readable JSON logs
/// - `pretty`: Human-readable formatted logs (default)
///
/// Log level is controlled via `RUST_LOG` environment variable. Logs go to
/// stderr so command output on stdout stays parseable.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let format = std::env::var("PROCPAUSE_LOG_FORMAT")
        .unwrap_or_else(|_| "pretty".to_string())
        .to_lowercase();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("procpause=info,procpause_cli=info"));

    match format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .init();
        }
        _ => {
            fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();

    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).with_context(|| {
        format!(
            "Failed to load configuration (expected at {:?})",
            args.config.clone().or_else(|| Config::config_path().ok())
        )
    })?;
    debug!(?config, "Loaded configuration");

    let table = Arc::new(SystemProcessTable::new());

    let command = args.command.unwrap_or(Command::Interactive {
        query: None,
        pause_secs: None,
    });

    match command {
        Command::List { query, json } => {
            let (query, _) = config.resolve(query.as_deref(), None)?;
            commands::list(ProcessLocator::new(table), query, json).await
        }
        Command::Pause {
            query,
            pause_secs,
            json,
        } => {
            let (query, pause) = config.resolve(query.as_deref(), pause_secs)?;
            let mut signals = Signals::new(TERMINATION_SIGNALS)?;

            let mut runner = TaskRunner::new(table, pause);
            if !json {
                runner = runner.with_event_callback(|event| display_event(&event));
            }

            info!(%query, %pause, "Pausing target");
            let outcome = commands::pause_once(&runner, query, &mut signals, json).await;
            signals.handle().close();
            Ok(ExitCode::from(exit_status(&outcome?)))
        }
        Command::Interactive { query, pause_secs } => {
            let (query, pause) = config.resolve(query.as_deref(), pause_secs)?;
            let mut signals = Signals::new(TERMINATION_SIGNALS)?;
            let (inputs, console) = interactive::spawn_prompt().await?;

            let printer = console.clone();
            let runner = TaskRunner::new(table, pause)
                .with_event_callback(move |event| printer.event(&event));

            interactive::run(&runner, &query, inputs, &mut signals, &console).await?;
            signals.handle().close();

            info!("Goodbye");
            Ok(ExitCode::SUCCESS)
        }
    }
}
