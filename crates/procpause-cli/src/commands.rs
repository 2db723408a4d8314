//! Command implementations for the CLI.

use std::process::ExitCode;

use anyhow::{Context, Result};
use futures::{Stream, StreamExt};
use procpause::{LifecycleOutcome, OutcomeKind, ProcessLocator, ProcessQuery, TaskRunner};
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use tracing::{info, warn};

use crate::display::{display_matches, display_matches_json, display_outcome, display_outcome_json};

/// Signals that end the program. Each one cancels a running cycle and waits
/// for the target to be resumed instead of killing us outright.
pub const TERMINATION_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGHUP, SIGQUIT];

/// Exit status when nothing matched the query.
pub const EXIT_NOT_RUNNING: u8 = 2;

/// Maps an outcome to the process exit status.
pub const fn exit_status(outcome: &LifecycleOutcome) -> u8 {
    match outcome.kind() {
        OutcomeKind::Success => 0,
        OutcomeKind::NotRunning => EXIT_NOT_RUNNING,
        OutcomeKind::CycleFailed | OutcomeKind::Degraded => 1,
    }
}

/// Runs a single cycle and waits for its outcome.
///
/// A termination signal while the target is stopped cancels the wait; the
/// target is resumed before we exit.
pub async fn pause_once<S>(
    runner: &TaskRunner,
    query: ProcessQuery,
    signals: &mut S,
    json: bool,
) -> Result<LifecycleOutcome>
where
    S: Stream<Item = i32> + Unpin,
{
    let ticket = runner.start(query).context("Failed to start pause cycle")?;
    let outcome = ticket.outcome();
    tokio::pin!(outcome);

    let outcome = loop {
        tokio::select! {
            result = &mut outcome => break result?,
            Some(signal) = signals.next() => {
                info!(signal, "Received termination signal, resuming target early");
                if !runner.cancel() {
                    warn!("No cycle to cancel");
                }
            }
        }
    };

    if json {
        display_outcome_json(&outcome)?;
    } else {
        display_outcome(&outcome);
    }

    Ok(outcome)
}

/// Lists processes matching a query in the order a cycle considers them.
pub async fn list(locator: ProcessLocator, query: ProcessQuery, json: bool) -> Result<ExitCode> {
    let needle = query.clone();
    let matches = tokio::task::spawn_blocking(move || locator.find_all(&needle))
        .await
        .context("Process enumeration failed")?;

    if json {
        display_matches_json(&matches)?;
    } else {
        display_matches(&query, &matches);
    }

    Ok(if matches.is_empty() {
        ExitCode::from(EXIT_NOT_RUNNING)
    } else {
        ExitCode::SUCCESS
    })
}
