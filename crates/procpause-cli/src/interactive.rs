//! Interactive mode: a single "button" on the terminal.
//!
//! Every Enter press starts a cycle against the configured target. While a
//! cycle is in flight the button is disabled: further presses are refused
//! with a notice instead of queueing. Outcomes are shown as they arrive,
//! so the prompt stays responsive during the pause window.

use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use colored::Colorize;
use futures::{Stream, StreamExt};
use procpause::{LifecycleOutcome, ProcessQuery, RunnerError, TaskRunner};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::display::Console;

type PendingOutcome =
    Pin<Box<dyn Future<Output = std::result::Result<LifecycleOutcome, RunnerError>> + Send>>;

/// What a line of input asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Press,
    Quit,
    Unknown,
}

fn parse_input(line: &str) -> Input {
    match line.trim() {
        "" | "p" | "pause" => Input::Press,
        "q" | "quit" | "exit" => Input::Quit,
        _ => Input::Unknown,
    }
}

/// Starts the line editor on its own thread.
///
/// `readline` blocks, so it cannot share the runtime with the cycle. Lines
/// come back over a channel; the returned [`Console`] prints above the
/// prompt while it is being edited. Ctrl-C and Ctrl-D at the prompt quit.
///
/// # Errors
///
/// Returns an error if the editor cannot be initialized.
pub async fn spawn_prompt() -> Result<(mpsc::UnboundedReceiver<Input>, Console)> {
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (ready_tx, ready_rx) = oneshot::channel::<Result<Console>>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                let _ = ready_tx.send(Err(e.into()));
                return;
            }
        };
        let console = rl.create_external_printer().map_or_else(
            |e| {
                debug!("No external printer ({e}), writing to stdout");
                Console::stdout()
            },
            Console::with_printer,
        );
        if ready_tx.send(Ok(console)).is_err() {
            return;
        }

        loop {
            let input = match rl.readline(&format!("{} ", ">".bright_green())) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        let _ = rl.add_history_entry(line);
                    }
                    parse_input(line)
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => Input::Quit,
                Err(err) => {
                    warn!("Prompt failed: {err}");
                    Input::Quit
                }
            };

            if input_tx.send(input).is_err() || input == Input::Quit {
                break;
            }
        }
    });

    let console = ready_rx.await.context("Prompt thread exited early")??;
    Ok((input_rx, console))
}

async fn next_outcome(
    pending: &mut Option<PendingOutcome>,
) -> std::result::Result<LifecycleOutcome, RunnerError> {
    match pending {
        Some(outcome) => outcome.await,
        None => std::future::pending().await,
    }
}

fn begin_quit(runner: &TaskRunner, console: &Console) {
    if runner.cancel() {
        console.notice("Resuming target before exit...");
    }
}

/// Runs the interactive loop until the user quits or a signal arrives.
///
/// Quitting with a cycle in flight cancels it and waits for the target to be
/// resumed first. A closed input channel counts as quitting.
///
/// # Errors
///
/// Returns an error if a cycle cannot be started for a reason other than
/// one already running.
pub async fn run<S>(
    runner: &TaskRunner,
    query: &ProcessQuery,
    mut inputs: mpsc::UnboundedReceiver<Input>,
    signals: &mut S,
    console: &Console,
) -> Result<()>
where
    S: Stream<Item = i32> + Unpin,
{
    let mut pending: Option<PendingOutcome> = None;
    let mut quitting = false;

    console.print(format!(
        "{} Press {} to pause '{}' for {}, {} to quit.",
        "procpause".bright_cyan().bold(),
        "Enter".bold(),
        query,
        runner.pause_window(),
        "q".bold()
    ));

    loop {
        if quitting && pending.is_none() {
            break;
        }

        tokio::select! {
            outcome = next_outcome(&mut pending) => {
                pending = None;
                match outcome {
                    Ok(outcome) => console.outcome(&outcome),
                    Err(e) => console.error(&e),
                }
                if !quitting {
                    console.notice("Ready.");
                }
            }
            input = inputs.recv(), if !quitting => {
                match input.unwrap_or(Input::Quit) {
                    Input::Press => match runner.start(query.clone()) {
                        Ok(ticket) => {
                            debug!("Cycle started from prompt");
                            pending = Some(Box::pin(ticket.outcome()));
                        }
                        Err(RunnerError::AlreadyRunning) => {
                            console.notice("Already running, wait for the target to resume.");
                        }
                        Err(e) => return Err(e.into()),
                    },
                    Input::Quit => {
                        quitting = true;
                        begin_quit(runner, console);
                    }
                    Input::Unknown => console.notice("Press Enter to pause, q to quit."),
                }
            }
            Some(signal) = signals.next() => {
                info!(signal, "Received termination signal");
                quitting = true;
                begin_quit(runner, console);
            }
        }
    }

    Ok(())
}
