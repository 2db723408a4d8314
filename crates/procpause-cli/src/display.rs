//! Display utilities for CLI output formatting
//!
//! Human-readable rendering of cycle events, outcomes and process listings.
//! `colored` honours `NO_COLOR` on its own.
//!
//! Writes ignore I/O errors: output may be piped into something that exits
//! early, and a closed stdout must never take a running cycle down with it.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use colored::Colorize;
use procpause::{CycleEvent, LifecycleOutcome, OutcomeKind, ProcessHandle, ProcessQuery};
use rustyline::ExternalPrinter;

fn write_out(text: &str) {
    let _ = writeln!(io::stdout().lock(), "{text}");
}

fn write_err(text: &str) {
    let _ = writeln!(io::stderr().lock(), "{text}");
}

/// Render a progress event of the running cycle
pub fn render_event(event: &CycleEvent) -> Option<String> {
    match event {
        CycleEvent::Located(handle) => Some(format!(
            "{} Found {}",
            "●".bright_blue(),
            handle.to_string().bold()
        )),
        CycleEvent::Suspended { handle, window } => Some(format!(
            "{} Suspended {} for {window}",
            "⏸".bright_yellow(),
            handle.name.bold()
        )),
        CycleEvent::Resumed(handle) => Some(format!(
            "{} Resumed {}",
            "▶".bright_green(),
            handle.name.bold()
        )),
        _ => None,
    }
}

/// Render the terminal outcome of a cycle, with a hint where one helps
pub fn render_outcome(outcome: &LifecycleOutcome) -> String {
    match outcome.kind() {
        OutcomeKind::Success => format!("{} {outcome}", "✓".bright_green().bold()),
        OutcomeKind::NotRunning => format!(
            "{} {outcome}\n  {}",
            "✗".bright_red().bold(),
            "Is the target running? Try `procpause list`.".dimmed()
        ),
        OutcomeKind::CycleFailed => format!(
            "{} {outcome}\n  {}",
            "✗".bright_red().bold(),
            "The process was not touched. Check that you may signal it.".dimmed()
        ),
        OutcomeKind::Degraded => {
            let mut text = format!("{} {outcome}", "⚠".bright_red().bold());
            if let LifecycleOutcome::OperationFailed { handle, .. } = outcome {
                let hint = format!(
                    "{} may still be stopped; `kill -CONT {}` resumes it.",
                    handle.name, handle.pid
                );
                text.push_str(&format!("\n  {}", hint.yellow()));
            }
            text
        }
    }
}

fn render_notice(message: &str) -> String {
    format!("{} {message}", "○".bright_black())
}

/// Display a progress event of the running cycle
pub fn display_event(event: &CycleEvent) {
    if let Some(text) = render_event(event) {
        write_out(&text);
    }
}

/// Display the terminal outcome of a cycle; failures go to stderr
pub fn display_outcome(outcome: &LifecycleOutcome) {
    let text = render_outcome(outcome);
    if outcome.is_success() {
        write_out(&text);
    } else {
        write_err(&text);
    }
}

/// Print an outcome as one line of JSON
pub fn display_outcome_json(outcome: &LifecycleOutcome) -> serde_json::Result<()> {
    write_out(&serde_json::to_string(outcome)?);
    Ok(())
}

/// Display every process matching a query, marking the one a cycle would pick
pub fn display_matches(query: &ProcessQuery, matches: &[ProcessHandle]) {
    if matches.is_empty() {
        write_out(&format!("No running process matches '{query}'."));
        return;
    }

    write_out(&format!(
        "{} process(es) match '{}':",
        matches.len(),
        query.to_string().bold()
    ));
    for (idx, handle) in matches.iter().enumerate() {
        let marker = if idx == 0 {
            "→".bright_green().to_string()
        } else {
            " ".to_string()
        };
        write_out(&format!("{marker} {:>8}  {}", handle.pid, handle.name));
    }
}

/// Print matching processes as a JSON array
pub fn display_matches_json(matches: &[ProcessHandle]) -> serde_json::Result<()> {
    write_out(&serde_json::to_string(matches)?);
    Ok(())
}

type SharedPrinter = Arc<Mutex<Box<dyn ExternalPrinter + Send>>>;

/// Output sink for interactive mode.
///
/// While the prompt is being edited, lines go through rustyline's external
/// printer so they land above the prompt instead of through it. Without a
/// terminal there is no printer and lines go straight to stdout.
#[derive(Clone, Default)]
pub struct Console {
    printer: Option<SharedPrinter>,
}

impl Console {
    pub fn stdout() -> Self {
        Self::default()
    }

    pub fn with_printer<P>(printer: P) -> Self
    where
        P: ExternalPrinter + Send + 'static,
    {
        Self {
            printer: Some(Arc::new(Mutex::new(Box::new(printer)))),
        }
    }

    pub fn print(&self, text: String) {
        if let Some(printer) = &self.printer {
            let mut printer = printer.lock().unwrap_or_else(PoisonError::into_inner);
            if printer.print(text.clone()).is_ok() {
                return;
            }
        }
        write_out(&text);
    }

    pub fn event(&self, event: &CycleEvent) {
        if let Some(text) = render_event(event) {
            self.print(text);
        }
    }

    pub fn outcome(&self, outcome: &LifecycleOutcome) {
        self.print(render_outcome(outcome));
    }

    pub fn notice(&self, message: &str) {
        self.print(render_notice(message));
    }

    pub fn error(&self, error: &dyn std::fmt::Display) {
        self.print(format!("{} {error}", "Error:".bright_red()));
    }
}
