//! # procpause
//!
//! Locate a running process by name, suspend it for a fixed window, then
//! resume it, without blocking the caller.
//!
//! A cycle runs in three stages:
//! - [`ProcessLocator`] scans the process table for the first name containing
//!   the query, ignoring case
//! - [`ProcessLifecycleController`] suspends the target, waits out the
//!   [`PauseWindow`], and resumes it
//! - [`TaskRunner`] runs both on a background task and delivers exactly one
//!   [`LifecycleOutcome`] per start
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use procpause::{PauseWindow, ProcessQuery, SystemProcessTable, TaskRunner};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let runner = TaskRunner::new(Arc::new(SystemProcessTable::new()), PauseWindow::DEFAULT);
//!
//! let ticket = runner.start(ProcessQuery::new("gta5")?)?;
//! let outcome = ticket.outcome().await?;
//! println!("{outcome}");
//! # Ok(())
//! # }
//! ```

pub mod controller;
pub mod error;
pub mod locator;
pub mod runner;
pub mod system;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;

pub use procpause_common::*;

pub use controller::{EventCallback, ProcessLifecycleController};
pub use error::RunnerError;
pub use locator::ProcessLocator;
pub use runner::{CycleTicket, TaskRunner};
pub use system::SystemProcessTable;
pub use table::{ProbeError, ProcessTable, SignalError};
