//! The OS process-table seam.
//!
//! Everything the engine needs from the operating system goes through
//! [`ProcessTable`]: listing processes, and stopping/continuing one by pid.

use procpause_common::{ProcessEntry, ProcessHandle};
use thiserror::Error;

/// A process row that could not be read during enumeration.
///
/// Always recoverable: the locator skips it and keeps scanning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("name of process {0} is unavailable")]
    NameUnavailable(u32),
}

/// Failure of a suspend or resume request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    #[error("no such process")]
    NoSuchProcess,

    #[error("access denied")]
    AccessDenied,

    #[error("process in unexpected state: {0}")]
    UnexpectedState(String),
}

/// Read and control access to the OS process table.
pub trait ProcessTable: Send + Sync {
    /// Lists the currently visible processes in enumeration order.
    ///
    /// Rows that could not be read are returned as errors rather than
    /// aborting the whole listing.
    fn snapshot(&self) -> Vec<Result<ProcessEntry, ProbeError>>;

    /// Stops every thread of the process.
    ///
    /// # Errors
    ///
    /// Returns a [`SignalError`] if the process is gone, not ours to stop,
    /// or cannot be stopped.
    fn suspend(&self, handle: &ProcessHandle) -> Result<(), SignalError>;

    /// Continues a stopped process.
    ///
    /// # Errors
    ///
    /// Returns a [`SignalError`] if the process is gone, not ours to
    /// continue, or cannot be continued.
    fn resume(&self, handle: &ProcessHandle) -> Result<(), SignalError>;
}
