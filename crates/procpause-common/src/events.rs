//! Progress events for a running cycle.
//!
//! Events are observability only: fire-and-forget notifications about what
//! the cycle is doing. The terminal result travels separately as a
//! [`LifecycleOutcome`](crate::LifecycleOutcome), exactly once.

use serde::{Deserialize, Serialize};

use crate::process::{PauseWindow, ProcessHandle};

/// Step notifications emitted by the engine while a cycle runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
#[non_exhaustive]
pub enum CycleEvent {
    /// The query resolved to a process.
    Located(ProcessHandle),

    /// The process is stopped and the pause window has started.
    Suspended {
        /// The stopped process
        handle: ProcessHandle,
        /// How long it will stay stopped
        window: PauseWindow,
    },

    /// The process was resumed.
    Resumed(ProcessHandle),
}
