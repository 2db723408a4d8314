//! # procpause-common
//!
//! Common value types for the procpause engine and its front ends.
//!
//! This crate provides the vocabulary shared by every layer:
//! - Process queries, handles, and process-table rows
//! - The pause window a target stays suspended for
//! - Terminal outcomes of a pause cycle and their failure reasons
//! - Progress events emitted while a cycle runs
//!
//! ## Example
//!
//! ```
//! use procpause_common::{ProcessEntry, ProcessQuery};
//!
//! let query = ProcessQuery::new("gta5").expect("non-empty query");
//! let entry = ProcessEntry::new(42, "GTA5.exe");
//!
//! assert!(query.matches(&entry.name));
//! ```

/// Progress notifications emitted during a cycle.
pub mod events;
/// Terminal outcomes and failure classification.
pub mod outcome;
/// Process queries, handles, and pause windows.
pub mod process;

pub use events::CycleEvent;
pub use outcome::{CycleReport, FailureReason, LifecycleOutcome, OutcomeKind};
pub use process::{PauseWindow, ProcessEntry, ProcessHandle, ProcessQuery, QueryError};
