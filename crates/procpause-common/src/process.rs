use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building a [`ProcessQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum QueryError {
    /// The query was empty after trimming whitespace.
    #[error("process query must not be empty")]
    Empty,
}

/// A case-insensitive substring matched against process names.
///
/// The needle is trimmed and lowercased once at construction so matching a
/// whole process table does not re-normalize it per row.
///
/// # Examples
///
/// ```
/// use procpause_common::ProcessQuery;
///
/// let query = ProcessQuery::new("  GTA5 ").unwrap();
/// assert_eq!(query.as_str(), "GTA5");
/// assert!(query.matches("gta5.exe"));
/// assert!(query.matches("GTA5.exe"));
/// assert!(!query.matches("explorer.exe"));
///
/// assert!(ProcessQuery::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProcessQuery {
    raw: String,
    needle: String,
}

impl ProcessQuery {
    /// Creates a query from user input.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Empty`] if the input is empty or whitespace only.
    pub fn new(input: impl AsRef<str>) -> Result<Self, QueryError> {
        let raw = input.as_ref().trim();
        if raw.is_empty() {
            return Err(QueryError::Empty);
        }

        Ok(Self {
            raw: raw.to_string(),
            needle: raw.to_lowercase(),
        })
    }

    /// The query as the user typed it, without surrounding whitespace.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether `name` contains this query, ignoring case.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        name.to_lowercase().contains(&self.needle)
    }
}

impl fmt::Display for ProcessQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for ProcessQuery {
    type Error = QueryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProcessQuery> for String {
    fn from(query: ProcessQuery) -> Self {
        query.raw
    }
}

/// One row of the OS process table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessEntry {
    /// Platform process ID
    pub pid: u32,
    /// Executable name as reported by the OS
    pub name: String,
}

impl ProcessEntry {
    /// Creates a process-table row.
    pub fn new(pid: u32, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
        }
    }
}

/// Identifies the process a cycle operates on.
///
/// Bound to one OS process at lookup time only. The process may exit at any
/// moment afterwards, so every operation taking a handle must expect a
/// "no such process" failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessHandle {
    /// Platform process ID
    pub pid: u32,
    /// Name observed at lookup time, for display only
    pub name: String,
}

impl From<ProcessEntry> for ProcessHandle {
    fn from(entry: ProcessEntry) -> Self {
        Self {
            pid: entry.pid,
            name: entry.name,
        }
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (pid {})", self.name, self.pid)
    }
}

/// How long a target process stays suspended.
///
/// Fixed for the lifetime of a runner; never derived at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PauseWindow(Duration);

impl PauseWindow {
    /// Eight seconds: long enough for peers to drop the suspended session.
    pub const DEFAULT: Self = Self(Duration::from_secs(8));

    /// Creates a window of the given duration.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self(duration)
    }

    /// Creates a window of whole seconds.
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    /// The window length.
    #[must_use]
    pub const fn duration(self) -> Duration {
        self.0
    }
}

impl Default for PauseWindow {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PauseWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
