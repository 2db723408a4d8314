//! Process lookup by case-insensitive name substring.

use std::sync::Arc;

use log::{debug, trace};
use procpause_common::{ProcessHandle, ProcessQuery};

use crate::table::ProcessTable;

/// Finds processes whose name contains a [`ProcessQuery`].
///
/// Read-only: the locator never signals a process. Rows the OS would not let
/// us read are skipped, never fatal.
#[derive(Clone)]
pub struct ProcessLocator {
    table: Arc<dyn ProcessTable>,
}

impl ProcessLocator {
    pub fn new(table: Arc<dyn ProcessTable>) -> Self {
        Self { table }
    }

    /// Returns the first matching process in enumeration order.
    ///
    /// When several processes match, which one is "first" is whatever order
    /// the table lists them in; no further disambiguation is attempted.
    /// Returns `None` when nothing matches.
    #[must_use]
    pub fn locate(&self, query: &ProcessQuery) -> Option<ProcessHandle> {
        let found = self.matches(query).next();

        match &found {
            Some(handle) => debug!("Query '{query}' matched {handle}"),
            None => debug!("Query '{query}' matched no process"),
        }

        found
    }

    /// Returns every matching process in enumeration order.
    #[must_use]
    pub fn find_all(&self, query: &ProcessQuery) -> Vec<ProcessHandle> {
        self.matches(query).collect()
    }

    fn matches<'a>(&self, query: &'a ProcessQuery) -> impl Iterator<Item = ProcessHandle> + 'a {
        self.table
            .snapshot()
            .into_iter()
            .filter_map(|row| match row {
                Ok(entry) => Some(entry),
                Err(e) => {
                    trace!("Skipping process: {e}");
                    None
                }
            })
            .filter(|entry| query.matches(&entry.name))
            .map(ProcessHandle::from)
    }
}
