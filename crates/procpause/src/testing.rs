//! Scripted in-memory process table for engine tests.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use procpause_common::{ProcessEntry, ProcessHandle};
use tokio::time::Instant;

use crate::table::{ProbeError, ProcessTable, SignalError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Snapshot,
    Suspend(u32),
    Resume(u32),
}

/// A process table whose rows and signal results are fixed up front.
///
/// Every call is recorded with the (possibly paused) tokio clock so tests
/// can assert ordering and spacing.
#[derive(Default)]
pub struct ScriptedTable {
    rows: Vec<Result<ProcessEntry, ProbeError>>,
    suspend_result: Option<SignalError>,
    resume_result: Option<SignalError>,
    calls: Mutex<Vec<(Call, Instant)>>,
}

impl ScriptedTable {
    pub fn new(rows: &[(u32, &str)]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|(pid, name)| Ok(ProcessEntry::new(*pid, *name)))
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_probe_error(mut self, error: ProbeError) -> Self {
        self.rows.insert(0, Err(error));
        self
    }

    pub fn failing_suspend(mut self, error: SignalError) -> Self {
        self.suspend_result = Some(error);
        self
    }

    pub fn failing_resume(mut self, error: SignalError) -> Self {
        self.resume_result = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().map(|(call, _)| *call).collect()
    }

    pub fn timed_calls(&self) -> Vec<(Call, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push((call, Instant::now()));
    }
}

impl ProcessTable for ScriptedTable {
    fn snapshot(&self) -> Vec<Result<ProcessEntry, ProbeError>> {
        self.record(Call::Snapshot);
        self.rows.clone()
    }

    fn suspend(&self, handle: &ProcessHandle) -> Result<(), SignalError> {
        self.record(Call::Suspend(handle.pid));
        self.suspend_result.clone().map_or(Ok(()), Err)
    }

    fn resume(&self, handle: &ProcessHandle) -> Result<(), SignalError> {
        self.record(Call::Resume(handle.pid));
        self.resume_result.clone().map_or(Ok(()), Err)
    }
}
