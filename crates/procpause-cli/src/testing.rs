//! Test doubles for the command loops.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use procpause::{ProbeError, ProcessEntry, ProcessHandle, ProcessTable, SignalError};
use rustyline::ExternalPrinter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Snapshot,
    Suspend(u32),
    Resume(u32),
}

/// In-memory process table that records every call.
#[derive(Default)]
pub struct RecordingTable {
    rows: Vec<ProcessEntry>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingTable {
    pub fn new(rows: &[(u32, &str)]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|(pid, name)| ProcessEntry::new(*pid, *name))
                .collect(),
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl ProcessTable for RecordingTable {
    fn snapshot(&self) -> Vec<Result<ProcessEntry, ProbeError>> {
        self.calls.lock().unwrap().push(Call::Snapshot);
        self.rows.iter().cloned().map(Ok).collect()
    }

    fn suspend(&self, handle: &ProcessHandle) -> Result<(), SignalError> {
        self.calls.lock().unwrap().push(Call::Suspend(handle.pid));
        Ok(())
    }

    fn resume(&self, handle: &ProcessHandle) -> Result<(), SignalError> {
        self.calls.lock().unwrap().push(Call::Resume(handle.pid));
        Ok(())
    }
}

/// Printer that keeps every line it is given.
#[derive(Clone, Default)]
pub struct CapturePrinter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl CapturePrinter {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl ExternalPrinter for CapturePrinter {
    fn print(&mut self, msg: String) -> rustyline::Result<()> {
        self.lines.lock().unwrap().push(msg);
        Ok(())
    }
}
