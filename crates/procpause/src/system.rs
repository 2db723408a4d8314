//! The live OS process table.
//!
//! Enumeration goes through `sysinfo`. Suspend and resume deliver
//! `SIGSTOP`/`SIGCONT` through `nix` on Unix; other platforms can list
//! processes but cannot pause them.

use log::trace;
use procpause_common::{ProcessEntry, ProcessHandle};
use sysinfo::{ProcessesToUpdate, System, ThreadKind};

use crate::table::{ProbeError, ProcessTable, SignalError};

/// [`ProcessTable`] backed by the running operating system.
///
/// The current process is never listed: stopping ourselves would leave
/// nobody to send the resume.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessTable;

impl SystemProcessTable {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ProcessTable for SystemProcessTable {
    fn snapshot(&self) -> Vec<Result<ProcessEntry, ProbeError>> {
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::All, true);

        let own_pid = std::process::id();
        let mut rows: Vec<_> = system
            .processes()
            .iter()
            // Linux lists each thread as its own task; keep whole processes.
            .filter(|(_, process)| !matches!(process.thread_kind(), Some(ThreadKind::Userland)))
            .map(|(pid, process)| (pid.as_u32(), process.name().to_string_lossy().into_owned()))
            .filter(|(pid, _)| *pid != own_pid)
            .collect();

        // sysinfo hands back a hash map; pid order is the stable choice.
        rows.sort_unstable_by_key(|(pid, _)| *pid);

        trace!("Enumerated {} processes", rows.len());

        rows.into_iter()
            .map(|(pid, name)| {
                if name.is_empty() {
                    Err(ProbeError::NameUnavailable(pid))
                } else {
                    Ok(ProcessEntry { pid, name })
                }
            })
            .collect()
    }

    fn suspend(&self, handle: &ProcessHandle) -> Result<(), SignalError> {
        signal::stop(handle.pid)
    }

    fn resume(&self, handle: &ProcessHandle) -> Result<(), SignalError> {
        signal::cont(handle.pid)
    }
}

#[cfg(unix)]
mod signal {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    use crate::table::SignalError;

    pub fn stop(pid: u32) -> Result<(), SignalError> {
        send(pid, Signal::SIGSTOP)
    }

    pub fn cont(pid: u32) -> Result<(), SignalError> {
        send(pid, Signal::SIGCONT)
    }

    fn send(pid: u32, signal: Signal) -> Result<(), SignalError> {
        // pid 0 and negative pids address process groups, never one process.
        let raw = i32::try_from(pid)
            .ok()
            .filter(|raw| *raw > 0)
            .ok_or(SignalError::NoSuchProcess)?;

        kill(Pid::from_raw(raw), signal).map_err(|errno| match errno {
            Errno::ESRCH => SignalError::NoSuchProcess,
            Errno::EPERM => SignalError::AccessDenied,
            other => SignalError::UnexpectedState(other.desc().to_string()),
        })
    }
}

#[cfg(not(unix))]
mod signal {
    use crate::table::SignalError;

    pub fn stop(_pid: u32) -> Result<(), SignalError> {
        Err(SignalError::UnexpectedState("unsupported platform".to_string()))
    }

    pub fn cont(_pid: u32) -> Result<(), SignalError> {
        Err(SignalError::UnexpectedState("unsupported platform".to_string()))
    }
}
