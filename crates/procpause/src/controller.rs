//! The suspend → wait → resume state machine.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{debug, info, warn};
use procpause_common::{
    CycleEvent, CycleReport, FailureReason, LifecycleOutcome, PauseWindow, ProcessHandle,
};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::table::{ProcessTable, SignalError};

/// Observer for [`CycleEvent`]s.
///
/// Called inline on the cycle's task, so it should return quickly. A panic
/// inside the observer is caught and logged; the cycle carries on.
pub type EventCallback = Arc<dyn Fn(CycleEvent) + Send + Sync>;

/// Hands `event` to the observer, if any, without letting it unwind the cycle.
pub(crate) fn notify(callback: Option<&EventCallback>, event: CycleEvent) {
    let Some(callback) = callback else {
        return;
    };
    if panic::catch_unwind(AssertUnwindSafe(move || callback(event))).is_err() {
        warn!("Cycle event observer panicked");
    }
}

/// A target this cycle has stopped and not yet resumed.
///
/// Dropping it while still armed sends the resume, so a cycle future that is
/// dropped or unwinds mid-wait never leaves the process stopped.
struct StoppedTarget<'a> {
    table: &'a dyn ProcessTable,
    handle: &'a ProcessHandle,
    armed: bool,
}

impl StoppedTarget<'_> {
    fn resume(mut self) -> Result<(), SignalError> {
        self.armed = false;
        self.table.resume(self.handle)
    }
}

impl Drop for StoppedTarget<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        warn!("Cycle for {} ended before its resume step, resuming now", self.handle);
        if let Err(e) = self.table.resume(self.handle) {
            warn!("Failed to resume {}, it may still be stopped: {e}", self.handle);
        }
    }
}

/// Pauses one process for a fixed window.
///
/// Steps run strictly in order: suspend, wait, resume. Resume is attempted
/// exactly once if and only if suspend succeeded; once the target is
/// stopped, no path out of [`run_cycle`](Self::run_cycle) skips the resume.
#[derive(Clone)]
pub struct ProcessLifecycleController {
    table: Arc<dyn ProcessTable>,
    on_event: Option<EventCallback>,
}

impl ProcessLifecycleController {
    pub fn new(table: Arc<dyn ProcessTable>) -> Self {
        Self {
            table,
            on_event: None,
        }
    }

    #[must_use]
    pub fn with_event_callback(mut self, callback: EventCallback) -> Self {
        self.on_event = Some(callback);
        self
    }

    /// Runs one full cycle against `handle`. The wait cannot be cut short.
    pub async fn run_cycle(&self, handle: ProcessHandle, pause: PauseWindow) -> LifecycleOutcome {
        // Nobody holds the sender, so the wait always runs to completion.
        let (_, cancel) = watch::channel(false);
        self.run_cycle_with_cancel(handle, pause, cancel).await
    }

    /// Runs one full cycle, fast-forwarding the wait when `cancel` turns true.
    ///
    /// Cancellation never skips the resume: a cancel that arrives before or
    /// during the wait ends the wait early and the resume runs right away.
    pub async fn run_cycle_with_cancel(
        &self,
        handle: ProcessHandle,
        pause: PauseWindow,
        mut cancel: watch::Receiver<bool>,
    ) -> LifecycleOutcome {
        if let Err(e) = self.table.suspend(&handle) {
            warn!("Failed to suspend {handle}: {e}");
            let reason = match e {
                SignalError::NoSuchProcess => FailureReason::SuspendNoSuchProcess,
                SignalError::AccessDenied => FailureReason::SuspendDenied,
                SignalError::UnexpectedState(detail) => {
                    FailureReason::SuspendUnexpectedState(detail)
                }
            };
            return LifecycleOutcome::OperationFailed { handle, reason };
        }

        let stopped = StoppedTarget {
            table: &*self.table,
            handle: &handle,
            armed: true,
        };
        let suspended_at = Instant::now();
        info!("Suspended {handle} for {pause}");
        self.emit(CycleEvent::Suspended {
            handle: handle.clone(),
            window: pause,
        });

        let cut_short = wait_out(pause, &mut cancel).await;
        let paused_for = suspended_at.elapsed();
        if cut_short {
            debug!("Wait for {handle} cut short after {paused_for:?}");
        }

        if let Err(e) = stopped.resume() {
            warn!("Failed to resume {handle}, it may still be stopped: {e}");
            let reason = match e {
                SignalError::NoSuchProcess => FailureReason::ResumeNoSuchProcess,
                SignalError::AccessDenied => FailureReason::ResumeDenied,
                SignalError::UnexpectedState(detail) => FailureReason::ResumeUnexpectedState(detail),
            };
            return LifecycleOutcome::OperationFailed { handle, reason };
        }

        info!("Resumed {handle} after {paused_for:?}");
        self.emit(CycleEvent::Resumed(handle.clone()));

        LifecycleOutcome::Completed(CycleReport {
            handle,
            paused_for,
            cut_short,
        })
    }

    fn emit(&self, event: CycleEvent) {
        notify(self.on_event.as_ref(), event);
    }
}

/// Sleeps for the window unless cancelled. Returns whether it was cut short.
async fn wait_out(pause: PauseWindow, cancel: &mut watch::Receiver<bool>) -> bool {
    if *cancel.borrow_and_update() {
        return true;
    }

    let sleep = tokio::time::sleep(pause.duration());
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            () = &mut sleep => return false,
            changed = cancel.changed() => match changed {
                Ok(()) if *cancel.borrow_and_update() => return true,
                Ok(()) => {}
                Err(_) => {
                    // Sender gone: cancellation can no longer arrive.
                    (&mut sleep).await;
                    return false;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;
    use crate::testing::{Call, ScriptedTable};

    fn gta() -> ProcessHandle {
        ProcessHandle {
            pid: 42,
            name: "GTA5.exe".to_string(),
        }
    }

    fn controller(table: &Arc<ScriptedTable>) -> ProcessLifecycleController {
        ProcessLifecycleController::new(Arc::clone(table) as Arc<dyn ProcessTable>)
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_suspends_waits_and_resumes() {
        let table = Arc::new(ScriptedTable::new(&[(42, "GTA5.exe")]));

        let outcome = controller(&table)
            .run_cycle(gta(), PauseWindow::from_secs(8))
            .await;

        let LifecycleOutcome::Completed(report) = outcome else {
            unreachable!("expected Completed, got {outcome:?}");
        };
        assert_eq!(report.handle.pid, 42);
        assert!(!report.cut_short);
        assert!(report.paused_for >= Duration::from_secs(8));
        assert_eq!(table.calls(), vec![Call::Suspend(42), Call::Resume(42)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_waits_for_full_window() {
        let table = Arc::new(ScriptedTable::new(&[]));

        let _ = controller(&table)
            .run_cycle(gta(), PauseWindow::from_secs(8))
            .await;

        let calls = table.timed_calls();
        assert_eq!(calls.len(), 2);
        let (suspend, suspended_at) = calls[0];
        let (resume, resumed_at) = calls[1];
        assert_eq!(suspend, Call::Suspend(42));
        assert_eq!(resume, Call::Resume(42));
        assert!(resumed_at.duration_since(suspended_at) >= Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_suspend_never_resumes() {
        for (error, expected) in [
            (SignalError::AccessDenied, FailureReason::SuspendDenied),
            (SignalError::NoSuchProcess, FailureReason::SuspendNoSuchProcess),
            (
                SignalError::UnexpectedState("EINVAL".into()),
                FailureReason::SuspendUnexpectedState("EINVAL".into()),
            ),
        ] {
            let table = Arc::new(ScriptedTable::new(&[]).failing_suspend(error));
            let started = Instant::now();

            let outcome = controller(&table)
                .run_cycle(gta(), PauseWindow::from_secs(8))
                .await;

            assert_eq!(
                outcome,
                LifecycleOutcome::OperationFailed {
                    handle: gta(),
                    reason: expected,
                }
            );
            assert_eq!(table.calls(), vec![Call::Suspend(42)]);
            assert!(started.elapsed() < Duration::from_secs(8));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_exiting_while_suspended_is_reported() {
        let table =
            Arc::new(ScriptedTable::new(&[]).failing_resume(SignalError::NoSuchProcess));

        let outcome = controller(&table)
            .run_cycle(gta(), PauseWindow::from_secs(8))
            .await;

        assert_eq!(
            outcome,
            LifecycleOutcome::OperationFailed {
                handle: gta(),
                reason: FailureReason::ResumeNoSuchProcess,
            }
        );
        assert!(!outcome.is_success());
        assert_eq!(table.calls(), vec![Call::Suspend(42), Call::Resume(42)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_resume_is_degraded() {
        let table = Arc::new(ScriptedTable::new(&[]).failing_resume(SignalError::AccessDenied));

        let outcome = controller(&table)
            .run_cycle(gta(), PauseWindow::from_secs(1))
            .await;

        assert_eq!(outcome.kind(), procpause_common::OutcomeKind::Degraded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_wait_still_resumes() {
        let table = Arc::new(ScriptedTable::new(&[]));
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let ctl = controller(&table);
        let cycle = tokio::spawn(async move {
            ctl.run_cycle_with_cancel(gta(), PauseWindow::from_secs(8), cancel_rx)
                .await
        });

        tokio::time::sleep(Duration::from_secs(2)).await;
        cancel_tx.send_replace(true);

        let outcome = cycle.await.unwrap();
        let LifecycleOutcome::Completed(report) = outcome else {
            unreachable!("expected Completed, got {outcome:?}");
        };
        assert!(report.cut_short);
        assert!(report.paused_for < Duration::from_secs(8));
        assert_eq!(table.calls(), vec![Call::Suspend(42), Call::Resume(42)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_start_fast_forwards() {
        let table = Arc::new(ScriptedTable::new(&[]));
        let (_cancel_tx, cancel_rx) = watch::channel(true);

        let outcome = controller(&table)
            .run_cycle_with_cancel(gta(), PauseWindow::from_secs(8), cancel_rx)
            .await;

        assert!(matches!(outcome, LifecycleOutcome::Completed(ref r) if r.cut_short));
        assert_eq!(table.calls(), vec![Call::Suspend(42), Call::Resume(42)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_follow_step_order() {
        let table = Arc::new(ScriptedTable::new(&[]));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let ctl = controller(&table).with_event_callback(Arc::new(move |event: CycleEvent| {
            sink.lock().unwrap().push(event);
        }));
        let _ = ctl.run_cycle(gta(), PauseWindow::from_secs(8)).await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                CycleEvent::Suspended {
                    handle: gta(),
                    window: PauseWindow::from_secs(8),
                },
                CycleEvent::Resumed(gta()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_cycle_still_resumes_target() {
        let table = Arc::new(ScriptedTable::new(&[]));

        let ctl = controller(&table);
        let cycle = ctl.run_cycle(gta(), PauseWindow::from_secs(8));
        let result = tokio::time::timeout(Duration::from_secs(2), cycle).await;

        assert!(result.is_err());
        let calls = table.timed_calls();
        assert_eq!(
            calls.iter().map(|(call, _)| *call).collect::<Vec<_>>(),
            vec![Call::Suspend(42), Call::Resume(42)]
        );
        assert!(calls[1].1.duration_since(calls[0].1) < Duration::from_secs(8));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(table.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_observer_does_not_skip_resume() {
        let table = Arc::new(ScriptedTable::new(&[]));
        let ctl = controller(&table).with_event_callback(Arc::new(|event: CycleEvent| {
            if matches!(event, CycleEvent::Suspended { .. }) {
                panic!("observer failed");
            }
        }));

        let outcome = ctl.run_cycle(gta(), PauseWindow::from_secs(8)).await;

        assert!(outcome.is_success());
        assert_eq!(table.calls(), vec![Call::Suspend(42), Call::Resume(42)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panic_after_resume_keeps_outcome() {
        let table = Arc::new(ScriptedTable::new(&[]));
        let ctl = controller(&table).with_event_callback(Arc::new(|event: CycleEvent| {
            if matches!(event, CycleEvent::Resumed(_)) {
                panic!("observer failed");
            }
        }));

        let outcome = ctl.run_cycle(gta(), PauseWindow::from_secs(1)).await;

        assert!(matches!(outcome, LifecycleOutcome::Completed(ref r) if !r.cut_short));
        assert_eq!(table.calls(), vec![Call::Suspend(42), Call::Resume(42)]);
    }
}
