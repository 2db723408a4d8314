//! Background execution of pause cycles.
//!
//! [`TaskRunner::start`] spawns one short-lived task per cycle and hands back
//! a [`CycleTicket`]. The ticket resolves exactly once, with the cycle's
//! [`LifecycleOutcome`]. At most one cycle is in flight per runner: the run
//! state moves `Idle → Running → Idle` through a single atomic
//! compare-exchange, and overlapping starts are rejected.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use procpause_common::{CycleEvent, LifecycleOutcome, PauseWindow, ProcessQuery};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::controller::{EventCallback, ProcessLifecycleController, notify};
use crate::error::RunnerError;
use crate::locator::ProcessLocator;
use crate::table::ProcessTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum RunState {
    Idle = 0,
    Running = 1,
}

struct Shared {
    state: AtomicU8,
    cancel: Mutex<Option<watch::Sender<bool>>>,
}

impl Shared {
    fn cancel_slot(&self) -> MutexGuard<'_, Option<watch::Sender<bool>>> {
        self.cancel.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks a cycle in flight. Dropping it returns the runner to idle, even if
/// the cycle's task unwinds.
struct InFlight {
    shared: Arc<Shared>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.shared.cancel_slot().take();
        self.shared
            .state
            .store(RunState::Idle as u8, Ordering::Release);
    }
}

/// Runs locate + pause cycles off the caller's task.
pub struct TaskRunner {
    locator: ProcessLocator,
    controller: ProcessLifecycleController,
    pause: PauseWindow,
    on_event: Option<EventCallback>,
    shared: Arc<Shared>,
}

impl TaskRunner {
    pub fn new(table: Arc<dyn ProcessTable>, pause: PauseWindow) -> Self {
        Self {
            locator: ProcessLocator::new(Arc::clone(&table)),
            controller: ProcessLifecycleController::new(table),
            pause,
            on_event: None,
            shared: Arc::new(Shared {
                state: AtomicU8::new(RunState::Idle as u8),
                cancel: Mutex::new(None),
            }),
        }
    }

    /// Registers an observer for progress events of every cycle.
    #[must_use]
    pub fn with_event_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(CycleEvent) + Send + Sync + 'static,
    {
        let callback: EventCallback = Arc::new(callback);
        self.controller = self.controller.with_event_callback(Arc::clone(&callback));
        self.on_event = Some(callback);
        self
    }

    #[must_use]
    pub const fn pause_window(&self) -> PauseWindow {
        self.pause
    }

    /// Whether a cycle is currently in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.state.load(Ordering::Acquire) == RunState::Running as u8
    }

    /// Starts a cycle for `query` on a background task.
    ///
    /// Returns immediately. The outcome arrives through the returned ticket;
    /// dropping the ticket does not stop the cycle, the target is still
    /// resumed. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::AlreadyRunning`] if a previous cycle has not
    /// delivered its outcome yet.
    pub fn start(&self, query: ProcessQuery) -> Result<CycleTicket, RunnerError> {
        self.shared
            .state
            .compare_exchange(
                RunState::Idle as u8,
                RunState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| RunnerError::AlreadyRunning)?;
        let in_flight = InFlight {
            shared: Arc::clone(&self.shared),
        };

        let (cancel_tx, cancel_rx) = watch::channel(false);
        *self.shared.cancel_slot() = Some(cancel_tx);

        debug!("Starting pause cycle for '{query}'");

        let (outcome_tx, outcome_rx) = oneshot::channel();
        let cycle = Cycle {
            locator: self.locator.clone(),
            controller: self.controller.clone(),
            pause: self.pause,
            on_event: self.on_event.clone(),
        };

        let task = tokio::spawn(async move {
            let outcome = cycle.run(query, cancel_rx).await;
            // Idle before delivery, so a caller reacting to the outcome can
            // start the next cycle straight away.
            drop(in_flight);
            if let Some(outcome) = outcome
                && outcome_tx.send(outcome).is_err()
            {
                debug!("Cycle ticket dropped before the outcome arrived");
            }
        });

        Ok(CycleTicket {
            outcome: outcome_rx,
            task,
        })
    }

    /// Asks the running cycle to stop waiting and resume its target now.
    ///
    /// Returns `false` if no cycle was running. Cancellation never skips the
    /// resume; the cycle still delivers an outcome.
    #[must_use]
    pub fn cancel(&self) -> bool {
        self.shared.cancel_slot().as_ref().is_some_and(|tx| {
            tx.send_replace(true);
            true
        })
    }
}

struct Cycle {
    locator: ProcessLocator,
    controller: ProcessLifecycleController,
    pause: PauseWindow,
    on_event: Option<EventCallback>,
}

impl Cycle {
    async fn run(
        self,
        query: ProcessQuery,
        cancel: watch::Receiver<bool>,
    ) -> Option<LifecycleOutcome> {
        let locator = self.locator;
        let needle = query.clone();
        let found = match tokio::task::spawn_blocking(move || locator.locate(&needle)).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Process lookup for '{query}' did not finish: {e}");
                return None;
            }
        };

        let Some(handle) = found else {
            return Some(LifecycleOutcome::NotFound { query });
        };

        notify(self.on_event.as_ref(), CycleEvent::Located(handle.clone()));

        Some(
            self.controller
                .run_cycle_with_cancel(handle, self.pause, cancel)
                .await,
        )
    }
}

/// The caller's end of one started cycle.
#[must_use = "the outcome of a cycle is delivered through its ticket"]
pub struct CycleTicket {
    outcome: oneshot::Receiver<LifecycleOutcome>,
    task: JoinHandle<()>,
}

impl CycleTicket {
    /// Waits for the cycle's terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Abandoned`] if the background task ended
    /// without producing an outcome.
    pub async fn outcome(self) -> Result<LifecycleOutcome, RunnerError> {
        let outcome = self.outcome.await.map_err(|_| RunnerError::Abandoned);
        if let Err(e) = self.task.await {
            warn!("Pause cycle task failed: {e}");
        }
        outcome
    }
}
