use thiserror::Error;

/// Errors returned by [`TaskRunner`](crate::TaskRunner) itself.
///
/// These are about the runner, not the target process: cycle results are
/// always delivered as a [`LifecycleOutcome`](crate::LifecycleOutcome).
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("a pause cycle is already running")]
    AlreadyRunning,

    #[error("pause cycle ended without delivering an outcome")]
    Abandoned,
}
