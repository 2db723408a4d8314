use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::process::{ProcessHandle, ProcessQuery};

/// Why a suspend or resume request failed.
///
/// The resume variants are reported after the target was successfully
/// suspended, so the target may still be stopped. See [`Self::is_degraded`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
#[non_exhaustive]
pub enum FailureReason {
    /// The OS refused to suspend the target
    SuspendDenied,
    /// The target exited before it could be suspended
    SuspendNoSuchProcess,
    /// Suspend failed for another OS-reported reason
    SuspendUnexpectedState(String),
    /// The OS refused to resume the target
    ResumeDenied,
    /// The target exited while suspended
    ResumeNoSuchProcess,
    /// Resume failed for another OS-reported reason
    ResumeUnexpectedState(String),
}

impl FailureReason {
    /// Whether the failure happened after a successful suspend.
    ///
    /// A degraded failure may leave the target stopped and needs different
    /// remediation than a failed suspend, where nothing was touched.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(
            self,
            Self::ResumeDenied | Self::ResumeNoSuchProcess | Self::ResumeUnexpectedState(_)
        )
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SuspendDenied => write!(f, "permission denied while suspending"),
            Self::SuspendNoSuchProcess => write!(f, "process exited before it could be suspended"),
            Self::SuspendUnexpectedState(detail) => write!(f, "suspend failed: {detail}"),
            Self::ResumeDenied => write!(f, "permission denied while resuming"),
            Self::ResumeNoSuchProcess => write!(f, "process exited while suspended"),
            Self::ResumeUnexpectedState(detail) => write!(f, "resume failed: {detail}"),
        }
    }
}

/// Details of a cycle that suspended and resumed its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// The process that was paused
    pub handle: ProcessHandle,
    /// Measured time between suspend success and the resume request
    pub paused_for: Duration,
    /// Whether cancellation fast-forwarded the wait
    pub cut_short: bool,
}

/// The single terminal result of one pause cycle.
///
/// Produced exactly once per started cycle and handed to the caller; it is
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
#[non_exhaustive]
pub enum LifecycleOutcome {
    /// The target was suspended for the pause window and resumed.
    Completed(CycleReport),

    /// No running process matched the query. Nothing was touched.
    NotFound {
        /// The query that matched nothing
        query: ProcessQuery,
    },

    /// A suspend or resume request failed.
    OperationFailed {
        /// The process the cycle was operating on
        handle: ProcessHandle,
        /// What went wrong
        reason: FailureReason,
    },
}

impl LifecycleOutcome {
    /// Classifies the outcome for presentation.
    #[must_use]
    pub const fn kind(&self) -> OutcomeKind {
        match self {
            Self::Completed(_) => OutcomeKind::Success,
            Self::NotFound { .. } => OutcomeKind::NotRunning,
            Self::OperationFailed { reason, .. } if reason.is_degraded() => OutcomeKind::Degraded,
            Self::OperationFailed { .. } => OutcomeKind::CycleFailed,
        }
    }

    /// Whether the cycle suspended and resumed its target.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

impl fmt::Display for LifecycleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed(report) if report.cut_short => write!(
                f,
                "{} resumed early after {:.1?}",
                report.handle, report.paused_for
            ),
            Self::Completed(report) => write!(
                f,
                "{} paused for {:.1?} and resumed",
                report.handle, report.paused_for
            ),
            Self::NotFound { query } => write!(f, "no running process matches '{query}'"),
            Self::OperationFailed { handle, reason } => write!(f, "{handle}: {reason}"),
        }
    }
}

/// Presentation class of a [`LifecycleOutcome`].
///
/// Front ends pick feedback by kind: "target not running" and "pause cycle
/// failed" call for different remediation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Suspended and resumed
    Success,
    /// No matching process
    NotRunning,
    /// Suspend failed; the target was never stopped
    CycleFailed,
    /// Resume failed; the target may still be stopped
    Degraded,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn handle() -> ProcessHandle {
        ProcessHandle {
            pid: 42,
            name: "GTA5.exe".to_string(),
        }
    }

    #[test]
    fn test_every_outcome_has_one_kind() {
        let completed = LifecycleOutcome::Completed(CycleReport {
            handle: handle(),
            paused_for: Duration::from_secs(8),
            cut_short: false,
        });
        let not_found = LifecycleOutcome::NotFound {
            query: ProcessQuery::new("gta5").unwrap(),
        };
        let suspend_failed = LifecycleOutcome::OperationFailed {
            handle: handle(),
            reason: FailureReason::SuspendDenied,
        };
        let resume_failed = LifecycleOutcome::OperationFailed {
            handle: handle(),
            reason: FailureReason::ResumeNoSuchProcess,
        };

        assert_eq!(completed.kind(), OutcomeKind::Success);
        assert_eq!(not_found.kind(), OutcomeKind::NotRunning);
        assert_eq!(suspend_failed.kind(), OutcomeKind::CycleFailed);
        assert_eq!(resume_failed.kind(), OutcomeKind::Degraded);
        assert!(completed.is_success());
        assert!(!not_found.is_success());
    }

    #[test]
    fn test_only_resume_failures_are_degraded() {
        assert!(!FailureReason::SuspendDenied.is_degraded());
        assert!(!FailureReason::SuspendNoSuchProcess.is_degraded());
        assert!(!FailureReason::SuspendUnexpectedState("EINVAL".into()).is_degraded());
        assert!(FailureReason::ResumeDenied.is_degraded());
        assert!(FailureReason::ResumeNoSuchProcess.is_degraded());
        assert!(FailureReason::ResumeUnexpectedState("EINVAL".into()).is_degraded());
    }

    #[test]
    fn test_outcome_json_shape() {
        let outcome = LifecycleOutcome::OperationFailed {
            handle: handle(),
            reason: FailureReason::ResumeNoSuchProcess,
        };

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["outcome"], "operation_failed");
        assert_eq!(value["handle"]["pid"], 42);
        assert_eq!(value["reason"]["type"], "resume_no_such_process");
    }

    #[test]
    fn test_display_messages() {
        let not_found = LifecycleOutcome::NotFound {
            query: ProcessQuery::new("gta5").unwrap(),
        };
        assert_eq!(not_found.to_string(), "no running process matches 'gta5'");

        let failed = LifecycleOutcome::OperationFailed {
            handle: handle(),
            reason: FailureReason::ResumeNoSuchProcess,
        };
        assert_eq!(
            failed.to_string(),
            "GTA5.exe (pid 42): process exited while suspended"
        );
    }
}
