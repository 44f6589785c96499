//! Error taxonomy for the scheduler.
//!
//! Task code reports failures as values (`crate::Result`), never by
//! unwinding. The scheduler wraps them into [`SchedulerError`] variants at
//! the point where a chain terminates, logs every failure path, and never
//! propagates task-level failures out of `tick()`.

use thiserror::Error;

/// Errors surfaced by the scheduler.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A callback or a steppable resumption failed.
    ///
    /// Carries the originating task for context and the original cause.
    /// The alternate `{cause:#}` rendering includes the full cause chain.
    #[error("task {origin} failed: {cause:#}")]
    TaskExecution {
        /// The task the failure originated from.
        origin: crate::TaskId,
        /// The deepest original cause, unwrapped.
        cause: anyhow::Error,
    },

    /// A dynamically submitted value matched neither task variant.
    ///
    /// Logged and executed as an immediate no-op; never aborts a chain.
    #[error("unrecognized submission of type `{type_name}`")]
    Unrecognized {
        /// Type name of the rejected submission.
        type_name: &'static str,
    },

    /// The driver attempted to begin a task while another was in flight.
    ///
    /// Starting a second task concurrently is forbidden; the driver logs
    /// this, forces the state back to idle, and drops the task.
    #[error("cannot begin task {origin} while another task is in flight")]
    AlreadyInFlight {
        /// The task that was refused.
        origin: crate::TaskId,
    },
}

impl SchedulerError {
    /// The task id the error relates to, if any.
    pub fn origin(&self) -> Option<crate::TaskId> {
        match self {
            SchedulerError::TaskExecution { origin, .. }
            | SchedulerError::AlreadyInFlight { origin } => Some(*origin),
            SchedulerError::Unrecognized { .. } => None,
        }
    }

    /// The original cause for execution failures.
    pub fn cause(&self) -> Option<&anyhow::Error> {
        match self {
            SchedulerError::TaskExecution { cause, .. } => Some(cause),
            _ => None,
        }
    }
}
