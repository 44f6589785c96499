//! Step runner: drives one job to completion, depth-first, across ticks.
//!
//! The runner keeps an explicit stack of steppable frames instead of
//! recursing, so suspension can cut across arbitrary nesting depth and a
//! long-lived queue never grows the call stack. The innermost frame is
//! always the one being resumed; a nested yield pushes a frame, exhaustion
//! pops one, and a failure at any depth discards the entire stack so that
//! no ancestor is ever resumed after a descendant fails.

use smallvec::SmallVec;
use tracing::{debug, error};

use crate::error::SchedulerError;
use crate::scheduler::queue::{Job, JobKind};
use crate::scheduler::task::{BoxSteppable, CallbackFn, Steppable, TaskId, Yield};

/// Outcome of driving the current job for one tick.
#[derive(Debug)]
pub(crate) enum RunStatus {
    /// A suspend marker was produced; resume on the next tick.
    Suspended,
    /// The job and all nested sub-tasks ran to exhaustion.
    Finished,
    /// A step failed; the whole chain was abandoned.
    Failed(SchedulerError),
}

/// One in-flight job with its stack of nested frames, innermost last.
///
/// Nesting is usually shallow, so frames stay inline.
pub(crate) struct StepRunner {
    id: TaskId,
    frames: SmallVec<[BoxSteppable; 4]>,
}

impl StepRunner {
    /// Wrap a dequeued job into a runnable root frame.
    pub fn new(job: Job) -> Self {
        let root: BoxSteppable = match job.kind {
            JobKind::Steppable(steppable) => steppable,
            JobKind::Callback(f) => Box::new(CallbackStep { f: Some(f) }),
            JobKind::Unrecognized { type_name } => Box::new(UnrecognizedStep {
                id: job.id,
                type_name,
                spent: false,
            }),
        };
        let mut frames = SmallVec::new();
        frames.push(root);
        Self { id: job.id, frames }
    }

    /// The id of the job this runner drives.
    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Current nesting depth, for diagnostics.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Resume the innermost frame until the chain suspends, finishes, or
    /// fails. Descending into a nested task and popping an exhausted frame
    /// both happen within the same tick; only a suspend marker ends one.
    pub fn drive(&mut self) -> RunStatus {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                return RunStatus::Finished;
            };
            match frame.resume() {
                Ok(Some(Yield::Suspend)) => return RunStatus::Suspended,
                Ok(Some(Yield::Task(nested))) => {
                    debug!("{}: entering nested task at depth {}", self.id, self.frames.len());
                    self.frames.push(nested);
                }
                Ok(None) => {
                    self.frames.pop();
                }
                Err(cause) => {
                    // Abort the entire ancestor chain: drop every frame so
                    // no parent produces further elements.
                    self.frames.clear();
                    return RunStatus::Failed(SchedulerError::TaskExecution {
                        origin: self.id,
                        cause,
                    });
                }
            }
        }
    }
}

impl std::fmt::Debug for StepRunner {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("StepRunner")
            .field("id", &self.id)
            .field("depth", &self.frames.len())
            .finish()
    }
}

/// Root frame for a one-shot callback: invoke, then signal exactly one
/// suspension so the driver yields a tick before chaining onward.
struct CallbackStep {
    f: Option<CallbackFn>,
}

impl Steppable for CallbackStep {
    fn resume(&mut self) -> crate::Result<Option<Yield>> {
        match self.f.take() {
            Some(f) => {
                f()?;
                Ok(Some(Yield::Suspend))
            }
            None => Ok(None),
        }
    }
}

/// Root frame for an unrecognized submission: log once, then complete as a
/// no-op with the same one-suspension shape as a callback.
struct UnrecognizedStep {
    id: TaskId,
    type_name: &'static str,
    spent: bool,
}

impl Steppable for UnrecognizedStep {
    fn resume(&mut self) -> crate::Result<Option<Yield>> {
        if self.spent {
            return Ok(None);
        }
        self.spent = true;
        error!(
            "{}: {}",
            self.id,
            SchedulerError::Unrecognized {
                type_name: self.type_name
            }
        );
        Ok(Some(Yield::Suspend))
    }
}
