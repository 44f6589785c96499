//! Task definitions for the scheduler.
//!
//! A [`Task`] is either a one-shot callback or a [`Steppable`]: a resumable
//! sequence that yields a [`Yield`] per resumption and may suspend itself
//! across driver ticks or hand control to a nested sub-task.

use std::any::Any;

/// Unique per-scheduler task identifier, assigned at enqueue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub usize);

impl TaskId {
    /// Get the inner value.
    #[inline]
    pub fn inner(&self) -> usize {
        self.0
    }
}

impl From<usize> for TaskId {
    fn from(val: usize) -> Self {
        Self(val)
    }
}

impl From<TaskId> for usize {
    fn from(val: TaskId) -> Self {
        val.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "Task({})", self.0)
    }
}

/// A value yielded by a [`Steppable`] between resumptions.
///
/// The two cases are distinct by construction: a suspension pauses the
/// chain until the next driver tick, while a nested task is drained to
/// completion, depth-first, before the yielding task resumes.
pub enum Yield {
    /// Pause here; the driver resumes the task on its next tick.
    Suspend,
    /// Run this sub-task to completion before resuming the yielding task.
    Task(Box<dyn Steppable + Send>),
}

impl Yield {
    /// Wrap a steppable as a nested yield.
    #[inline]
    pub fn nested(task: impl Steppable + Send + 'static) -> Self {
        Yield::Task(Box::new(task))
    }
}

impl std::fmt::Debug for Yield {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Yield::Suspend => f.write_str("Suspend"),
            Yield::Task(_) => f.write_str("Task(..)"),
        }
    }
}

/// A resumable sequence of yields.
///
/// Each [`resume`](Steppable::resume) call advances the task by one
/// element: `Ok(Some(_))` yields, `Ok(None)` signals exhaustion, and
/// `Err(_)` reports a step failure and terminates the task. A steppable is
/// not rewindable; restarting means recreating the value.
pub trait Steppable {
    /// Advance by one element.
    fn resume(&mut self) -> crate::Result<Option<Yield>>;
}

/// Any iterator of yield results is a steppable.
impl<I> Steppable for I
where
    I: Iterator<Item = crate::Result<Yield>>,
{
    fn resume(&mut self) -> crate::Result<Option<Yield>> {
        self.next().transpose()
    }
}

pub(crate) type CallbackFn = Box<dyn FnOnce() -> crate::Result<()> + Send>;
pub(crate) type BoxSteppable = Box<dyn Steppable + Send>;

/// A unit of work accepted by the scheduler.
pub enum Task {
    /// Invoked exactly once, synchronously, within a single step.
    Callback(CallbackFn),
    /// Stepped across one or more ticks until exhaustion.
    Steppable(BoxSteppable),
}

impl Task {
    /// A one-shot callback that cannot fail.
    pub fn callback(f: impl FnOnce() + Send + 'static) -> Self {
        Task::Callback(Box::new(move || {
            f();
            Ok(())
        }))
    }

    /// A one-shot callback that reports failure as a `Result`.
    pub fn try_callback(f: impl FnOnce() -> crate::Result<()> + Send + 'static) -> Self {
        Task::Callback(Box::new(f))
    }

    /// A steppable task.
    pub fn steppable(task: impl Steppable + Send + 'static) -> Self {
        Task::Steppable(Box::new(task))
    }

    /// A steppable task built from a sequence of yield results.
    ///
    /// Convenient for fixed scripts of suspensions and nested tasks:
    ///
    /// ```rust
    /// use ticktask::{Task, Yield};
    ///
    /// let task = Task::from_yields([
    ///     Ok(Yield::Suspend),
    ///     Ok(Yield::nested((0..1).map(|_| Ok(Yield::Suspend)))),
    ///     Ok(Yield::Suspend),
    /// ]);
    /// ```
    pub fn from_yields<I>(yields: I) -> Self
    where
        I: IntoIterator<Item = crate::Result<Yield>>,
        I::IntoIter: Send + 'static,
    {
        Task::Steppable(Box::new(yields.into_iter()))
    }

    /// Classify an arbitrary submitted value into a task.
    ///
    /// Accepts a [`Task`], a boxed steppable, or a boxed callback; anything
    /// else is returned unclassified so the caller can record it as an
    /// unrecognized submission.
    pub(crate) fn classify(value: Box<dyn Any + Send>) -> Result<Task, Box<dyn Any + Send>> {
        let value = match value.downcast::<Task>() {
            Ok(task) => return Ok(*task),
            Err(other) => other,
        };
        let value = match value.downcast::<BoxSteppable>() {
            Ok(steppable) => return Ok(Task::Steppable(*steppable)),
            Err(other) => other,
        };
        match value.downcast::<CallbackFn>() {
            Ok(callback) => Ok(Task::Callback(*callback)),
            Err(other) => Err(other),
        }
    }
}

impl std::fmt::Debug for Task {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Task::Callback(_) => f.write_str("Task::Callback"),
            Task::Steppable(_) => f.write_str("Task::Steppable"),
        }
    }
}
