//! Pending-job queue for the scheduler.
//!
//! Unbounded FIFO: insertion order is execution order. Producers on any
//! thread may append through a shared handle; the driver is the single
//! consumer. Task ids are assigned under the queue lock so that ids also
//! reflect enqueue order.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::task::{BoxSteppable, CallbackFn, Task, TaskId};

/// A classified submission waiting in the queue.
pub(crate) struct Job {
    pub id: TaskId,
    pub kind: JobKind,
}

pub(crate) enum JobKind {
    Callback(CallbackFn),
    Steppable(BoxSteppable),
    /// A dynamic submission that matched neither task variant. Runs as a
    /// logged no-op.
    Unrecognized { type_name: &'static str },
}

impl JobKind {
    pub(crate) fn from_task(task: Task) -> Self {
        match task {
            Task::Callback(f) => JobKind::Callback(f),
            Task::Steppable(s) => JobKind::Steppable(s),
        }
    }
}

impl std::fmt::Debug for Job {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let kind = match &self.kind {
            JobKind::Callback(_) => "Callback",
            JobKind::Steppable(_) => "Steppable",
            JobKind::Unrecognized { type_name } => type_name,
        };
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("kind", &kind)
            .finish()
    }
}

struct Inner {
    jobs: VecDeque<Job>,
    next_id: usize,
}

/// A thread-safe FIFO of pending jobs shared between producer handles and
/// the single driver.
pub(crate) struct JobQueue {
    inner: Arc<Mutex<Inner>>,
}

impl JobQueue {
    /// Create a new empty queue.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                jobs: VecDeque::new(),
                next_id: 0,
            })),
        }
    }

    /// Append a job to the tail, assigning it the next task id.
    pub fn push(&self, kind: JobKind) -> TaskId {
        let mut inner = self.inner.lock();
        let id = TaskId(inner.next_id);
        inner.next_id += 1;
        inner.jobs.push_back(Job { id, kind });
        id
    }

    /// Remove and return the head job.
    #[inline]
    pub fn pop_front(&self) -> Option<Job> {
        self.inner.lock().jobs.pop_front()
    }

    /// Number of queued jobs.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.lock().jobs.len()
    }

    /// Whether the queue holds no jobs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().jobs.is_empty()
    }
}

impl Clone for JobQueue {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for JobQueue {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("JobQueue")
            .field("len", &inner.jobs.len())
            .field("next_id", &inner.next_id)
            .finish()
    }
}
