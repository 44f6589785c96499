//! Cooperative tick-driven scheduler.
//!
//! This module provides the [`Scheduler`]: a single-consumer driver loop
//! over a FIFO of submitted tasks. The host calls [`Scheduler::tick`] once
//! per scheduling period; each tick either resumes the in-flight task or
//! starts the next queued one. Producers submit work through the scheduler
//! itself or through a cloned [`SchedulerHandle`].

pub mod instance;
pub(crate) mod queue;
pub(crate) mod runner;
pub mod task;


pub use task::{Steppable, Task, TaskId, Yield};

use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::error::SchedulerError;
use queue::{JobKind, JobQueue};
use runner::{RunStatus, StepRunner};

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Instance name, used as the prefix of every log line.
    pub name: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            name: crate::NAME.to_string(),
        }
    }
}

/// Scheduler statistics.
///
/// Counters are point-in-time snapshots; producers may race with the
/// driver between reads.
#[derive(Debug, Default)]
pub struct SchedulerStats {
    /// Total tasks enqueued.
    pub tasks_enqueued: AtomicUsize,
    /// Total tasks driven to normal exhaustion.
    pub tasks_completed: AtomicUsize,
    /// Total tasks abandoned by a failure.
    pub tasks_failed: AtomicUsize,
    /// Total driver ticks observed.
    pub ticks: AtomicUsize,
}

impl SchedulerStats {
    #[inline]
    fn record_enqueued(&self) {
        self.tasks_enqueued.fetch_add(1, Ordering::SeqCst);
    }

    #[inline]
    fn record_completed(&self) {
        self.tasks_completed.fetch_add(1, Ordering::SeqCst);
    }

    #[inline]
    fn record_failed(&self) {
        self.tasks_failed.fetch_add(1, Ordering::SeqCst);
    }

    #[inline]
    fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }
}

/// State shared between the driver and producer handles.
#[derive(Debug)]
struct Shared {
    queue: JobQueue,
    /// True while a step runner is active for some task.
    in_flight: AtomicBool,
    stats: SchedulerStats,
}

impl Shared {
    fn new() -> Self {
        Self {
            queue: JobQueue::new(),
            in_flight: AtomicBool::new(false),
            stats: SchedulerStats::default(),
        }
    }

    #[inline]
    fn has_pending_work(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) || !self.queue.is_empty()
    }

    fn enqueue_kind(
        &self,
        name: &str,
        kind: JobKind,
    ) -> TaskId {
        let idle = !self.in_flight.load(Ordering::SeqCst);
        let id = self.queue.push(kind);
        self.stats.record_enqueued();
        debug!(
            "{}: queuing {}. idle? {}. queue depth {}",
            name,
            id,
            idle,
            self.queue.len()
        );
        id
    }
}

/// Handler observing each top-level task failure exactly once.
pub type FailureHandler = Box<dyn FnMut(&SchedulerError) + Send>;

/// A cooperative, single-threaded task scheduler driven by host ticks.
///
/// Owns the pending-job queue and the run state. At most one task is in
/// flight at a time; tasks start in strict enqueue order; a task's nested
/// sub-tasks run to completion, depth-first, before anything else.
pub struct Scheduler {
    config: SchedulerConfig,
    shared: Arc<Shared>,
    /// The in-flight step runner, or `None` when idle.
    current: Option<StepRunner>,
    failure_handler: Option<FailureHandler>,
}

impl Scheduler {
    /// Create a scheduler with the default configuration.
    #[inline]
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Create a scheduler with a custom configuration.
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            shared: Arc::new(Shared::new()),
            current: None,
            failure_handler: None,
        }
    }

    /// The scheduler configuration.
    #[inline]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// A clonable producer handle sharing this scheduler's queue.
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            name: self.config.name.clone(),
            shared: self.shared.clone(),
        }
    }

    /// Install a handler invoked once per failed top-level task, after the
    /// failure has been logged.
    pub fn set_failure_handler(
        &mut self,
        handler: impl FnMut(&SchedulerError) + Send + 'static,
    ) {
        self.failure_handler = Some(Box::new(handler));
    }

    /// Append a task to the tail of the queue.
    pub fn enqueue(
        &self,
        task: Task,
    ) -> TaskId {
        self.shared
            .enqueue_kind(&self.config.name, JobKind::from_task(task))
    }

    /// Append a one-shot callback.
    pub fn enqueue_callback(
        &self,
        f: impl FnOnce() + Send + 'static,
    ) -> TaskId {
        self.enqueue(Task::callback(f))
    }

    /// Append a steppable task.
    pub fn enqueue_steppable(
        &self,
        steppable: impl Steppable + Send + 'static,
    ) -> TaskId {
        self.enqueue(Task::steppable(steppable))
    }

    /// Classify and append an arbitrary value.
    ///
    /// Values that are neither a [`Task`], a boxed steppable, nor a boxed
    /// callback are still accepted: they run as a logged no-op step, so a
    /// bad submission never crashes the driver.
    pub fn enqueue_any<T: Any + Send>(
        &self,
        value: T,
    ) -> TaskId {
        let kind = match Task::classify(Box::new(value)) {
            Ok(task) => JobKind::from_task(task),
            Err(_) => JobKind::Unrecognized {
                type_name: std::any::type_name::<T>(),
            },
        };
        self.shared.enqueue_kind(&self.config.name, kind)
    }

    /// True iff a task is in flight or the queue is non-empty.
    ///
    /// A point-in-time snapshot: a concurrent producer can change the
    /// answer immediately after this returns.
    #[inline]
    pub fn has_pending_work(&self) -> bool {
        self.shared.has_pending_work()
    }

    /// Scheduler statistics.
    #[inline]
    pub fn stats(&self) -> &SchedulerStats {
        &self.shared.stats
    }

    /// Passthrough diagnostic sink.
    pub fn log(
        &self,
        message: impl AsRef<str>,
    ) {
        info!("{}: {}", self.config.name, message.as_ref());
    }

    /// Drive the scheduler by one tick.
    ///
    /// Must be called by the external driver once per scheduling period;
    /// this is the sole entry point by which queued work ever executes.
    /// Task-level failures are logged and absorbed here, never surfaced to
    /// the caller, so the host loop stays stable.
    pub fn tick(&mut self) {
        self.shared.stats.record_tick();

        if self.current.is_none() {
            if self.shared.queue.is_empty() {
                return;
            }
            debug!(
                "{}: idle with {} queued, starting work",
                self.config.name,
                self.shared.queue.len()
            );
            if !self.start_next() {
                return;
            }
        }

        self.drive_current();
    }

    /// Dequeue the head job and begin a runner for it. Returns `false`
    /// when the queue was empty or initiation failed.
    fn start_next(&mut self) -> bool {
        let Some(job) = self.shared.queue.pop_front() else {
            self.clear_in_flight();
            return false;
        };
        let id = job.id;
        match self.begin_job(job) {
            Ok(()) => true,
            Err(err) => {
                // Initiation failure: log, force idle, drop the task.
                error!("{}: failed to start {}: {}", self.config.name, id, err);
                self.current = None;
                self.clear_in_flight();
                false
            }
        }
    }

    /// Install a runner for the job. Refuses to begin while another task
    /// is in flight; one task at a time is the core invariant.
    fn begin_job(
        &mut self,
        job: queue::Job,
    ) -> Result<(), SchedulerError> {
        if self.current.is_some() {
            return Err(SchedulerError::AlreadyInFlight { origin: job.id });
        }
        self.shared.in_flight.store(true, Ordering::SeqCst);
        self.current = Some(StepRunner::new(job));
        Ok(())
    }

    /// Resume the in-flight runner. On normal exhaustion, chain directly
    /// into the next queued task within the same tick; on failure, clear
    /// to idle and let the next tick start the next queued task.
    fn drive_current(&mut self) {
        while let Some(runner) = self.current.as_mut() {
            match runner.drive() {
                RunStatus::Suspended => return,
                RunStatus::Finished => {
                    let id = runner.id();
                    self.shared.stats.record_completed();
                    self.current = None;
                    if self.shared.queue.is_empty() {
                        debug!("{}: {} done, no further work, clearing out", self.config.name, id);
                        self.clear_in_flight();
                        return;
                    }
                    debug!("{}: {} done, chaining into next task", self.config.name, id);
                    if !self.start_next() {
                        return;
                    }
                }
                RunStatus::Failed(err) => {
                    self.shared.stats.record_failed();
                    self.current = None;
                    self.clear_in_flight();
                    self.report_failure(err);
                    return;
                }
            }
        }
    }

    fn clear_in_flight(&mut self) {
        self.shared.in_flight.store(false, Ordering::SeqCst);
    }

    /// Log a chain failure, then notify the installed handler, if any.
    /// Fires at most once per top-level task.
    fn report_failure(
        &mut self,
        err: SchedulerError,
    ) {
        error!(
            "{}: task failed, stopping its chain; queued tasks are unaffected. {}",
            self.config.name, err
        );
        if let Some(handler) = self.failure_handler.as_mut() {
            handler(&err);
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("name", &self.config.name)
            .field("queued", &self.shared.queue.len())
            .field("in_flight", &self.current.is_some())
            .finish()
    }
}

/// A clonable producer-side handle to a [`Scheduler`].
///
/// Handles can enqueue work and query status from any thread; only the
/// owner of the [`Scheduler`] itself can drive ticks.
#[derive(Clone, Debug)]
pub struct SchedulerHandle {
    name: String,
    shared: Arc<Shared>,
}

impl SchedulerHandle {
    /// Append a task to the tail of the queue.
    pub fn enqueue(
        &self,
        task: Task,
    ) -> TaskId {
        self.shared.enqueue_kind(&self.name, JobKind::from_task(task))
    }

    /// Append a one-shot callback.
    pub fn enqueue_callback(
        &self,
        f: impl FnOnce() + Send + 'static,
    ) -> TaskId {
        self.enqueue(Task::callback(f))
    }

    /// Append a steppable task.
    pub fn enqueue_steppable(
        &self,
        steppable: impl Steppable + Send + 'static,
    ) -> TaskId {
        self.enqueue(Task::steppable(steppable))
    }

    /// True iff a task is in flight or the queue is non-empty.
    #[inline]
    pub fn has_pending_work(&self) -> bool {
        self.shared.has_pending_work()
    }

    /// Scheduler statistics.
    #[inline]
    pub fn stats(&self) -> &SchedulerStats {
        &self.shared.stats
    }

    /// Passthrough diagnostic sink.
    pub fn log(
        &self,
        message: impl AsRef<str>,
    ) {
        info!("{}: {}", self.name, message.as_ref());
    }
}
