//! ticktask
//!
//! A cooperative, single-threaded task scheduler embedded in a host
//! application's periodic update loop. Callers enqueue one-shot callbacks
//! or resumable steppable tasks; the host drives the scheduler by calling
//! [`Scheduler::tick`] once per period. At most one task is in flight at a
//! time, tasks start in strict FIFO order, and nested sub-tasks are drained
//! depth-first before their parent resumes.
//!
//! # Example
//!
//! ```rust
//! use ticktask::{Scheduler, Task, Yield};
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.enqueue_callback(|| println!("hello from the tick loop"));
//! scheduler.enqueue(Task::from_yields([Ok(Yield::Suspend), Ok(Yield::Suspend)]));
//!
//! // Host update loop.
//! while scheduler.has_pending_work() {
//!     scheduler.tick();
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/ticktask")]
#![warn(rust_2018_idioms)]

// Public modules
pub mod error;
pub mod scheduler;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use error::SchedulerError;
pub use scheduler::task::{Steppable, Task, TaskId, Yield};
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerHandle, SchedulerStats};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name used as the default log prefix
pub const NAME: &str = "ticktask";
