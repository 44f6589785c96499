//! Process-wide default scheduler instance.
//!
//! The primary API is an explicitly owned [`Scheduler`]; this shim exists
//! for hosts that want ambient access without threading a handle through.
//! The default instance is created lazily on first use and torn down on
//! demand, abandoning any in-flight and queued work.

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use super::{Scheduler, SchedulerHandle};

static DEFAULT: Lazy<Mutex<Option<Scheduler>>> = Lazy::new(|| Mutex::new(None));

/// Run `f` against the default scheduler, creating it on first access.
///
/// The cell's lock is held for the duration of `f`; keep the closure
/// short and never call back into this module from inside it.
pub fn with_default<R>(f: impl FnOnce(&mut Scheduler) -> R) -> R {
    let mut guard = DEFAULT.lock();
    let scheduler = guard.get_or_insert_with(Scheduler::new);
    f(scheduler)
}

/// A producer handle to the default scheduler, creating it on first access.
pub fn default_handle() -> SchedulerHandle {
    with_default(|scheduler| scheduler.handle())
}

/// True if the default instance currently exists.
pub fn is_initialized() -> bool {
    DEFAULT.lock().is_some()
}

/// Drop the default instance.
///
/// Any in-flight task's continuation and all queued work are abandoned,
/// not drained. Handles obtained earlier keep the old queue alive but the
/// work in it will never run. A later access creates a fresh instance.
pub fn teardown() {
    DEFAULT.lock().take();
}
