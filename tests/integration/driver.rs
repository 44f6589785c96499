//! End-to-end driver-loop scenarios: a host ticking the scheduler the way
//! a frame loop or timer would.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ticktask::{Scheduler, Task, Yield};

/// Tick until idle, returning how many ticks it took. The cap guards
/// against a scheduler that never clears.
fn drain(scheduler: &mut Scheduler) -> usize {
    let mut ticks = 0;
    while scheduler.has_pending_work() {
        scheduler.tick();
        ticks += 1;
        assert!(ticks < 1000, "scheduler failed to drain");
    }
    ticks
}

#[test]
fn test_three_callbacks_three_ticks() {
    let mut scheduler = Scheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let counter = counter.clone();
        scheduler.enqueue_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }

    for expected in 1..=3 {
        scheduler.tick();
        assert_eq!(counter.load(Ordering::SeqCst), expected);
    }
}

#[test]
fn test_outer_marker_nested_marker_outer_marker() {
    // [marker, nested [marker], marker]: three suspend-driven ticks, the
    // nested task fully drained between the first and third outer marker.
    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

    struct Probe {
        label: &'static str,
        order: Arc<parking_lot::Mutex<Vec<&'static str>>>,
    }
    impl Iterator for Probe {
        type Item = ticktask::Result<Yield>;
        fn next(&mut self) -> Option<Self::Item> {
            self.order.lock().push(self.label);
            None
        }
    }

    let nested_mark = Probe {
        label: "nested-done",
        order: order.clone(),
    };
    let task = Task::from_yields(
        vec![
            Ok(Yield::Suspend),
            Ok(Yield::nested(
                vec![Ok(Yield::Suspend)].into_iter().chain(nested_mark),
            )),
            Ok(Yield::Suspend),
        ]
        .into_iter(),
    );

    let mut scheduler = Scheduler::new();
    scheduler.enqueue(task);

    scheduler.tick(); // outer first marker
    assert!(order.lock().is_empty());
    scheduler.tick(); // descend, nested marker
    assert!(order.lock().is_empty());
    scheduler.tick(); // nested drained, outer final marker
    assert_eq!(*order.lock(), vec!["nested-done"]);
    assert!(scheduler.has_pending_work());
    scheduler.tick(); // outer exhausts
    assert!(!scheduler.has_pending_work());
}

#[test]
fn test_n_suspends_need_n_plus_one_ticks() {
    for n in 0..6 {
        let mut scheduler = Scheduler::new();
        scheduler.enqueue(Task::from_yields((0..n).map(|_| Ok(Yield::Suspend))));
        assert_eq!(drain(&mut scheduler), n + 1, "n = {n}");
    }
}

#[test]
fn test_tasks_never_interleave() {
    // Two steppables that each record which task is "inside" at every
    // resumption; strict FIFO means all of A's entries precede all of B's.
    let trace = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let mut scheduler = Scheduler::new();

    for label in ["a", "b"] {
        let trace = trace.clone();
        scheduler.enqueue(Task::from_yields((0..3).map(move |_| {
            trace.lock().push(label);
            Ok(Yield::Suspend)
        })));
    }

    drain(&mut scheduler);

    let trace = trace.lock();
    assert_eq!(*trace, vec!["a", "a", "a", "b", "b", "b"]);
}

#[test]
fn test_enqueue_while_running_executes_after_current_chain() {
    let trace = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let mut scheduler = Scheduler::new();
    let handle = scheduler.handle();

    // The diagnostic sink is a plain passthrough; it must accept messages
    // from the owner and from producer handles without touching state.
    scheduler.log("starting long-running task scenario");
    handle.log("producer attached");
    assert!(!scheduler.has_pending_work());

    {
        let trace = trace.clone();
        let handle = handle.clone();
        let mut injected = false;
        scheduler.enqueue(Task::from_yields((0..2).map(move |_| {
            trace.lock().push("long");
            if !injected {
                injected = true;
                let trace = trace.clone();
                handle.enqueue_callback(move || {
                    trace.lock().push("late");
                });
            }
            Ok(Yield::Suspend)
        })));
    }

    drain(&mut scheduler);
    assert_eq!(*trace.lock(), vec!["long", "long", "late"]);
}

#[test]
fn test_hundreds_of_chained_tasks_drain_without_recursion_issues() {
    let mut scheduler = Scheduler::new();
    let counter = Arc::new(AtomicUsize::new(0));

    // Zero-suspend steppables chain through in very few ticks; the driver
    // loop must iterate, not recurse.
    for _ in 0..500 {
        let counter = counter.clone();
        scheduler.enqueue(Task::from_yields((0..1).map(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Yield::Suspend)
        })));
    }

    drain(&mut scheduler);
    assert_eq!(counter.load(Ordering::SeqCst), 500);
}
