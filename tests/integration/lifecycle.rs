//! Default-instance lifecycle: lazy creation, ambient access, teardown.
//!
//! These tests share one process-wide cell, so they run as a single test
//! to keep them from racing each other under the parallel test runner.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ticktask::scheduler::instance;

#[test]
fn test_default_instance_lifecycle() {
    instance::teardown();
    assert!(!instance::is_initialized());

    // First access creates the instance.
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let counter = counter.clone();
        instance::with_default(move |scheduler| {
            scheduler.enqueue_callback(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        });
    }
    assert!(instance::is_initialized());

    // A producer handle reaches the same queue.
    let handle = instance::default_handle();
    assert!(handle.has_pending_work());
    {
        let counter = counter.clone();
        handle.enqueue_callback(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
    }

    // The host drives the ambient instance the same way as an owned one.
    while instance::with_default(|s| {
        s.tick();
        s.has_pending_work()
    }) {}
    assert_eq!(counter.load(Ordering::SeqCst), 2);

    // Teardown abandons everything; queued work never runs afterwards.
    {
        let counter = counter.clone();
        instance::with_default(move |scheduler| {
            scheduler.enqueue_callback(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        });
    }
    instance::teardown();
    assert!(!instance::is_initialized());

    instance::with_default(|scheduler| {
        assert!(!scheduler.has_pending_work());
        scheduler.tick();
    });
    assert_eq!(counter.load(Ordering::SeqCst), 2);

    instance::teardown();
}
