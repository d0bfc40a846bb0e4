use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use matrixos::tasks::{TaskError, TaskManager};

/// Wait until `done` reaches `expected`, then a grace period for the
/// workers to push their results onto the completion queue.
fn wait_for_completions(done: &AtomicUsize, expected: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while done.load(Ordering::Acquire) < expected {
        assert!(Instant::now() < deadline, "workers did not finish in time");
        thread::sleep(Duration::from_millis(5));
    }
    thread::sleep(Duration::from_millis(100));
}

// ============================================================================
// Id assignment
// ============================================================================

#[test]
fn test_ids_unique_across_concurrent_schedulers() {
    let manager = Arc::new(TaskManager::new(2));
    let mut handles = Vec::new();
    for _ in 0..8 {
        let manager = Arc::clone(&manager);
        handles.push(thread::spawn(move || {
            let mut ids = Vec::new();
            for _ in 0..50 {
                ids.push(manager.schedule_detached(|| Ok(()), "test"));
            }
            ids
        }));
    }

    let mut all = Vec::new();
    for handle in handles {
        let ids = handle.join().unwrap();
        // Strictly increasing in assignment order within each thread.
        for pair in ids.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        all.extend(ids);
    }

    all.sort();
    all.dedup();
    assert_eq!(all.len(), 8 * 50, "duplicate task ids assigned");
}

// ============================================================================
// Callback delivery
// ============================================================================

#[test]
fn test_callback_fires_exactly_once_and_only_on_drain() {
    let manager = TaskManager::new(2);
    let ran = Arc::new(AtomicUsize::new(0));
    let fired = Arc::new(AtomicUsize::new(0));

    let ran_in_task = Arc::clone(&ran);
    let fired_in_cb = Arc::clone(&fired);
    manager.schedule(
        move || {
            ran_in_task.fetch_add(1, Ordering::AcqRel);
            Ok(1u32)
        },
        move |_result| {
            fired_in_cb.fetch_add(1, Ordering::AcqRel);
        },
        "test",
    );

    wait_for_completions(&ran, 1);
    // The task has completed, but no drain has happened yet.
    assert_eq!(fired.load(Ordering::Acquire), 0);

    assert_eq!(manager.process_completed(), 1);
    assert_eq!(fired.load(Ordering::Acquire), 1);

    // A second drain must not re-deliver.
    assert_eq!(manager.process_completed(), 0);
    assert_eq!(fired.load(Ordering::Acquire), 1);
}

#[test]
fn test_failing_task_does_not_kill_worker() {
    // One worker, so both tasks run on the same thread.
    let manager = TaskManager::new(1);
    let ran = Arc::new(AtomicUsize::new(0));
    let outcomes = Arc::new(Mutex::new(Vec::new()));

    let ran_a = Arc::clone(&ran);
    let outcomes_a = Arc::clone(&outcomes);
    manager.schedule(
        move || -> Result<u32, TaskError> {
            ran_a.fetch_add(1, Ordering::AcqRel);
            panic!("task body blew up");
        },
        move |result| {
            outcomes_a
                .lock()
                .unwrap()
                .push(("a", result.success(), result.into_value::<u32>()));
        },
        "test",
    );

    let ran_b = Arc::clone(&ran);
    let outcomes_b = Arc::clone(&outcomes);
    manager.schedule(
        move || {
            ran_b.fetch_add(1, Ordering::AcqRel);
            Ok(42u32)
        },
        move |result| {
            outcomes_b
                .lock()
                .unwrap()
                .push(("b", result.success(), result.into_value::<u32>()));
        },
        "test",
    );

    wait_for_completions(&ran, 2);
    assert_eq!(manager.process_completed(), 2);

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.as_slice(), &[
        ("a", false, None),
        ("b", true, Some(42)),
    ]);
}

#[test]
fn test_error_result_carries_message() {
    let manager = TaskManager::new(1);
    let seen = Arc::new(Mutex::new(None));

    let seen_in_cb = Arc::clone(&seen);
    let ran = Arc::new(AtomicUsize::new(0));
    let ran_in_task = Arc::clone(&ran);
    manager.schedule(
        move || -> Result<u32, TaskError> {
            ran_in_task.fetch_add(1, Ordering::AcqRel);
            Err(TaskError::new("fetch refused"))
        },
        move |result| {
            *seen_in_cb.lock().unwrap() = result.error().map(|e| e.to_string());
        },
        "test",
    );

    wait_for_completions(&ran, 1);
    manager.process_completed();
    assert_eq!(seen.lock().unwrap().as_deref(), Some("fetch refused"));
}

#[test]
fn test_single_drain_consumes_all_finished_tasks() {
    let manager = TaskManager::new(2);
    let ran = Arc::new(AtomicUsize::new(0));

    const K: usize = 20;
    for i in 0..K {
        let ran = Arc::clone(&ran);
        manager.schedule(
            move || {
                ran.fetch_add(1, Ordering::AcqRel);
                Ok(i)
            },
            |_result| {},
            "test",
        );
    }

    wait_for_completions(&ran, K);
    assert_eq!(manager.process_completed(), K);
    assert_eq!(manager.process_completed(), 0);
    assert_eq!(manager.stats().pending, 0);
}

#[test]
fn test_callback_panic_does_not_stop_drain() {
    let manager = TaskManager::new(1);
    let ran = Arc::new(AtomicUsize::new(0));
    let second_fired = Arc::new(AtomicUsize::new(0));

    let ran_a = Arc::clone(&ran);
    manager.schedule(
        move || {
            ran_a.fetch_add(1, Ordering::AcqRel);
            Ok(())
        },
        |_result| panic!("callback blew up"),
        "test",
    );

    let ran_b = Arc::clone(&ran);
    let fired = Arc::clone(&second_fired);
    manager.schedule(
        move || {
            ran_b.fetch_add(1, Ordering::AcqRel);
            Ok(())
        },
        move |_result| {
            fired.fetch_add(1, Ordering::AcqRel);
        },
        "test",
    );

    wait_for_completions(&ran, 2);
    assert_eq!(manager.process_completed(), 2);
    assert_eq!(second_fired.load(Ordering::Acquire), 1);
}

// ============================================================================
// Restart after stop
// ============================================================================

#[test]
fn test_restart_after_midtask_stop_still_executes_new_tasks() {
    // One worker, and a task long enough that stop() runs while the
    // worker is inside the body. The worker then exits via the running
    // flag without consuming its shutdown sentinel, which stays queued.
    let manager = TaskManager::new(1);
    let started = Arc::new(AtomicUsize::new(0));
    let started_in_task = Arc::clone(&started);
    manager.schedule_detached(
        move || {
            started_in_task.fetch_add(1, Ordering::AcqRel);
            thread::sleep(Duration::from_millis(300));
            Ok(())
        },
        "test",
    );
    let deadline = Instant::now() + Duration::from_secs(5);
    while started.load(Ordering::Acquire) == 0 {
        assert!(Instant::now() < deadline, "task never started");
        thread::sleep(Duration::from_millis(5));
    }
    manager.stop();

    // Scheduling restarts the pool; the stale sentinel must not make
    // the fresh worker exit before running the new task.
    let ran = Arc::new(AtomicUsize::new(0));
    let ran_in_task = Arc::clone(&ran);
    manager.schedule_detached(
        move || {
            ran_in_task.fetch_add(1, Ordering::AcqRel);
            Ok(())
        },
        "test",
    );
    wait_for_completions(&ran, 1);
    assert_eq!(ran.load(Ordering::Acquire), 1);
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn test_cancel_suppresses_callback() {
    let manager = TaskManager::new(1);
    let ran = Arc::new(AtomicUsize::new(0));
    let fired = Arc::new(AtomicUsize::new(0));

    let ran_in_task = Arc::clone(&ran);
    let fired_in_cb = Arc::clone(&fired);
    let id = manager.schedule(
        move || {
            thread::sleep(Duration::from_millis(200));
            ran_in_task.fetch_add(1, Ordering::AcqRel);
            Ok(7u32)
        },
        move |_result| {
            fired_in_cb.fetch_add(1, Ordering::AcqRel);
        },
        "test",
    );

    assert!(manager.cancel(id), "cancel before completion must succeed");

    wait_for_completions(&ran, 1);
    // The worker still ran the body; only the callback is suppressed.
    assert_eq!(manager.process_completed(), 1);
    assert_eq!(fired.load(Ordering::Acquire), 0);

    // Unknown or already-drained ids are not cancellable.
    assert!(!manager.cancel(id));
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_round_trip_map_value_into_state() {
    let manager = TaskManager::new(2);
    let stored = Arc::new(Mutex::new(None));
    let ran = Arc::new(AtomicUsize::new(0));

    let ran_in_task = Arc::clone(&ran);
    let stored_in_cb = Arc::clone(&stored);
    manager.schedule(
        move || {
            ran_in_task.fetch_add(1, Ordering::AcqRel);
            let mut data = HashMap::new();
            data.insert("value".to_string(), 7i64);
            Ok(data)
        },
        move |result| {
            if let Some(data) = result.into_value::<HashMap<String, i64>>() {
                *stored_in_cb.lock().unwrap() = data.get("value").copied();
            }
        },
        "test",
    );

    wait_for_completions(&ran, 1);
    manager.process_completed();
    assert_eq!(*stored.lock().unwrap(), Some(7));
}
