//! Concurrency tests: one tracker shared across threads.

use super::Harness;
use crate::reader::SampleReader;
use crate::writer::SampleWriter;
use crate::{NewMovement, NewResult, NewSample, SampleId, TrackerError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;
const MOVES_PER_THREAD: usize = 10;

#[test]
fn concurrent_moves_keep_every_row_and_last_location() {
    let h = Harness::new();
    h.tracker
        .register_sample(NewSample::new("SHARED", "type", "Start"))
        .unwrap();
    let tracker = Arc::new(h.tracker);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let tracker = Arc::clone(&tracker);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let id = SampleId::from("SHARED");
                barrier.wait();
                for i in 0..MOVES_PER_THREAD {
                    tracker
                        .move_sample(
                            &id,
                            NewMovement::new("unknown", format!("T{t}-{i}"), format!("Robot_{t}")),
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let history = tracker.get_history(&"SHARED".into()).unwrap().unwrap();
    assert_eq!(history.movements.len(), THREADS * MOVES_PER_THREAD);

    let last = history.movements.last().unwrap();
    assert_eq!(history.sample.current_location, last.to_location);
    assert!(history
        .movements
        .windows(2)
        .all(|pair| pair[0].timestamp < pair[1].timestamp));

    // Every thread's moves are present and in its own issue order.
    for t in 0..THREADS {
        let mine: Vec<&str> = history
            .movements
            .iter()
            .filter(|m| m.actor_id == format!("Robot_{t}"))
            .map(|m| m.to_location.as_str())
            .collect();
        let expected: Vec<String> = (0..MOVES_PER_THREAD).map(|i| format!("T{t}-{i}")).collect();
        assert_eq!(mine, expected);
    }
}

#[test]
fn concurrent_duplicate_registration_admits_exactly_one() {
    let h = Harness::new();
    let tracker = Arc::new(h.tracker);
    let barrier = Arc::new(Barrier::new(THREADS));
    let duplicates = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let tracker = Arc::clone(&tracker);
            let barrier = Arc::clone(&barrier);
            let duplicates = Arc::clone(&duplicates);
            thread::spawn(move || {
                barrier.wait();
                match tracker.register_sample(NewSample::new("RACE", "type", format!("Loc_{t}"))) {
                    Ok(_) => {}
                    Err(TrackerError::DuplicateSample(_)) => {
                        duplicates.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(e) => panic!("unexpected error: {e}"),
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(duplicates.load(Ordering::SeqCst), THREADS - 1);
    assert_eq!(tracker.list_all().unwrap().len(), 1);
    assert_eq!(tracker.sink().len(), 1);
}

#[test]
fn concurrent_writers_on_distinct_samples() {
    let h = Harness::new();
    let tracker = Arc::new(h.tracker);

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                let id = SampleId::from(format!("S{t}"));
                tracker
                    .register_sample(NewSample::new(id.as_str(), "type", "Intake"))
                    .unwrap();
                tracker
                    .move_sample(&id, NewMovement::new("Intake", format!("Bench_{t}"), "R1"))
                    .unwrap();
                tracker
                    .record_result(&id, NewResult::new("ph", t as f64, "pH", "PH-1"))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for t in 0..THREADS {
        let history = tracker
            .get_history(&format!("S{t}").into())
            .unwrap()
            .unwrap();
        assert_eq!(history.sample.current_location, format!("Bench_{t}"));
        assert_eq!(history.movements.len(), 1);
        assert_eq!(history.results.len(), 1);
        assert_eq!(history.results[0].value, t as f64);
    }
    assert!(tracker.list_by_location("Intake").unwrap().is_empty());
}

#[test]
fn readers_see_consistent_snapshots_during_writes() {
    let h = Harness::new();
    h.tracker
        .register_sample(NewSample::new("S1", "type", "L0"))
        .unwrap();
    let tracker = Arc::new(h.tracker);

    let writer = {
        let tracker = Arc::clone(&tracker);
        thread::spawn(move || {
            let id = SampleId::from("S1");
            for i in 1..=50 {
                tracker
                    .move_sample(&id, NewMovement::new(format!("L{}", i - 1), format!("L{i}"), "R1"))
                    .unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                let id = SampleId::from("S1");
                for _ in 0..50 {
                    let history = tracker.get_history(&id).unwrap().unwrap();
                    let expected = history
                        .movements
                        .last()
                        .map(|m| m.to_location.clone())
                        .unwrap_or_else(|| "L0".to_string());
                    assert_eq!(history.sample.current_location, expected);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    let history = tracker.get_history(&"S1".into()).unwrap().unwrap();
    assert_eq!(history.movements.len(), 50);
    assert_eq!(history.sample.current_location, "L50");
}

#[test]
fn side_effects_match_committed_operations_under_contention() {
    let h = Harness::new();
    h.tracker
        .register_sample(NewSample::new("S1", "type", "A"))
        .unwrap();
    let tracker = Arc::new(h.tracker);

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                let id = SampleId::from("S1");
                for _ in 0..5 {
                    tracker
                        .record_result(&id, NewResult::new("ph", 7.0, "pH", "PH-1"))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let history = tracker.get_history(&"S1".into()).unwrap().unwrap();
    assert_eq!(history.results.len(), THREADS * 5);
    assert_eq!(tracker.sink().len(), 1 + THREADS * 5);
}
