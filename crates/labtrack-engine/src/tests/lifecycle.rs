//! State transition tests.

use super::{run_plate_scenario, Harness};
use crate::reader::SampleReader;
use crate::writer::SampleWriter;
use crate::{NewMovement, NewResult, NewSample, SampleStatus};
use serde_json::json;

#[test]
fn register_starts_registered_at_initial_location() {
    let h = Harness::new();
    let sample = h
        .tracker
        .register_sample(NewSample::new("S1", "serum", "Freezer_B2"))
        .unwrap();

    assert_eq!(sample.status, SampleStatus::Registered);
    assert_eq!(sample.current_location, "Freezer_B2");
    assert!(sample.metadata.is_none());

    let stored = h.tracker.get_sample(&"S1".into()).unwrap().unwrap();
    assert_eq!(stored, sample);
}

#[test]
fn register_keeps_metadata() {
    let h = Harness::new();
    let meta = json!({"donor": "D-17", "volume_ml": 2.5, "tags": ["urgent"]});
    h.tracker
        .register_sample(NewSample::new("S1", "blood", "Intake").with_metadata(meta.clone()))
        .unwrap();

    let stored = h.tracker.get_sample(&"S1".into()).unwrap().unwrap();
    assert_eq!(stored.metadata, Some(meta));
}

#[test]
fn move_sets_location_and_in_transit() {
    let h = Harness::new();
    h.tracker
        .register_sample(NewSample::new("S1", "type", "LocA"))
        .unwrap();

    let movement = h
        .tracker
        .move_sample(&"S1".into(), NewMovement::new("LocA", "LocB", "R1"))
        .unwrap();
    assert_eq!(movement.from_location, "LocA");
    assert_eq!(movement.to_location, "LocB");
    assert_eq!(movement.actor_id, "R1");

    let sample = h.tracker.get_sample(&"S1".into()).unwrap().unwrap();
    assert_eq!(sample.current_location, "LocB");
    assert_eq!(sample.status, SampleStatus::InTransit);
}

#[test]
fn location_follows_latest_move() {
    let h = Harness::new();
    let id = "S1".into();
    h.tracker
        .register_sample(NewSample::new("S1", "type", "L0"))
        .unwrap();

    let hops = ["L1", "L2", "L3", "L1", "L4"];
    let mut from = "L0";
    for to in hops {
        h.tracker
            .move_sample(&id, NewMovement::new(from, to, "R1"))
            .unwrap();
        let sample = h.tracker.get_sample(&id).unwrap().unwrap();
        assert_eq!(sample.current_location, to);
        from = to;
    }
}

#[test]
fn result_sets_analyzed_without_moving() {
    let h = Harness::new();
    let id = "S1".into();
    h.tracker
        .register_sample(NewSample::new("S1", "type", "Bench_3"))
        .unwrap();

    let result = h
        .tracker
        .record_result(&id, NewResult::new("ph", 7.4, "pH", "PH-METER-2"))
        .unwrap();
    assert_eq!(result.assay_type, "ph");
    assert_eq!(result.value, 7.4);

    let sample = h.tracker.get_sample(&id).unwrap().unwrap();
    assert_eq!(sample.status, SampleStatus::Analyzed);
    assert_eq!(sample.current_location, "Bench_3");
}

#[test]
fn analyzed_sample_stays_analyzed_on_further_results() {
    let h = Harness::new();
    let id = "S1".into();
    h.tracker
        .register_sample(NewSample::new("S1", "type", "Bench"))
        .unwrap();
    h.tracker
        .record_result(&id, NewResult::new("od600", 0.42, "AU", "SPECTRO-1"))
        .unwrap();
    h.tracker
        .record_result(&id, NewResult::new("od600", 0.57, "AU", "SPECTRO-1"))
        .unwrap();

    let sample = h.tracker.get_sample(&id).unwrap().unwrap();
    assert_eq!(sample.status, SampleStatus::Analyzed);
}

#[test]
fn moving_an_analyzed_sample_puts_it_back_in_transit() {
    let h = Harness::new();
    let id = "S1".into();
    h.tracker
        .register_sample(NewSample::new("S1", "type", "Bench"))
        .unwrap();
    h.tracker
        .record_result(&id, NewResult::new("mass", 1.2, "g", "SCALE"))
        .unwrap();
    h.tracker
        .move_sample(&id, NewMovement::new("Bench", "Archive", "Tech_7"))
        .unwrap();

    let sample = h.tracker.get_sample(&id).unwrap().unwrap();
    assert_eq!(sample.status, SampleStatus::InTransit);
    assert_eq!(sample.current_location, "Archive");
}

#[test]
fn move_never_sets_analyzed() {
    let h = Harness::new();
    let id = "S1".into();
    h.tracker
        .register_sample(NewSample::new("S1", "type", "A"))
        .unwrap();
    for (from, to) in [("A", "B"), ("B", "C"), ("C", "A")] {
        h.tracker
            .move_sample(&id, NewMovement::new(from, to, "R1"))
            .unwrap();
        let status = h.tracker.get_sample(&id).unwrap().unwrap().status;
        assert_ne!(status, SampleStatus::Analyzed);
    }
}

#[test]
fn plate_scenario_final_state() {
    let h = Harness::new();
    run_plate_scenario(&h.tracker);

    let sample = h.tracker.get_sample(&"PLATE_001".into()).unwrap().unwrap();
    assert_eq!(sample.sample_type, "cell_culture");
    assert_eq!(sample.current_location, "Incubator_37C");
    assert_eq!(sample.status, SampleStatus::Analyzed);
}

#[test]
fn operations_on_one_sample_do_not_touch_another() {
    let h = Harness::new();
    h.tracker
        .register_sample(NewSample::new("A", "type", "Rack_1"))
        .unwrap();
    h.tracker
        .register_sample(NewSample::new("B", "type", "Rack_1"))
        .unwrap();

    h.tracker
        .move_sample(&"A".into(), NewMovement::new("Rack_1", "Rack_2", "R1"))
        .unwrap();
    h.tracker
        .record_result(&"A".into(), NewResult::new("ph", 6.9, "pH", "PH-1"))
        .unwrap();

    let b = h.tracker.get_sample(&"B".into()).unwrap().unwrap();
    assert_eq!(b.current_location, "Rack_1");
    assert_eq!(b.status, SampleStatus::Registered);
    let history = h.tracker.get_history(&"B".into()).unwrap().unwrap();
    assert!(history.movements.is_empty());
    assert!(history.results.is_empty());
}
