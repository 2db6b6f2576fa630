//! Service tests

use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use serde_json::{Value, json};
use vmsim_memory_management::{FINISHED_EVENT, PagingConfig, ReplacementPolicy, SegmentDescriptor};
use vmsim_services::{SimulationSession, handle};

fn call(session: &SimulationSession, request: Value) -> Value {
    serde_json::from_str(&handle(session, &request.to_string())).unwrap()
}

#[test]
fn test_init_step_run_flow() {
    let session = SimulationSession::new();
    let init = call(&session, json!({"op": "init", "refs": "1 2 3 1 2 4", "frames": "3", "algo": "lru"}));
    assert_eq!(init["status"], "initialized");
    assert_eq!(init["state"]["frames"], json!([null, null, null]));
    assert_eq!(init["state"]["clock"], 0);
    assert_eq!(init["state"]["event"], Value::Null);

    let step = call(&session, json!({"op": "step"}));
    assert_eq!(step["done"], false);
    assert_eq!(step["state"]["event"], "page fault → loaded 1 into frame 0");

    let run = call(&session, json!({"op": "run"}));
    assert_eq!(run["status"], "done");
    assert_eq!(run["state"]["frames"], json!([1, 2, 4]));
    assert_eq!(run["state"]["event"], FINISHED_EVENT);
    assert_eq!(run["state"]["pageTable"]["3"]["valid"], false);

    let step = call(&session, json!({"op": "step"}));
    assert_eq!(step["done"], true);
    assert_eq!(step["state"]["clock"], 6);
}

#[test]
fn test_reference_array_and_numeric_frames() {
    let session = SimulationSession::new();
    let init = call(&session, json!({"op": "init", "refs": [4, 4, 5], "frames": 1, "algo": "Fifo"}));
    assert_eq!(init["status"], "initialized");
    let stats = call(&session, json!({"op": "run"}));
    assert_eq!(stats["state"]["frames"], json!([5]));
}

#[test]
fn test_not_initialized_errors() {
    let session = SimulationSession::new();
    for op in ["step", "run", "snapshot"] {
        assert_eq!(call(&session, json!({"op": op})), json!({"error": "not initialized: paging"}));
    }
    for request in [json!({"op": "segments"}), json!({"op": "translate", "segment": 0, "offset": 0})] {
        assert_eq!(call(&session, request), json!({"error": "not initialized: segmentation"}));
    }
    assert_eq!(call(&session, json!({"op": "stats"})), json!({"paging": null, "segmentation": null}));
}

#[test]
fn test_invalid_configuration_keeps_previous_engine() {
    let session = SimulationSession::new();
    call(&session, json!({"op": "init", "refs": "1 2", "frames": 2, "algo": "fifo"}));
    call(&session, json!({"op": "step"}));

    let bad = [
        json!({"op": "init", "refs": "1 2", "frames": 2, "algo": "clock"}),
        json!({"op": "init", "refs": "1 x", "frames": 2, "algo": "fifo"}),
        json!({"op": "init", "refs": "1 2", "frames": 0, "algo": "fifo"}),
        json!({"op": "init", "refs": "1 2", "frames": "-3", "algo": "fifo"}),
        json!({"op": "init", "refs": [1, -2], "frames": 2, "algo": "fifo"}),
    ];
    for request in bad {
        let reply = call(&session, request);
        let message = reply["error"].as_str().unwrap();
        assert!(message.starts_with("invalid configuration"), "{}", message);
    }

    let snapshot = call(&session, json!({"op": "snapshot"}));
    assert_eq!(snapshot["state"]["clock"], 1);
    assert_eq!(snapshot["state"]["frames"], json!([1, null]));
}

#[test]
fn test_whole_float_frame_count() {
    let session = SimulationSession::new();
    let reply = call(&session, json!({"op": "init", "refs": "4 5", "frames": 3.0, "algo": "lru"}));
    assert_eq!(reply["status"], "initialized");
    assert_eq!(reply["state"]["frames"], json!([null, null, null]));

    let reply = call(&session, json!({"op": "init", "refs": "4 5", "frames": 2.5, "algo": "lru"}));
    assert_eq!(
        reply["error"],
        "invalid configuration: frames: frame count 2.5 is not a whole number"
    );
}

#[test]
fn test_malformed_request() {
    let session = SimulationSession::new();
    let reply: Value = serde_json::from_str(&handle(&session, "{\"op\": ")).unwrap();
    assert!(reply["error"].as_str().unwrap().contains("malformed request"));
}

#[test]
fn test_reinitialization_replaces_engine() {
    let session = SimulationSession::new();
    session.init_paging(vec![1, 2, 3], PagingConfig::new(1, ReplacementPolicy::Lfu)).unwrap();
    session.run().unwrap();
    let fresh = session.init_paging(vec![9], PagingConfig::new(2, ReplacementPolicy::Lru)).unwrap();
    assert_eq!(fresh.clock, 0);
    assert_eq!(fresh.frames, vec![None, None]);
    assert_eq!(fresh.page_table.keys().copied().collect::<Vec<_>>(), [9]);
    assert!(!session.step().unwrap().done);
}

#[test]
fn test_snapshot_reports_terminal_event() {
    let session = SimulationSession::new();
    session.init_paging(vec![1], PagingConfig::new(1, ReplacementPolicy::Fifo)).unwrap();
    session.run().unwrap();
    let first = session.paging_snapshot().unwrap();
    assert_eq!(first.event.as_deref(), Some(FINISHED_EVENT));
    assert_eq!(session.paging_snapshot().unwrap(), first);
}

#[test]
fn test_segmentation_flow() {
    let session = SimulationSession::new();
    let init = call(
        &session,
        json!({"op": "initSegments", "segments": [{"id": 0, "base": 1000, "limit": 500}, {"id": 1, "base": 4000, "limit": 99}]}),
    );
    assert_eq!(init["status"], "initialized");
    assert_eq!(init["state"]["segments"]["1"], json!({"base": 4000, "limit": 99}));
    assert_eq!(init["state"]["event"], Value::Null);

    let ok = call(&session, json!({"op": "translate", "segment": 0, "offset": 500}));
    assert_eq!(ok["physical"], 1500);
    assert_eq!(ok["state"]["event"], "translated (seg=0, off=500) → physical=1500");

    let fault = call(&session, json!({"op": "translate", "segment": 0, "offset": 501}));
    assert_eq!(fault["physical"], Value::Null);
    assert_eq!(fault["state"]["event"], "fault → offset 501 > limit 500");

    let missing = call(&session, json!({"op": "translate", "segment": 7, "offset": 0}));
    assert_eq!(missing["physical"], Value::Null);
    assert_eq!(missing["state"]["event"], "fault → invalid segment 7");

    let stats = call(&session, json!({"op": "stats"}));
    assert_eq!(stats["segmentation"], json!({"translations": 1, "faults": 2}));
}

#[test]
fn test_duplicate_segments_rejected() {
    let session = SimulationSession::new();
    session.init_segmentation(vec![SegmentDescriptor::new(3, 0, 10)]).unwrap();
    let error = session
        .init_segmentation(vec![SegmentDescriptor::new(1, 0, 1), SegmentDescriptor::new(1, 9, 1)])
        .unwrap_err();
    assert!(error.is_invalid_configuration());
    assert_eq!(session.translate(3, 10).unwrap().physical, Some(10));
}

#[test]
fn test_concurrent_steps_are_serialized() {
    let refs: Vec<u64> = (0..400).map(|i| i % 17).collect();
    let session = Arc::new(SimulationSession::new());
    session.init_paging(refs.clone(), PagingConfig::new(5, ReplacementPolicy::Lru)).unwrap();

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                for _ in 0..100 {
                    session.step().unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let stats = session.paging_stats().unwrap();
    assert_eq!(stats.hits + stats.faults, refs.len() as u64);

    // Same final state as a single-threaded run
    let reference = SimulationSession::new();
    reference.init_paging(refs, PagingConfig::new(5, ReplacementPolicy::Lru)).unwrap();
    reference.run().unwrap();
    assert_eq!(session.run().unwrap(), reference.run().unwrap());
}

proptest! {
    #[test]
    fn prop_text_and_array_references_agree(refs in prop::collection::vec(0u64..50, 0..30), frames in 1u64..6) {
        let text = refs.iter().map(u64::to_string).collect::<Vec<_>>().join(" ");
        let by_text = SimulationSession::new();
        let by_array = SimulationSession::new();
        call(&by_text, json!({"op": "init", "refs": text, "frames": frames.to_string(), "algo": "lfu"}));
        call(&by_array, json!({"op": "init", "refs": refs, "frames": frames, "algo": "LFU"}));
        prop_assert_eq!(call(&by_text, json!({"op": "run"})), call(&by_array, json!({"op": "run"})));
    }
}
