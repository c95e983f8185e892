//! Starting and restarting in a targeted state

use crate::prelude::*;
use similar_asserts::assert_eq;

fn graph(log: &EntryLog) -> (Engine<()>, Gate, sy_engine::StateId) {
    let engine = Engine::<()>::new();
    let gate = Gate::new("First", log);
    let first = engine.add_state("First", gate.clone());
    let mid = resolver(&engine, log, "Mid", "trans", json!("foo"));
    let last = resolver(&engine, log, "Last", "output", json!(42));
    engine.set_first_state(first).unwrap();
    engine.add_transition("", first, mid).unwrap();
    engine.add_transition("trans", mid, last).unwrap();
    engine.add_terminal("", last).unwrap();
    (engine, gate, mid)
}

#[tokio::test]
async fn can_start_in_a_targeted_state() {
    let log = EntryLog::new();
    let (engine, _gate, mid) = graph(&log);

    let result = engine
        .run_from(&session(), Some(mid), json!("bar"))
        .unwrap()
        .await;

    assert_eq!(result, Ok(Transition::new("output", 42)));
    assert_eq!(log.states(), vec!["Mid", "Last"]);
    assert_eq!(log.last("Mid").unwrap().input, json!("bar"));
}

#[tokio::test]
async fn can_restart_in_a_targeted_state() {
    let log = EntryLog::new();
    let (engine, gate, mid) = graph(&log);
    let s = session();

    let first_run = engine.run(&s).unwrap();
    gate.entered().await;
    engine.stop(s.id());
    assert_eq!(first_run.await, Err(RunError::Stopped));

    let result = engine.run_from(&s, Some(mid), json!("bar")).unwrap().await;

    assert_eq!(result, Ok(Transition::new("output", 42)));
    assert_eq!(log.states(), vec!["First", "Mid", "Last"]);
    assert_eq!(log.count("Mid"), 1);
    assert_eq!(log.last("Mid").unwrap().input, json!("bar"));
}
