//! Ordinary and error transition resolution

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test]
async fn states_transition_all_the_way_through() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let a = resolver(&engine, &log, "A", "x", json!("v"));
    let b = resolver(&engine, &log, "B", "output", json!(42));
    engine.set_first_state(a).unwrap();
    engine.add_transition("x", a, b).unwrap();
    engine.add_terminal("", b).unwrap();

    let result = engine.run(&session()).unwrap().await;

    assert_eq!(result, Ok(Transition::new("output", 42)));
    assert_eq!(log.states(), vec!["A", "B"]);
    let entry = log.last("B").unwrap();
    assert_eq!(entry.input, json!("v"));
    assert_eq!(entry.incoming.as_deref(), Some("x"));
}

#[tokio::test]
async fn specific_transition_beats_wildcard() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let a = resolver(&engine, &log, "A", "t", json!(1));
    let b = resolver(&engine, &log, "B", "", json!(2));
    let decoy = resolver(&engine, &log, "Decoy", "bad", json!(0));
    engine.set_first_state(a).unwrap();
    engine.add_transition("", a, decoy).unwrap();
    engine.add_transition("t", a, b).unwrap();
    engine.add_terminal("", b).unwrap();

    let result = engine.run(&session()).unwrap().await;

    assert_eq!(result, Ok(Transition::new("", 2)));
    assert_eq!(log.states(), vec!["A", "B"]);
    assert_eq!(log.count("Decoy"), 0);
}

#[tokio::test]
async fn wildcard_transition_is_taken_for_unmapped_names() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let a = resolver(&engine, &log, "A", "anything", json!(1));
    let b = resolver(&engine, &log, "B", "output", json!(2));
    engine.set_first_state(a).unwrap();
    engine.add_transition("", a, b).unwrap();
    engine.add_terminal("", b).unwrap();

    engine.run(&session()).unwrap().await.unwrap();
    assert_eq!(log.last("B").unwrap().incoming.as_deref(), Some("anything"));
}

#[tokio::test]
async fn missing_transition_rejects_with_transition_error() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let a = resolver(&engine, &log, "First", "trans", Value::Null);
    let b = resolver(&engine, &log, "Last", "output", json!(42));
    engine.set_first_state(a).unwrap();
    engine.add_transition("notTrans", a, b).unwrap();
    engine.add_terminal("", b).unwrap();

    let err = engine.run(&session()).unwrap().await.unwrap_err();
    assert_eq!(
        err,
        RunError::Unhandled(Transition::new(
            "~TransitionError",
            "Unable to find transition trans on state First"
        ))
    );
}

#[tokio::test]
async fn error_transitions_produced_by_states_are_taken() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let a = resolver(&engine, &log, "A", "~trans.longForm", json!("detail"));
    let b = resolver(&engine, &log, "B", "output", json!(42));
    let decoy = resolver(&engine, &log, "Decoy", "bad", json!(0));
    engine.set_first_state(a).unwrap();
    engine.add_transition("~", a, decoy).unwrap();
    engine.add_transition("~trans", a, b).unwrap();
    engine.add_terminal("", b).unwrap();

    let result = engine.run(&session()).unwrap().await;

    assert_eq!(result, Ok(Transition::new("output", 42)));
    assert_eq!(log.count("Decoy"), 0);
    assert_eq!(
        log.last("B").unwrap().incoming.as_deref(),
        Some("~trans.longForm")
    );
}

#[tokio::test]
async fn most_specific_global_catch_handles_failure() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let a = rejecter(
        &engine,
        &log,
        "A",
        StateFailure::Transition(Transition::new("~a.b.c", "deep")),
    );
    let narrow = resolver(&engine, &log, "Narrow", "done", Value::Null);
    let broad = resolver(&engine, &log, "Broad", "done", Value::Null);
    engine.set_first_state(a).unwrap();
    engine.add_catch("~a", narrow).unwrap();
    engine.add_catch("~", broad).unwrap();
    engine.add_terminal("done", narrow).unwrap();
    engine.add_terminal("done", broad).unwrap();

    engine.run(&session()).unwrap().await.unwrap();

    assert_eq!(log.states(), vec!["A", "Narrow"]);
    assert_eq!(log.last("Narrow").unwrap().input, json!("deep"));
}

#[tokio::test]
async fn local_handlers_are_tried_before_global_catches() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let a = rejecter(&engine, &log, "A", StateFailure::from("oops"));
    let local = resolver(&engine, &log, "Local", "done", Value::Null);
    let global = resolver(&engine, &log, "Global", "done", Value::Null);
    engine.set_first_state(a).unwrap();
    engine.add_transition("~oops", a, local).unwrap();
    engine.add_catch("~oops", global).unwrap();
    engine.add_terminal("done", local).unwrap();
    engine.add_terminal("done", global).unwrap();

    engine.run(&session()).unwrap().await.unwrap();

    assert_eq!(log.states(), vec!["A", "Local"]);
}

#[tokio::test]
async fn concrete_two_state_scenario() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let a = resolver(&engine, &log, "A", "t", json!(1));
    let b = resolver(&engine, &log, "B", "", json!(2));
    engine.set_first_state(a).unwrap();
    engine.add_transition("t", a, b).unwrap();
    engine.add_terminal("", b).unwrap();

    let result = engine.run(&session()).unwrap().await;

    assert_eq!(result, Ok(Transition::new("", 2)));
    assert_eq!(log.states(), vec!["A", "B"]);
}
