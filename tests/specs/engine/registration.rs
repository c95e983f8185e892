//! Graph registration rules

use crate::prelude::*;
use similar_asserts::assert_eq;

#[test]
fn second_first_state_is_rejected() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let first = resolver(&engine, &log, "First", "x", Value::Null);
    let other = resolver(&engine, &log, "Other", "x", Value::Null);

    engine.set_first_state(first).unwrap();
    assert_eq!(
        engine.set_first_state(other),
        Err(EngineError::FirstStateAlreadySet("First".to_string()))
    );
}

#[test]
fn duplicate_transition_name_on_one_state_is_rejected() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let first = resolver(&engine, &log, "First", "x", Value::Null);
    let a = resolver(&engine, &log, "A", "x", Value::Null);
    let b = resolver(&engine, &log, "B", "x", Value::Null);

    engine.add_transition("go", first, a).unwrap();
    assert!(matches!(
        engine.add_transition("go", first, b),
        Err(EngineError::DuplicateTransition { .. })
    ));

    // The same name on another state is fine
    engine.add_transition("go", a, b).unwrap();
}

#[test]
fn duplicate_global_catch_is_rejected() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let a = resolver(&engine, &log, "A", "x", Value::Null);
    let b = resolver(&engine, &log, "B", "x", Value::Null);

    engine.add_catch("~failed", a).unwrap();
    assert_eq!(
        engine.add_catch("failed", b),
        Err(EngineError::DuplicateCatch {
            name: "~failed".to_string()
        })
    );
}

#[tokio::test]
async fn run_on_running_session_fails_and_stop_on_idle_session_is_noop() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let gate = Gate::new("Gate", &log);
    let first = engine.add_state("Gate", gate.clone());
    engine.set_first_state(first).unwrap();
    engine.add_terminal("", first).unwrap();

    let idle = session();
    engine.stop(idle.id());
    assert!(!engine.is_running(idle.id()));

    let running = session();
    let handle = engine.run(&running).unwrap();
    assert!(matches!(
        engine.run(&running),
        Err(EngineError::SessionAlreadyRunning(_))
    ));

    gate.entered().await;
    gate.release(Transition::wildcard(json!("ok")));
    assert_eq!(handle.await, Ok(Transition::wildcard(json!("ok"))));
}
