//! Interrupting and stopping running sessions

use crate::prelude::*;
use similar_asserts::assert_eq;

#[tokio::test]
async fn interrupt_cancels_pending_state_and_resolves_error() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let gate = Gate::new("Waiting", &log);
    let first = engine.add_state("Waiting", gate.clone());
    let handler = resolver(&engine, &log, "Handler", "done", json!("handled"));
    engine.set_first_state(first).unwrap();
    engine.add_transition("~cancel", first, handler).unwrap();
    engine.add_terminal("done", handler).unwrap();

    let s = session();
    let handle = engine.run(&s).unwrap();
    gate.entered().await;
    engine.interrupt(s.id(), "cancel", json!({"by": "user"})).unwrap();

    assert_eq!(handle.await, Ok(Transition::new("done", "handled")));
    assert_eq!(gate.cancels(), 1);
    let entry = log.last("Handler").unwrap();
    assert_eq!(entry.incoming.as_deref(), Some("~cancel"));
    assert_eq!(entry.input, json!({"by": "user"}));
}

#[tokio::test]
async fn interrupt_on_idle_session_fails() {
    let engine = Engine::<()>::new();
    let s = session();
    assert_eq!(
        engine.interrupt(s.id(), "cancel", Value::Null),
        Err(EngineError::SessionNotRunning(s.id().clone()))
    );
}

#[tokio::test]
async fn stop_settles_run_as_stopped() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let gate = Gate::new("Waiting", &log);
    let first = engine.add_state("Waiting", gate.clone());
    engine.set_first_state(first).unwrap();

    let s = session();
    let handle = engine.run(&s).unwrap();
    gate.entered().await;
    engine.stop(s.id());

    assert_eq!(handle.await, Err(RunError::Stopped));
    assert_eq!(gate.cancels(), 1);
    assert!(!engine.is_running(s.id()));
}
