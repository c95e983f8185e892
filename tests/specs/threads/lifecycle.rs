//! Secondary threads composed through decorators

use crate::prelude::*;
use similar_asserts::assert_eq;
use sy_states::{BeginThread, EndThread, InterruptThread};

#[tokio::test]
async fn main_thread_completion_tears_down_secondary_threads() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let main_gate = Gate::new("Main", &log);
    let side_gate = Gate::new("Side", &log);
    let main = engine.add_state("Main", main_gate.clone());
    let side = engine.add_state("Side", side_gate.clone());
    engine.set_first_state(main).unwrap();
    engine.add_terminal("", main).unwrap();
    let thread = engine
        .add_decorator(BeginThread::new(RunMode::BeforeState, side), Some(main))
        .unwrap();

    let s = session();
    let handle = engine.run(&s).unwrap();
    main_gate.entered().await;
    side_gate.entered().await;
    assert_eq!(engine.thread_ids(s.id()), vec![MAIN_THREAD, thread]);

    main_gate.release(Transition::wildcard(json!("done")));
    assert_eq!(handle.await, Ok(Transition::wildcard(json!("done"))));

    assert_eq!(side_gate.cancels(), 1);
    assert!(!engine.is_running(s.id()));
}

#[tokio::test]
async fn duplicate_start_and_unknown_stop_are_noops() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let main_gate = Gate::new("Main", &log);
    let side_gate = Gate::new("Side", &log);
    let main = engine.add_state("Main", main_gate.clone());
    let side = engine.add_state("Side", side_gate.clone());
    engine.set_first_state(main).unwrap();
    engine.add_terminal("", main).unwrap();

    let s = session();
    let handle = engine.run(&s).unwrap();
    main_gate.entered().await;

    let thread = engine.register_thread();
    engine.start_secondary_thread(thread, &s, side, Value::Null).unwrap();
    engine.start_secondary_thread(thread, &s, side, Value::Null).unwrap();
    side_gate.entered().await;
    engine.stop_secondary_thread(engine.register_thread(), s.id());

    assert_eq!(engine.thread_ids(s.id()), vec![MAIN_THREAD, thread]);
    assert_eq!(log.count("Side"), 1);

    main_gate.release(Transition::wildcard(Value::Null));
    handle.await.unwrap();
    assert_eq!(side_gate.cancels(), 1);
}

#[tokio::test]
async fn secondary_failure_never_reaches_run_caller() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let main_gate = Gate::new("Main", &log);
    let main = engine.add_state("Main", main_gate.clone());
    let broken = rejecter(&engine, &log, "Broken", StateFailure::error("Crash", "side"));
    engine.set_first_state(main).unwrap();
    engine.add_terminal("", main).unwrap();
    engine
        .add_decorator(BeginThread::new(RunMode::BeforeState, broken), Some(main))
        .unwrap();

    let s = session();
    let handle = engine.run(&s).unwrap();
    main_gate.entered().await;
    while engine.thread_ids(s.id()).len() > 1 {
        tokio::task::yield_now().await;
    }

    main_gate.release(Transition::wildcard(json!("fine")));
    assert_eq!(handle.await, Ok(Transition::wildcard(json!("fine"))));
    assert_eq!(log.count("Broken"), 1);
}

#[tokio::test]
async fn end_thread_stops_a_running_secondary_thread() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let start_gate = Gate::new("Start", &log);
    let finish_gate = Gate::new("Finish", &log);
    let side_gate = Gate::new("Side", &log);
    let start = engine.add_state("Start", start_gate.clone());
    let finish = engine.add_state("Finish", finish_gate.clone());
    let side = engine.add_state("Side", side_gate.clone());
    engine.set_first_state(start).unwrap();
    engine.add_transition("next", start, finish).unwrap();
    engine.add_terminal("", finish).unwrap();
    let thread = engine
        .add_decorator(BeginThread::new(RunMode::BeforeState, side), Some(start))
        .unwrap();
    engine
        .add_decorator(EndThread::new(RunMode::BeforeState, thread), Some(finish))
        .unwrap();

    let s = session();
    let handle = engine.run(&s).unwrap();
    start_gate.entered().await;
    side_gate.entered().await;
    assert_eq!(engine.thread_ids(s.id()), vec![MAIN_THREAD, thread]);

    start_gate.release(Transition::named("next"));
    finish_gate.entered().await;
    assert_eq!(engine.thread_ids(s.id()), vec![MAIN_THREAD]);
    assert_eq!(side_gate.cancels(), 1);

    finish_gate.release(Transition::wildcard(Value::Null));
    handle.await.unwrap();
    assert_eq!(side_gate.cancels(), 1);
}

#[tokio::test]
async fn secondary_thread_can_interrupt_main_thread() {
    let engine = Engine::<()>::new();
    let log = EntryLog::new();
    let main_gate = Gate::new("Main", &log);
    let main = engine.add_state("Main", main_gate.clone());
    let watchdog = resolver(&engine, &log, "Watchdog", "timeout", json!(30));
    let recover = resolver(&engine, &log, "Recover", "recovered", Value::Null);
    engine.set_first_state(main).unwrap();
    engine.add_terminal("timeout", watchdog).unwrap();
    engine.add_catch("timeout", recover).unwrap();
    engine.add_terminal("recovered", recover).unwrap();
    engine
        .add_decorator(BeginThread::new(RunMode::BeforeState, watchdog), Some(main))
        .unwrap();
    engine
        .add_decorator(
            InterruptThread::new(RunMode::AfterState, MAIN_THREAD),
            Some(watchdog),
        )
        .unwrap();

    let result = engine.run(&session()).unwrap().await;

    assert_eq!(result, Ok(Transition::named("recovered")));
    assert_eq!(main_gate.cancels(), 1);
    let entry = log.last("Recover").unwrap();
    assert_eq!(entry.incoming.as_deref(), Some("~timeout"));
    assert_eq!(entry.input, json!(30));
}
