// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instrumented states for testing engines
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::{
    Decorator, DecoratorError, DecoratorInit, Engine, RunMode, State, StateId, ThreadContext,
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use sy_core::{Session, StateFailure, Transition};
use tokio::sync::{oneshot, Notify};

/// One recorded state entry
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub state: String,
    pub input: Value,
    pub incoming: Option<String>,
}

/// Shared, ordered record of state entries
#[derive(Debug, Clone, Default)]
pub struct EntryLog {
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl EntryLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, state: &str, input: Value, incoming: Option<String>) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Entry {
                state: state.to_string(),
                input,
                incoming,
            });
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Names of the entered states, in order
    pub fn states(&self) -> Vec<String> {
        self.entries().into_iter().map(|entry| entry.state).collect()
    }

    /// The last entry of `state`
    pub fn last(&self, state: &str) -> Option<Entry> {
        self.entries()
            .into_iter()
            .rev()
            .find(|entry| entry.state == state)
    }

    pub fn count(&self, state: &str) -> usize {
        self.entries()
            .iter()
            .filter(|entry| entry.state == state)
            .count()
    }
}

/// Resolves with a fixed transition
pub struct Resolver {
    name: String,
    log: EntryLog,
    transition: Transition,
}

impl Resolver {
    pub fn new(name: impl Into<String>, log: &EntryLog, transition: Transition) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
            transition,
        }
    }
}

#[async_trait]
impl<S: Send + Sync + 'static> State<S> for Resolver {
    async fn enter(
        &self,
        _session: Arc<Session<S>>,
        _thread: ThreadContext,
        input: Value,
        incoming: Option<String>,
    ) -> Result<Transition, StateFailure> {
        self.log.record(&self.name, input, incoming);
        Ok(self.transition.clone())
    }
}

/// Fails with a fixed value
pub struct Rejecter {
    name: String,
    log: EntryLog,
    failure: StateFailure,
}

impl Rejecter {
    pub fn new(name: impl Into<String>, log: &EntryLog, failure: StateFailure) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
            failure,
        }
    }
}

#[async_trait]
impl<S: Send + Sync + 'static> State<S> for Rejecter {
    async fn enter(
        &self,
        _session: Arc<Session<S>>,
        _thread: ThreadContext,
        input: Value,
        incoming: Option<String>,
    ) -> Result<Transition, StateFailure> {
        self.log.record(&self.name, input, incoming);
        Err(self.failure.clone())
    }
}

/// Pends until released; counts how often its wait was cancelled.
///
/// Clones share the same gate, so a test can keep one clone while the
/// engine owns another.
#[derive(Clone)]
pub struct Gate {
    name: String,
    log: EntryLog,
    entered: Arc<Notify>,
    release: Arc<Mutex<Option<oneshot::Sender<Transition>>>>,
    cancels: Arc<AtomicUsize>,
}

impl Gate {
    pub fn new(name: impl Into<String>, log: &EntryLog) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
            entered: Arc::new(Notify::new()),
            release: Arc::new(Mutex::new(None)),
            cancels: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Wait until the gate has been entered (returns at once if it was
    /// entered since the last call)
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let the pending entry resolve with `transition`; false if nothing is
    /// pending
    pub fn release(&self, transition: Transition) -> bool {
        let pending = self
            .release
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        pending.is_some_and(|tx| tx.send(transition).is_ok())
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: Send + Sync + 'static> State<S> for Gate {
    async fn enter(
        &self,
        _session: Arc<Session<S>>,
        thread: ThreadContext,
        input: Value,
        incoming: Option<String>,
    ) -> Result<Transition, StateFailure> {
        self.log.record(&self.name, input, incoming);
        let (tx, rx) = oneshot::channel();
        *self.release.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);
        self.entered.notify_one();

        let cancels = Arc::clone(&self.cancels);
        let released = thread
            .wrap_with_cleanup(rx, move || {
                cancels.fetch_add(1, Ordering::SeqCst);
            })
            .await?;
        released.map_err(|_| StateFailure::error("GateDropped", "gate dropped before release"))
    }
}

type HookFn<S> = dyn Fn(&Engine<S>, &Arc<Session<S>>, StateId, &Transition) -> Result<(), DecoratorError>
    + Send
    + Sync;

/// Decorator backed by a closure
pub struct Hook<S> {
    mode: RunMode,
    body: Box<HookFn<S>>,
}

/// What a recording [`Hook`] saw at one boundary
pub type HookCall = (RunMode, StateId, Transition);

impl<S: Send + Sync + 'static> Hook<S> {
    pub fn new<F>(mode: RunMode, body: F) -> Self
    where
        F: Fn(&Engine<S>, &Arc<Session<S>>, StateId, &Transition) -> Result<(), DecoratorError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            mode,
            body: Box::new(body),
        }
    }

    /// Records every boundary it runs at into `calls`
    pub fn recording(mode: RunMode, calls: &Arc<Mutex<Vec<HookCall>>>) -> Self {
        let calls = Arc::clone(calls);
        Self::new(mode, move |_, _, state, transition| {
            calls
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push((mode, state, transition.clone()));
            Ok(())
        })
    }
}

impl<S: Send + Sync + 'static> Decorator<S> for Hook<S> {
    fn run_mode(&self) -> RunMode {
        self.mode
    }

    fn run(
        &self,
        engine: &Engine<S>,
        session: &Arc<Session<S>>,
        state: StateId,
        transition: &Transition,
    ) -> Result<(), DecoratorError> {
        (self.body)(engine, session, state, transition)
    }
}

impl<S> DecoratorInit<S> for Hook<S> {
    type Output = ();

    fn init(&mut self, _engine: &Engine<S>) {}
}
