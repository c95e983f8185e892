// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler for running state graphs
//!
//! Every state entry of every thread runs as one step of a spawned driver
//! task. The per-session thread registry is the only shared mutable state;
//! it is touched synchronously and never while user code (state bodies,
//! decorators, cleanups) runs. A step commits its result only if its entry
//! is still the thread's current one, which is how interrupted and stopped
//! work gets discarded.

use crate::graph::{Graph, Next};
use crate::thread::{Completion, Thread};
use crate::{
    Decorator, DecoratorError, DecoratorInit, EngineError, RunError, RunHandle, RunMode, State,
    StateId, ThreadContext,
};
use futures_util::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard};
use sy_core::{
    CancelScope, EngineConfig, ErrorHierarchy, ScopeId, Session, SessionId, StateFailure,
    ThreadId, Transition, MAIN_THREAD,
};
use tracing::Instrument;

/// Error kind raised when a decorator fails
const INTERNAL_ERROR: &str = "InternalError";

/// Handle to a state-graph engine; clones share the same graph and registry
pub struct Engine<S> {
    inner: Arc<EngineInner<S>>,
}

struct EngineInner<S> {
    config: EngineConfig,
    hierarchy: ErrorHierarchy,
    graph: RwLock<Graph<S>>,
    next_thread_id: AtomicU64,
    sessions: Mutex<HashMap<SessionId, SessionThreads<S>>>,
}

/// Threads running for one session
struct SessionThreads<S> {
    session: Arc<Session<S>>,
    threads: HashMap<ThreadId, Thread>,
}

/// One committed state entry, ready to be driven
struct Entry {
    state: StateId,
    scope: CancelScope,
    input: Value,
    incoming: Option<String>,
}

impl<S> Clone for Engine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Send + Sync + 'static> Default for Engine<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Send + Sync + 'static> Engine<S> {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                hierarchy: config.hierarchy(),
                config,
                graph: RwLock::new(Graph::default()),
                next_thread_id: AtomicU64::new(MAIN_THREAD.0 + 1),
                sessions: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn hierarchy(&self) -> ErrorHierarchy {
        self.inner.hierarchy
    }

    // -- Registration ------------------------------------------------------

    /// Register a state body under a diagnostic name
    pub fn add_state(&self, name: impl Into<String>, body: impl State<S>) -> StateId {
        self.graph_mut().add_state(name.into(), Arc::new(body))
    }

    /// Register the state `run` starts from; may be set only once
    pub fn set_first_state(&self, dest: StateId) -> Result<(), EngineError> {
        self.graph_mut().set_first_state(dest)
    }

    /// Register a global catch for the error transition `name`.
    ///
    /// The error marker is added if `name` lacks it.
    pub fn add_catch(&self, name: &str, dest: StateId) -> Result<(), EngineError> {
        let name = self.inner.hierarchy.normalize(name);
        self.graph_mut().add_catch(name, dest)
    }

    /// Register `name` as a terminal transition of `source`
    pub fn add_terminal(&self, name: &str, source: StateId) -> Result<(), EngineError> {
        self.graph_mut().add_transition(name.to_string(), source, None)
    }

    /// Register `name` as the transition from `source` to `dest`
    pub fn add_transition(
        &self,
        name: &str,
        source: StateId,
        dest: StateId,
    ) -> Result<(), EngineError> {
        self.graph_mut()
            .add_transition(name.to_string(), source, Some(dest))
    }

    /// Attach a decorator to `target`, or globally when `target` is `None`.
    ///
    /// Returns whatever the decorator's `init` produces.
    pub fn add_decorator<D>(
        &self,
        mut decorator: D,
        target: Option<StateId>,
    ) -> Result<D::Output, EngineError>
    where
        D: Decorator<S> + DecoratorInit<S>,
    {
        if let Some(state) = target {
            self.graph().node(state)?;
        }
        let output = decorator.init(self);
        self.graph_mut().add_decorator(Arc::new(decorator), target)?;
        Ok(output)
    }

    pub fn state_name(&self, state: StateId) -> Option<String> {
        self.graph().node(state).ok().map(|node| node.name.clone())
    }

    // -- Runs --------------------------------------------------------------

    /// Run `session` from the first state with a `null` input
    pub fn run(&self, session: &Arc<Session<S>>) -> Result<RunHandle, EngineError> {
        self.run_from(session, None, Value::Null)
    }

    /// Run `session` from `start` (default: the first state) with `input`.
    ///
    /// Fails if the session is already running. When the returned handle
    /// settles, every other thread of the session has already been stopped.
    /// Must be called within a tokio runtime.
    pub fn run_from(
        &self,
        session: &Arc<Session<S>>,
        start: Option<StateId>,
        input: Value,
    ) -> Result<RunHandle, EngineError> {
        let start = {
            let graph = self.graph();
            match start {
                Some(state) => graph.node(state).map(|_| state)?,
                None => graph.first_state().ok_or(EngineError::NoFirstState)?,
            }
        };

        let id = session.id().clone();
        let scope = CancelScope::new();
        let (tx, handle) = RunHandle::channel(id.clone());
        {
            let mut sessions = self.sessions();
            if sessions.contains_key(&id) {
                return Err(EngineError::SessionAlreadyRunning(id));
            }
            let threads = HashMap::from([(
                MAIN_THREAD,
                Thread::new(start, scope.clone(), Completion::Main(tx)),
            )]);
            sessions.insert(
                id.clone(),
                SessionThreads {
                    session: Arc::clone(session),
                    threads,
                },
            );
        }

        tracing::info!(session = %id, state = start.index(), "run started");
        self.spawn_entry(
            Arc::clone(session),
            MAIN_THREAD,
            Entry {
                state: start,
                scope,
                input,
                incoming: None,
            },
        );
        Ok(handle)
    }

    /// Cancel every thread of `session` and forget it. No-op if not running.
    ///
    /// A pending run handle for the session resolves to [`RunError::Stopped`].
    pub fn stop(&self, session: &SessionId) {
        let Some(registry) = self.sessions().remove(session) else {
            return;
        };

        tracing::info!(session = %session, threads = registry.threads.len(), "stopping session");
        for (id, thread) in registry.threads {
            let discarded = thread.scope.cancel();
            tracing::debug!(session = %session, thread = %id, discarded, "thread stopped");
        }
    }

    /// Interrupt the main thread with the error transition `name`
    pub fn interrupt(
        &self,
        session: &SessionId,
        name: &str,
        input: Value,
    ) -> Result<(), EngineError> {
        self.interrupt_thread(MAIN_THREAD, session, name, input)
    }

    pub fn is_running(&self, session: &SessionId) -> bool {
        self.sessions().contains_key(session)
    }

    /// Ids of the threads currently active for `session`, in order
    pub fn thread_ids(&self, session: &SessionId) -> Vec<ThreadId> {
        let mut ids: Vec<ThreadId> = self
            .sessions()
            .get(session)
            .map(|registry| registry.threads.keys().copied().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    // -- Thread lifecycle (for decorators) ----------------------------------

    /// Reserve a fresh thread id
    pub fn register_thread(&self) -> ThreadId {
        ThreadId(self.inner.next_thread_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Start thread `id` of `session` at `start`.
    ///
    /// Does nothing if that thread is already active. The thread is removed
    /// when it settles; a failure is logged and otherwise ignored.
    pub fn start_secondary_thread(
        &self,
        id: ThreadId,
        session: &Arc<Session<S>>,
        start: StateId,
        input: Value,
    ) -> Result<(), EngineError> {
        self.graph().node(start)?;

        let scope = CancelScope::new();
        {
            let mut sessions = self.sessions();
            let registry = sessions
                .get_mut(session.id())
                .ok_or_else(|| EngineError::SessionNotRunning(session.id().clone()))?;
            if registry.threads.contains_key(&id) {
                tracing::debug!(session = %session.id(), thread = %id, "thread already running");
                return Ok(());
            }
            registry.threads.insert(
                id,
                Thread::new(start, scope.clone(), Completion::Secondary),
            );
        }

        tracing::info!(session = %session.id(), thread = %id, state = start.index(), "thread started");
        self.spawn_entry(
            Arc::clone(session),
            id,
            Entry {
                state: start,
                scope,
                input,
                incoming: None,
            },
        );
        Ok(())
    }

    /// Cancel and remove secondary thread `id`. No-op if it is not active.
    pub fn stop_secondary_thread(&self, id: ThreadId, session: &SessionId) {
        if id.is_main() {
            tracing::warn!(session = %session, "refusing to stop the main thread as a secondary thread");
            return;
        }

        let thread = self
            .sessions()
            .get_mut(session)
            .and_then(|registry| registry.threads.remove(&id));
        if let Some(thread) = thread {
            let discarded = thread.scope.cancel();
            tracing::info!(session = %session, thread = %id, discarded, "thread stopped");
        }
    }

    /// Abandon the entry thread `id` is running and resolve as if its state
    /// had failed with the error transition `name`.
    pub fn interrupt_thread(
        &self,
        id: ThreadId,
        session: &SessionId,
        name: &str,
        input: Value,
    ) -> Result<(), EngineError> {
        let fresh = CancelScope::new();
        let (owner, current, stale) = {
            let mut sessions = self.sessions();
            let registry = sessions
                .get_mut(session)
                .ok_or_else(|| EngineError::SessionNotRunning(session.clone()))?;
            let owner = Arc::clone(&registry.session);
            let thread = registry
                .threads
                .get_mut(&id)
                .ok_or_else(|| EngineError::ThreadNotRunning {
                    thread: id,
                    session: session.clone(),
                })?;
            // Swapping the scope first means the abandoned step can no longer commit
            let stale = std::mem::replace(&mut thread.scope, fresh.clone());
            (owner, thread.current, stale)
        };

        let discarded = stale.cancel();
        let transition = Transition::new(self.inner.hierarchy.normalize(name), input);
        tracing::info!(
            session = %session,
            thread = %id,
            transition = %transition.name,
            discarded,
            "thread interrupted"
        );

        let next = self.resolve(current, transition);
        if let Some(entry) = self.commit(session, id, fresh.id(), next) {
            self.spawn_entry(owner, id, entry);
        }
        Ok(())
    }

    // -- Driving -----------------------------------------------------------

    fn spawn_entry(&self, session: Arc<Session<S>>, thread: ThreadId, entry: Entry) {
        let engine = self.clone();
        tokio::spawn(async move { engine.drive(session, thread, entry).await });
    }

    async fn drive(self, session: Arc<Session<S>>, thread: ThreadId, mut entry: Entry) {
        loop {
            let span = tracing::info_span!(
                "state",
                session = %session.id(),
                thread = %thread,
                state = %self.state_name(entry.state).unwrap_or_default(),
            );
            match self.step(&session, thread, entry).instrument(span).await {
                Some(next) => entry = next,
                None => return,
            }
        }
    }

    /// Run one state entry; returns the next entry if this thread continues
    async fn step(
        &self,
        session: &Arc<Session<S>>,
        thread: ThreadId,
        entry: Entry,
    ) -> Option<Entry> {
        let (body, before, after) = {
            let graph = self.graph();
            let node = match graph.node(entry.state) {
                Ok(node) => node,
                Err(e) => {
                    drop(graph);
                    let next = Next::Unhandled(self.internal_error(e));
                    return self.commit(session.id(), thread, entry.scope.id(), next);
                }
            };
            (
                Arc::clone(&node.body),
                graph.decorators_for(entry.state, RunMode::BeforeState),
                graph.decorators_for(entry.state, RunMode::AfterState),
            )
        };

        if entry.scope.is_cancelled() {
            tracing::debug!("entry discarded before entering");
            return None;
        }

        let incoming = Transition::new(
            entry.incoming.clone().unwrap_or_default(),
            entry.input.clone(),
        );
        if let Err(e) = self.run_decorators(&before, session, entry.state, &incoming) {
            let next = Next::Unhandled(self.internal_error(e));
            return self.commit(session.id(), thread, entry.scope.id(), next);
        }

        tracing::debug!(incoming = %incoming.name, "entering");
        let context = ThreadContext::new(thread, entry.scope.clone());
        let body = AssertUnwindSafe(body.enter(
            Arc::clone(session),
            context,
            entry.input,
            entry.incoming,
        ))
        .catch_unwind();
        let result = match entry.scope.wrap(body, None).await {
            Ok(Ok(Ok(transition))) => transition,
            Ok(Ok(Err(failure))) => failure.into_transition(&self.inner.hierarchy),
            Ok(Err(panic)) => {
                let message = panic_message(panic.as_ref());
                tracing::warn!(panic = %message, "state panicked");
                StateFailure::unknown(message).into_transition(&self.inner.hierarchy)
            }
            Err(_) => {
                tracing::debug!("entry discarded");
                return None;
            }
        };
        if entry.scope.is_cancelled() {
            tracing::debug!(transition = %result.name, "entry discarded after completion");
            return None;
        }

        if let Err(e) = self.run_decorators(&after, session, entry.state, &result) {
            let next = Next::Unhandled(self.internal_error(e));
            return self.commit(session.id(), thread, entry.scope.id(), next);
        }

        tracing::debug!(transition = %result.name, "state finished");
        let next = self.resolve(entry.state, result);
        self.commit(session.id(), thread, entry.scope.id(), next)
    }

    fn run_decorators(
        &self,
        decorators: &[Arc<dyn Decorator<S>>],
        session: &Arc<Session<S>>,
        state: StateId,
        transition: &Transition,
    ) -> Result<(), DecoratorError> {
        for decorator in decorators {
            let run = std::panic::catch_unwind(AssertUnwindSafe(|| {
                decorator.run(self, session, state, transition)
            }));
            match run {
                Ok(result) => result?,
                Err(panic) => {
                    return Err(DecoratorError::Panicked(panic_message(panic.as_ref())));
                }
            }
        }
        Ok(())
    }

    fn resolve(&self, from: StateId, result: Transition) -> Next {
        self.graph().resolve(from, result, &self.inner.hierarchy)
    }

    fn internal_error(&self, error: impl std::fmt::Display) -> Transition {
        tracing::warn!(error = %error, "internal error");
        Transition::new(
            self.inner.hierarchy.prefixed(INTERNAL_ERROR),
            error.to_string(),
        )
    }

    /// Apply `next` to the thread if `expected` is still its current scope.
    ///
    /// Returns the entry to drive next, or `None` if the thread settled or
    /// the result was stale.
    fn commit(
        &self,
        session: &SessionId,
        thread_id: ThreadId,
        expected: ScopeId,
        next: Next,
    ) -> Option<Entry> {
        let mut sessions = self.sessions();
        let thread = sessions
            .get_mut(session)
            .and_then(|registry| registry.threads.get_mut(&thread_id))?;
        if thread.scope.id() != expected {
            tracing::debug!(session = %session, thread = %thread_id, "stale result discarded");
            return None;
        }

        match next {
            Next::Enter {
                state,
                input,
                incoming,
            } => {
                tracing::debug!(
                    session = %session,
                    thread = %thread_id,
                    transition = %incoming,
                    to = state.index(),
                    "transition taken"
                );
                let scope = CancelScope::new();
                thread.current = state;
                thread.scope = scope.clone();
                Some(Entry {
                    state,
                    scope,
                    input,
                    incoming: Some(incoming),
                })
            }
            Next::Complete(transition) => {
                self.settle(sessions, session, thread_id, Ok(transition));
                None
            }
            Next::Unhandled(transition) => {
                tracing::warn!(
                    session = %session,
                    thread = %thread_id,
                    transition = %transition.name,
                    "no handler for transition"
                );
                self.settle(sessions, session, thread_id, Err(RunError::Unhandled(transition)));
                None
            }
        }
    }

    /// Settle a thread. Settling the main thread tears down the whole
    /// session before the outcome reaches the run handle.
    fn settle(
        &self,
        mut sessions: MutexGuard<'_, HashMap<SessionId, SessionThreads<S>>>,
        session: &SessionId,
        thread_id: ThreadId,
        outcome: Result<Transition, RunError>,
    ) {
        let is_main = sessions
            .get(session)
            .and_then(|registry| registry.threads.get(&thread_id))
            .is_some_and(|thread| matches!(thread.completion, Completion::Main(_)));

        if !is_main {
            let removed = sessions
                .get_mut(session)
                .and_then(|registry| registry.threads.remove(&thread_id));
            drop(sessions);
            if removed.is_some() {
                match &outcome {
                    Ok(transition) => tracing::info!(
                        session = %session,
                        thread = %thread_id,
                        transition = %transition.name,
                        "thread completed"
                    ),
                    Err(e) => tracing::debug!(
                        session = %session,
                        thread = %thread_id,
                        error = %e,
                        "thread failed; ignored"
                    ),
                }
            }
            return;
        }

        let Some(registry) = sessions.remove(session) else {
            return;
        };
        drop(sessions);

        let mut completion = None;
        for (id, thread) in registry.threads {
            let discarded = thread.scope.cancel();
            if id != thread_id {
                tracing::debug!(session = %session, thread = %id, discarded, "thread torn down");
            }
            if let Completion::Main(tx) = thread.completion {
                completion = Some(tx);
            }
        }

        match &outcome {
            Ok(transition) => {
                tracing::info!(session = %session, transition = %transition.name, "run completed")
            }
            Err(e) => tracing::info!(session = %session, error = %e, "run failed"),
        }
        if let Some(tx) = completion {
            // The caller may have dropped the handle
            let _ = tx.send(outcome);
        }
    }

    fn graph(&self) -> RwLockReadGuard<'_, Graph<S>> {
        self.inner.graph.read().unwrap_or_else(|e| e.into_inner())
    }

    fn graph_mut(&self) -> std::sync::RwLockWriteGuard<'_, Graph<S>> {
        self.inner.graph.write().unwrap_or_else(|e| e.into_inner())
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, SessionThreads<S>>> {
        self.inner.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
