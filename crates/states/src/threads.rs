// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decorators that compose parallel threads

use serde_json::Value;
use std::sync::Arc;
use sy_core::{Session, ThreadId, Transition};
use sy_engine::{Decorator, DecoratorError, DecoratorInit, Engine, RunMode, StateId};

/// Starts a secondary thread at `start` whenever it runs.
///
/// Registering it reserves the thread id, which [`EndThread`] and
/// [`InterruptThread`] use to address the thread. Running it again while
/// the thread is still active does nothing.
#[derive(Debug)]
pub struct BeginThread {
    mode: RunMode,
    start: StateId,
    thread: Option<ThreadId>,
}

impl BeginThread {
    pub fn new(mode: RunMode, start: StateId) -> Self {
        Self {
            mode,
            start,
            thread: None,
        }
    }
}

impl<S: Send + Sync + 'static> DecoratorInit<S> for BeginThread {
    type Output = ThreadId;

    fn init(&mut self, engine: &Engine<S>) -> ThreadId {
        let id = engine.register_thread();
        self.thread = Some(id);
        id
    }
}

impl<S: Send + Sync + 'static> Decorator<S> for BeginThread {
    fn run_mode(&self) -> RunMode {
        self.mode
    }

    fn run(
        &self,
        engine: &Engine<S>,
        session: &Arc<Session<S>>,
        _state: StateId,
        _transition: &Transition,
    ) -> Result<(), DecoratorError> {
        let id = self
            .thread
            .ok_or_else(|| DecoratorError::Failed("thread id was never registered".to_string()))?;
        engine.start_secondary_thread(id, session, self.start, Value::Null)?;
        Ok(())
    }
}

/// Stops a secondary thread whenever it runs
#[derive(Debug)]
pub struct EndThread {
    mode: RunMode,
    thread: ThreadId,
}

impl EndThread {
    pub fn new(mode: RunMode, thread: ThreadId) -> Self {
        Self { mode, thread }
    }
}

impl<S: Send + Sync + 'static> DecoratorInit<S> for EndThread {
    type Output = ();

    fn init(&mut self, _engine: &Engine<S>) {}
}

impl<S: Send + Sync + 'static> Decorator<S> for EndThread {
    fn run_mode(&self) -> RunMode {
        self.mode
    }

    fn run(
        &self,
        engine: &Engine<S>,
        session: &Arc<Session<S>>,
        _state: StateId,
        _transition: &Transition,
    ) -> Result<(), DecoratorError> {
        engine.stop_secondary_thread(self.thread, session.id());
        Ok(())
    }
}

/// Interrupts a thread, the main one included, whenever it runs.
///
/// Without a fixed transition, the transition observed at the boundary is
/// forwarded (as an error transition).
#[derive(Debug)]
pub struct InterruptThread {
    mode: RunMode,
    thread: ThreadId,
    transition: Option<Transition>,
}

impl InterruptThread {
    pub fn new(mode: RunMode, thread: ThreadId) -> Self {
        Self {
            mode,
            thread,
            transition: None,
        }
    }

    /// Always interrupt with `transition`
    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }
}

impl<S: Send + Sync + 'static> DecoratorInit<S> for InterruptThread {
    type Output = ();

    fn init(&mut self, _engine: &Engine<S>) {}
}

impl<S: Send + Sync + 'static> Decorator<S> for InterruptThread {
    fn run_mode(&self) -> RunMode {
        self.mode
    }

    fn run(
        &self,
        engine: &Engine<S>,
        session: &Arc<Session<S>>,
        _state: StateId,
        transition: &Transition,
    ) -> Result<(), DecoratorError> {
        let interrupt = self.transition.as_ref().unwrap_or(transition);
        engine.interrupt_thread(
            self.thread,
            session.id(),
            &interrupt.name,
            interrupt.payload.clone(),
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "threads_tests.rs"]
mod tests;
