// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine wrapper bound to one session at a time

use serde_json::Value;
use std::sync::{Arc, Mutex};
use sy_core::Session;
use sy_engine::{Engine, EngineError, RunHandle, StateId};

/// Runs at most one session and remembers it, so that `stop` and
/// `interrupt` need no session argument.
pub struct SingleSessionMachine<S> {
    engine: Engine<S>,
    session: Mutex<Option<Arc<Session<S>>>>,
}

impl<S: Send + Sync + 'static> SingleSessionMachine<S> {
    pub fn new(engine: Engine<S>) -> Self {
        Self {
            engine,
            session: Mutex::new(None),
        }
    }

    pub fn engine(&self) -> &Engine<S> {
        &self.engine
    }

    /// The remembered session, if any
    pub fn session(&self) -> Option<Arc<Session<S>>> {
        self.remembered().clone()
    }

    pub fn run(&self, session: &Arc<Session<S>>) -> Result<RunHandle, EngineError> {
        self.run_from(session, None, Value::Null)
    }

    /// Fails while the remembered session is still running
    pub fn run_from(
        &self,
        session: &Arc<Session<S>>,
        start: Option<StateId>,
        input: Value,
    ) -> Result<RunHandle, EngineError> {
        let mut remembered = self.remembered();
        if let Some(active) = remembered.as_ref() {
            if self.engine.is_running(active.id()) {
                return Err(EngineError::SessionAlreadyRunning(active.id().clone()));
            }
        }

        let handle = self.engine.run_from(session, start, input)?;
        *remembered = Some(Arc::clone(session));
        Ok(handle)
    }

    /// Stop the remembered session and forget it
    pub fn stop(&self) {
        let session = self.remembered().take();
        if let Some(session) = session {
            self.engine.stop(session.id());
        }
    }

    /// Interrupt the main thread of the remembered session
    pub fn interrupt(&self, name: &str, input: Value) -> Result<(), EngineError> {
        let session = self.session().ok_or(EngineError::NoActiveSession)?;
        self.engine.interrupt(session.id(), name, input)
    }

    fn remembered(&self) -> std::sync::MutexGuard<'_, Option<Arc<Session<S>>>> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "single_session_tests.rs"]
mod tests;
