// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Nested engine run as a single state

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use sy_core::{Session, StateFailure, Transition};
use sy_engine::{Engine, RunError, State, ThreadContext};

/// Runs `machine` on the entering session, from its first state with this
/// state's input.
///
/// The nested run's terminal transition becomes this state's result. An
/// unhandled transition in the nested run is raised here as a failure, so
/// the outer graph can catch it. Cancelling the entry stops the nested run.
pub struct SubMachine<S> {
    machine: Engine<S>,
}

impl<S> SubMachine<S> {
    pub fn new(machine: Engine<S>) -> Self {
        Self { machine }
    }

    pub fn machine(&self) -> &Engine<S> {
        &self.machine
    }
}

#[async_trait]
impl<S: Send + Sync + 'static> State<S> for SubMachine<S> {
    async fn enter(
        &self,
        session: Arc<Session<S>>,
        thread: ThreadContext,
        input: Value,
        _incoming: Option<String>,
    ) -> Result<Transition, StateFailure> {
        let handle = self
            .machine
            .run_from(&session, None, input)
            .map_err(|e| StateFailure::error("EngineError", e))?;

        let machine = self.machine.clone();
        let session_id = session.id().clone();
        let settled = thread
            .wrap_with_cleanup(handle, move || machine.stop(&session_id))
            .await?;

        match settled {
            Ok(transition) => Ok(transition),
            Err(RunError::Unhandled(transition)) => Err(StateFailure::Transition(transition)),
            Err(e @ RunError::Stopped) => Err(StateFailure::error("Stopped", e)),
        }
    }
}

#[cfg(test)]
#[path = "submachine_tests.rs"]
mod tests;
