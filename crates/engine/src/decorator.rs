// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Before/after-state hooks

use crate::{Engine, EngineError, StateId};
use std::sync::Arc;
use sy_core::{Session, Transition};
use thiserror::Error;

/// When a decorator runs relative to the state it is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Immediately before the state is entered, given the incoming transition
    BeforeState,
    /// After the state finishes, given the transition it produced
    AfterState,
}

/// Failure raised by a decorator; the engine turns it into an internal error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecoratorError {
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("{0}")]
    Failed(String),
    #[error("decorator panicked: {0}")]
    Panicked(String),
}

/// Hook attached to one state or, globally, to every state.
pub trait Decorator<S>: Send + Sync + 'static {
    fn run_mode(&self) -> RunMode;

    /// Called at every boundary matching [`Decorator::run_mode`]
    fn run(
        &self,
        engine: &Engine<S>,
        session: &Arc<Session<S>>,
        state: StateId,
        transition: &Transition,
    ) -> Result<(), DecoratorError>;
}

/// One-time setup performed when a decorator is registered
pub trait DecoratorInit<S> {
    type Output;

    fn init(&mut self, engine: &Engine<S>) -> Self::Output;
}
