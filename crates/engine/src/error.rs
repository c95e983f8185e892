// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use crate::StateId;
use sy_core::{SessionId, ThreadId, Transition};
use thiserror::Error;

/// Registration and lifecycle failures, reported synchronously
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("first state is already set to {0}")]
    FirstStateAlreadySet(String),
    #[error("global catch for {name} is already set")]
    DuplicateCatch { name: String },
    #[error("state {state} already has a transition with the name {name:?}")]
    DuplicateTransition { state: String, name: String },
    #[error("unknown state: {0}")]
    UnknownState(StateId),
    #[error("no first state registered")]
    NoFirstState,
    #[error("session already running: {0}")]
    SessionAlreadyRunning(SessionId),
    #[error("session not running: {0}")]
    SessionNotRunning(SessionId),
    #[error("unable to interrupt {thread} of session {session} because it isn't running")]
    ThreadNotRunning { thread: ThreadId, session: SessionId },
    #[error("no active session")]
    NoActiveSession,
}

/// How a run settles when it does not complete gracefully
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    /// No handler matched; carries the raw transition
    #[error("unhandled transition {0}")]
    Unhandled(Transition),
    /// The session was stopped before the main thread settled
    #[error("run stopped before completion")]
    Stopped,
}

impl RunError {
    /// The unmatched transition, if the run ended on one
    pub fn transition(&self) -> Option<&Transition> {
        match self {
            Self::Unhandled(transition) => Some(transition),
            Self::Stopped => None,
        }
    }
}
