// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The capability every state body provides

use crate::ThreadContext;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use sy_core::{Session, StateFailure, Transition};

/// Handle to a state registered with an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub(crate) usize);

impl StateId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state#{}", self.0)
    }
}

/// Body of a state.
///
/// `enter` runs once per entry. Any awaiting it does that should stop when
/// the thread is stopped or interrupted must go through
/// [`ThreadContext::wrap`] or [`ThreadContext::wrap_with_cleanup`].
#[async_trait]
pub trait State<S>: Send + Sync + 'static {
    async fn enter(
        &self,
        session: Arc<Session<S>>,
        thread: ThreadContext,
        input: Value,
        incoming: Option<String>,
    ) -> Result<Transition, StateFailure>;
}
