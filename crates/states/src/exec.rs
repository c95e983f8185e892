// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State backed by an async closure

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use sy_core::{Session, StateFailure, Transition};
use sy_engine::{State, ThreadContext};

/// Runs `body` on every entry.
///
/// The closure's future is registered with the thread, so stopping or
/// interrupting the thread discards whatever it would have produced.
pub struct Exec<F> {
    body: F,
}

impl<F> Exec<F> {
    pub fn new(body: F) -> Self {
        Self { body }
    }
}

#[async_trait]
impl<S, F, Fut> State<S> for Exec<F>
where
    S: Send + Sync + 'static,
    F: Fn(Arc<Session<S>>, ThreadContext, Value, Option<String>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Transition, StateFailure>> + Send + 'static,
{
    async fn enter(
        &self,
        session: Arc<Session<S>>,
        thread: ThreadContext,
        input: Value,
        incoming: Option<String>,
    ) -> Result<Transition, StateFailure> {
        let operation = (self.body)(session, thread.clone(), input, incoming);
        thread.wrap(operation).await?
    }
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
