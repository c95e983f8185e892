// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed delay state

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use sy_core::{Session, StateFailure, Transition};
use sy_engine::{State, ThreadContext};

/// Pauses the thread, then passes its input through unchanged.
///
/// Produces `(incoming, input)`, so a `Wait` is transparent to the
/// transition that led into it. An entry without an incoming transition
/// produces the wildcard.
#[derive(Debug, Clone, Copy)]
pub struct Wait {
    duration: Duration,
}

impl Wait {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

#[async_trait]
impl<S: Send + Sync + 'static> State<S> for Wait {
    async fn enter(
        &self,
        _session: Arc<Session<S>>,
        thread: ThreadContext,
        input: Value,
        incoming: Option<String>,
    ) -> Result<Transition, StateFailure> {
        let thread_id = thread.id();
        let duration = self.duration;
        thread
            .wrap_with_cleanup(tokio::time::sleep(duration), move || {
                tracing::debug!(thread = %thread_id, ?duration, "wait cancelled");
            })
            .await?;
        Ok(Transition::new(incoming.unwrap_or_default(), input))
    }
}

#[cfg(test)]
#[path = "wait_tests.rs"]
mod tests;
