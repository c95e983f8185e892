// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion handle returned by a run

use crate::thread::CompletionSender;
use crate::RunError;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use sy_core::{SessionId, Transition};
use tokio::sync::oneshot;

/// Resolves once the main thread of a run settles.
///
/// `Ok` carries the terminal transition; `Err` carries the unmatched one, or
/// [`RunError::Stopped`] if the session was stopped first.
#[derive(Debug)]
pub struct RunHandle {
    session: SessionId,
    completion: oneshot::Receiver<Result<Transition, RunError>>,
}

impl RunHandle {
    pub(crate) fn channel(session: SessionId) -> (CompletionSender, Self) {
        let (tx, completion) = oneshot::channel();
        (
            tx,
            Self {
                session,
                completion,
            },
        )
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session
    }
}

impl Future for RunHandle {
    type Output = Result<Transition, RunError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().completion)
            .poll(cx)
            .map(|settled| settled.unwrap_or(Err(RunError::Stopped)))
    }
}
