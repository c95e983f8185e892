// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Threads: execution cursors within a session

use crate::{RunError, StateId};
use std::future::Future;
use sy_core::{CancelScope, Cancelled, ThreadId, Transition};
use tokio::sync::oneshot;

pub(crate) type CompletionSender = oneshot::Sender<Result<Transition, RunError>>;

/// Bookkeeping for one running thread
pub(crate) struct Thread {
    pub(crate) current: StateId,
    /// Scope of the entry in progress; replaced at every entry
    pub(crate) scope: CancelScope,
    pub(crate) completion: Completion,
}

pub(crate) enum Completion {
    /// Settles the caller's run handle
    Main(CompletionSender),
    /// Settlement only removes the thread
    Secondary,
}

impl Thread {
    pub(crate) fn new(current: StateId, scope: CancelScope, completion: Completion) -> Self {
        Self {
            current,
            scope,
            completion,
        }
    }
}

/// The view of its thread a running state body receives
#[derive(Debug, Clone)]
pub struct ThreadContext {
    id: ThreadId,
    scope: CancelScope,
}

impl ThreadContext {
    pub(crate) fn new(id: ThreadId, scope: CancelScope) -> Self {
        Self { id, scope }
    }

    pub fn id(&self) -> ThreadId {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.scope.is_cancelled()
    }

    /// Register `operation` with the current entry so that stopping or
    /// interrupting the thread discards its outcome.
    pub async fn wrap<F: Future>(&self, operation: F) -> Result<F::Output, Cancelled> {
        self.scope.wrap(operation, None).await
    }

    /// Like [`ThreadContext::wrap`], firing `on_cancel` synchronously if the
    /// operation is discarded
    pub async fn wrap_with_cleanup<F, C>(
        &self,
        operation: F,
        on_cancel: C,
    ) -> Result<F::Output, Cancelled>
    where
        F: Future,
        C: FnOnce() + Send + 'static,
    {
        self.scope.wrap(operation, Some(Box::new(on_cancel))).await
    }
}
