// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cancellation scopes
//!
//! A scope tracks the outstanding operations of one state entry. Cancelling
//! it discards the eventual outcome of every outstanding operation and fires
//! each one's cleanup. It cannot stop code that is already executing: work
//! the operation spawned elsewhere keeps running and its result is ignored.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::watch;

/// Cleanup callback fired synchronously when a wrapped operation is cancelled
pub type CancelHandler = Box<dyn FnOnce() + Send + 'static>;

/// Outcome of a wrapped operation whose scope was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one scope; a fresh scope never reuses an id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope-{}", self.0)
    }
}

/// Registry of in-flight operations for one state entry
#[derive(Clone)]
pub struct CancelScope {
    inner: Arc<ScopeInner>,
}

struct ScopeInner {
    id: ScopeId,
    cancelled: watch::Sender<bool>,
    outstanding: Mutex<Outstanding>,
}

#[derive(Default)]
struct Outstanding {
    next_token: u64,
    cleanups: HashMap<u64, Option<CancelHandler>>,
}

impl CancelScope {
    pub fn new() -> Self {
        let (cancelled, _) = watch::channel(false);
        Self {
            inner: Arc::new(ScopeInner {
                id: ScopeId(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed)),
                cancelled,
                outstanding: Mutex::new(Outstanding::default()),
            }),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.inner.id
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.borrow()
    }

    /// Number of wrapped operations that have neither finished nor been cancelled
    pub fn outstanding(&self) -> usize {
        self.lock().cleanups.len()
    }

    /// Run `operation` as part of this scope.
    ///
    /// Resolves to `Err(Cancelled)` if the scope is cancelled before the
    /// operation finishes; `on_cancel` then fires exactly once. Wrapping into
    /// a scope that is already cancelled fires `on_cancel` immediately and
    /// never polls the operation.
    pub async fn wrap<F>(
        &self,
        operation: F,
        on_cancel: Option<CancelHandler>,
    ) -> Result<F::Output, Cancelled>
    where
        F: Future,
    {
        let Some(token) = self.register(on_cancel) else {
            return Err(Cancelled);
        };

        let mut cancelled = self.inner.cancelled.subscribe();
        let output = tokio::select! {
            biased;
            _ = cancelled.wait_for(|cancelled| *cancelled) => None,
            output = operation => Some(output),
        };

        match output {
            // The operation can finish in the same instant the scope is
            // cancelled; its cleanup has fired, so the output is discarded.
            Some(output) if self.release(token) => Ok(output),
            _ => Err(Cancelled),
        }
    }

    /// Cancel every outstanding operation, firing cleanups in registration order.
    ///
    /// Returns the number of operations discarded. Cancelling twice is a no-op.
    pub fn cancel(&self) -> usize {
        if self.inner.cancelled.send_replace(true) {
            return 0;
        }

        let mut handlers: Vec<(u64, Option<CancelHandler>)> =
            self.lock().cleanups.drain().collect();
        handlers.sort_by_key(|(token, _)| *token);

        let discarded = handlers.len();
        for handler in handlers.into_iter().filter_map(|(_, handler)| handler) {
            handler();
        }
        discarded
    }

    fn register(&self, on_cancel: Option<CancelHandler>) -> Option<u64> {
        let mut outstanding = self.lock();
        if self.is_cancelled() {
            drop(outstanding);
            if let Some(handler) = on_cancel {
                handler();
            }
            return None;
        }

        let token = outstanding.next_token;
        outstanding.next_token += 1;
        outstanding.cleanups.insert(token, on_cancel);
        Some(token)
    }

    /// Remove a finished operation. Returns false if cancel already claimed it.
    fn release(&self, token: u64) -> bool {
        self.lock().cleanups.remove(&token).is_some()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Outstanding> {
        self.inner
            .outstanding
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for CancelScope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelScope")
            .field("id", &self.inner.id)
            .field("cancelled", &self.is_cancelled())
            .field("outstanding", &self.outstanding())
            .finish()
    }
}

#[cfg(test)]
#[path = "cancel_tests.rs"]
mod tests;
