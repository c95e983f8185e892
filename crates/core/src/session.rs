// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Caller-owned session context

use crate::id::SessionId;
use std::ops::Deref;

/// Caller data correlated with a set of running threads.
///
/// The engine keys its registry by [`Session::id`] and never mutates the
/// data; states that need shared mutable context use interior mutability.
#[derive(Debug)]
pub struct Session<S> {
    id: SessionId,
    data: S,
}

impl<S> Session<S> {
    pub fn new(data: S) -> Self {
        Self::with_id(SessionId::new(), data)
    }

    pub fn with_id(id: impl Into<SessionId>, data: S) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn data(&self) -> &S {
        &self.data
    }
}

impl<S> Deref for Session<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.data
    }
}
