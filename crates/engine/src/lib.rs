// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Switchyard execution engine
//!
//! Runs a graph of named asynchronous states as one or more logical threads
//! per session, with cooperative cancellation and hierarchical resolution of
//! error transitions.

mod decorator;
mod engine;
mod error;
mod graph;
mod handle;
mod state;
mod thread;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use decorator::{Decorator, DecoratorError, DecoratorInit, RunMode};
pub use engine::Engine;
pub use error::{EngineError, RunError};
pub use handle::RunHandle;
pub use state::{State, StateId};
pub use thread::ThreadContext;

pub use sy_core::{
    Cancelled, EngineConfig, Session, SessionId, StateFailure, ThreadId, Transition,
    MAIN_THREAD, WILDCARD,
};
