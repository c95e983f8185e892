// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sy-core: leaf types for the Switchyard state-graph runtime
//!
//! This crate provides:
//! - Transitions, the `[name, payload]` pair every state produces
//! - Error hierarchy expansion for error transitions
//! - Cancellation scopes for in-flight work of one state entry
//! - Coercion of failed state entries into error transitions
//! - Session handles and engine configuration

pub mod cancel;
pub mod config;
pub mod failure;
pub mod hierarchy;
pub mod id;
pub mod session;
pub mod transition;

pub use cancel::{CancelHandler, CancelScope, Cancelled, ScopeId};
pub use config::{ConfigError, EngineConfig};
pub use failure::{StateFailure, UNKNOWN_ERROR};
pub use hierarchy::ErrorHierarchy;
pub use id::{SessionId, ThreadId, MAIN_THREAD};
pub use session::Session;
pub use transition::{
    Transition, DEFAULT_ERROR_MARKER, DEFAULT_HIERARCHY_SEPARATOR, WILDCARD,
};
