// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! sy-states: ready-made states and decorators for Switchyard engines
//!
//! Everything here is built on the public engine surface:
//! - [`Exec`] runs an async closure as a state
//! - [`Wait`] pauses a thread for a fixed duration
//! - [`SubMachine`] runs a nested engine as one state
//! - [`BeginThread`], [`EndThread`] and [`InterruptThread`] compose
//!   parallel threads through decorators
//! - [`SingleSessionMachine`] remembers the one session it runs

mod exec;
mod single_session;
mod submachine;
mod threads;
mod wait;

pub use exec::Exec;
pub use single_session::SingleSessionMachine;
pub use submachine::SubMachine;
pub use threads::{BeginThread, EndThread, InterruptThread};
pub use wait::Wait;
