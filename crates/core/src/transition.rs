// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transitions: the named edge plus payload that every state produces

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Name of the transition that accepts any unmapped non-error transition
pub const WILDCARD: &str = "";

/// Default character that begins an error transition name
pub const DEFAULT_ERROR_MARKER: char = '~';

/// Default separator between levels of an error transition name
pub const DEFAULT_HIERARCHY_SEPARATOR: char = '.';

/// A named control-flow edge plus its payload.
///
/// On the wire a transition is the two-element array `[name, payload]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(String, Value)", into = "(String, Value)")]
pub struct Transition {
    pub name: String,
    pub payload: Value,
}

impl Transition {
    pub fn new(name: impl Into<String>, payload: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }

    /// A transition with a `null` payload
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, Value::Null)
    }

    /// The wildcard transition carrying `payload`
    pub fn wildcard(payload: impl Into<Value>) -> Self {
        Self::new(WILDCARD, payload)
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == WILDCARD
    }
}

impl From<(String, Value)> for Transition {
    fn from((name, payload): (String, Value)) -> Self {
        Self { name, payload }
    }
}

impl From<Transition> for (String, Value) {
    fn from(transition: Transition) -> Self {
        (transition.name, transition.payload)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}, {}]", self.name, self.payload)
    }
}

#[cfg(test)]
#[path = "transition_tests.rs"]
mod tests;
