// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failed state entries and their coercion into error transitions

use crate::cancel::Cancelled;
use crate::hierarchy::ErrorHierarchy;
use crate::transition::Transition;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Error kind used when a failure cannot be classified
pub const UNKNOWN_ERROR: &str = "UnknownError";

/// The value a state body fails with
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateFailure {
    /// A full transition; its name gains the error marker if missing
    #[error("failed with transition {0}")]
    Transition(Transition),
    /// A bare transition name with no payload
    #[error("failed with {0:?}")]
    Name(String),
    /// A structured error identified by its kind
    #[error("{kind}: {payload}")]
    Error { kind: String, payload: Value },
    /// Anything else, including no value at all
    #[error("failed with unclassified value {0}")]
    Unknown(Value),
}

impl StateFailure {
    /// A structured error whose payload is the display form of `error`
    pub fn error(kind: impl Into<String>, error: impl fmt::Display) -> Self {
        Self::Error {
            kind: kind.into(),
            payload: Value::String(error.to_string()),
        }
    }

    pub fn unknown(value: impl Into<Value>) -> Self {
        Self::Unknown(value.into())
    }

    /// Normalize into the error transition the resolver searches with
    pub fn into_transition(self, hierarchy: &ErrorHierarchy) -> Transition {
        match self {
            Self::Transition(transition) => {
                Transition::new(hierarchy.normalize(&transition.name), transition.payload)
            }
            Self::Name(name) => Transition::named(hierarchy.normalize(&name)),
            Self::Error { kind, payload } if !kind.is_empty() => {
                Transition::new(hierarchy.prefixed(&kind), payload)
            }
            Self::Error { payload, .. } | Self::Unknown(payload) => {
                Transition::new(hierarchy.prefixed(UNKNOWN_ERROR), payload)
            }
        }
    }
}

impl From<Transition> for StateFailure {
    fn from(transition: Transition) -> Self {
        Self::Transition(transition)
    }
}

impl From<String> for StateFailure {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&str> for StateFailure {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<Value> for StateFailure {
    fn from(value: Value) -> Self {
        Self::Unknown(value)
    }
}

impl From<Cancelled> for StateFailure {
    fn from(cancelled: Cancelled) -> Self {
        Self::error("Cancelled", cancelled)
    }
}

impl From<serde_json::Error> for StateFailure {
    fn from(error: serde_json::Error) -> Self {
        Self::error("SerdeError", error)
    }
}

#[cfg(test)]
#[path = "failure_tests.rs"]
mod tests;
