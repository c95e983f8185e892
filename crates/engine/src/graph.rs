// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State graph: registration and transition resolution
//!
//! Nodes live in a flat arena owned by the engine. Transition tables refer
//! to destinations by [`StateId`], so cycles in the graph never become
//! ownership cycles.

use crate::{Decorator, EngineError, RunMode, State, StateId};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use sy_core::{ErrorHierarchy, Transition, WILDCARD};

/// Error kind raised when a finished state has no matching transition
pub(crate) const TRANSITION_ERROR: &str = "TransitionError";

pub(crate) struct StateNode<S> {
    pub(crate) name: String,
    pub(crate) body: Arc<dyn State<S>>,
    /// `None` marks a terminal transition
    transitions: HashMap<String, Option<StateId>>,
    decorators: Vec<Arc<dyn Decorator<S>>>,
}

/// Where a finished state leads
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Next {
    Enter {
        state: StateId,
        input: Value,
        incoming: String,
    },
    /// A terminal transition was taken
    Complete(Transition),
    /// Nothing matched
    Unhandled(Transition),
}

pub(crate) struct Graph<S> {
    nodes: Vec<StateNode<S>>,
    first_state: Option<StateId>,
    global_catches: HashMap<String, StateId>,
    global_decorators: Vec<Arc<dyn Decorator<S>>>,
}

impl<S> Default for Graph<S> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            first_state: None,
            global_catches: HashMap::new(),
            global_decorators: Vec::new(),
        }
    }
}

impl<S: 'static> Graph<S> {
    pub(crate) fn add_state(&mut self, name: String, body: Arc<dyn State<S>>) -> StateId {
        let id = StateId(self.nodes.len());
        self.nodes.push(StateNode {
            name,
            body,
            transitions: HashMap::new(),
            decorators: Vec::new(),
        });
        id
    }

    pub(crate) fn node(&self, id: StateId) -> Result<&StateNode<S>, EngineError> {
        self.nodes.get(id.0).ok_or(EngineError::UnknownState(id))
    }

    fn node_mut(&mut self, id: StateId) -> Result<&mut StateNode<S>, EngineError> {
        self.nodes.get_mut(id.0).ok_or(EngineError::UnknownState(id))
    }

    pub(crate) fn first_state(&self) -> Option<StateId> {
        self.first_state
    }

    pub(crate) fn set_first_state(&mut self, dest: StateId) -> Result<(), EngineError> {
        self.node(dest)?;
        if let Some(existing) = self.first_state {
            return Err(EngineError::FirstStateAlreadySet(
                self.node(existing)?.name.clone(),
            ));
        }
        self.first_state = Some(dest);
        Ok(())
    }

    /// `name` must already carry the error marker
    pub(crate) fn add_catch(&mut self, name: String, dest: StateId) -> Result<(), EngineError> {
        self.node(dest)?;
        if self.global_catches.contains_key(&name) {
            return Err(EngineError::DuplicateCatch { name });
        }
        self.global_catches.insert(name, dest);
        Ok(())
    }

    pub(crate) fn add_transition(
        &mut self,
        name: String,
        source: StateId,
        dest: Option<StateId>,
    ) -> Result<(), EngineError> {
        if let Some(dest) = dest {
            self.node(dest)?;
        }
        let node = self.node_mut(source)?;
        if node.transitions.contains_key(&name) {
            return Err(EngineError::DuplicateTransition {
                state: node.name.clone(),
                name,
            });
        }
        node.transitions.insert(name, dest);
        Ok(())
    }

    pub(crate) fn add_decorator(
        &mut self,
        decorator: Arc<dyn Decorator<S>>,
        target: Option<StateId>,
    ) -> Result<(), EngineError> {
        match target {
            Some(state) => self.node_mut(state)?.decorators.push(decorator),
            None => self.global_decorators.push(decorator),
        }
        Ok(())
    }

    /// Decorators that fire for `state` at `mode`: global ones first
    pub(crate) fn decorators_for(
        &self,
        state: StateId,
        mode: RunMode,
    ) -> Vec<Arc<dyn Decorator<S>>> {
        let local = self
            .nodes
            .get(state.0)
            .map(|node| node.decorators.as_slice())
            .unwrap_or_default();
        self.global_decorators
            .iter()
            .chain(local)
            .filter(|decorator| decorator.run_mode() == mode)
            .cloned()
            .collect()
    }

    /// Find where `result`, produced by `from`, leads.
    ///
    /// Error transitions search the state's own table across every
    /// candidate of the hierarchy before consulting the global catches.
    /// Other transitions match exactly, then fall back to the wildcard.
    pub(crate) fn resolve(
        &self,
        from: StateId,
        result: Transition,
        hierarchy: &ErrorHierarchy,
    ) -> Next {
        let Some(node) = self.nodes.get(from.0) else {
            return Next::Unhandled(result);
        };

        if hierarchy.is_error(&result.name) {
            let candidates = hierarchy.expand(&result.name);
            // A terminal error entry on the state counts as no destination
            let dest = candidates
                .iter()
                .find_map(|name| node.transitions.get(name))
                .copied()
                .flatten()
                .or_else(|| {
                    candidates
                        .iter()
                        .find_map(|name| self.global_catches.get(name))
                        .copied()
                });

            return match dest {
                Some(state) => Next::Enter {
                    state,
                    input: result.payload,
                    incoming: result.name,
                },
                None => Next::Unhandled(result),
            };
        }

        let entry = node
            .transitions
            .get(&result.name)
            .or_else(|| node.transitions.get(WILDCARD));
        match entry {
            Some(Some(state)) => Next::Enter {
                state: *state,
                input: result.payload,
                incoming: result.name,
            },
            Some(None) => Next::Complete(result),
            None => Next::Unhandled(Transition::new(
                hierarchy.prefixed(TRANSITION_ERROR),
                format!(
                    "Unable to find transition {} on state {}",
                    result.name, node.name
                ),
            )),
        }
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
