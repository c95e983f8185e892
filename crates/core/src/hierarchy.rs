// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error transition hierarchy
//!
//! An error transition name may encode a dotted hierarchy. Resolution tries
//! the candidates from most to least specific: with marker `~`, the name
//! `~a.b.c` expands to `~a.b.c`, `~a.b`, `~a` and finally the bare `~`.

use crate::transition::{DEFAULT_ERROR_MARKER, DEFAULT_HIERARCHY_SEPARATOR};

/// Marker and separator rules for error transition names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorHierarchy {
    marker: char,
    separator: char,
}

impl Default for ErrorHierarchy {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_MARKER, DEFAULT_HIERARCHY_SEPARATOR)
    }
}

impl ErrorHierarchy {
    pub fn new(marker: char, separator: char) -> Self {
        Self { marker, separator }
    }

    pub fn marker(&self) -> char {
        self.marker
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Whether `name` is an error transition
    pub fn is_error(&self, name: &str) -> bool {
        name.starts_with(self.marker)
    }

    /// Ensure `name` carries the error marker
    pub fn normalize(&self, name: &str) -> String {
        if self.is_error(name) {
            name.to_string()
        } else {
            self.prefixed(name)
        }
    }

    /// Prepend the marker unconditionally
    pub fn prefixed(&self, kind: &str) -> String {
        let mut name = String::with_capacity(kind.len() + self.marker.len_utf8());
        name.push(self.marker);
        name.push_str(kind);
        name
    }

    /// Expand an error name into its candidate list, most to least specific.
    ///
    /// The list always ends with the bare marker and never repeats an entry.
    pub fn expand(&self, name: &str) -> Vec<String> {
        let mut candidates = vec![name.to_string()];
        let mut current = name;
        while let Some(idx) = current.rfind(self.separator) {
            current = &current[..idx];
            candidates.push(current.to_string());
        }

        let bare = self.marker.to_string();
        if candidates.last() != Some(&bare) {
            candidates.push(bare);
        }
        candidates
    }
}

#[cfg(test)]
#[path = "hierarchy_tests.rs"]
mod tests;
