// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composite cache keys for rendered template results.
//!
//! A key names one cached byte sequence: which project, which template
//! file, and a variant string encoding every request facet that entered
//! the render (URI, user, selected parameters). Callers treat the whole
//! key as opaque and never parse it back apart.

use indexmap::IndexMap;
use std::fmt;

/// Key for one rendered-result cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    project: u32,
    template: String,
    variant: String,
}

impl CacheKey {
    /// Build a key from its three components.
    pub fn new(project: u32, template: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            project,
            template: template.into(),
            variant: variant.into(),
        }
    }

    /// Project the key belongs to.
    pub fn project(&self) -> u32 {
        self.project
    }

    /// Template file path the key belongs to.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// True when the key carries no distinguishing variant. Such a key
    /// would alias unrelated renders, so the cache refuses to store it.
    pub fn is_degenerate(&self) -> bool {
        self.variant.is_empty()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.project, self.template, self.variant)
    }
}

/// Borrowed view of one render request, used to compute its cache key.
#[derive(Debug, Clone, Copy)]
pub struct KeyContext<'a> {
    /// Project id of the request.
    pub project: u32,
    /// Template file being rendered.
    pub template: &'a str,
    /// Request URI.
    pub uri: &'a str,
    /// Acting user name.
    pub user: &'a str,
    /// Acting group name.
    pub group: &'a str,
    /// Active element name (prefix for element-scoped parameters).
    pub element: &'a str,
    /// Request parameters in arrival order.
    pub parameters: &'a IndexMap<String, String>,
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;
