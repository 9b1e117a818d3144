// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Render request context.

use indexmap::IndexMap;

/// Everything the engine knows about one render request: who is asking,
/// for which URI, which element of the template, and with which
/// parameters. Parameter order is preserved as received.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Project id the request renders against.
    pub project: u32,
    /// Request URI.
    pub uri: String,
    /// Acting user name.
    pub user: String,
    /// Acting group name.
    pub group: String,
    /// Element (datablock) to render; empty selects the default block.
    pub element: String,
    /// Request parameters in arrival order.
    pub parameters: IndexMap<String, String>,
}

impl RequestContext {
    /// Context for an anonymous request to a URI.
    pub fn for_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Add a request parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Select the element to render.
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = element.into();
        self
    }

    /// Set the acting user and group.
    pub fn with_user(mut self, user: impl Into<String>, group: impl Into<String>) -> Self {
        self.user = user.into();
        self.group = group.into();
        self
    }
}
