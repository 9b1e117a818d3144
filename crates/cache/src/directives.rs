// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cacheability policy for rendered template elements.
//!
//! A `CacheDirectives` value answers two questions: may this element's
//! output be cached at all, and if so, which facets of the request make
//! the entry distinct. Merging two policies (an element with its
//! sub-elements) only ever reduces cacheability.

use crate::key::{CacheKey, KeyContext};
use serde::{Deserialize, Serialize};

/// Marker prefixed to every computed key variant, so a future change to
/// the composition order invalidates old entries instead of aliasing them.
const KEY_SCHEME: &str = "v1";

/// Cacheability flags plus key-shape description for one template element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheDirectives {
    /// Result may be stored in the internal rendered-result cache.
    internal: bool,
    /// Result may be cached by a private (per-user) proxy.
    proxy_private: bool,
    /// Result may be cached by a shared proxy.
    proxy_public: bool,
    /// Result may be written to the static export.
    export: bool,
    /// Result may be streamed to the client while rendering.
    stream: bool,

    /// Key shape: current URI participates in the key.
    key_uri: bool,
    /// Key shape: acting user participates in the key.
    key_user: bool,
    /// Key shape: acting group participates in the key.
    key_group: bool,
    /// Key shape: these request parameters participate, in this order.
    cache_parameters: Vec<String>,

    /// Presence of any of these request parameters forces a cache bypass.
    dynamic_parameters: Vec<String>,
}

impl CacheDirectives {
    /// Build a policy from its five cacheability facets. The key shape
    /// starts empty; add facets with the `key_*` builders.
    pub fn new(internal: bool, proxy_private: bool, proxy_public: bool, export: bool, stream: bool) -> Self {
        Self {
            internal,
            proxy_private,
            proxy_public,
            export,
            stream,
            ..Self::default()
        }
    }

    /// Fully cacheable policy (all five facets true).
    pub fn cacheable() -> Self {
        Self::new(true, true, true, true, true)
    }

    /// Fully uncacheable policy (all five facets false).
    pub fn uncacheable() -> Self {
        Self::new(false, false, false, false, false)
    }

    /// Include the request URI in the cache key.
    pub fn key_uri(mut self) -> Self {
        self.key_uri = true;
        self
    }

    /// Include the acting user in the cache key.
    pub fn key_user(mut self) -> Self {
        self.key_user = true;
        self
    }

    /// Include the acting group in the cache key.
    pub fn key_group(mut self) -> Self {
        self.key_group = true;
        self
    }

    /// Include a named request parameter's value in the cache key.
    /// Order of registration is the order of composition.
    pub fn key_parameter(mut self, name: impl Into<String>) -> Self {
        self.cache_parameters.push(name.into());
        self
    }

    /// Mark a request parameter as dynamic: its presence in a request
    /// forces a cache bypass regardless of the cacheability facets.
    pub fn dynamic_parameter(mut self, name: impl Into<String>) -> Self {
        self.dynamic_parameters.push(name.into());
        self
    }

    /// May the result enter the internal rendered-result cache?
    pub fn is_internal_cacheable(&self) -> bool {
        self.internal
    }

    /// May a private proxy cache the result?
    pub fn is_proxy_private_cacheable(&self) -> bool {
        self.proxy_private
    }

    /// May a shared proxy cache the result?
    pub fn is_proxy_public_cacheable(&self) -> bool {
        self.proxy_public
    }

    /// May the result be statically exported?
    pub fn is_exportable(&self) -> bool {
        self.export
    }

    /// May the result be streamed while rendering?
    pub fn is_streamable(&self) -> bool {
        self.stream
    }

    /// True when cached entries for this element must be purged on every
    /// publish event: an element keyed by URI can change whenever any
    /// resource it links to changes, so it is renewed unconditionally.
    pub fn should_renew(&self) -> bool {
        self.key_uri
    }

    /// Combine with the policy of a sub-element.
    ///
    /// Each cacheability facet is ANDed, so merging never increases
    /// cacheability. Key-shape flags are ANDed as well; parameter lists
    /// are unioned, which also only restricts (more dynamic parameters
    /// mean more bypasses, more keyed parameters mean finer entries).
    pub fn merge(&mut self, other: &CacheDirectives) {
        self.internal &= other.internal;
        self.proxy_private &= other.proxy_private;
        self.proxy_public &= other.proxy_public;
        self.export &= other.export;
        self.stream &= other.stream;

        self.key_uri &= other.key_uri;
        self.key_user &= other.key_user;
        self.key_group &= other.key_group;

        for name in &other.cache_parameters {
            if !self.cache_parameters.contains(name) {
                self.cache_parameters.push(name.clone());
            }
        }
        for name in &other.dynamic_parameters {
            if !self.dynamic_parameters.contains(name) {
                self.dynamic_parameters.push(name.clone());
            }
        }
    }

    /// Compute the cache key for a request, or `None` when the result
    /// must not be served from cache.
    ///
    /// Bypass conditions: internal caching is off, a dynamic parameter is
    /// present in the request, or the composed key would carry nothing
    /// that distinguishes the request (caching would alias unrelated
    /// renders).
    pub fn cache_key(&self, ctx: &KeyContext<'_>) -> Option<CacheKey> {
        if !self.internal {
            return None;
        }
        if self
            .dynamic_parameters
            .iter()
            .any(|name| ctx.parameters.contains_key(name))
        {
            return None;
        }

        let mut variant = String::new();
        if self.key_uri {
            variant.push_str("uri=");
            variant.push_str(ctx.uri);
            variant.push(';');
        }
        if self.key_user {
            variant.push_str("user=");
            variant.push_str(ctx.user);
            variant.push(';');
        }
        if self.key_group {
            variant.push_str("group=");
            variant.push_str(ctx.group);
            variant.push(';');
        }
        for name in &self.cache_parameters {
            if let Some(value) = ctx.parameters.get(name) {
                variant.push_str(name);
                variant.push('=');
                variant.push_str(value);
                variant.push(';');
            }
        }
        if !ctx.element.is_empty() {
            let prefix = format!("{}.", ctx.element);
            for (name, value) in ctx.parameters {
                if name.starts_with(&prefix) {
                    variant.push_str(name);
                    variant.push('=');
                    variant.push_str(value);
                    variant.push(';');
                }
            }
        }

        if variant.is_empty() {
            return None;
        }
        Some(CacheKey::new(
            ctx.project,
            ctx.template,
            format!("{};{}", KEY_SCHEME, variant),
        ))
    }
}

#[cfg(test)]
#[path = "directives_tests.rs"]
mod tests;
