// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The render engine: ties the document cache, tag processor, and
//! rendered-result cache together for one render request.
//!
//! Render flow: compute the cache key from the element's directives; on
//! a hit return the cached bytes without touching the handler chain; on
//! a miss load the document (parsed-document cache or VFS), clone a
//! working copy, main-pass process the requested datablock, serialize,
//! and store under the key. Any failure evicts both the parsed-document
//! entry and the result-cache entry so a transient error never pins a
//! stale or partial cache entry.

use crate::document::ContentDocument;
use crate::error::TemplateError;
use crate::parse::parse_document;
use crate::processor::{
    CallbackError, ElementRenderer, HandlerValue, MethodRegistry, Phase, TagContext, TagTable,
};
use crate::request::RequestContext;
use crate::vfs::{DocumentCache, VfsProvider};
use std::sync::Arc;
use tessera_cache::{CacheDirectives, CacheKey, KeyContext, TemplateCache};
use tracing::debug;

/// Mandatory root tag of a template document.
pub const TEMPLATE_ROOT: &str = "xmltemplate";

/// Datablock rendered when the request names no element.
pub const DEFAULT_BLOCK: &str = "template";

/// Template render engine over one VFS provider.
pub struct TemplateEngine<V: VfsProvider> {
    vfs: V,
    tags: TagTable,
    methods: MethodRegistry,
    elements: Option<Box<dyn ElementRenderer>>,
    documents: DocumentCache,
    results: TemplateCache,
}

impl<V: VfsProvider> TemplateEngine<V> {
    /// Engine with the built-in tag table and default cache capacity.
    pub fn new(vfs: V) -> Self {
        Self {
            vfs,
            tags: TagTable::with_builtins(),
            methods: MethodRegistry::new(),
            elements: None,
            documents: DocumentCache::new(),
            results: TemplateCache::new(),
        }
    }

    /// Engine with a bounded rendered-result cache capacity.
    pub fn with_result_capacity(vfs: V, capacity: usize) -> Self {
        Self {
            results: TemplateCache::with_capacity(capacity),
            ..Self::new(vfs)
        }
    }

    /// Register a user method callable from `<METHOD>` tags.
    pub fn register_method<F>(&mut self, name: impl Into<String>, method: F)
    where
        F: Fn(&RequestContext, &str) -> Result<HandlerValue, CallbackError>
            + Send
            + Sync
            + 'static,
    {
        self.methods.register(name, method);
    }

    /// Install the renderer backing `<ELEMENT>` tags.
    pub fn set_element_renderer(&mut self, renderer: Box<dyn ElementRenderer>) {
        self.elements = Some(renderer);
    }

    /// The tag table, for registering custom tags at startup.
    pub fn tags_mut(&mut self) -> &mut TagTable {
        &mut self.tags
    }

    /// The rendered-result cache; the host clears keys from it on
    /// publish events.
    pub fn results(&self) -> &TemplateCache {
        &self.results
    }

    /// The parsed-document cache.
    pub fn documents(&self) -> &DocumentCache {
        &self.documents
    }

    /// Render one template file for a request.
    pub fn render(
        &self,
        file: &str,
        directives: &CacheDirectives,
        request: &RequestContext,
    ) -> Result<Vec<u8>, TemplateError> {
        let key = self.cache_key(file, directives, request);
        if let Some(key) = &key {
            if let Some(bytes) = self.results.get(key) {
                debug!(file, %key, "serving render from result cache");
                return Ok(bytes);
            }
        }

        match self.render_uncached(file, request) {
            Ok(bytes) => {
                if let Some(key) = key {
                    self.results.put(key, bytes.clone());
                }
                Ok(bytes)
            }
            Err(err) => {
                self.documents.evict(file);
                if let Some(key) = &key {
                    self.results.clear(key);
                }
                Err(err)
            }
        }
    }

    fn cache_key(
        &self,
        file: &str,
        directives: &CacheDirectives,
        request: &RequestContext,
    ) -> Option<CacheKey> {
        directives.cache_key(&KeyContext {
            project: request.project,
            template: file,
            uri: &request.uri,
            user: &request.user,
            group: &request.group,
            element: &request.element,
            parameters: &request.parameters,
        })
    }

    fn render_uncached(
        &self,
        file: &str,
        request: &RequestContext,
    ) -> Result<Vec<u8>, TemplateError> {
        let document = self.load_document(file, request)?;
        // The cached parse stays pristine; each render mutates its own copy.
        let mut working = (*document).clone();

        let block = if request.element.is_empty() {
            DEFAULT_BLOCK
        } else {
            request.element.as_str()
        };
        let processed = {
            let mut cx = TagContext {
                doc: &mut working,
                request,
                vfs: &self.vfs,
                methods: &self.methods,
                elements: self.elements.as_deref(),
                depth: 0,
            };
            self.tags.processed_data(&mut cx, block)?
        };
        Ok(working.tree().render_content_bytes(processed))
    }

    fn load_document(
        &self,
        file: &str,
        request: &RequestContext,
    ) -> Result<Arc<ContentDocument>, TemplateError> {
        if let Some(document) = self.documents.get(file) {
            return Ok(document);
        }

        let bytes = self.vfs.read(file)?;
        let text = String::from_utf8(bytes).map_err(|_| TemplateError::Parse {
            file: file.to_string(),
            line: 0,
            message: "template file is not valid UTF-8".to_string(),
        })?;
        let tree = parse_document(file, &text)?;
        let mut document = ContentDocument::from_tree(file, tree, Some(TEMPLATE_ROOT))?;

        {
            let root = document.tree().root();
            let mut cx = TagContext {
                doc: &mut document,
                request,
                vfs: &self.vfs,
                methods: &self.methods,
                elements: self.elements.as_deref(),
                depth: 0,
            };
            self.tags.process(Phase::FirstPass, &mut cx, root)?;
        }

        let document = Arc::new(document);
        self.documents.insert(file, Arc::clone(&document));
        debug!(file, "parsed and cached template document");
        Ok(document)
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
