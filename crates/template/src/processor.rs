// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tree-walking tag processor.
//!
//! Two independent phase tables map lowercase tag names to handler
//! closures registered at startup. The first pass discovers structure
//! (datablock registration, include expansion); the main pass generates
//! output (datablock insertion, method dispatch, element rendering).
//!
//! Dispatch rules for an element encountered during a walk:
//! 1. a handler registered for the tag in the active phase runs;
//! 2. otherwise a tag known to any phase is skipped untouched — it is
//!    never treated as an implicit datablock;
//! 3. otherwise the phase's default handler runs, if any;
//! 4. otherwise the walk descends into the element's children.
//!
//! A handler outcome of `Keep` leaves the node in place and descends;
//! any other outcome replaces the node in place. Replacement content is
//! already processed and is not re-walked. The child list is snapshotted
//! before dispatch, so replacing or removing a node cannot skip or
//! repeat its siblings.

use crate::document::{ContentDocument, DATA_TAG};
use crate::error::TemplateError;
use crate::parse::parse_document;
use crate::request::RequestContext;
use crate::tree::NodeId;
use crate::vfs::VfsProvider;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Nesting limit for datablock processing, against self-referential
/// blocks.
const MAX_PROCESS_DEPTH: usize = 32;

/// Tag-processing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Discovery: datablock registration and include expansion.
    FirstPass,
    /// Output generation.
    MainPass,
}

/// Errors from user-registered callbacks (methods, element renderers).
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// What a handler did with its node.
pub enum HandlerValue {
    /// Leave the node untouched; the walk descends into it.
    Keep,
    /// Replace the node with these nodes (already in the document tree).
    Nodes(Vec<NodeId>),
    /// Replace the node with a text node.
    Text(String),
    /// Replace the node with the decimal rendering of an integer.
    Int(i64),
    /// Replace the node with a byte sequence (inserted as text).
    Bytes(Vec<u8>),
}

/// A user method callable from `<METHOD name="...">` tags. Receives the
/// request context and the tag's text content as its argument.
pub type MethodFn =
    Box<dyn Fn(&RequestContext, &str) -> Result<HandlerValue, CallbackError> + Send + Sync>;

/// Renderer for `<ELEMENT name="...">` tags, typically rendering a
/// sub-template for the named element.
pub trait ElementRenderer: Send + Sync {
    fn render_element(&self, name: &str, ctx: &RequestContext)
        -> Result<Vec<u8>, CallbackError>;
}

/// Named user methods, registered at startup. Replaces the original
/// reflection-style lookup with an explicit table.
#[derive(Default)]
pub struct MethodRegistry {
    methods: IndexMap<String, MethodFn>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method under a name. Re-registering replaces.
    pub fn register<F>(&mut self, name: impl Into<String>, method: F)
    where
        F: Fn(&RequestContext, &str) -> Result<HandlerValue, CallbackError>
            + Send
            + Sync
            + 'static,
    {
        self.methods.insert(name.into(), Box::new(method));
    }

    /// Look up a method by name.
    pub fn get(&self, name: &str) -> Option<&MethodFn> {
        self.methods.get(name)
    }
}

/// Everything a handler can reach while processing a document.
pub struct TagContext<'a> {
    /// The document being processed (working copy during rendering).
    pub doc: &'a mut ContentDocument,
    /// The render request.
    pub request: &'a RequestContext,
    /// File access for includes.
    pub vfs: &'a dyn VfsProvider,
    /// User method table.
    pub methods: &'a MethodRegistry,
    /// Element renderer, when the host registered one.
    pub elements: Option<&'a dyn ElementRenderer>,
    /// Current datablock processing depth.
    pub depth: usize,
}

impl<'a> TagContext<'a> {
    /// Context with no method table or element renderer, enough for
    /// first-pass processing and plain datablock rendering.
    pub fn bare(
        doc: &'a mut ContentDocument,
        request: &'a RequestContext,
        vfs: &'a dyn VfsProvider,
        methods: &'a MethodRegistry,
    ) -> Self {
        Self {
            doc,
            request,
            vfs,
            methods,
            elements: None,
            depth: 0,
        }
    }
}

/// Handler bound to a tag name. Receives the table itself so built-in
/// handlers can recurse into datablock processing.
pub type TagHandler = Box<
    dyn Fn(&TagTable, &mut TagContext<'_>, NodeId) -> Result<HandlerValue, TemplateError>
        + Send
        + Sync,
>;

enum Action {
    Recurse,
    Skip,
    Apply(HandlerValue),
}

/// The two phase tables plus the known-tags set and default handlers.
pub struct TagTable {
    first: IndexMap<String, TagHandler>,
    main: IndexMap<String, TagHandler>,
    known: HashSet<String>,
    default_first: Option<TagHandler>,
    default_main: Option<TagHandler>,
}

impl TagTable {
    /// Empty table: no handlers, no known tags, no defaults.
    pub fn new() -> Self {
        Self {
            first: IndexMap::new(),
            main: IndexMap::new(),
            known: HashSet::new(),
            default_first: None,
            default_main: None,
        }
    }

    /// Table with the built-in template tags registered: `DATA` and
    /// `INCLUDE` in the first pass; `DATA`, `PROCESS`, `METHOD` and
    /// `ELEMENT` in the main pass; implicit datablock registration as
    /// the first-pass default.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.register(Phase::FirstPass, DATA_TAG, Box::new(handle_data_first));
        table.register(Phase::FirstPass, "include", Box::new(handle_include_first));
        table.register(Phase::MainPass, DATA_TAG, Box::new(handle_data_main));
        table.register(Phase::MainPass, "process", Box::new(handle_process_main));
        table.register(Phase::MainPass, "method", Box::new(handle_method_main));
        table.register(Phase::MainPass, "element", Box::new(handle_element_main));
        table.set_default(Phase::FirstPass, Box::new(handle_implicit_datablock));
        table
    }

    /// Bind a handler to a tag in one phase. The tag becomes known to
    /// both phases.
    pub fn register(&mut self, phase: Phase, tag: &str, handler: TagHandler) {
        let tag = tag.to_ascii_lowercase();
        self.known.insert(tag.clone());
        match phase {
            Phase::FirstPass => self.first.insert(tag, handler),
            Phase::MainPass => self.main.insert(tag, handler),
        };
    }

    /// Mark a tag as known without binding a handler. Known tags are
    /// skipped instead of falling through to the default handler.
    pub fn mark_known(&mut self, tag: &str) {
        self.known.insert(tag.to_ascii_lowercase());
    }

    /// Set the fallback handler for unknown tags in one phase.
    pub fn set_default(&mut self, phase: Phase, handler: TagHandler) {
        match phase {
            Phase::FirstPass => self.default_first = Some(handler),
            Phase::MainPass => self.default_main = Some(handler),
        }
    }

    fn table(&self, phase: Phase) -> &IndexMap<String, TagHandler> {
        match phase {
            Phase::FirstPass => &self.first,
            Phase::MainPass => &self.main,
        }
    }

    fn default(&self, phase: Phase) -> Option<&TagHandler> {
        match phase {
            Phase::FirstPass => self.default_first.as_ref(),
            Phase::MainPass => self.default_main.as_ref(),
        }
    }

    /// Process the children of `node` depth-first in one phase,
    /// mutating the tree in place.
    pub fn process(
        &self,
        phase: Phase,
        cx: &mut TagContext<'_>,
        node: NodeId,
    ) -> Result<(), TemplateError> {
        let children = cx.doc.tree().children(node).to_vec();
        for child in children {
            if !cx.doc.tree().is_element(child) {
                continue;
            }
            let tag = cx
                .doc
                .tree()
                .name(child)
                .unwrap_or_default()
                .to_ascii_lowercase();

            let action = if let Some(handler) = self.table(phase).get(&tag) {
                Action::Apply(handler(self, cx, child)?)
            } else if self.known.contains(&tag) {
                Action::Skip
            } else if let Some(default) = self.default(phase) {
                Action::Apply(default(self, cx, child)?)
            } else {
                Action::Recurse
            };

            match action {
                Action::Skip => {}
                Action::Recurse | Action::Apply(HandlerValue::Keep) => {
                    self.process(phase, cx, child)?;
                }
                Action::Apply(value) => apply(cx, child, value),
            }
        }
        Ok(())
    }

    /// Clone a named datablock and run the main pass over the clone.
    /// Returns the clone's root; the stored original is never mutated
    /// by rendering.
    pub fn processed_data(
        &self,
        cx: &mut TagContext<'_>,
        name: &str,
    ) -> Result<NodeId, TemplateError> {
        let block = cx
            .doc
            .get_data(name)
            .ok_or_else(|| TemplateError::MissingDatablock {
                name: name.to_string(),
                file: cx.doc.file().to_string(),
            })?;
        if cx.depth >= MAX_PROCESS_DEPTH {
            return Err(TemplateError::RecursionLimit {
                name: name.to_string(),
                file: cx.doc.file().to_string(),
            });
        }
        let clone = cx.doc.tree_mut().clone_subtree(block);
        cx.depth += 1;
        let result = self.process(Phase::MainPass, cx, clone);
        cx.depth -= 1;
        result?;
        Ok(clone)
    }
}

impl Default for TagTable {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn apply(cx: &mut TagContext<'_>, node: NodeId, value: HandlerValue) {
    let replacements = match value {
        HandlerValue::Keep => return,
        HandlerValue::Nodes(nodes) => nodes,
        HandlerValue::Text(text) => vec![cx.doc.tree_mut().new_text(&text)],
        HandlerValue::Int(value) => vec![cx.doc.tree_mut().new_text(&value.to_string())],
        HandlerValue::Bytes(bytes) => {
            vec![cx
                .doc
                .tree_mut()
                .new_text(&String::from_utf8_lossy(&bytes))]
        }
    };
    cx.doc.tree_mut().replace_with(node, &replacements);
}

// First pass <DATA>: register under the hierarchical name, keep the
// node so nested definitions are discovered too.
fn handle_data_first(
    _table: &TagTable,
    cx: &mut TagContext<'_>,
    node: NodeId,
) -> Result<HandlerValue, TemplateError> {
    cx.doc.register(node);
    Ok(HandlerValue::Keep)
}

// First-pass default: any unrecognized tag is an implicit datablock.
fn handle_implicit_datablock(
    _table: &TagTable,
    cx: &mut TagContext<'_>,
    node: NodeId,
) -> Result<HandlerValue, TemplateError> {
    cx.doc.register(node);
    Ok(HandlerValue::Keep)
}

// First pass <INCLUDE>file</INCLUDE>: read and parse the referenced
// file, run its own first pass, then graft its datablocks into this
// document (merge semantics on name collisions). The tag itself is
// stripped from the output.
fn handle_include_first(
    table: &TagTable,
    cx: &mut TagContext<'_>,
    node: NodeId,
) -> Result<HandlerValue, TemplateError> {
    let path = cx.doc.tree().text_content(node).trim().to_string();
    if path.is_empty() {
        return Err(TemplateError::Handler {
            tag: "include".to_string(),
            file: cx.doc.file().to_string(),
            message: "missing include file name".to_string(),
        });
    }

    let bytes = cx.vfs.read(&path)?;
    let text = String::from_utf8(bytes).map_err(|_| TemplateError::Parse {
        file: path.clone(),
        line: 0,
        message: "included file is not valid UTF-8".to_string(),
    })?;
    let tree = parse_document(&path, &text)?;
    let mut included = ContentDocument::from_tree(&path, tree, None)?;
    {
        let mut sub = TagContext {
            doc: &mut included,
            request: cx.request,
            vfs: cx.vfs,
            methods: cx.methods,
            elements: cx.elements,
            depth: cx.depth,
        };
        let root = sub.doc.tree().root();
        table.process(Phase::FirstPass, &mut sub, root)?;
    }

    let blocks: Vec<(String, NodeId)> = included
        .datablocks()
        .map(|(name, id)| (name.to_string(), id))
        .collect();
    for (name, id) in blocks {
        let grafted = cx.doc.tree_mut().graft(included.tree(), id);
        cx.doc.set_data(&name, grafted);
    }
    Ok(HandlerValue::Nodes(Vec::new()))
}

// Main pass <DATA name="...">: insert the processed content of the
// named block; a nameless definition is stripped (it was captured in
// the first pass).
fn handle_data_main(
    table: &TagTable,
    cx: &mut TagContext<'_>,
    node: NodeId,
) -> Result<HandlerValue, TemplateError> {
    let Some(name) = cx.doc.tree().attr(node, "name").map(str::to_string) else {
        return Ok(HandlerValue::Nodes(Vec::new()));
    };
    insert_processed(table, cx, &name)
}

// Main pass <PROCESS>blockname</PROCESS>: inline the processed content
// of the named block.
fn handle_process_main(
    table: &TagTable,
    cx: &mut TagContext<'_>,
    node: NodeId,
) -> Result<HandlerValue, TemplateError> {
    let name = cx.doc.tree().text_content(node).trim().to_string();
    if name.is_empty() {
        return Err(TemplateError::Handler {
            tag: "process".to_string(),
            file: cx.doc.file().to_string(),
            message: "missing datablock name".to_string(),
        });
    }
    insert_processed(table, cx, &name)
}

fn insert_processed(
    table: &TagTable,
    cx: &mut TagContext<'_>,
    name: &str,
) -> Result<HandlerValue, TemplateError> {
    let processed = table.processed_data(cx, name)?;
    let content = cx.doc.tree().children(processed).to_vec();
    Ok(HandlerValue::Nodes(content))
}

// Main pass <METHOD name="...">arg</METHOD>: dispatch to the registered
// method. Callback failures are wrapped once with tag and file context.
fn handle_method_main(
    _table: &TagTable,
    cx: &mut TagContext<'_>,
    node: NodeId,
) -> Result<HandlerValue, TemplateError> {
    let Some(name) = cx.doc.tree().attr(node, "name").map(str::to_string) else {
        return Err(TemplateError::Handler {
            tag: "method".to_string(),
            file: cx.doc.file().to_string(),
            message: "missing method name".to_string(),
        });
    };
    let method = cx.methods.get(&name).ok_or_else(|| TemplateError::Handler {
        tag: "method".to_string(),
        file: cx.doc.file().to_string(),
        message: format!("unknown method '{}'", name),
    })?;
    let argument = cx.doc.tree().text_content(node);
    method(cx.request, &argument)
        .map_err(|cause| TemplateError::wrap("method", cx.doc.file(), cause))
}

// Main pass <ELEMENT name="...">: delegate to the element renderer.
fn handle_element_main(
    _table: &TagTable,
    cx: &mut TagContext<'_>,
    node: NodeId,
) -> Result<HandlerValue, TemplateError> {
    let Some(name) = cx.doc.tree().attr(node, "name").map(str::to_string) else {
        return Err(TemplateError::Handler {
            tag: "element".to_string(),
            file: cx.doc.file().to_string(),
            message: "missing element name".to_string(),
        });
    };
    let Some(renderer) = cx.elements else {
        return Err(TemplateError::Handler {
            tag: "element".to_string(),
            file: cx.doc.file().to_string(),
            message: format!("no element renderer registered for '{}'", name),
        });
    };
    renderer
        .render_element(&name, cx.request)
        .map(HandlerValue::Bytes)
        .map_err(|cause| TemplateError::wrap("element", cx.doc.file(), cause))
}

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;
