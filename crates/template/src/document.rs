// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parsed template document with its datablock registry.
//!
//! A datablock is a named subtree addressable by a lowercase dotted
//! hierarchical name such as `elementdef.body.class`. The name of a node
//! is built from its ancestor chain: each element contributes its tag
//! name, plus its `name` attribute when present; a generic `DATA` tag
//! contributes only its `name` attribute. The document root contributes
//! no segment.

use crate::error::TemplateError;
use crate::tree::{NodeId, XmlTree};
use indexmap::IndexMap;

/// Tag name of the generic datablock element.
pub const DATA_TAG: &str = "data";

/// A parsed template tree plus the mapping from datablock names to
/// subtree roots.
#[derive(Debug, Clone)]
pub struct ContentDocument {
    file: String,
    tree: XmlTree,
    datablocks: IndexMap<String, NodeId>,
}

impl ContentDocument {
    /// Wrap a parsed tree. When `expected_root` is given, a document
    /// whose root tag differs fails to load — the root tag is the
    /// structural contract of the document type.
    pub fn from_tree(
        file: impl Into<String>,
        tree: XmlTree,
        expected_root: Option<&str>,
    ) -> Result<Self, TemplateError> {
        let file = file.into();
        if let Some(expected) = expected_root {
            let found = tree.name(tree.root()).unwrap_or_default();
            if !found.eq_ignore_ascii_case(expected) {
                return Err(TemplateError::UnknownRoot {
                    file,
                    found: found.to_string(),
                    expected: expected.to_string(),
                });
            }
        }
        Ok(Self {
            file,
            tree,
            datablocks: IndexMap::new(),
        })
    }

    /// File name this document was loaded from.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The underlying tree.
    pub fn tree(&self) -> &XmlTree {
        &self.tree
    }

    /// Mutable access to the underlying tree.
    pub fn tree_mut(&mut self) -> &mut XmlTree {
        &mut self.tree
    }

    /// Compute the hierarchical datablock name for a node. Deterministic
    /// for a given document structure — this is the address scheme every
    /// other component uses to retrieve sub-content.
    pub fn datablock_name(&self, node: NodeId) -> String {
        let mut segments: Vec<String> = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.tree.root() {
                break;
            }
            if let Some(tag) = self.tree.name(id) {
                let tag = tag.to_ascii_lowercase();
                match self.tree.attr(id, "name") {
                    Some(name) if tag == DATA_TAG => {
                        segments.push(name.to_ascii_lowercase());
                    }
                    Some(name) => {
                        segments.push(format!("{}.{}", tag, name.to_ascii_lowercase()));
                    }
                    None => segments.push(tag),
                }
            }
            current = self.tree.parent(id);
        }
        segments.reverse();
        segments.join(".")
    }

    /// Register a node as a datablock under its hierarchical name.
    /// Returns the name it was registered under.
    pub fn register(&mut self, node: NodeId) -> String {
        let name = self.datablock_name(node);
        self.set_data(&name, node);
        name
    }

    /// Register a datablock under an explicit name (lowercased).
    ///
    /// On a name collision the new node's children are merged into the
    /// existing block instead of replacing it, so references other code
    /// holds into the existing subtree stay valid.
    pub fn set_data(&mut self, name: &str, node: NodeId) {
        let name = name.to_ascii_lowercase();
        match self.datablocks.get(&name) {
            Some(existing) if *existing != node => {
                let existing = *existing;
                let children = self.tree.children(node).to_vec();
                for child in children {
                    self.tree.detach(child);
                    self.tree.append(existing, child);
                }
            }
            _ => {
                self.datablocks.insert(name, node);
            }
        }
    }

    /// Look up a datablock by name (case-insensitive).
    pub fn get_data(&self, name: &str) -> Option<NodeId> {
        self.datablocks.get(&name.to_ascii_lowercase()).copied()
    }

    /// True if a datablock with this name is registered.
    pub fn has_data(&self, name: &str) -> bool {
        self.datablocks.contains_key(&name.to_ascii_lowercase())
    }

    /// Iterate registered datablocks in registration order.
    pub fn datablocks(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.datablocks.iter().map(|(name, id)| (name.as_str(), *id))
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
