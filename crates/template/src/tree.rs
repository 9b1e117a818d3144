// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Arena-backed XML tree.
//!
//! Nodes live in a flat arena and are addressed by `NodeId`, so
//! "replace this node with that list, then continue the walk" is a
//! well-defined splice of a child index list instead of live pointer
//! surgery. Detached nodes stay allocated until the tree is dropped;
//! ids are stable for the tree's lifetime.

use indexmap::IndexMap;

/// Index of a node within its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Payload of a node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Element with a tag name and attributes (attribute names are
    /// stored lowercase).
    Element {
        name: String,
        attrs: IndexMap<String, String>,
    },
    /// Character data.
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An XML document tree with one element root.
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl XmlTree {
    /// Create a tree containing only an element root.
    pub fn new(root_name: &str) -> Self {
        let root = Node {
            kind: NodeKind::Element {
                name: root_name.to_string(),
                attrs: IndexMap::new(),
            },
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Allocate a detached element node.
    pub fn new_element(&mut self, name: &str) -> NodeId {
        self.push(Node {
            kind: NodeKind::Element {
                name: name.to_string(),
                attrs: IndexMap::new(),
            },
            parent: None,
            children: Vec::new(),
        })
    }

    /// Allocate a detached text node.
    pub fn new_text(&mut self, text: &str) -> NodeId {
        self.push(Node {
            kind: NodeKind::Text(text.to_string()),
            parent: None,
            children: Vec::new(),
        })
    }

    /// Append a detached node as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// The node's payload.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// True for element nodes.
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Element { .. })
    }

    /// Tag name of an element node.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { name, .. } => Some(name),
            NodeKind::Text(_) => None,
        }
    }

    /// Attribute value of an element node. Attribute names are matched
    /// case-insensitively (they are normalized to lowercase at parse).
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => {
                attrs.get(&name.to_ascii_lowercase()).map(String::as_str)
            }
            NodeKind::Text(_) => None,
        }
    }

    /// Set an attribute on an element node. No-op on text nodes.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind {
            attrs.insert(name.to_ascii_lowercase(), value.to_string());
        }
    }

    /// Ordered children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Parent of a node, `None` for the root and detached nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Concatenated text of all text descendants, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for child in &self.nodes[id.0].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Unlink a node from its parent. The node and its subtree stay
    /// allocated and addressable.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    /// Splice `with` into the position of `id` under its parent,
    /// preserving document order. `id` becomes detached; nodes in `with`
    /// are re-parented. No-op when `id` has no parent.
    pub fn replace_with(&mut self, id: NodeId, with: &[NodeId]) {
        let Some(parent) = self.nodes[id.0].parent else {
            return;
        };
        for node in with {
            if let Some(old) = self.nodes[node.0].parent.take() {
                self.nodes[old.0].children.retain(|c| *c != *node);
            }
        }
        let children = &mut self.nodes[parent.0].children;
        let Some(position) = children.iter().position(|c| *c == id) else {
            return;
        };
        children.splice(position..=position, with.iter().copied());
        self.nodes[id.0].parent = None;
        for node in with {
            self.nodes[node.0].parent = Some(parent);
        }
    }

    /// Deep-copy a subtree within this tree. The copy is detached.
    pub fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let copy = self.push(Node {
            kind: self.nodes[id.0].kind.clone(),
            parent: None,
            children: Vec::new(),
        });
        let children = self.nodes[id.0].children.clone();
        for child in children {
            let child_copy = self.clone_subtree(child);
            self.append(copy, child_copy);
        }
        copy
    }

    /// Deep-copy a subtree from another tree into this one. The copy is
    /// detached.
    pub fn graft(&mut self, other: &XmlTree, other_id: NodeId) -> NodeId {
        let copy = self.push(Node {
            kind: other.nodes[other_id.0].kind.clone(),
            parent: None,
            children: Vec::new(),
        });
        for child in &other.nodes[other_id.0].children {
            let child_copy = self.graft(other, *child);
            self.append(copy, child_copy);
        }
        copy
    }

    /// Serialize a node, including its own tags, to bytes.
    pub fn render_bytes(&self, id: NodeId) -> Vec<u8> {
        let mut out = String::new();
        self.serialize(id, &mut out);
        out.into_bytes()
    }

    /// Serialize only a node's content (its children), to bytes.
    pub fn render_content_bytes(&self, id: NodeId) -> Vec<u8> {
        let mut out = String::new();
        for child in &self.nodes[id.0].children {
            self.serialize(*child, &mut out);
        }
        out.into_bytes()
    }

    fn serialize(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => escape_text(text, out),
            NodeKind::Element { name, attrs } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    escape_attr(value, out);
                    out.push('"');
                }
                let children = &self.nodes[id.0].children;
                if children.is_empty() {
                    out.push_str("/>");
                } else {
                    out.push('>');
                    for child in children {
                        self.serialize(*child, out);
                    }
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
            }
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
