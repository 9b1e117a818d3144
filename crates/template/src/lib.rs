// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tessera-template: XML template documents, datablocks, and the
//! tag-processing engine that renders them

pub mod document;
pub mod engine;
pub mod error;
pub mod parse;
pub mod processor;
pub mod request;
pub mod tree;
pub mod vfs;

pub use document::ContentDocument;
pub use engine::{TemplateEngine, DEFAULT_BLOCK, TEMPLATE_ROOT};
pub use error::TemplateError;
pub use parse::parse_document;
pub use processor::{
    CallbackError, ElementRenderer, HandlerValue, MethodRegistry, Phase, TagContext, TagTable,
};
pub use request::RequestContext;
pub use tree::{NodeId, NodeKind, XmlTree};
pub use vfs::{DiskVfs, DocumentCache, MemoryVfs, VfsProvider};
