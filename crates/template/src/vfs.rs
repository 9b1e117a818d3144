// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File access seam and the parsed-document cache.
//!
//! The engine reads template files through `VfsProvider`, so the
//! backing store (a real VFS, a directory on disk, an in-memory map for
//! tests) is the host's choice.

use crate::document::ContentDocument;
use crate::error::TemplateError;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Read access to template files.
pub trait VfsProvider: Send + Sync {
    /// Read a file's bytes. Missing files are `TemplateError::NotFound`.
    fn read(&self, path: &str) -> Result<Vec<u8>, TemplateError>;
}

/// In-memory file map. Clones share the same backing map, so a test can
/// keep a handle and change files after handing the VFS to an engine.
#[derive(Debug, Clone, Default)]
pub struct MemoryVfs {
    files: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryVfs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.write().insert(path.into(), bytes.into());
    }

    /// Remove a file.
    pub fn remove(&self, path: &str) {
        self.files.write().remove(path);
    }
}

impl VfsProvider for MemoryVfs {
    fn read(&self, path: &str) -> Result<Vec<u8>, TemplateError> {
        self.files
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound(path.to_string()))
    }
}

/// Directory-backed provider. Paths are resolved relative to the root;
/// a leading `/` is stripped so VFS-style absolute paths work.
#[derive(Debug, Clone)]
pub struct DiskVfs {
    root: PathBuf,
}

impl DiskVfs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl VfsProvider for DiskVfs {
    fn read(&self, path: &str) -> Result<Vec<u8>, TemplateError> {
        let full = self.root.join(path.trim_start_matches('/'));
        std::fs::read(&full).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                TemplateError::NotFound(path.to_string())
            } else {
                TemplateError::Io {
                    path: path.to_string(),
                    message: err.to_string(),
                }
            }
        })
    }
}

/// Cache of parsed, first-pass-processed documents keyed by file name.
///
/// Owned by the engine and passed by reference — never ambient state.
/// Documents are shared immutably; rendering clones its own working
/// copy.
#[derive(Debug, Default)]
pub struct DocumentCache {
    inner: Mutex<HashMap<String, Arc<ContentDocument>>>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a parsed document.
    pub fn get(&self, file: &str) -> Option<Arc<ContentDocument>> {
        self.inner.lock().get(file).cloned()
    }

    /// Store a parsed document.
    pub fn insert(&self, file: impl Into<String>, doc: Arc<ContentDocument>) {
        self.inner.lock().insert(file.into(), doc);
    }

    /// Drop the entry for one file, if present. Called on render
    /// failures so a transient error cannot pin a stale parse.
    pub fn evict(&self, file: &str) {
        self.inner.lock().remove(file);
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "vfs_tests.rs"]
mod tests;
