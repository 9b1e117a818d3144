// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered crontab table with resilient loading and copy-on-write sharing.

use crate::cron::CronEntry;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::warn;

/// Ordered collection of cron entries.
///
/// Order matters only for deterministic iteration, not priority.
/// Duplicate entries are legal and kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CronTable {
    entries: Vec<CronEntry>,
}

impl CronTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from crontab text, one rule per line.
    ///
    /// Blank lines are skipped. Malformed lines are logged and skipped;
    /// a single bad entry never aborts the load.
    pub fn from_text(text: &str) -> Self {
        let mut table = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.parse::<CronEntry>() {
                Ok(entry) => table.entries.push(entry),
                Err(err) => warn!(line, %err, "skipping malformed crontab line"),
            }
        }
        table
    }

    /// Replace the entire table from crontab text.
    pub fn load_from_text(&mut self, text: &str) {
        *self = Self::from_text(text);
    }

    /// Serialize back to crontab text, one rule per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out
    }

    /// Append an entry.
    pub fn add(&mut self, entry: CronEntry) {
        self.entries.push(entry);
    }

    /// Remove the entry at an index, if present.
    pub fn remove(&mut self, index: usize) -> Option<CronEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Get the entry at an index.
    pub fn get(&self, index: usize) -> Option<&CronEntry> {
        self.entries.get(index)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in order.
    pub fn iter(&self) -> impl Iterator<Item = &CronEntry> {
        self.entries.iter()
    }
}

/// Copy-on-write handle to a shared cron table.
///
/// The job starter iterates a snapshot while a reload may be swapping in a
/// fresh table from another thread; readers never observe a half-rebuilt
/// state because the whole `Arc` is replaced atomically.
#[derive(Debug, Clone, Default)]
pub struct SharedCronTable {
    inner: Arc<RwLock<Arc<CronTable>>>,
}

impl SharedCronTable {
    /// Wrap an initial table.
    pub fn new(table: CronTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(table))),
        }
    }

    /// Current table snapshot. Iteration over the snapshot is unaffected
    /// by later `replace` calls.
    pub fn snapshot(&self) -> Arc<CronTable> {
        Arc::clone(&self.inner.read())
    }

    /// Swap in a replacement table.
    pub fn replace(&self, table: CronTable) {
        *self.inner.write() = Arc::new(table);
    }

    /// Rebuild from crontab text and swap in the result.
    pub fn reload_from_text(&self, text: &str) {
        self.replace(CronTable::from_text(text));
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
