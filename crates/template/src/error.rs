// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type for template loading and rendering.

use thiserror::Error;

/// Errors from parsing, datablock resolution, and tag processing.
///
/// Handler failures carry enough context (tag, file, cause) for an
/// operator to locate the faulty template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("XML parse error in {file} at line {line}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    #[error("unexpected root tag <{found}> in {file}: expected <{expected}>")]
    UnknownRoot {
        file: String,
        found: String,
        expected: String,
    },

    #[error("missing datablock '{name}' in {file}")]
    MissingDatablock { name: String, file: String },

    #[error("datablock recursion limit exceeded for '{name}' in {file}")]
    RecursionLimit { name: String, file: String },

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("read error for {path}: {message}")]
    Io { path: String, message: String },

    #[error("error in <{tag}> while processing {file}: {message}")]
    Handler {
        tag: String,
        file: String,
        message: String,
    },
}

impl TemplateError {
    /// Wrap an error surfacing from a user-registered callback.
    ///
    /// A cause that is already a `TemplateError` propagates unchanged so
    /// callers never see double-wrapped context; anything else is folded
    /// into a `Handler` error naming the tag and file.
    pub fn wrap(
        tag: &str,
        file: &str,
        cause: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        match cause.downcast::<TemplateError>() {
            Ok(domain) => *domain,
            Err(other) => Self::Handler {
                tag: tag.to_string(),
                file: file.to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
