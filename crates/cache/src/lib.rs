// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tessera-cache: cacheability policy and the bounded rendered-result cache

pub mod directives;
pub mod key;
pub mod store;

pub use directives::CacheDirectives;
pub use key::{CacheKey, KeyContext};
pub use store::TemplateCache;
