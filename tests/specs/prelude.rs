//! Test helpers for behavioral specifications.
//!
//! Provides a recording scheduler host and engine builders shared by
//! the cron and render specs.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tessera_cache::CacheDirectives;
use tessera_core::CronEntry;
use tessera_scheduler::{SchedulerError, SchedulerHost};
use tessera_template::{HandlerValue, MemoryVfs, RequestContext, TemplateEngine};

/// A scheduler host backed by an in-memory crontab that records every
/// job start.
pub struct RecordingHost {
    crontab: Mutex<String>,
    fail_reload: AtomicBool,
    started: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn with_crontab(text: &str) -> Arc<Self> {
        Arc::new(Self {
            crontab: Mutex::new(text.to_string()),
            fail_reload: AtomicBool::new(false),
            started: Mutex::new(Vec::new()),
        })
    }

    pub fn set_crontab(&self, text: &str) {
        *self.crontab.lock() = text.to_string();
    }

    pub fn fail_reloads(&self, fail: bool) {
        self.fail_reload.store(fail, Ordering::SeqCst);
    }

    pub fn started(&self) -> Vec<String> {
        self.started.lock().clone()
    }
}

#[async_trait]
impl SchedulerHost for RecordingHost {
    async fn reload_crontab(&self) -> Result<String, SchedulerError> {
        if self.fail_reload.load(Ordering::SeqCst) {
            return Err(SchedulerError::Reload("crontab store offline".to_string()));
        }
        Ok(self.crontab.lock().clone())
    }

    async fn start_job(&self, entry: &CronEntry) -> Result<(), SchedulerError> {
        self.started.lock().push(entry.job.clone());
        Ok(())
    }
}

/// A UTC timestamp on 2026-08-25, hour 10, at `minute:second`.
pub fn at(minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 25, 10, minute, second).unwrap()
}

pub const PAGE: &str = "/system/templates/page.xml";

/// Engine over a fresh in-memory VFS with the main template preloaded.
/// Returns the VFS handle too, so specs can add fragments or swap the
/// template under the engine.
pub fn engine_with(template: &str) -> (TemplateEngine<MemoryVfs>, MemoryVfs) {
    let vfs = MemoryVfs::new();
    vfs.insert(PAGE, template);
    (TemplateEngine::new(vfs.clone()), vfs)
}

/// Engine whose template invokes a counting `hits` method, for
/// observing whether a render hit the handler chain or the cache.
pub fn counting_engine() -> (TemplateEngine<MemoryVfs>, Arc<AtomicUsize>) {
    let (mut engine, _vfs) = engine_with(
        "<xmltemplate><template><method name=\"hits\"/></template></xmltemplate>",
    );
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    engine.register_method("hits", move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(HandlerValue::Text("rendered".to_string()))
    });
    (engine, calls)
}

/// Fully cacheable directives keyed by URI, the common page policy.
pub fn page_directives() -> CacheDirectives {
    CacheDirectives::cacheable().key_uri()
}

/// An anonymous request for `/index.html`.
pub fn index_request() -> RequestContext {
    RequestContext::for_uri("/index.html")
}
