// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The minute-tick scheduler loop.
//!
//! Every tick the scheduler reloads the crontab from the host, swaps the
//! shared table, and sweeps a snapshot for jobs due in the window since
//! the previous tick. The minute field matches a window rather than an
//! instant, so loop jitter around the minute boundary cannot double-fire
//! or skip an entry. Missed minutes are not backfilled.

use crate::host::SchedulerHost;
use crate::starter::JobStarter;
use chrono::{DateTime, Duration as ChronoDuration, Timelike, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tessera_core::{Clock, SharedCronTable, TickTime};
use tokio::sync::Notify;
use tracing::{info, warn};

/// Slack past the minute boundary before a tick fires, so a tick never
/// lands on the previous minute through clock rounding.
const TICK_GRACE_SECS: i64 = 10;

/// Minute-tick cron scheduler, generic over the clock for testability.
pub struct CronScheduler<C: Clock> {
    clock: C,
    host: Arc<dyn SchedulerHost>,
    table: SharedCronTable,
    last_run: Mutex<DateTime<Utc>>,
    stop: AtomicBool,
    notify: Notify,
}

impl<C: Clock> CronScheduler<C> {
    /// Scheduler with an empty table; the first tick's reload fills it.
    pub fn new(clock: C, host: Arc<dyn SchedulerHost>) -> Self {
        let last_run = Mutex::new(clock.now());
        Self {
            clock,
            host,
            table: SharedCronTable::default(),
            last_run,
            stop: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    /// The shared crontab table, for hosts that edit entries between
    /// reloads.
    pub fn table(&self) -> &SharedCronTable {
        &self.table
    }

    /// Request shutdown. The loop exits at the next wakeup, without
    /// waiting for the pending tick deadline.
    pub fn shutdown(&self) {
        self.stop.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// True once shutdown was requested.
    pub fn is_shutdown(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Run the tick loop until shutdown.
    ///
    /// Each tick spawns its job-starter sweep as a separate task, so a
    /// slow `start_job` never delays the next tick deadline.
    pub async fn run(&self) {
        info!("cron scheduler started");
        while !self.is_shutdown() {
            let deadline = next_deadline(*self.last_run.lock());
            let wait = (deadline - self.clock.now())
                .to_std()
                .unwrap_or(Duration::ZERO);
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = self.notify.notified() => continue,
            }
            let starter = self.prepare_tick().await;
            let host = Arc::clone(&self.host);
            tokio::spawn(async move {
                starter.run(host.as_ref()).await;
            });
        }
        info!("cron scheduler stopped");
    }

    /// One scheduler tick with the sweep awaited inline, for callers
    /// that need the dispatch count. Returns the number of jobs started.
    pub async fn tick_once(&self) -> usize {
        let starter = self.prepare_tick().await;
        starter.run(self.host.as_ref()).await
    }

    /// Reload the crontab and advance the tick window. The window moves
    /// before the sweep runs, so the sweep's duration never widens the
    /// next window.
    async fn prepare_tick(&self) -> JobStarter {
        match self.host.reload_crontab().await {
            Ok(text) => self.table.reload_from_text(&text),
            Err(err) => warn!(%err, "crontab reload failed, keeping previous table"),
        }

        let this_run = self.clock.now();
        let last_run = {
            let mut guard = self.last_run.lock();
            std::mem::replace(&mut *guard, this_run)
        };
        JobStarter::new(
            self.table.snapshot(),
            TickTime::from(last_run),
            TickTime::from(this_run),
        )
    }
}

/// Start of the minute after `after`, plus the grace period.
fn next_deadline(after: DateTime<Utc>) -> DateTime<Utc> {
    let next = after + ChronoDuration::minutes(1);
    let truncated = next
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(next);
    truncated + ChronoDuration::seconds(TICK_GRACE_SECS)
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
