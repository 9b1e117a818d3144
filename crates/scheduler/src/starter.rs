// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One tick's worth of job dispatch.

use crate::host::SchedulerHost;
use std::sync::Arc;
use tessera_core::{CronTable, TickTime};
use tracing::{debug, warn};

/// Sweeps a table snapshot for one tick window and starts every due job.
///
/// Works against an `Arc` snapshot, so a concurrent crontab reload never
/// changes the set of entries mid-sweep.
pub struct JobStarter {
    table: Arc<CronTable>,
    last_run: TickTime,
    this_run: TickTime,
}

impl JobStarter {
    pub fn new(table: Arc<CronTable>, last_run: TickTime, this_run: TickTime) -> Self {
        Self {
            table,
            last_run,
            this_run,
        }
    }

    /// Start every entry due in the window `(last_run, this_run]`, in
    /// table order. A start failure is logged and skipped; one broken
    /// job never blocks the rest. Returns the number of jobs started.
    pub async fn run(&self, host: &dyn SchedulerHost) -> usize {
        let mut started = 0;
        for entry in self.table.iter() {
            if !entry.matches(&self.last_run, &self.this_run) {
                continue;
            }
            debug!(job = %entry.job, user = %entry.user, "starting scheduled job");
            match host.start_job(entry).await {
                Ok(()) => started += 1,
                Err(err) => warn!(job = %entry.job, %err, "scheduled job failed to start"),
            }
        }
        started
    }
}

#[cfg(test)]
#[path = "starter_tests.rs"]
mod tests;
