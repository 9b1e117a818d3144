// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host seam for the scheduler.
//!
//! The scheduler decides *when*; the host decides *what*. The host owns
//! crontab persistence and job execution, so the scheduler stays free of
//! storage and job-runtime concerns.

use async_trait::async_trait;
use tessera_core::CronEntry;
use thiserror::Error;

/// Errors the host can surface to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// The persisted crontab could not be fetched.
    #[error("crontab reload failed: {0}")]
    Reload(String),

    /// A due job could not be started.
    #[error("job '{job}' failed to start: {message}")]
    JobStart { job: String, message: String },
}

/// What the scheduler needs from its host.
///
/// Each tick's sweep runs as its own task, so a slow `start_job` stalls
/// only that tick's remaining entries, never the scheduler loop.
#[async_trait]
pub trait SchedulerHost: Send + Sync {
    /// Fetch the current crontab text from wherever the host keeps it.
    async fn reload_crontab(&self) -> Result<String, SchedulerError>;

    /// Launch one due job under the entry's user and group.
    async fn start_job(&self, entry: &CronEntry) -> Result<(), SchedulerError>;
}
