// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tessera-scheduler: minute-tick cron scheduler driving host-owned jobs

pub mod host;
pub mod scheduler;
pub mod starter;

pub use host::{SchedulerError, SchedulerHost};
pub use scheduler::CronScheduler;
pub use starter::JobStarter;
