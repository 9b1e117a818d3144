// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tessera-core: Clock abstraction and crontab model for the tessera CMS core

pub mod clock;
pub mod cron;
pub mod table;

pub use clock::{Clock, FakeClock, SystemClock};
pub use cron::{CronEntry, CronField, CronParseError, TickTime};
pub use table::{CronTable, SharedCronTable};
