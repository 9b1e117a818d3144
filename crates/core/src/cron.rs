// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crontab entry model: time fields, parsing, and tick matching.
//!
//! One entry is one line of the persisted crontab:
//!
//! ```text
//! minute hour day-of-month month day-of-week user group job [param]
//! ```
//!
//! `*` is the wildcard in any of the five time fields. The table loader
//! substitutes `*` to the `-1` sentinel before field parsing; the field
//! parser accepts both spellings.

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel value the loader substitutes for `*`.
pub const WILDCARD_SENTINEL: i32 = -1;

/// Errors from parsing a crontab line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CronParseError {
    #[error("expected 8 or 9 fields, found {found}: '{line}'")]
    FieldCount { found: usize, line: String },

    #[error("invalid {field} field '{token}': not a number")]
    NotANumber { field: &'static str, token: String },
}

/// One time field of a cron entry: a wildcard or an exact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CronField {
    /// Matches any value.
    Any,
    /// Matches exactly this value.
    At(i32),
}

impl CronField {
    fn parse(field: &'static str, token: &str) -> Result<Self, CronParseError> {
        if token == "*" {
            return Ok(Self::Any);
        }
        let value: i32 = token.parse().map_err(|_| CronParseError::NotANumber {
            field,
            token: token.to_string(),
        })?;
        if value == WILDCARD_SENTINEL {
            Ok(Self::Any)
        } else {
            Ok(Self::At(value))
        }
    }

    /// Exact-equality match against a calendar field of the current tick.
    pub fn matches_exact(&self, value: i32) -> bool {
        match self {
            Self::Any => true,
            Self::At(at) => *at == value,
        }
    }

    /// Exclusive-inclusive window match `(last, this]`, used for the
    /// minute field so scheduler jitter cannot double-fire or skip a tick.
    pub fn matches_window(&self, last: i32, this: i32) -> bool {
        match self {
            Self::Any => true,
            Self::At(at) => last < *at && *at <= this,
        }
    }
}

impl fmt::Display for CronField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "*"),
            Self::At(value) => write!(f, "{}", value),
        }
    }
}

/// Calendar fields of one scheduler tick, snapshotted from a UTC timestamp.
///
/// Day-of-week is numbered 0 = Sunday through 6 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTime {
    pub minute: i32,
    pub hour: i32,
    pub day_of_month: i32,
    pub month: i32,
    pub day_of_week: i32,
}

impl TickTime {
    /// Snapshot the calendar fields of a timestamp.
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            minute: at.minute() as i32,
            hour: at.hour() as i32,
            day_of_month: at.day() as i32,
            month: at.month() as i32,
            day_of_week: at.weekday().num_days_from_sunday() as i32,
        }
    }
}

impl From<DateTime<Utc>> for TickTime {
    fn from(at: DateTime<Utc>) -> Self {
        Self::from_datetime(at)
    }
}

/// One scheduled-job rule: five time fields plus the job identity and the
/// user/group context it runs under.
///
/// Immutable after parsing; the table replaces entries wholesale on reload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronEntry {
    pub minute: CronField,
    pub hour: CronField,
    pub day_of_month: CronField,
    pub month: CronField,
    pub day_of_week: CronField,
    /// User the job runs as.
    pub user: String,
    /// Group the job runs as.
    pub group: String,
    /// Job name dispatched to the host.
    pub job: String,
    /// Optional single job parameter.
    pub param: Option<String>,
}

impl CronEntry {
    /// True if this entry is due for the tick window `(last_run, this_run]`.
    ///
    /// The minute field uses the window check; the other four fields use
    /// exact equality against `this_run`, since they change at most once
    /// per tick. Missed minutes are not backfilled: a delay of more than
    /// one minute collapses into a single window against the latest tick.
    pub fn matches(&self, last_run: &TickTime, this_run: &TickTime) -> bool {
        self.minute.matches_window(last_run.minute, this_run.minute)
            && self.hour.matches_exact(this_run.hour)
            && self.day_of_month.matches_exact(this_run.day_of_month)
            && self.month.matches_exact(this_run.month)
            && self.day_of_week.matches_exact(this_run.day_of_week)
    }
}

impl FromStr for CronEntry {
    type Err = CronParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 8 && tokens.len() != 9 {
            return Err(CronParseError::FieldCount {
                found: tokens.len(),
                line: line.trim().to_string(),
            });
        }

        Ok(Self {
            minute: CronField::parse("minute", tokens[0])?,
            hour: CronField::parse("hour", tokens[1])?,
            day_of_month: CronField::parse("day-of-month", tokens[2])?,
            month: CronField::parse("month", tokens[3])?,
            day_of_week: CronField::parse("day-of-week", tokens[4])?,
            user: tokens[5].to_string(),
            group: tokens[6].to_string(),
            job: tokens[7].to_string(),
            param: tokens.get(8).map(|t| t.to_string()),
        })
    }
}

impl fmt::Display for CronEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {} {}",
            self.minute,
            self.hour,
            self.day_of_month,
            self.month,
            self.day_of_week,
            self.user,
            self.group,
            self.job,
        )?;
        if let Some(param) = &self.param {
            write!(f, " {}", param)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
