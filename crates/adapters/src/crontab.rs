// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron spec evaluation for schedules.
//!
//! Accepts standard 5-field Unix expressions, 6-field expressions with
//! seconds, the `@hourly`-style shorthands, and `@every <duration>`.

use crate::workflow::ParseError;
use chrono::{DateTime, TimeZone, Utc};
use drover_core::parse_duration;
use std::str::FromStr;

pub trait CronParser: Send + Sync + 'static {
    /// Next fire time strictly after `after_ms` (epoch milliseconds).
    fn next_after(&self, spec: &str, after_ms: u64) -> Result<u64, ParseError>;
}

/// Parser backed by the `cron` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScheduleCronParser;

/// The `cron` crate wants a seconds field; Unix cron has none.
fn normalize(spec: &str) -> String {
    let fields: Vec<&str> = spec.split_whitespace().collect();
    if fields.len() == 5 {
        format!("0 {}", fields.join(" "))
    } else {
        fields.join(" ")
    }
}

fn cron_err(spec: &str, reason: impl ToString) -> ParseError {
    ParseError::Cron { spec: spec.to_string(), reason: reason.to_string() }
}

/// Interval of an `@every` spec: `"1h30m"`, `"90s"`, `"15m"`.
fn parse_every(spec: &str, text: &str) -> Result<u64, ParseError> {
    let interval = parse_duration(text).map_err(|e| cron_err(spec, e))?;
    let millis = u64::try_from(interval.as_millis()).map_err(|_| cron_err(spec, "interval out of range"))?;
    if millis == 0 {
        return Err(cron_err(spec, "interval must be positive"));
    }
    Ok(millis)
}

impl CronParser for ScheduleCronParser {
    fn next_after(&self, spec: &str, after_ms: u64) -> Result<u64, ParseError> {
        let spec = spec.trim();
        if let Some(every) = spec.strip_prefix("@every") {
            let interval = parse_every(spec, every)?;
            return after_ms.checked_add(interval).ok_or_else(|| cron_err(spec, "time out of range"));
        }

        let schedule = cron::Schedule::from_str(&normalize(spec)).map_err(|e| cron_err(spec, e))?;
        let after_ms = i64::try_from(after_ms).map_err(|_| cron_err(spec, "time out of range"))?;
        let after: DateTime<Utc> = Utc
            .timestamp_millis_opt(after_ms)
            .single()
            .ok_or_else(|| cron_err(spec, "time out of range"))?;
        let next = schedule
            .after(&after)
            .next()
            .ok_or_else(|| cron_err(spec, "no upcoming fire time"))?;
        u64::try_from(next.timestamp_millis()).map_err(|_| cron_err(spec, "time out of range"))
    }
}

#[cfg(test)]
#[path = "crontab_tests.rs"]
mod tests;
