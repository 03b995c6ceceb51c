// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-written durations: `"30s"`, `"10m"`, `"1h30m"`, `"5 min"`.

use std::time::Duration;

fn unit_millis(unit: &str) -> Option<u64> {
    Some(match unit {
        "ms" | "millis" | "millisecond" | "milliseconds" => 1,
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1_000,
        "m" | "min" | "mins" | "minute" | "minutes" => 60_000,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000,
        "d" | "day" | "days" => 86_400_000,
        _ => return None,
    })
}

/// Parse a duration made of `<number><unit>` segments, summed.
///
/// A number without a unit means seconds and is only allowed as the last
/// segment. Totals that do not fit in `u64` milliseconds are rejected.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }
    let out_of_range = || format!("duration out of range: {s}");

    let mut total_ms = 0u64;
    let mut rest = s;
    while !rest.is_empty() {
        let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (num_str, tail) = rest.split_at(digits_end);
        if num_str.is_empty() {
            return Err(format!("invalid number in duration: {s}"));
        }
        let num: u64 = num_str.parse().map_err(|_| out_of_range())?;

        let tail = tail.trim_start();
        let unit_end = tail.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_end);
        if unit.is_empty() && !tail.is_empty() {
            return Err(format!("missing unit in duration: {s}"));
        }
        let per_unit = unit_millis(unit).ok_or_else(|| format!("unknown duration suffix: {unit}"))?;

        let part = num.checked_mul(per_unit).ok_or_else(out_of_range)?;
        total_ms = total_ms.checked_add(part).ok_or_else(out_of_range)?;
        rest = tail.trim_start();
    }
    Ok(Duration::from_millis(total_ms))
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod tests;
