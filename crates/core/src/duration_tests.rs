// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    seconds     = { "30s",     Duration::from_secs(30) },
    bare_number = { "30",      Duration::from_secs(30) },
    minutes     = { "10m",     Duration::from_secs(600) },
    hours       = { "3h",      Duration::from_secs(3 * 3600) },
    days        = { "365d",    Duration::from_secs(365 * 86400) },
    ws_middle   = { "5 min",   Duration::from_secs(300) },
    millis      = { "200ms",   Duration::from_millis(200) },
    compound    = { "1h30m",   Duration::from_secs(90 * 60) },
    spaced      = { "1h 30m",  Duration::from_secs(90 * 60) },
    trailing    = { "1m 5",    Duration::from_secs(65) },
)]
fn parse_duration_valid(input: &str, expected: Duration) {
    assert_eq!(parse_duration(input).unwrap(), expected);
}

#[parameterized(
    invalid_suffix  = { "30x" },
    empty_string    = { "" },
    invalid_number  = { "abcs" },
    bare_then_more  = { "10 20s" },
    huge_number     = { "99999999999999999999999s" },
    overflow_mul    = { "18446744073709551615h" },
    overflow_sum    = { "18446744073709551s 18446744073709551s" },
)]
fn parse_duration_invalid(input: &str) {
    assert!(parse_duration(input).is_err());
}
