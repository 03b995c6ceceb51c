// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

/// 2024-01-01T00:00:00Z
const JAN_1: u64 = 1_704_067_200_000;
const MINUTE: u64 = 60_000;
const HOUR: u64 = 60 * MINUTE;

#[test]
fn normalize_adds_seconds_field() {
    assert_eq!(normalize("* * * * *"), "0 * * * * *");
    assert_eq!(normalize("0 0 * * * *"), "0 0 * * * *");
}

#[parameterized(
    every_minute = { "* * * * *", JAN_1 + MINUTE },
    hourly_field = { "0 * * * *", JAN_1 + HOUR },
    half_past = { "30 * * * *", JAN_1 + 30 * MINUTE },
    six_fields = { "15 * * * * *", JAN_1 + 15_000 },
    shorthand = { "@hourly", JAN_1 + HOUR },
    every = { "@every 1h30m", JAN_1 + 90 * MINUTE },
    every_spaced = { "@every 1h 30m", JAN_1 + 90 * MINUTE },
    every_bare_seconds = { "@every 90", JAN_1 + 90_000 },
)]
fn next_fire_time(spec: &str, expected: u64) {
    assert_eq!(ScheduleCronParser.next_after(spec, JAN_1).unwrap(), expected);
}

#[test]
fn next_is_strictly_after() {
    let next = ScheduleCronParser.next_after("0 * * * *", JAN_1 + HOUR).unwrap();
    assert_eq!(next, JAN_1 + 2 * HOUR);
}

#[parameterized(
    garbage = { "invalid" },
    empty = { "" },
    too_many = { "0 0 0 0 0 0 0 0" },
    every_empty = { "@every" },
    every_zero = { "@every 0s" },
    every_bad_unit = { "@every 3w" },
    every_overflowing_interval = { "@every 18446744073709551615h" },
)]
fn invalid_specs(spec: &str) {
    assert!(matches!(ScheduleCronParser.next_after(spec, JAN_1), Err(ParseError::Cron { .. })));
}

#[test]
fn every_past_the_end_of_time_is_rejected() {
    let result = ScheduleCronParser.next_after("@every 1h", u64::MAX - 1);
    assert!(matches!(result, Err(ParseError::Cron { .. })));
}
