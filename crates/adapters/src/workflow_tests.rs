// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    named = { r#"{"steps":[{"name":"Checkout","uses":"actions/checkout@v4"}]}"#, "Checkout" },
    uses = { r#"{"steps":[{"uses":"actions/checkout@v4"}]}"#, "actions/checkout@v4" },
    run = { r#"{"steps":[{"run":"\n  make test\nmake lint"}]}"#, "Run make test" },
    blank_name = { r#"{"steps":[{"name":"  ","run":"ls"}]}"#, "Run ls" },
    anonymous = { r#"{"steps":[{}]}"#, "Step 1" },
)]
fn step_naming(payload: &str, expected: &str) {
    let steps = JsonWorkflowParser.parse_steps(payload).unwrap();
    assert_eq!(steps, vec![expected.to_string()]);
}

#[test]
fn empty_payload_has_no_steps() {
    assert!(JsonWorkflowParser.parse_steps("").unwrap().is_empty());
    assert!(JsonWorkflowParser.parse_steps("{}").unwrap().is_empty());
}

#[test]
fn malformed_payload_is_an_error() {
    assert!(matches!(JsonWorkflowParser.parse_steps("{steps"), Err(ParseError::Payload(_))));
}

#[test]
fn order_is_preserved() {
    let payload = r#"{"steps":[{"name":"a"},{"name":"b"},{"name":"c"}]}"#;
    assert_eq!(JsonWorkflowParser.parse_steps(payload).unwrap(), vec!["a", "b", "c"]);
}
