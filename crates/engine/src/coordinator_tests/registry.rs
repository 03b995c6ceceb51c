// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    empty_token = { "", "runner-1" },
    empty_name = { REG_TOKEN, "  " },
    unknown_token = { "nope", "runner-1" },
)]
fn register_rejects_bad_input(token: &str, name: &str) {
    let h = harness();
    let err = h.coord.register_runner(token, name, "v1", &[]).unwrap_err();
    assert_eq!(err.code(), "invalid_argument");
}

#[test]
fn register_creates_runner_in_token_scope() {
    let h = harness();
    let labels = vec!["ubuntu".to_string(), "docker".to_string()];
    let reg = h.coord.register_runner(REG_TOKEN, "builder", "v1.2.0", &labels).unwrap();

    assert_eq!(reg.runner.scope, repo_scope());
    assert!(reg.runner.labels.contains("docker"));
    assert!(reg.runner.secret.verify(&reg.token));
    let stored = h.coord.store().read(|s| s.runner_by_uuid(&reg.runner.uuid).cloned()).unwrap();
    assert_eq!(stored.id, reg.runner.id);

    let used = h.coord.store().read(|s| s.registration_token(REG_TOKEN).cloned()).unwrap();
    assert!(used.is_active);
    assert!(used.last_used_at_ms.is_some());
}

#[test]
fn superseded_registration_token_is_rejected() {
    let h = harness();
    h.coord.put_registration_token("reg-second", repo_scope()).unwrap();

    let err = h.coord.register_runner(REG_TOKEN, "builder", "v1", &[]).unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(h.coord.register_runner("reg-second", "builder", "v1", &[]).is_ok());
}

#[test]
fn authenticate_runner_checks_secret() {
    let h = harness();
    let reg = h.coord.register_runner(REG_TOKEN, "builder", "v1", &[]).unwrap();

    let runner = h.coord.authenticate_runner(&reg.runner.uuid, &reg.token).unwrap();
    assert_eq!(runner.id, reg.runner.id);

    let mut flipped = reg.token.clone().into_bytes();
    flipped[0] ^= 1;
    let flipped = String::from_utf8(flipped).unwrap();
    assert!(matches!(
        h.coord.authenticate_runner(&reg.runner.uuid, &flipped),
        Err(ServiceError::Authentication(_))
    ));
    assert!(matches!(
        h.coord.authenticate_runner("unknown-uuid", &reg.token),
        Err(ServiceError::Authentication(_))
    ));
}

#[test]
fn declare_replaces_labels_and_version() {
    let h = harness();
    let runner = h.register(&["old"]);
    let labels = vec!["gpu".to_string()];

    let declared = h.coord.declare_runner(&runner, &labels, "v2").unwrap();
    assert!(declared.labels.contains("gpu"));
    assert!(!declared.labels.contains("old"));
    assert_eq!(declared.version, "v2");

    let again = h.coord.declare_runner(&runner, &labels, "v2").unwrap();
    assert_eq!(again.labels, declared.labels);
    let stored = h.coord.store().read(|s| s.runner(runner.id).cloned()).unwrap();
    assert_eq!(stored.version, "v2");
}

#[tokio::test]
async fn task_token_authenticates_running_task() {
    let h = harness();
    let runner = h.register(&[]);
    h.submit(vec![job("build")]).await;
    let task = h.fetch(&runner).await.unwrap();

    let found = h.coord.authenticate_task_token(&task.token).unwrap();
    assert_eq!(found.id, task.task_id);
    assert_eq!(h.coord.token_cache().len(), 1);

    // Cached hit is served again.
    assert_eq!(h.coord.authenticate_task_token(&task.token).unwrap().id, task.task_id);
}

#[tokio::test]
async fn cache_hit_skips_hash_verification() {
    let h = harness();
    let runner = h.register(&[]);
    h.submit(vec![job("build")]).await;
    let task = h.fetch(&runner).await.unwrap();

    // The stored hash does not match this token; only the cached id resolves it.
    let planted = "0".repeat(40);
    h.coord.token_cache().insert(&planted, task.task_id);
    assert_eq!(h.coord.authenticate_task_token(&planted).unwrap().id, task.task_id);

    h.coord.token_cache().remove(&planted);
    assert_eq!(h.coord.authenticate_task_token(&planted).unwrap_err().code(), "not_found");
}

#[tokio::test]
async fn cached_token_of_finished_task_is_evicted() {
    let h = harness();
    let runner = h.register(&[]);
    h.submit(vec![job("build")]).await;
    let task = h.fetch(&runner).await.unwrap();
    h.coord.authenticate_task_token(&task.token).unwrap();

    h.finish(&runner, task.task_id, TaskResult::Success).await;

    let err = h.coord.authenticate_task_token(&task.token).unwrap_err();
    assert_eq!(err.code(), "not_found");
    assert!(h.coord.token_cache().is_empty());
}

#[parameterized(
    short = { "abc" },
    upper = { "ABCDEF0123456789ABCDEF0123456789ABCDEF01" },
    not_hex = { "zzzzzz0123456789abcdef0123456789abcdef01" },
)]
fn malformed_task_tokens_are_not_found(token: &str) {
    let h = harness();
    assert_eq!(h.coord.authenticate_task_token(token).unwrap_err().code(), "not_found");
}
