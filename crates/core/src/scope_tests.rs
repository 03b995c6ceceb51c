// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

fn at(owner: u64, repo: u64) -> Scope {
    Scope::repo(OwnerId::new(owner), RepoId::new(repo))
}

#[yare::parameterized(
    global_sees_everything   = { Scope::global(), at(3, 30), true },
    owner_sees_own_repos     = { Scope::owner(OwnerId::new(3)), at(3, 30), true },
    owner_ignores_others     = { Scope::owner(OwnerId::new(4)), at(3, 30), false },
    repo_sees_its_repo       = { Scope::repo(OwnerId::NONE, RepoId::new(30)), at(3, 30), true },
    repo_ignores_sibling     = { Scope::repo(OwnerId::NONE, RepoId::new(31)), at(3, 30), false },
)]
fn runner_scope_covers_job(runner: Scope, job: Scope, expected: bool) {
    assert_eq!(runner.covers(&job), expected);
}

#[test]
fn affected_keys_cover_every_polling_scope() {
    let job = at(3, 30);
    let keys = job.affected_version_keys();
    for runner in [Scope::global(), Scope::owner(OwnerId::new(3)), at(0, 30)] {
        assert!(keys.contains(&runner.version_key()), "missing key for {runner:?}");
    }
}

#[test]
fn scope_key_round_trips_as_map_key() {
    let mut map = HashMap::new();
    map.insert(ScopeKey { owner_id: OwnerId::new(1), repo_id: RepoId::new(2) }, 5u64);
    let json = serde_json::to_string(&map).unwrap();
    assert_eq!(json, r#"{"1/2":5}"#);
    let back: HashMap<ScopeKey, u64> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, map);
}

#[test]
fn scope_key_rejects_garbage() {
    assert!("nope".parse::<ScopeKey>().is_err());
    assert!("a/1".parse::<ScopeKey>().is_err());
}
