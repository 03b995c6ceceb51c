// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use drover_core::RegistrationToken;

fn issued(token: &str, scope: Scope) -> Event {
    Event::RegistrationIssued {
        token: RegistrationToken {
            token: token.into(),
            scope,
            is_active: true,
            created_at_ms: FIXTURE_EPOCH_MS,
            last_used_at_ms: None,
        },
    }
}

#[test]
fn new_token_supersedes_same_scope() {
    let mut state = MaterializedState::default();
    let repo = Scope::repo(OwnerId::new(1), RepoId::new(1));
    state.apply_event(&issued("old", repo));
    state.apply_event(&issued("other-scope", Scope::global()));
    state.apply_event(&issued("new", repo));

    assert!(!state.registration_token("old").unwrap().is_active);
    assert!(state.registration_token("new").unwrap().is_active);
    assert!(state.registration_token("other-scope").unwrap().is_active);
}

#[test]
fn registration_use_is_recorded() {
    let mut state = MaterializedState::default();
    state.apply_event(&issued("tok", Scope::global()));
    state.apply_event(&Event::RegistrationUsed { token: "tok".into(), at_ms: 42 });
    assert_eq!(state.registration_token("tok").unwrap().last_used_at_ms, Some(42));
}

#[test]
fn runner_registration_is_idempotent() {
    let mut state = MaterializedState::default();
    let (r, _) = runner(3, &["linux"]);
    let event = Event::RunnerRegistered { runner: r.clone() };
    let once = apply_twice(&mut state, &event);
    assert_same(&once, &state);
    assert_eq!(state.runner_by_uuid(&r.uuid).unwrap().id, r.id);
    assert_eq!(state.last_ids.runner, 3);
}
