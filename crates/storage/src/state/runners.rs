// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registration token and runner event handlers.

use drover_core::Event;

use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::RegistrationIssued { token } => {
            // A new token supersedes every other active token of its scope.
            for other in state.registration_tokens.values_mut() {
                if other.scope == token.scope && other.token != token.token {
                    other.is_active = false;
                }
            }
            state.registration_tokens.insert(token.token.clone(), token.clone());
        }

        Event::RegistrationUsed { token, at_ms } => {
            if let Some(reg) = state.registration_tokens.get_mut(token) {
                reg.is_active = true;
                reg.last_used_at_ms = Some(*at_ms);
            }
        }

        Event::RunnerRegistered { runner } => {
            if !state.runners.contains_key(&runner.id) {
                state.indexes.runner_by_uuid.insert(runner.uuid.clone(), runner.id);
                state.runners.insert(runner.id, runner.clone());
            }
            state.last_ids.runner = state.last_ids.runner.max(runner.id.get());
        }

        Event::RunnerDeclared { id, labels, version, at_ms } => {
            if let Some(runner) = state.runners.get_mut(id) {
                runner.labels = labels.clone();
                runner.version = version.clone();
                runner.updated_at_ms = *at_ms;
            }
        }

        _ => {}
    }
}
