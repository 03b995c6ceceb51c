// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule event handlers.

use drover_core::Event;

use super::MaterializedState;

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::ScheduleCreated { schedule, specs } => {
            state.schedules.entry(schedule.id).or_insert_with(|| schedule.clone());
            state.last_ids.schedule = state.last_ids.schedule.max(schedule.id.get());
            for spec in specs {
                state.schedule_specs.entry(spec.id).or_insert_with(|| spec.clone());
                state.last_ids.spec = state.last_ids.spec.max(spec.id.get());
            }
        }

        Event::ScheduleSpecAdvanced { id, next_ms } => {
            if let Some(spec) = state.schedule_specs.get_mut(id) {
                spec.next_ms = *next_ms;
            }
        }

        Event::SchedulesDeleted { repo_id } => {
            state.schedules.retain(|_, s| s.scope.repo_id != *repo_id);
            state.schedule_specs.retain(|_, s| s.repo_id != *repo_id);
        }

        _ => {}
    }
}
