// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Administrator calls, accepted on the local socket only.

use std::time::Instant;

use drover_adapters::{ArchiveStore, NotifyAdapter, StatusPublisher};
use drover_core::{Clock, JobSpec, RepoId, Scope};
use drover_engine::{Coordinator, NewSchedule, ServiceError};
use drover_storage::NewRun;
use drover_wire::{JobEntry, Response, RunInfo, ScheduleRequest, StatusInfo};

pub(super) fn put_registration_token<A, P, N, C>(
    coord: &Coordinator<A, P, N, C>,
    token: &str,
    scope: Scope,
) -> Result<Response, ServiceError>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    coord.put_registration_token(token, scope)?;
    Ok(Response::Ok)
}

pub(super) async fn create_run<A, P, N, C>(
    coord: &Coordinator<A, P, N, C>,
    scope: Scope,
    commit_sha: String,
    title: String,
    jobs: Vec<JobSpec>,
) -> Result<Response, ServiceError>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    let (run, jobs) =
        coord.create_run(NewRun { scope, commit_sha, title, schedule_id: None, jobs }).await?;
    let status = coord.run_status(run.id)?;
    let jobs = jobs.into_iter().map(|j| JobEntry { id: j.id, key: j.key, status: j.status }).collect();
    Ok(Response::RunCreated { run: RunInfo { id: run.id, status, jobs } })
}

pub(super) fn create_schedules<A, P, N, C>(
    coord: &Coordinator<A, P, N, C>,
    schedules: Vec<ScheduleRequest>,
) -> Result<Response, ServiceError>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    let schedules = schedules
        .into_iter()
        .map(|s| NewSchedule {
            title: s.title,
            scope: s.scope,
            workflow_id: s.workflow_id,
            ref_name: s.ref_name,
            commit_sha: s.commit_sha,
            specs: s.specs,
            payload: s.payload,
        })
        .collect();
    let created = coord.create_schedules(schedules)?;
    Ok(Response::SchedulesCreated { ids: created.into_iter().map(|s| s.id).collect() })
}

pub(super) fn delete_schedules<A, P, N, C>(
    coord: &Coordinator<A, P, N, C>,
    repo_id: RepoId,
) -> Result<Response, ServiceError>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    let removed = coord.delete_schedules_by_repo(repo_id)?;
    Ok(Response::SchedulesDeleted { removed })
}

pub(super) fn status<A, P, N, C>(coord: &Coordinator<A, P, N, C>, start_time: Instant) -> Response
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    let summary = coord.status_summary();
    Response::Status {
        status: StatusInfo {
            uptime_secs: start_time.elapsed().as_secs(),
            runners: summary.runners,
            runs: summary.runs,
            waiting_jobs: summary.waiting_jobs,
            blocked_jobs: summary.blocked_jobs,
            running_tasks: summary.running_tasks,
            schedules: summary.schedules,
        },
    }
}
