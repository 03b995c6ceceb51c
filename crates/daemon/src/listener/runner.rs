// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner calls: register, declare, poll, state/log reports, and task-token
//! lookups from inside a job.

use std::collections::BTreeMap;

use drover_adapters::{ArchiveStore, NotifyAdapter, StatusPublisher};
use drover_core::{Clock, Runner, TaskId};
use drover_engine::{Coordinator, LogChunk, LogRow, ServiceError, TaskPayload, TaskStateUpdate};
use drover_wire::{
    LogLine, NeedInfo, Response, RunnerAuth, RunnerInfo, TaskContextInfo, TaskInfo, TaskState,
};

fn runner_info(runner: &Runner, token: Option<String>) -> RunnerInfo {
    RunnerInfo {
        id: runner.id,
        uuid: runner.uuid.clone(),
        token,
        name: runner.name.clone(),
        version: runner.version.clone(),
        labels: runner.labels.to_vec(),
    }
}

fn task_info(task: TaskPayload) -> TaskInfo {
    TaskInfo {
        id: task.task_id,
        token: task.token,
        job_id: task.job_id,
        run_id: task.run_id,
        job_key: task.job_key,
        job_name: task.job_name,
        attempt: task.attempt,
        scope: task.scope,
        commit_sha: task.commit_sha,
        payload: task.payload,
        steps: task.steps,
        needs: task
            .needs
            .into_iter()
            .map(|(key, need)| (key, NeedInfo { result: need.result, outputs: need.outputs }))
            .collect(),
    }
}

fn authenticate<A, P, N, C>(
    coord: &Coordinator<A, P, N, C>,
    auth: &RunnerAuth,
) -> Result<Runner, ServiceError>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    coord.authenticate_runner(&auth.uuid, &auth.token)
}

pub(super) fn register<A, P, N, C>(
    coord: &Coordinator<A, P, N, C>,
    token: &str,
    name: &str,
    version: &str,
    labels: &[String],
) -> Result<Response, ServiceError>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    let registration = coord.register_runner(token, name, version, labels)?;
    Ok(Response::Runner { runner: runner_info(&registration.runner, Some(registration.token)) })
}

pub(super) fn declare<A, P, N, C>(
    coord: &Coordinator<A, P, N, C>,
    auth: &RunnerAuth,
    labels: &[String],
    version: &str,
) -> Result<Response, ServiceError>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    let runner = authenticate(coord, auth)?;
    let runner = coord.declare_runner(&runner, labels, version)?;
    Ok(Response::Runner { runner: runner_info(&runner, None) })
}

pub(super) async fn fetch_task<A, P, N, C>(
    coord: &Coordinator<A, P, N, C>,
    auth: &RunnerAuth,
    tasks_version: u64,
) -> Result<Response, ServiceError>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    let runner = authenticate(coord, auth)?;
    let fetched = coord.fetch_task(&runner, tasks_version).await?;
    Ok(Response::Task {
        task: fetched.task.map(|t| Box::new(task_info(t))),
        tasks_version: fetched.tasks_version,
    })
}

pub(super) async fn update_task<A, P, N, C>(
    coord: &Coordinator<A, P, N, C>,
    auth: &RunnerAuth,
    state: TaskState,
    outputs: BTreeMap<String, String>,
) -> Result<Response, ServiceError>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    let runner = authenticate(coord, auth)?;
    let update = TaskStateUpdate {
        task_id: state.id,
        result: state.result,
        stopped_at_ms: state.stopped_at_ms,
        steps: state.steps,
    };
    let ack = coord.update_task(&runner, update, outputs).await?;
    Ok(Response::TaskUpdated { id: ack.task_id, result: ack.result, sent_outputs: ack.sent_outputs })
}

pub(super) async fn update_log<A, P, N, C>(
    coord: &Coordinator<A, P, N, C>,
    auth: &RunnerAuth,
    task_id: TaskId,
    rows: Vec<LogLine>,
    index: u64,
    no_more: bool,
) -> Result<Response, ServiceError>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    let runner = authenticate(coord, auth)?;
    let chunk = LogChunk {
        task_id,
        index,
        rows: rows.into_iter().map(|r| LogRow { time: r.time, content: r.content }).collect(),
        no_more,
    };
    let ack_index = coord.update_log(&runner, chunk).await?;
    Ok(Response::LogAck { ack_index })
}

pub(super) fn task_context<A, P, N, C>(
    coord: &Coordinator<A, P, N, C>,
    token: &str,
) -> Result<Response, ServiceError>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    let (task, job) = coord.task_context(token)?;
    Ok(Response::TaskContext {
        context: TaskContextInfo {
            task_id: task.id,
            job_id: job.id,
            run_id: job.run_id,
            attempt: task.attempt,
            scope: task.scope,
            commit_sha: task.commit_sha,
        },
    })
}
