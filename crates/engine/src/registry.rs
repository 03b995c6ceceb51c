// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runner Registry: registration, capability declaration, authentication.

use crate::coordinator::Coordinator;
use crate::error::ServiceError;
use drover_adapters::{ArchiveStore, NotifyAdapter, StatusPublisher};
use drover_core::{
    token, truncate_name, Clock, Event, Job, LabelSet, RegistrationToken, Runner, SaltedToken,
    Scope, Status, Task, MAX_NAME_BYTES,
};
use drover_storage::StoreError;

/// A freshly registered runner with its plaintext secret. The secret is not
/// stored and cannot be recovered later.
#[derive(Debug, Clone)]
pub struct Registration {
    pub runner: Runner,
    pub token: String,
}

impl<A, P, N, C> Coordinator<A, P, N, C>
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    /// Make `token` the active registration token for `scope`. Issued
    /// out-of-band by an administrator; supersedes older tokens of the scope.
    pub fn put_registration_token(
        &self,
        token: &str,
        scope: Scope,
    ) -> Result<RegistrationToken, ServiceError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ServiceError::Validation("registration token is empty".into()));
        }
        let reg = RegistrationToken {
            token: token.to_string(),
            scope,
            is_active: true,
            created_at_ms: self.now_ms(),
            last_used_at_ms: None,
        };
        self.store.transact(|tx| {
            tx.emit(Event::RegistrationIssued { token: reg.clone() });
            Ok::<_, StoreError>(())
        })?;
        tracing::info!(owner_id = %scope.owner_id, repo_id = %scope.repo_id, "registration token issued");
        Ok(reg)
    }

    pub fn register_runner(
        &self,
        registration_token: &str,
        name: &str,
        version: &str,
        labels: &[String],
    ) -> Result<Registration, ServiceError> {
        if registration_token.is_empty() {
            return Err(ServiceError::Validation("registration token is required".into()));
        }
        if name.trim().is_empty() {
            return Err(ServiceError::Validation("runner name is required".into()));
        }

        let now = self.now_ms();
        let (plaintext, secret) = SaltedToken::generate();
        let runner = self.store.transact(|tx| {
            let reg = tx
                .state()
                .registration_token(registration_token)
                .filter(|r| r.is_active)
                .ok_or_else(|| {
                    ServiceError::Validation("runner registration token is invalid or inactive".into())
                })?;

            let runner = Runner {
                id: tx.next_runner_id(),
                uuid: uuid::Uuid::new_v4().to_string(),
                name: truncate_name(name.trim(), MAX_NAME_BYTES),
                scope: reg.scope,
                labels: labels.iter().collect::<LabelSet>(),
                version: version.to_string(),
                secret,
                created_at_ms: now,
                updated_at_ms: now,
            };
            tx.emit(Event::RunnerRegistered { runner: runner.clone() });
            tx.emit(Event::RegistrationUsed { token: reg.token.clone(), at_ms: now });
            Ok::<_, ServiceError>(runner)
        })?;

        tracing::info!(
            runner_id = %runner.id,
            uuid = %runner.uuid,
            name = %runner.name,
            labels = %runner.labels,
            "runner registered"
        );
        Ok(Registration { runner, token: plaintext })
    }

    /// Replace the runner's labels and version. Idempotent.
    pub fn declare_runner(
        &self,
        runner: &Runner,
        labels: &[String],
        version: &str,
    ) -> Result<Runner, ServiceError> {
        let labels: LabelSet = labels.iter().collect();
        let now = self.now_ms();
        let updated = self.store.transact(|tx| {
            let mut current = tx
                .state()
                .runner(runner.id)
                .cloned()
                .ok_or_else(|| ServiceError::not_found("runner", runner.id))?;
            tx.emit(Event::RunnerDeclared {
                id: runner.id,
                labels: labels.clone(),
                version: version.to_string(),
                at_ms: now,
            });
            current.labels = labels.clone();
            current.version = version.to_string();
            current.updated_at_ms = now;
            Ok::<_, ServiceError>(current)
        })?;
        tracing::info!(runner_id = %updated.id, labels = %updated.labels, version, "runner declared");
        Ok(updated)
    }

    /// Resolve the runner behind a `(uuid, token)` credential pair.
    pub fn authenticate_runner(&self, uuid: &str, token: &str) -> Result<Runner, ServiceError> {
        let runner = self
            .store
            .read(|s| s.runner_by_uuid(uuid).cloned())
            .ok_or_else(|| ServiceError::Authentication("unregistered runner".into()))?;
        if !runner.secret.verify(token) {
            tracing::debug!(runner_id = %runner.id, "runner token mismatch");
            return Err(ServiceError::Authentication("runner token mismatch".into()));
        }
        Ok(runner)
    }

    /// Resolve the running task a plaintext task token belongs to.
    ///
    /// Consults the token cache first. A cached id skips the hash check and
    /// is trusted while the task still exists and is running; otherwise the
    /// entry is dropped and the candidates are verified one by one.
    pub fn authenticate_task_token(&self, plaintext: &str) -> Result<Task, ServiceError> {
        let not_found = || ServiceError::not_found("task", "for token");
        if !token::is_well_formed(plaintext) {
            return Err(not_found());
        }

        if let Some(id) = self.tokens.get(plaintext) {
            match self.store.read(|s| s.task(id).cloned()) {
                Some(task) if task.status == Status::Running => return Ok(task),
                _ => self.tokens.remove(plaintext),
            }
        }

        let last_eight = token::last_eight(plaintext);
        let task = self
            .store
            .read(|s| {
                s.running_tasks_by_last_eight(last_eight)
                    .into_iter()
                    .find(|t| t.token.verify(plaintext))
                    .cloned()
            })
            .ok_or_else(not_found)?;
        self.tokens.insert(plaintext, task.id);
        Ok(task)
    }

    /// The running task behind a task token, with its job.
    pub fn task_context(&self, plaintext: &str) -> Result<(Task, Job), ServiceError> {
        let task = self.authenticate_task_token(plaintext)?;
        let job = self
            .store
            .read(|s| s.job(task.job_id).cloned())
            .ok_or_else(|| ServiceError::not_found("job", task.job_id))?;
        Ok((task, job))
    }
}
