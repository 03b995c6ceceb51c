// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic background work: reaper sweeps, schedule firing, checkpoints.
//!
//! Each loop waits one full period before its first tick and exits when
//! the cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use drover_adapters::{ArchiveStore, NotifyAdapter, StatusPublisher};
use drover_core::Clock;
use drover_engine::Coordinator;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

async fn every<F, Fut>(period: Duration, cancel: CancellationToken, mut tick: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let mut timer = interval_at(Instant::now() + period, period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = timer.tick() => tick().await,
        }
    }
}

/// Sweep zombie, endless and abandoned work plus expired logs.
pub async fn reaper_loop<A, P, N, C>(
    coord: Arc<Coordinator<A, P, N, C>>,
    period: Duration,
    cancel: CancellationToken,
) where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    every(period, cancel, || {
        let coord = Arc::clone(&coord);
        async move {
            let report = coord.sweep().await;
            if report.is_empty() {
                debug!("reaper sweep found nothing");
            } else {
                info!(
                    zombie = report.zombie,
                    endless = report.endless,
                    requeued = report.requeued,
                    abandoned = report.abandoned,
                    logs_expired = report.logs_expired,
                    failed = report.failed,
                    "reaper sweep"
                );
            }
        }
    })
    .await;
}

/// Fire schedule specs whose next run time has passed.
pub async fn schedule_loop<A, P, N, C>(
    coord: Arc<Coordinator<A, P, N, C>>,
    period: Duration,
    cancel: CancellationToken,
) where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    every(period, cancel, || {
        let coord = Arc::clone(&coord);
        async move {
            let runs = coord.fire_due_schedules().await;
            if !runs.is_empty() {
                info!(runs = runs.len(), "fired due schedules");
            }
        }
    })
    .await;
}

/// Snapshot the store and truncate the WAL.
pub async fn checkpoint_loop<A, P, N, C>(
    coord: Arc<Coordinator<A, P, N, C>>,
    period: Duration,
    cancel: CancellationToken,
) where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    every(period, cancel, || {
        let store = coord.store().clone();
        async move {
            match tokio::task::spawn_blocking(move || store.checkpoint()).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!(error = %e, "checkpoint failed"),
                Err(e) => warn!(error = %e, "checkpoint task failed"),
            }
        }
    })
    .await;
}

#[cfg(test)]
#[path = "timers_tests.rs"]
mod tests;
