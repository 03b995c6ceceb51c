// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! droverd: the drover scheduling daemon.

use std::sync::Arc;

use drover_daemon::{env, logging, startup, timers, Config, LifecycleError, ListenCtx, Listener, StartupResult};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("droverd: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), LifecycleError> {
    let config = Config::load()?;
    let _log_guard = logging::init(&config.log_dir)?;

    let StartupResult { mut daemon, unix, tcp } = match startup(&config).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "startup failed");
            return Err(e);
        }
    };

    let shutdown = Arc::new(Notify::new());
    let cancel = CancellationToken::new();
    let ctx = Arc::new(ListenCtx {
        coord: Arc::clone(&daemon.coordinator),
        start_time: daemon.start_time,
        shutdown: Arc::clone(&shutdown),
        ipc_timeout: env::ipc_timeout(),
    });

    let settings = &daemon.settings;
    let tasks = vec![
        tokio::spawn(Listener::new(unix, tcp, ctx).run(cancel.clone())),
        tokio::spawn(timers::reaper_loop(
            Arc::clone(&daemon.coordinator),
            settings.reaper_interval,
            cancel.clone(),
        )),
        tokio::spawn(timers::schedule_loop(
            Arc::clone(&daemon.coordinator),
            settings.schedule_interval,
            cancel.clone(),
        )),
        tokio::spawn(timers::checkpoint_loop(
            Arc::clone(&daemon.coordinator),
            settings.checkpoint_interval,
            cancel.clone(),
        )),
    ];

    // Signals the parent process that the socket is accepting
    println!("READY");
    info!(version = env::PROTOCOL_VERSION, "daemon ready");

    tokio::select! {
        _ = shutdown.notified() => info!("shutdown requested"),
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => info!("interrupted"),
            Err(e) => error!(error = %e, "failed to listen for ctrl-c"),
        },
    }

    cancel.cancel();
    for task in tasks {
        if let Err(e) = task.await {
            error!(error = %e, "background task failed");
        }
    }
    daemon.shutdown()
}
