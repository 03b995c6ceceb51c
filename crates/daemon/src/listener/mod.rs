// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for handling socket I/O.
//!
//! Each connection carries one request and one response. The Unix socket
//! accepts every call; TCP accepts runner calls only.

mod admin;
mod runner;

use std::sync::Arc;
use std::time::{Duration, Instant};

use drover_adapters::{ArchiveStore, NotifyAdapter, StatusPublisher};
use drover_core::Clock;
use drover_engine::{Coordinator, ServiceError};
use drover_wire::{ErrorCode, ProtocolError, Request, Response};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::{TcpListener, UnixListener};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::env::PROTOCOL_VERSION;

/// Shared daemon context for all request handlers.
pub struct ListenCtx<A, P, N, C: Clock> {
    pub coord: Arc<Coordinator<A, P, N, C>>,
    pub start_time: Instant,
    /// Notified by an admin `Shutdown`.
    pub shutdown: Arc<Notify>,
    pub ipc_timeout: Duration,
}

/// Listener task for accepting socket connections.
pub struct Listener<A, P, N, C: Clock> {
    unix: UnixListener,
    tcp: Option<TcpListener>,
    ctx: Arc<ListenCtx<A, P, N, C>>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Source of a connection (for permission decisions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionSource {
    /// Local Unix socket: trusted, admin calls allowed.
    Unix,
    /// Remote TCP: runner calls only.
    Tcp,
}

impl<A, P, N, C> Listener<A, P, N, C>
where
    A: ArchiveStore + 'static,
    P: StatusPublisher + 'static,
    N: NotifyAdapter + 'static,
    C: Clock + 'static,
{
    pub fn new(unix: UnixListener, tcp: Option<TcpListener>, ctx: Arc<ListenCtx<A, P, N, C>>) -> Self {
        Self { unix, tcp, ctx }
    }

    /// Run the listener loop until cancelled, spawning a task per connection.
    pub async fn run(mut self, cancel: CancellationToken) {
        match self.tcp.take() {
            Some(tcp) => self.run_dual(tcp, cancel).await,
            None => self.run_unix_only(cancel).await,
        }
    }

    async fn run_unix_only(self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.unix.accept() => match result {
                    Ok((stream, _)) => self.spawn(stream.into_split(), ConnectionSource::Unix),
                    Err(e) => error!(error = %e, "unix accept error"),
                },
            }
        }
    }

    async fn run_dual(self, tcp: TcpListener, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.unix.accept() => match result {
                    Ok((stream, _)) => self.spawn(stream.into_split(), ConnectionSource::Unix),
                    Err(e) => error!(error = %e, "unix accept error"),
                },
                result = tcp.accept() => match result {
                    Ok((stream, addr)) => {
                        debug!(%addr, "tcp connection");
                        self.spawn(stream.into_split(), ConnectionSource::Tcp);
                    }
                    Err(e) => error!(error = %e, "tcp accept error"),
                },
            }
        }
    }

    fn spawn<R, W>(&self, (reader, writer): (R, W), source: ConnectionSource)
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let ctx = Arc::clone(&self.ctx);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(reader, writer, source, &ctx).await {
                log_connection_error(e);
            }
        });
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(ProtocolError::ConnectionClosed) => debug!("client disconnected"),
        ConnectionError::Protocol(ProtocolError::Timeout) => warn!("connection timeout"),
        _ => error!(error = %e, "connection error"),
    }
}

/// Handle a single client connection.
///
/// The handler is raced against client disconnect; a client that hangs up
/// first gets no response and the handler future is dropped.
pub async fn handle_connection<R, W, A, P, N, C>(
    mut reader: R,
    mut writer: W,
    source: ConnectionSource,
    ctx: &ListenCtx<A, P, N, C>,
) -> Result<(), ConnectionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    let request = drover_wire::read_request(&mut reader, ctx.ipc_timeout).await?;

    if request.is_poll() {
        debug!(request = request.name(), "received request");
    } else {
        info!(request = request.name(), "received request");
    }

    let response = tokio::select! {
        response = handle_request(request, source, ctx) => response,
        _ = detect_client_disconnect(&mut reader) => {
            debug!("client disconnected, cancelling handler");
            return Ok(());
        }
    };

    drover_wire::write_response(&mut writer, &response, ctx.ipc_timeout).await?;
    Ok(())
}

/// Reading after the request returns only at EOF (or on a protocol
/// violation), since clients wait for the response.
async fn detect_client_disconnect<R: AsyncRead + Unpin>(reader: &mut R) {
    let mut buf = [0u8; 1];
    let _ = reader.read(&mut buf).await;
}

/// Handle a single request and return a response.
pub async fn handle_request<A, P, N, C>(
    request: Request,
    source: ConnectionSource,
    ctx: &ListenCtx<A, P, N, C>,
) -> Response
where
    A: ArchiveStore,
    P: StatusPublisher,
    N: NotifyAdapter,
    C: Clock,
{
    if source == ConnectionSource::Tcp && request.is_admin() {
        warn!(request = request.name(), "admin call rejected on tcp");
        return Response::error(ErrorCode::PermissionDenied, "admin calls require the local socket");
    }

    let name = request.name();
    let result = match request {
        Request::Ping => Ok(Response::Pong),
        Request::Hello { version } => {
            if version != PROTOCOL_VERSION {
                debug!(client = %version, daemon = PROTOCOL_VERSION, "protocol version differs");
            }
            Ok(Response::Hello { version: PROTOCOL_VERSION.to_string() })
        }

        Request::Register { token, name, version, labels } => {
            runner::register(&ctx.coord, &token, &name, &version, &labels)
        }
        Request::Declare { auth, labels, version } => {
            runner::declare(&ctx.coord, &auth, &labels, &version)
        }
        Request::FetchTask { auth, tasks_version } => {
            runner::fetch_task(&ctx.coord, &auth, tasks_version).await
        }
        Request::UpdateTask { auth, state, outputs } => {
            runner::update_task(&ctx.coord, &auth, state, outputs).await
        }
        Request::UpdateLog { auth, task_id, rows, index, no_more } => {
            runner::update_log(&ctx.coord, &auth, task_id, rows, index, no_more).await
        }
        Request::TaskContext { token } => runner::task_context(&ctx.coord, &token),

        Request::PutRegistrationToken { token, scope } => {
            admin::put_registration_token(&ctx.coord, &token, scope)
        }
        Request::CreateRun { scope, commit_sha, title, jobs } => {
            admin::create_run(&ctx.coord, scope, commit_sha, title, jobs).await
        }
        Request::CreateSchedules { schedules } => admin::create_schedules(&ctx.coord, schedules),
        Request::DeleteSchedules { repo_id } => admin::delete_schedules(&ctx.coord, repo_id),
        Request::Status => Ok(admin::status(&ctx.coord, ctx.start_time)),
        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Ok(Response::ShuttingDown)
        }
    };

    result.unwrap_or_else(|e| error_response(name, e))
}

/// Map a service failure to its wire error via [`ServiceError::code`].
pub fn error_response(request: &str, e: ServiceError) -> Response {
    let code = e.code().parse().unwrap_or(ErrorCode::Internal);
    match code {
        ErrorCode::Internal => error!(request, error = %e, "request failed"),
        _ => debug!(request, error = %e, "request rejected"),
    }
    Response::error(code, e.to_string())
}

#[cfg(test)]
#[path = "../listener_tests/mod.rs"]
mod tests;
