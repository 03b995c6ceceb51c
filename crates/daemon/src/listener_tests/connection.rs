// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn connection_answers_one_request() {
    let h = harness();
    let (client, server) = tokio::io::duplex(64 * 1024);
    let (server_read, server_write) = tokio::io::split(server);
    let (mut client_read, mut client_write) = tokio::io::split(client);

    let (served, response) = tokio::join!(
        handle_connection(server_read, server_write, ConnectionSource::Tcp, &h.ctx),
        async {
            drover_wire::write_request(&mut client_write, &Request::Ping, Duration::from_secs(1))
                .await
                .unwrap();
            drover_wire::read_response(&mut client_read, Duration::from_secs(1)).await
        }
    );
    served.unwrap();
    assert_eq!(response.unwrap(), Response::Pong);
}

#[tokio::test]
async fn closed_connection_is_reported() {
    let h = harness();
    let (client, server) = tokio::io::duplex(1024);
    drop(client);
    let (server_read, server_write) = tokio::io::split(server);

    let result = handle_connection(server_read, server_write, ConnectionSource::Unix, &h.ctx).await;
    assert!(matches!(result, Err(ConnectionError::Protocol(ProtocolError::ConnectionClosed))));
}

#[tokio::test]
async fn garbage_frame_is_a_protocol_error() {
    let h = harness();
    let (mut client, server) = tokio::io::duplex(1024);
    let (server_read, server_write) = tokio::io::split(server);
    drover_wire::write_message(&mut client, b"{not json").await.unwrap();

    let result = handle_connection(server_read, server_write, ConnectionSource::Unix, &h.ctx).await;
    assert!(matches!(result, Err(ConnectionError::Protocol(ProtocolError::Json(_)))));
}
