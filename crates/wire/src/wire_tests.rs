// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire format tests: length-prefix framing and JSON encoding.

use super::*;
use crate::ErrorCode;

const TIMEOUT: Duration = Duration::from_secs(1);

#[test]
fn encode_returns_json_without_length_prefix() {
    let encoded = encode(&Response::Ok).expect("encode failed");
    let json_str = std::str::from_utf8(&encoded).expect("should be valid UTF-8");
    assert_eq!(json_str, r#"{"type":"Ok"}"#);
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";

    let mut buffer = Vec::new();
    write_message(&mut buffer, original).await.expect("write failed");

    // write_message adds 4-byte length prefix
    assert_eq!(buffer.len(), 4 + original.len());
    assert_eq!(u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]), 11);

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.expect("read failed");
    assert_eq!(read_back, original);
}

#[tokio::test]
async fn empty_stream_is_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn oversized_frame_is_rejected_before_reading_body() {
    let mut frame = ((MAX_MESSAGE_BYTES + 1) as u32).to_be_bytes().to_vec();
    frame.extend_from_slice(b"{}");
    let mut cursor = std::io::Cursor::new(frame);
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}

#[tokio::test]
async fn truncated_body_is_an_io_error() {
    let mut frame = 10u32.to_be_bytes().to_vec();
    frame.extend_from_slice(b"{}");
    let mut cursor = std::io::Cursor::new(frame);
    assert!(matches!(read_message(&mut cursor).await, Err(ProtocolError::Io(_))));
}

#[tokio::test]
async fn request_and_response_cross_a_duplex_pipe() {
    let (mut client, mut server) = tokio::io::duplex(1024);

    write_request(&mut client, &Request::Ping, TIMEOUT).await.unwrap();
    assert_eq!(read_request(&mut server, TIMEOUT).await.unwrap(), Request::Ping);

    let response = Response::error(ErrorCode::NotFound, "task 9 not found");
    write_response(&mut server, &response, TIMEOUT).await.unwrap();
    assert_eq!(read_response(&mut client, TIMEOUT).await.unwrap(), response);
}

#[tokio::test]
async fn silent_peer_times_out() {
    let (_client, mut server) = tokio::io::duplex(64);
    let err = read_request(&mut server, Duration::from_millis(20)).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Timeout));
}

#[test]
fn error_codes_serialize_snake_case() {
    let json = serde_json::to_string(&Response::error(ErrorCode::InvalidArgument, "bad")).unwrap();
    assert_eq!(json, r#"{"type":"Error","code":"invalid_argument","message":"bad"}"#);
    assert_eq!(ErrorCode::AlreadyExists.to_string(), "already_exists");
}

#[test]
fn error_codes_parse_from_display_names() {
    for code in ErrorCode::ALL {
        assert_eq!(code.to_string().parse::<ErrorCode>().unwrap(), code);
    }
    assert!("teapot".parse::<ErrorCode>().is_err());
}
