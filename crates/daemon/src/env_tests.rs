// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn state_dir_prefers_explicit_override() {
    std::env::set_var("DROVER_STATE_DIR", "/tmp/drover-explicit");
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/drover-explicit"));
    std::env::remove_var("DROVER_STATE_DIR");
    std::env::remove_var("XDG_STATE_HOME");
}

#[test]
#[serial]
fn state_dir_falls_back_to_xdg_then_home() {
    std::env::remove_var("DROVER_STATE_DIR");
    std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
    assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/xdg/drover"));

    std::env::remove_var("XDG_STATE_HOME");
    let home = std::env::var("HOME").unwrap();
    assert_eq!(state_dir().unwrap(), PathBuf::from(home).join(".local/state/drover"));
}

#[test]
#[serial]
fn ipc_timeout_reads_millis() {
    std::env::set_var("DROVER_IPC_TIMEOUT_MS", "250");
    assert_eq!(ipc_timeout(), Duration::from_millis(250));
    std::env::set_var("DROVER_IPC_TIMEOUT_MS", "soon");
    assert_eq!(ipc_timeout(), Duration::from_secs(5));
    std::env::remove_var("DROVER_IPC_TIMEOUT_MS");
}

#[test]
#[serial]
fn tcp_port_is_optional() {
    std::env::remove_var("DROVER_TCP_PORT");
    assert_eq!(tcp_port(), None);
    std::env::set_var("DROVER_TCP_PORT", "7443");
    assert_eq!(tcp_port(), Some(7443));
    std::env::remove_var("DROVER_TCP_PORT");
}
