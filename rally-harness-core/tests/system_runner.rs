// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! End-to-end test spawning a fake `esrally` from PATH.
//!
//! Kept in its own test binary because it rewrites PATH for the process.

#![cfg(unix)]

use std::net::TcpListener;
use std::os::unix::fs::PermissionsExt;
use std::time::Duration;

use rally_harness_core::{
    ClusterController, ClusterOptions, HarnessError, Port, RaceConfig, RaceController,
    RaceOptions,
};
use tempfile::TempDir;

const FAKE_ESRALLY: &str = r#"#!/bin/sh
case "$1" in
  --version) echo "esrally 2.10.0" ;;
  install) echo '{"installation-id": "fake-install-1"}' ;;
  start) exit 0 ;;
  stop) exit 5 ;;
  race) shift; printf '%s\n' "$@" > "$(dirname "$0")/race-args"; exit 3 ;;
  *) echo "unknown subcommand $1"; exit 64 ;;
esac
"#;

#[test]
fn test_fake_esrally_session() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let bin_dir = temp_dir.path().join("bin");
    std::fs::create_dir_all(&bin_dir).unwrap();

    let script = bin_dir.join("esrally");
    std::fs::write(&script, FAKE_ESRALLY).expect("Failed to write fake esrally");
    let mut perms = std::fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).unwrap();

    let path = std::env::var("PATH").unwrap_or_default();
    std::env::set_var("PATH", format!("{}:{}", bin_dir.display(), path));

    // Cluster lifecycle
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = Port::new(listener.local_addr().unwrap().port()).unwrap();
    drop(listener);

    let mut cluster = ClusterController::new(ClusterOptions {
        http_port: port,
        port_timeout: Duration::from_secs(5),
        ..ClusterOptions::default()
    })
    .unwrap();

    cluster.install().expect("install should succeed");
    assert_eq!(cluster.installation_id().unwrap().as_str(), "fake-install-1");
    cluster.start().expect("start should succeed");

    // The fake exits non-zero on stop
    let err = cluster.stop().unwrap_err();
    assert!(matches!(err, HarnessError::Stop { .. }));
    assert!(err.to_string().contains("--installation-id=fake-install-1"));

    // Race session
    let mut rally = RaceController::new(RaceConfig {
        track_repository: Some(temp_dir.path().join("tracks").display().to_string()),
        track_revision: None,
        config_dir: temp_dir.path().join(".rally"),
        config_name: "pytest".to_string(),
        debug: false,
    });
    rally.configure().expect("configure should succeed");
    assert_eq!(rally.revision(), Some("esrally 2.10.0"));
    assert!(rally.config_location().exists());

    let options = RaceOptions {
        track_params: vec![("bulk_size".to_string(), "10".to_string())],
        user_tag: Some("intention:smoke test".to_string()),
        ..RaceOptions::track("geonames")
    };
    assert_eq!(rally.race(&options).unwrap(), Some(3));

    let args = std::fs::read_to_string(bin_dir.join("race-args")).unwrap();
    let args: Vec<&str> = args.lines().collect();
    assert_eq!(args[0], "--track=geonames");
    assert!(args.contains(&"--track-params=bulk_size:10"));
    assert!(args.contains(&"--user-tag=intention:smoke test"));
    assert!(args.contains(&"--test-mode"));

    rally.delete_config_file().unwrap();
}
