use super::*;
use fbuild_core::DeployRequest;
use std::time::Duration;

#[test]
fn parse_startup_error_after_marker() {
    let log = "\
--- fbuildd: starting (pid: 12345) ---

ERROR failed to start fbuildd: address already in use
";
    assert_eq!(
        parse_startup_error(log),
        Some("address already in use".to_string())
    );
}

#[test]
fn parse_startup_error_clean_start_has_none() {
    let log = "\
--- fbuildd: starting (pid: 12345) ---

INFO fbuildd starting
";
    assert_eq!(parse_startup_error(log), None);
}

#[test]
fn parse_startup_error_picks_the_latest_attempt() {
    let log = "\
--- fbuildd: starting (pid: 100) ---

ERROR failed to start fbuildd: first failure
--- fbuildd: starting (pid: 200) ---

ERROR failed to start fbuildd: second failure
";
    assert_eq!(
        parse_startup_error(log),
        Some("second failure".to_string())
    );
}

#[test]
fn parse_startup_error_no_marker_is_none() {
    assert_eq!(parse_startup_error("unrelated log content\n"), None);
}

#[tokio::test]
async fn submit_then_poll_sees_a_terminal_status() {
    let state_dir = tempfile::tempdir().unwrap();
    let layout = StateLayout::new(state_dir.path());
    let client = Client::new(layout.clone());

    let request = InboundRequest::Deploy(DeployRequest {
        project_dir: "/tmp/project".to_string(),
        environment: "esp32dev".to_string(),
        port: None,
        clean_build: false,
        monitor_after: false,
        monitor_timeout: None,
        monitor_halt_on_error: None,
        monitor_halt_on_success: None,
        caller_pid: std::process::id(),
        caller_cwd: "/tmp".to_string(),
        timestamp: 0.0,
        request_id: "deploy_client_test".to_string(),
    });
    client.submit(&request).unwrap();
    assert!(layout.inbox_request_file("deploy_client_test").exists());

    // Simulate the daemon publishing a terminal status directly.
    let status_store = StatusStore::new(layout.root());
    let mut status = DaemonStatus::idle(4242, 0.0);
    status.state = DaemonState::Completed;
    status.message = "deploy completed".to_string();
    status.request_id = Some("deploy_client_test".to_string());
    status_store.write_request("deploy_client_test", &status).unwrap();

    let mut seen_messages = Vec::new();
    let outcome = client
        .wait_for_request("deploy_client_test", Duration::from_millis(5), |s| {
            seen_messages.push(s.message.clone());
        })
        .await;

    match outcome {
        WaitOutcome::Terminal(status) => assert_eq!(status.state, DaemonState::Completed),
        other => panic!("expected a terminal outcome, got {other:?}"),
    }
    assert_eq!(seen_messages, vec!["deploy completed".to_string()]);
}

#[test]
fn cancel_touches_the_signal_file() {
    let state_dir = tempfile::tempdir().unwrap();
    let layout = StateLayout::new(state_dir.path());
    let client = Client::new(layout.clone());

    client.cancel("deploy_abc").unwrap();
    assert!(layout.cancel_signal_file("deploy_abc").exists());
}

#[tokio::test]
async fn stop_daemon_with_no_pidfile_is_a_noop() {
    let state_dir = tempfile::tempdir().unwrap();
    let layout = StateLayout::new(state_dir.path());
    let client = Client::new(layout);

    assert_eq!(client.stop_daemon().await.unwrap(), StopOutcome::NotRunning);
}

#[tokio::test]
async fn stop_daemon_with_a_dead_pid_cleans_up_the_pidfile() {
    let state_dir = tempfile::tempdir().unwrap();
    let layout = StateLayout::new(state_dir.path());
    std::fs::create_dir_all(layout.root()).unwrap();
    // A pid essentially guaranteed not to be running.
    std::fs::write(layout.pid_file(), "999999\n").unwrap();

    let client = Client::new(layout.clone());
    assert_eq!(client.stop_daemon().await.unwrap(), StopOutcome::NotRunning);
    assert!(!layout.pid_file().exists());
}
