use super::*;

#[test]
fn file_paths_follow_the_documented_layout() {
    let layout = StateLayout::new("/home/alex/.fbuild/daemon");

    assert_eq!(layout.pid_file(), Path::new("/home/alex/.fbuild/daemon/fbuild_daemon.pid"));
    assert_eq!(
        layout.daemon_status_file(),
        Path::new("/home/alex/.fbuild/daemon/daemon_status.json")
    );
    assert_eq!(
        layout.request_status_file("deploy_123"),
        Path::new("/home/alex/.fbuild/daemon/status_deploy_123.json")
    );
    assert_eq!(layout.inbox_dir(), Path::new("/home/alex/.fbuild/daemon/inbox"));
    assert_eq!(
        layout.inbox_request_file("deploy_123"),
        Path::new("/home/alex/.fbuild/daemon/inbox/request_deploy_123.json")
    );
    assert_eq!(layout.rejected_dir(), Path::new("/home/alex/.fbuild/daemon/rejected"));
    assert_eq!(
        layout.rejected_request_file("deploy_123"),
        Path::new("/home/alex/.fbuild/daemon/rejected/request_deploy_123.json")
    );
    assert_eq!(
        layout.registry_file(),
        Path::new("/home/alex/.fbuild/daemon/process_registry.json")
    );
    assert_eq!(
        layout.shutdown_signal_file(),
        Path::new("/home/alex/.fbuild/daemon/shutdown.signal")
    );
    assert_eq!(
        layout.cancel_signal_file("deploy_123"),
        Path::new("/home/alex/.fbuild/daemon/cancel_deploy_123.signal")
    );
    assert_eq!(layout.log_file(), Path::new("/home/alex/.fbuild/daemon/daemon.log"));
}

#[test]
#[serial_test::serial(fbuild_state_dir_env)]
fn from_env_honors_override() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var(STATE_DIR_ENV, dir.path());
    let layout = StateLayout::from_env().unwrap();
    assert_eq!(layout.root(), dir.path());
    std::env::remove_var(STATE_DIR_ENV);
}

#[test]
fn ensure_dirs_creates_root_inbox_and_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let layout = StateLayout::new(dir.path().join("state"));
    layout.ensure_dirs().unwrap();

    assert!(layout.root().is_dir());
    assert!(layout.inbox_dir().is_dir());
    assert!(layout.rejected_dir().is_dir());
}

#[test]
fn ensure_dirs_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let layout = StateLayout::new(dir.path().join("state"));
    layout.ensure_dirs().unwrap();
    layout.ensure_dirs().unwrap();
    assert!(layout.root().is_dir());
}
