use super::*;

#[test]
#[serial_test::serial(fbuild_state_dir_env)]
fn defaults_apply_when_no_env_vars_are_set() {
    std::env::remove_var("FBUILD_DAEMON_TICK_MS");
    std::env::remove_var("FBUILD_DAEMON_MAX_CONCURRENT");
    std::env::remove_var("FBUILD_DAEMON_STALE_SECONDS");
    std::env::remove_var("FBUILD_DAEMON_KILL_GRACE_MS");
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var(fbuild_core::STATE_DIR_ENV, dir.path());

    let config = DaemonConfig::from_env().unwrap();

    assert_eq!(config.tick_interval, Duration::from_millis(200));
    assert_eq!(config.max_concurrent_operations, 4);
    assert_eq!(config.stale_seconds, DEFAULT_STALE_SECONDS);
    assert_eq!(config.kill_grace, Duration::from_secs(3));

    std::env::remove_var(fbuild_core::STATE_DIR_ENV);
}

#[test]
#[serial_test::serial(fbuild_state_dir_env)]
fn env_vars_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var(fbuild_core::STATE_DIR_ENV, dir.path());
    std::env::set_var("FBUILD_DAEMON_TICK_MS", "50");
    std::env::set_var("FBUILD_DAEMON_MAX_CONCURRENT", "8");

    let config = DaemonConfig::from_env().unwrap();

    assert_eq!(config.tick_interval, Duration::from_millis(50));
    assert_eq!(config.max_concurrent_operations, 8);

    std::env::remove_var(fbuild_core::STATE_DIR_ENV);
    std::env::remove_var("FBUILD_DAEMON_TICK_MS");
    std::env::remove_var("FBUILD_DAEMON_MAX_CONCURRENT");
}
