use super::*;

#[test]
fn acquire_writes_the_current_pid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fbuild_daemon.pid");

    let guard = PidFile::acquire(&path).unwrap();
    assert_eq!(read_pid(guard.path()), Some(std::process::id()));
}

#[test]
fn acquire_fails_while_another_holder_is_alive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fbuild_daemon.pid");

    let _first = PidFile::acquire(&path).unwrap();
    match PidFile::acquire(&path) {
        Err(LifecycleError::AlreadyRunning(p)) => assert_eq!(p, path),
        other => panic!("expected AlreadyRunning, got {other:?}"),
    }
}

#[test]
fn dropping_the_guard_removes_the_file_and_releases_the_lock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fbuild_daemon.pid");

    {
        let _guard = PidFile::acquire(&path).unwrap();
        assert!(path.exists());
    }
    assert!(!path.exists());

    // A fresh acquire must succeed now that the lock was released.
    let _second = PidFile::acquire(&path).unwrap();
}
