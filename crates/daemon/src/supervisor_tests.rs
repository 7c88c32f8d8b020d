use super::*;
use std::process::Command;

#[tokio::test]
#[cfg(unix)]
async fn kill_tree_terminates_a_backgrounded_child() {
    let mut child = Command::new("sh")
        .args(["-c", "sleep 100 & wait"])
        .spawn()
        .unwrap();
    let root_pid = child.id();
    std::thread::sleep(Duration::from_millis(150));

    let supervisor = ProcessTreeSupervisor::new(Duration::from_millis(500));
    let info = ProcessTreeInfo::new(std::process::id(), root_pid);
    supervisor.kill_tree(&info).await;

    let exit = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let Ok(Some(_)) = child.try_wait() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(exit.is_ok(), "child did not terminate in time");
}

#[tokio::test]
async fn kill_tree_is_a_no_op_on_an_already_dead_tree() {
    let supervisor = ProcessTreeSupervisor::new(Duration::from_millis(200));
    let info = ProcessTreeInfo::new(std::process::id(), 999_999);
    // Must return promptly rather than hang the grace period on a pid
    // that was never alive.
    let result = tokio::time::timeout(Duration::from_millis(500), supervisor.kill_tree(&info)).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn kill_tree_refuses_to_kill_itself() {
    let supervisor = ProcessTreeSupervisor::new(Duration::from_millis(200));
    let info = ProcessTreeInfo::new(std::process::id(), std::process::id());

    let result = tokio::time::timeout(Duration::from_millis(500), supervisor.kill_tree(&info)).await;
    assert!(result.is_ok());

    let system = sysutil::refreshed_system();
    assert!(sysutil::is_alive(&system, std::process::id()));
}
