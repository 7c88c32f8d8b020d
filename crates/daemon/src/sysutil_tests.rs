use super::*;
use std::process::Command;
use std::time::Duration;

#[test]
fn is_alive_is_true_for_the_current_process() {
    let system = refreshed_system();
    assert!(is_alive(&system, std::process::id()));
}

#[test]
fn is_alive_is_false_for_an_unlikely_pid() {
    let system = refreshed_system();
    assert!(!is_alive(&system, 999_999));
}

#[test]
#[cfg(unix)]
fn descendants_of_finds_a_backgrounded_child() {
    let mut child = Command::new("sh")
        .args(["-c", "sleep 100 & wait"])
        .spawn()
        .unwrap();
    let parent_pid = child.id();
    std::thread::sleep(Duration::from_millis(150));

    let system = refreshed_system();
    let descendants = descendants_of(&system, parent_pid);
    assert_eq!(descendants.len(), 1);

    send_signal(&system, descendants[0], Signal::Kill);
    send_signal(&system, parent_pid, Signal::Kill);
    let _ = child.wait();
}

#[test]
#[cfg(unix)]
fn leaves_first_orders_children_before_parents() {
    let mut child = Command::new("sh")
        .args(["-c", "sleep 100 & wait"])
        .spawn()
        .unwrap();
    let parent_pid = child.id();
    std::thread::sleep(Duration::from_millis(150));

    let system = refreshed_system();
    let descendants = descendants_of(&system, parent_pid);
    let mut all = descendants.clone();
    all.push(parent_pid);

    let ordered = leaves_first(&system, &all);
    assert_eq!(ordered[0], descendants[0]);
    assert_eq!(ordered[1], parent_pid);

    send_signal(&system, descendants[0], Signal::Kill);
    send_signal(&system, parent_pid, Signal::Kill);
    let _ = child.wait();
}
