use super::*;

#[test]
fn all_pids_includes_root_and_children() {
    let mut info = ProcessTreeInfo::new(10, 11);
    info.child_pids = vec![12, 13];
    let all = info.all_pids();
    assert_eq!(all, vec![12, 13, 11]);
}

#[test]
fn round_trips_through_json_with_legacy_defaults() {
    let json = r#"{"client_pid": 5, "root_pid": 6}"#;
    let info: ProcessTreeInfo = serde_json::from_str(json).unwrap();
    assert!(info.child_pids.is_empty());
    assert_eq!(info.request_id, "");
    assert!(info.port.is_none());
}
