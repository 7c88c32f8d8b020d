use super::*;

fn registry_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("process_registry.json")
}

#[test]
fn register_persists_an_entry_with_its_descendants() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ProcessRegistry::load(registry_path(&dir));

    registry
        .register(
            std::process::id(),
            std::process::id(),
            "deploy_1",
            "/projects/blink",
            "deploy",
            Some("COM7".to_string()),
        )
        .unwrap();

    let entry = registry.get(std::process::id()).unwrap();
    assert_eq!(entry.request_id, "deploy_1");
    assert_eq!(entry.project_dir, "/projects/blink");
    assert_eq!(entry.port.as_deref(), Some("COM7"));

    // Reloading from disk must see the same entry.
    let reloaded = ProcessRegistry::load(registry_path(&dir));
    assert!(reloaded.get(std::process::id()).is_some());
}

#[test]
fn unregister_removes_the_entry_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ProcessRegistry::load(registry_path(&dir));
    registry
        .register(42, 42, "deploy_1", "/p", "deploy", None)
        .unwrap();

    registry.unregister(42).unwrap();
    assert!(registry.get(42).is_none());

    let reloaded = ProcessRegistry::load(registry_path(&dir));
    assert!(reloaded.get(42).is_none());
}

#[test]
fn find_by_port_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ProcessRegistry::load(registry_path(&dir));
    registry
        .register(1, 1, "deploy_1", "/p", "deploy", Some("COM7".to_string()))
        .unwrap();

    assert!(registry.find_by_port("com7").is_some());
    assert!(registry.find_by_port("COM8").is_none());
}

#[test]
fn find_by_project_matches_exact_dir() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ProcessRegistry::load(registry_path(&dir));
    registry
        .register(1, 1, "deploy_1", "/projects/blink", "deploy", None)
        .unwrap();

    assert!(registry.find_by_project("/projects/blink").is_some());
    assert!(registry.find_by_project("/projects/other").is_none());
}

#[test]
fn list_dead_clients_finds_entries_whose_owner_has_exited() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ProcessRegistry::load(registry_path(&dir));

    // A pid astronomically unlikely to be alive on the test machine.
    registry
        .register(999_999, 999_999, "deploy_1", "/p", "deploy", None)
        .unwrap();
    registry
        .register(std::process::id(), std::process::id(), "deploy_2", "/p", "deploy", None)
        .unwrap();

    let dead = registry.list_dead_clients();
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].client_pid, 999_999);
}

#[test]
fn loading_a_missing_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ProcessRegistry::load(registry_path(&dir));
    assert!(registry.list_all().is_empty());
}

#[test]
fn loading_a_corrupt_file_starts_empty_instead_of_panicking() {
    let dir = tempfile::tempdir().unwrap();
    let path = registry_path(&dir);
    std::fs::write(&path, b"{not json").unwrap();
    let registry = ProcessRegistry::load(&path);
    assert!(registry.list_all().is_empty());
}
