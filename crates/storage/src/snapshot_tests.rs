use super::*;
use serde::{Deserialize, Serialize};
use tempfile::tempdir;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Counter {
    n: u32,
}

#[test]
fn load_missing_is_none() {
    let dir = tempdir().unwrap();
    let store: SnapshotStore<Counter> = SnapshotStore::new(dir.path().join("state.json"));
    assert!(store.load().is_none());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let store: SnapshotStore<Counter> = SnapshotStore::new(dir.path().join("state.json"));
    store.save(&Counter { n: 1 }).unwrap();
    assert_eq!(store.load(), Some(Counter { n: 1 }));
}

#[test]
fn repeated_saves_rotate_backups() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    let store: SnapshotStore<Counter> = SnapshotStore::new(&path);
    for n in 1..=5 {
        store.save(&Counter { n }).unwrap();
    }
    assert_eq!(store.load(), Some(Counter { n: 5 }));
    assert!(path.with_extension("bak").exists());
    assert!(path.with_extension("bak.2").exists());
    assert!(path.with_extension("bak.3").exists());
    assert!(!path.with_extension("bak.4").exists());
}
