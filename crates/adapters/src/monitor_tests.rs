use super::*;
use std::time::Duration;

#[tokio::test]
async fn fake_adapter_replays_scripted_lines_in_order() {
    let adapter = FakeMonitorAdapter::new(vec![
        ScriptedLine::new("booting", Duration::from_millis(1)),
        ScriptedLine::new("TEST PASSED", Duration::from_millis(1)),
    ]);
    let mut session = adapter.open("COM7", 115200).await.unwrap();

    let first = session.read_line(Duration::from_millis(50)).await.unwrap();
    assert_eq!(first.as_deref(), Some("booting"));
    let second = session.read_line(Duration::from_millis(50)).await.unwrap();
    assert_eq!(second.as_deref(), Some("TEST PASSED"));
}

#[tokio::test]
async fn fake_adapter_returns_none_when_script_exhausted() {
    let adapter = FakeMonitorAdapter::new(vec![]);
    let mut session = adapter.open("COM7", 115200).await.unwrap();
    let line = session.read_line(Duration::from_millis(5)).await.unwrap();
    assert!(line.is_none());
}

#[tokio::test]
async fn fake_adapter_defers_line_past_its_read_window() {
    let adapter = FakeMonitorAdapter::new(vec![ScriptedLine::new(
        "late",
        Duration::from_millis(100),
    )]);
    let mut session = adapter.open("COM7", 115200).await.unwrap();
    let first = session.read_line(Duration::from_millis(10)).await.unwrap();
    assert!(first.is_none());
    let second = session.read_line(Duration::from_millis(200)).await.unwrap();
    assert_eq!(second.as_deref(), Some("late"));
}
