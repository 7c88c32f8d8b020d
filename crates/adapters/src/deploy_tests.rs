use super::*;

#[derive(Default)]
struct RecordingDeploySink {
    pid: Option<u32>,
    lines: Vec<String>,
}

impl DeployOutputSink for RecordingDeploySink {
    fn on_spawn(&mut self, pid: u32) {
        self.pid = Some(pid);
    }
    fn on_line(&mut self, line: String) {
        self.lines.push(line);
    }
}

#[tokio::test]
async fn fake_adapter_records_call_and_replays_script() {
    let adapter = FakeDeployAdapter::new(0, vec!["Connecting...".to_string(), "Done".to_string()])
        .with_pid(4242);
    let ctx = DeployContext {
        project_dir: PathBuf::from("/p"),
        environment: "esp32c6".to_string(),
        port: Some("COM7".to_string()),
        artifact_path: PathBuf::from("/p/.build/firmware.bin"),
    };
    let mut sink = RecordingDeploySink::default();
    let outcome = adapter.flash(&ctx, &mut sink).await.unwrap();

    assert!(outcome.succeeded());
    assert_eq!(sink.lines, vec!["Connecting...", "Done"]);
    assert_eq!(sink.pid, Some(4242));
    let calls = adapter.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].environment, "esp32c6");
    assert_eq!(calls[0].port.as_deref(), Some("COM7"));
}

#[tokio::test]
async fn fake_adapter_can_script_a_failure() {
    let adapter = FakeDeployAdapter::new(1, vec![]);
    let ctx = DeployContext {
        project_dir: PathBuf::from("/p"),
        environment: "esp32c6".to_string(),
        port: None,
        artifact_path: PathBuf::from("/p/.build/firmware.bin"),
    };
    let mut sink = RecordingDeploySink::default();
    let outcome = adapter.flash(&ctx, &mut sink).await.unwrap();
    assert!(!outcome.succeeded());
}

#[tokio::test]
async fn process_adapter_builds_expected_args_and_runs() {
    let adapter = ProcessDeployAdapter::new("true");
    let ctx = DeployContext {
        project_dir: std::env::temp_dir(),
        environment: "esp32c6".to_string(),
        port: Some("COM7".to_string()),
        artifact_path: PathBuf::from("firmware.bin"),
    };
    let mut sink = RecordingDeploySink::default();
    let outcome = adapter.flash(&ctx, &mut sink).await.unwrap();
    assert!(outcome.succeeded());
    assert!(sink.pid.is_some());
}
