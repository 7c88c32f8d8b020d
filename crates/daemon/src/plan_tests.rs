use super::*;
use std::fs;

fn write_fbuild_toml(project_dir: &Path, contents: &str) {
    fs::write(project_dir.join("fbuild.toml"), contents).unwrap();
}

fn deploy_request(project_dir: &Path, environment: &str) -> DeployRequest {
    DeployRequest {
        project_dir: project_dir.display().to_string(),
        environment: environment.to_string(),
        port: None,
        clean_build: false,
        monitor_after: false,
        monitor_timeout: None,
        monitor_halt_on_error: None,
        monitor_halt_on_success: None,
        caller_pid: std::process::id(),
        caller_cwd: project_dir.display().to_string(),
        timestamp: 0.0,
        request_id: "deploy_1".to_string(),
    }
}

#[test]
fn deploy_plan_fails_when_the_artifact_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    write_fbuild_toml(
        dir.path(),
        r#"
        [env.esp32c6]
        board = "esp32-c6-devkitc-1"
        port = "/dev/ttyUSB0"
        "#,
    );
    let config = ProjectConfig::load(dir.path()).unwrap();
    let request = deploy_request(dir.path(), "esp32c6");

    match deploy_plan(&request, &config) {
        Err(PlanError::ArtifactMissing(_)) => {}
        other => panic!("expected ArtifactMissing, got {other:?}"),
    }
}

#[test]
fn deploy_plan_falls_back_to_the_environment_port() {
    let dir = tempfile::tempdir().unwrap();
    write_fbuild_toml(
        dir.path(),
        r#"
        [env.esp32c6]
        board = "esp32-c6-devkitc-1"
        port = "/dev/ttyUSB0"
        upload_speed = 460800
        "#,
    );
    let artifact = artifact_path(dir.path(), "esp32c6");
    fs::create_dir_all(artifact.parent().unwrap()).unwrap();
    fs::write(&artifact, b"firmware").unwrap();

    let config = ProjectConfig::load(dir.path()).unwrap();
    let request = deploy_request(dir.path(), "esp32c6");

    let plan = deploy_plan(&request, &config).unwrap();
    assert_eq!(plan.port.as_deref(), Some("/dev/ttyUSB0"));
    assert_eq!(plan.artifact_path, artifact);
}

#[test]
fn deploy_plan_prefers_the_request_port_over_the_environment_default() {
    let dir = tempfile::tempdir().unwrap();
    write_fbuild_toml(
        dir.path(),
        r#"
        [env.esp32c6]
        board = "esp32-c6-devkitc-1"
        port = "/dev/ttyUSB0"
        "#,
    );
    let artifact = artifact_path(dir.path(), "esp32c6");
    fs::create_dir_all(artifact.parent().unwrap()).unwrap();
    fs::write(&artifact, b"firmware").unwrap();

    let config = ProjectConfig::load(dir.path()).unwrap();
    let mut request = deploy_request(dir.path(), "esp32c6");
    request.port = Some("/dev/ttyACM3".to_string());

    let plan = deploy_plan(&request, &config).unwrap();
    assert_eq!(plan.port.as_deref(), Some("/dev/ttyACM3"));
}

#[test]
fn clean_build_removes_the_conventional_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = artifact_path(dir.path(), "esp32c6");
    fs::create_dir_all(artifact.parent().unwrap()).unwrap();
    fs::write(&artifact, b"firmware").unwrap();

    clean_build(dir.path(), "esp32c6").unwrap();

    assert!(!artifact.exists());
}

#[test]
fn clean_build_on_a_missing_directory_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    clean_build(dir.path(), "esp32c6").unwrap();
}

#[test]
fn monitor_plan_fails_with_no_port_anywhere() {
    let dir = tempfile::tempdir().unwrap();
    write_fbuild_toml(
        dir.path(),
        r#"
        [env.esp32c6]
        board = "esp32-c6-devkitc-1"
        "#,
    );
    let config = ProjectConfig::load(dir.path()).unwrap();
    let request = MonitorRequest {
        project_dir: dir.path().display().to_string(),
        environment: "esp32c6".to_string(),
        port: None,
        baud_rate: None,
        halt_on_error: None,
        halt_on_success: None,
        timeout: None,
        caller_pid: std::process::id(),
        caller_cwd: dir.path().display().to_string(),
        timestamp: 0.0,
        request_id: "monitor_1".to_string(),
    };

    match monitor_plan(&request, &config) {
        Err(PlanError::MissingPort(_)) => {}
        other => panic!("expected MissingPort, got {other:?}"),
    }
}
