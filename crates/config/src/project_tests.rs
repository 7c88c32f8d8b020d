use super::*;
use std::io::Write;
use tempfile::tempdir;

fn write_config(dir: &Path, content: &str) {
    let mut f = std::fs::File::create(dir.join("fbuild.toml")).unwrap();
    f.write_all(content.as_bytes()).unwrap();
}

#[test]
fn missing_config_is_not_found() {
    let dir = tempdir().unwrap();
    let err = ProjectConfig::load(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn loads_environments_in_declaration_order() {
    let dir = tempdir().unwrap();
    write_config(
        dir.path(),
        r#"
        [env.esp32c6]
        board = "esp32-c6-devkitm-1"
        monitor_speed = 115200

        [env.esp32s3]
        board = "esp32-s3-devkitc-1"
        port = "COM7"
        "#,
    );
    let cfg = ProjectConfig::load(dir.path()).unwrap();
    let names: Vec<&str> = cfg.environment_names().collect();
    assert_eq!(names, vec!["esp32c6", "esp32s3"]);

    let env = cfg.environment("esp32c6").unwrap();
    assert_eq!(env.board, "esp32-c6-devkitm-1");
    assert_eq!(env.monitor_speed, Some(115200));
    assert!(env.port.is_none());
}

#[test]
fn unknown_environment_is_an_error() {
    let dir = tempdir().unwrap();
    write_config(dir.path(), "[env.only]\nboard = \"x\"\n");
    let cfg = ProjectConfig::load(dir.path()).unwrap();
    assert!(matches!(
        cfg.environment("missing"),
        Err(ConfigError::UnknownEnvironment(_))
    ));
}
