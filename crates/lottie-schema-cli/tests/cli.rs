use assert_cmd::Command;
use std::fs;
use tempfile::tempdir;

fn cli() -> Command {
    Command::cargo_bin("lottie-schema").unwrap()
}

fn create_temp_file(dir: &tempfile::TempDir, name: &str, content: &str) -> String {
    let file_path = dir.path().join(name);
    fs::write(&file_path, content).unwrap();
    file_path.to_str().unwrap().to_string()
}

const SCHEMA: &str = r#"{
    "$id": "https://example.test/lottie.schema.json#",
    "type": "object",
    "properties": { "v": { "type": "string" } },
    "additionalProperties": false
}"#;

#[test]
fn test_version() {
    let mut cmd = cli();
    cmd.arg("--version");
    let output = cmd.output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Version:"));
}

#[test]
fn test_valid_instance() {
    let dir = tempdir().unwrap();
    let schema = create_temp_file(&dir, "schema.json", SCHEMA);
    let instance = create_temp_file(&dir, "instance.json", r#"{"v": "5.5.0"}"#);

    let mut cmd = cli();
    cmd.arg(&schema).arg("--instance").arg(&instance);
    let output = cmd.output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("VALID"));
}

#[test]
fn test_invalid_instance() {
    let dir = tempdir().unwrap();
    let schema = create_temp_file(&dir, "schema.json", SCHEMA);
    let instance = create_temp_file(&dir, "instance.json", r#"{"v": "5.5.0", "unknown": true}"#);

    let mut cmd = cli();
    cmd.arg(&schema).arg("--instance").arg(&instance);
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "unknown property is only a warning by default");
    assert!(String::from_utf8_lossy(&output.stdout).contains("VALID"));
}

#[test]
fn test_warnings_flag_surfaces_unknown_properties() {
    let dir = tempdir().unwrap();
    let schema = create_temp_file(&dir, "schema.json", SCHEMA);
    let instance = create_temp_file(&dir, "instance.json", r#"{"v": "5.5.0", "unknown": true}"#);

    let mut cmd = cli();
    cmd.arg(&schema).arg("--instance").arg(&instance).arg("--warnings");
    let output = cmd.output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[warning]"));
    assert!(stdout.contains("unknown"));
}

#[test]
fn test_invalid_schema() {
    let dir = tempdir().unwrap();
    let schema = create_temp_file(&dir, "schema.json", r#"{"type": "object"}"#);
    let instance = create_temp_file(&dir, "instance.json", "{}");

    let mut cmd = cli();
    cmd.arg(&schema).arg("--instance").arg(&instance);
    let output = cmd.output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Error"));
}

#[test]
fn test_multiple_instances() {
    let dir = tempdir().unwrap();
    let schema = create_temp_file(&dir, "schema.json", SCHEMA);
    let instance1 = create_temp_file(&dir, "instance1.json", r#"{"v": "5.5.0"}"#);
    let instance2 = create_temp_file(&dir, "instance2.json", r#"{"v": 5}"#);

    let mut cmd = cli();
    cmd.arg(&schema).arg("--instance").arg(&instance1).arg("--instance").arg(&instance2);
    let output = cmd.output().unwrap();
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("instance1.json - VALID"));
    assert!(stdout.contains("instance2.json - INVALID"));
}

#[test]
fn test_no_instances() {
    let dir = tempdir().unwrap();
    let schema = create_temp_file(&dir, "schema.json", SCHEMA);

    let mut cmd = cli();
    cmd.arg(&schema);
    let output = cmd.output().unwrap();
    assert!(output.status.success());
}
