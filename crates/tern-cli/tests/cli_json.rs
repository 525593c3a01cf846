//! Integration tests for `tern --json` output.

use std::process::{Command, Output};
use tempfile::TempDir;

fn tern(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tern"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("TERN_MAX_DEPTH")
        .output()
        .expect("Failed to run tern")
}

fn json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("stdout should be valid JSON")
}

#[test]
fn test_parse_json_has_envelope() {
    let output = tern(&["--json", "parse", "-e", "1 + 2 * 3"]);
    assert!(output.status.success());

    let json = json(&output);
    assert_eq!(json["schema_version"].as_u64(), Some(1));
    assert_eq!(json["ok"], true);
    assert_eq!(json["display"], "ADD(1, MULTIPLY(2, 3))");
    let root = &json["ast"]["root"];
    let nodes = json["ast"]["nodes"].as_array().expect("nodes table");
    let top = nodes.iter().find(|n| &n["id"] == root).expect("root node");
    assert_eq!(top["kind"]["Binary"], "Add");
    assert!(json["nodes"].as_u64().unwrap() >= 5);
}

#[test]
fn test_parse_script() {
    let output = tern(&["--json", "parse", "--script", "-e", "a = 1; b"]);
    assert!(output.status.success());
    assert_eq!(json(&output)["display"], "ASSIGN(a, 1); b");
}

#[test]
fn test_parse_error_json_and_exit_code() {
    let output = tern(&["--json", "parse", "-e", "1 +"]);
    assert!(!output.status.success());

    let json = json(&output);
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"]["kind"]["class"], "Syntax");
    assert_eq!(json["error"]["message"], "Unexpected end of input");
    assert_eq!(json["error"]["line"], 1);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unexpected end of input"), "stderr: {stderr}");
}

#[test]
fn test_tokens_json() {
    let output = tern(&["--json", "tokens", "-e", "a = 1"]);
    assert!(output.status.success());

    let json = json(&output);
    let tokens = json["tokens"].as_array().expect("tokens array");
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0]["kind"], "Name");
    assert_eq!(tokens[0]["text"], "a");
    assert_eq!(tokens[1]["kind"], "Assignment");
    assert_eq!(tokens[2]["kind"]["Number"], 1.0);
    assert_eq!(tokens[2]["span"]["start"], 4);
}

#[test]
fn test_reads_file_relative_to_cwd() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("input.js"), "x ?? y").unwrap();

    let cwd = dir.path().to_str().unwrap();
    let output = tern(&["--json", "--cwd", cwd, "parse", "input.js"]);
    assert!(output.status.success());
    assert_eq!(json(&output)["display"], "COALESCE(x, y)");
}

#[test]
fn test_config_file_sets_max_depth() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("tern.json"),
        r#"{ "parser": { "max_depth": 4 } }"#,
    )
    .unwrap();
    let cwd = dir.path().to_str().unwrap();

    let output = tern(&["--json", "--cwd", cwd, "parse", "-e", "((((((1))))))"]);
    assert!(!output.status.success());
    assert_eq!(json(&output)["error"]["kind"]["kind"], "NestingTooDeep");

    // The flag wins over the file.
    let output = tern(&[
        "--json", "--cwd", cwd, "parse", "--max-depth", "200", "-e", "((((((1))))))",
    ]);
    assert!(output.status.success());
}

#[test]
fn test_missing_input_fails() {
    let output = tern(&["parse"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No input"), "stderr: {stderr}");
}

#[test]
fn test_unreadable_file_names_the_path() {
    let dir = TempDir::new().unwrap();
    let cwd = dir.path().to_str().unwrap();

    let output = tern(&["--cwd", cwd, "tokens", "absent.js"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read source"), "stderr: {stderr}");
    assert!(stderr.contains("absent.js"), "stderr: {stderr}");
}

#[test]
fn test_version_prints_name() {
    let output = tern(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("tern "));
}
