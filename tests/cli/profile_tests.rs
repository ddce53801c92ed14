//! Tests for the `profile` CLI command

use crate::common::{assert_contains, assert_exit, assert_valid_json, string_array, TestRepo};

#[test]
fn test_profile_react_typescript() {
    let repo = TestRepo::new();
    repo.with_react_typescript();

    let output = repo.run_cli_success(&["profile", "."]);
    let json = assert_valid_json(&output, "profile react");

    assert_eq!(string_array(&json["primary"]), vec!["typescript"]);
    assert!(string_array(&json["secondary"]).is_empty());
    assert_eq!(json["complexity"], "simple");

    let frameworks: Vec<&str> = json["frameworks"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["name"].as_str())
        .collect();
    assert!(frameworks.contains(&"react"), "frameworks: {frameworks:?}");
}

#[test]
fn test_profile_invariants_hold() {
    let repo = TestRepo::new();
    repo.with_multilang().with_python_service();

    let output = repo.run_cli_success(&["profile", &repo.path_str()]);
    let json = assert_valid_json(&output, "profile multilang");

    let confidence = json["confidence"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&confidence));

    let primary = string_array(&json["primary"]);
    let secondary = string_array(&json["secondary"]);
    assert!(!primary.is_empty());
    assert!(primary.len() <= 3);
    assert!(secondary.len() <= 5);
    assert!(primary.iter().all(|p| !secondary.contains(p)));
}

#[test]
fn test_profile_is_deterministic() {
    let repo = TestRepo::new();
    repo.with_multilang();

    let first = repo.run_cli_success(&["profile"]);
    let second = repo.run_cli_success(&["profile"]);
    assert_eq!(first, second);
}

#[test]
fn test_profile_missing_path_exits_1() {
    let repo = TestRepo::new();
    let (code, _stdout, stderr) = repo.run_cli_status(&["profile", "does/not/exist"]);

    assert_exit(code, 1, &stderr);
    assert_contains(&stderr, "Path not found");
}

#[test]
fn test_profile_text_format() {
    let repo = TestRepo::new();
    repo.with_python_service();

    let output = repo.run_cli_success(&["--format", "text", "profile"]);
    assert_contains(&output, "REPOSITORY PROFILE");
    assert_contains(&output, "primary: python");
}

#[test]
fn test_profile_skips_vendored_dirs() {
    let repo = TestRepo::new();
    repo.add_file("main.go", "package main\n");
    for i in 0..5 {
        repo.add_file(&format!("node_modules/pkg{i}/index.js"), "module.exports = 1;\n");
    }

    let output = repo.run_cli_success(&["profile"]);
    let json = assert_valid_json(&output, "profile vendored");
    assert_eq!(string_array(&json["primary"]), vec!["go"]);
    assert!(!string_array(&json["secondary"]).contains(&"javascript".to_string()));
}
