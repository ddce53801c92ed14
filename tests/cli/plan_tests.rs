//! Tests for the `plan` CLI command

use crate::common::{
    assert_contains, assert_exit, assert_json_type, assert_valid_json, assert_valid_toon,
    enabled_linters, string_array, TestRepo,
};

const CONFLICTS: &[(&str, &str)] = &[
    ("prettier", "eslint-plugin-prettier"),
    ("eslint", "standard"),
    ("black", "autopep8"),
    ("flake8", "ruff"),
    ("golangci-lint", "revive"),
    ("rubocop", "standardrb"),
];

#[test]
fn test_plan_react_typescript() {
    let repo = TestRepo::new();
    repo.with_react_typescript();

    let output = repo.run_cli_success(&["plan", "."]);
    let json = assert_valid_json(&output, "plan react");
    assert_json_type(&json, "plan");

    let config = &json["configuration"];
    let enabled = enabled_linters(config);
    assert!(enabled.contains(&"eslint".to_string()));
    assert!(enabled.contains(&"prettier".to_string()));
    assert!(enabled.contains(&"eslint-plugin-react".to_string()));
    assert!(!enabled.contains(&"eslint-plugin-prettier".to_string()));
    assert!(string_array(&config["linters"]["disabled"])
        .contains(&"eslint-plugin-prettier".to_string()));

    assert_eq!(json["validation"]["valid"], true);
    assert!(string_array(&config["reporting"]["formats"]).contains(&"json".to_string()));
}

#[test]
fn test_plan_never_enables_conflicting_pair() {
    let repo = TestRepo::new();
    repo.with_multilang().with_react_typescript().with_python_service();

    let output = repo.run_cli_success(&["plan"]);
    let json = assert_valid_json(&output, "plan multilang");
    let enabled = enabled_linters(&json["configuration"]);

    for (a, b) in CONFLICTS {
        assert!(
            !(enabled.contains(&a.to_string()) && enabled.contains(&b.to_string())),
            "{a} and {b} both enabled: {enabled:?}"
        );
    }
}

#[test]
fn test_plan_is_deterministic() {
    let repo = TestRepo::new();
    repo.with_multilang();

    let first = repo.run_cli_success(&["plan"]);
    let second = repo.run_cli_success(&["plan"]);
    assert_eq!(first, second);
}

#[test]
fn test_plan_env_export() {
    let repo = TestRepo::new();
    repo.with_python_service();

    let output = repo.run_cli_success(&["plan", "--env"]);
    assert!(output.starts_with("# lintscope execution plan"));
    assert_contains(&output, "ENABLE_LINTERS=");
    assert_contains(&output, "MAX_EXECUTION_TIME=");
    assert_contains(&output, "REPORT_FORMATS=json");

    let keys: Vec<&str> = output
        .lines()
        .filter(|l| !l.starts_with('#') && !l.is_empty())
        .filter_map(|l| l.split_once('=').map(|(k, _)| k))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
}

#[test]
fn test_plan_with_preferences_file() {
    let repo = TestRepo::new();
    repo.with_python_service().add_file(
        "lint-prefs.toml",
        r#"
excluded_linters = ["cspell"]
performance_profile = "fast"

[organization_standards]
required_linters = ["autopep8"]
"#,
    );

    let output = repo.run_cli_success(&["plan", "--prefs", "lint-prefs.toml"]);
    let json = assert_valid_json(&output, "plan prefs");
    let config = &json["configuration"];
    let enabled = enabled_linters(config);

    assert!(enabled.contains(&"autopep8".to_string()));
    assert!(!enabled.contains(&"black".to_string()));
    assert!(!enabled.contains(&"cspell".to_string()));
    assert_eq!(config["performance"]["cache_strategy"], "aggressive");
    assert_eq!(config["performance"]["incremental_scanning"], true);
}

#[test]
fn test_plan_profile_flag_overrides_preferences() {
    let repo = TestRepo::new();
    repo.with_python_service()
        .add_file(
            "prefs.json",
            r#"{"performance_profile": "fast", "excluded_linters": ["cspell", "jscpd", "markdownlint"]}"#,
        );

    let output = repo.run_cli_success(&["plan", "--prefs", "prefs.json", "--profile", "thorough"]);
    let json = assert_valid_json(&output, "plan thorough");
    assert_eq!(json["performance_profile"], "thorough");
    assert_eq!(json["configuration"]["performance"]["incremental_scanning"], false);
}

#[test]
fn test_plan_invalid_preferences_exit_1() {
    let repo = TestRepo::new();
    repo.with_python_service()
        .add_file("bad.toml", "severity_threshold = \"loud\"\n");

    let (code, stdout, stderr) = repo.run_cli_status(&["plan", "--prefs", "bad.toml"]);
    assert_exit(code, 1, &stderr);
    assert!(stdout.is_empty());
    assert_contains(&stderr, "Invalid preferences file");
}

#[test]
fn test_plan_toon_and_text_formats() {
    let repo = TestRepo::new();
    repo.with_react_typescript();

    let toon = repo.run_cli_success(&["plan", "--format", "toon"]);
    assert_valid_toon(&toon, "plan toon");

    let text = repo.run_cli_success(&["plan", "--format", "text"]);
    assert_contains(&text, "LINT PLAN");
    assert_contains(&text, "✓ eslint");
    assert_contains(&text, "PERFORMANCE");
}
