//! Tests for the `run` CLI command
//!
//! A shell script stands in for the container engine, so these tests only
//! need `/bin/sh`.

use crate::common::{assert_contains, assert_exit, assert_valid_json, TestRepo};

#[test]
fn test_run_without_runtime_exits_4() {
    let repo = TestRepo::new();
    repo.with_python_service();

    let (code, stdout, stderr) =
        repo.run_cli_status(&["--runtime", "lintscope-no-such-runtime", "run", "."]);

    assert_exit(code, 4, &stderr);
    assert!(stdout.is_empty());
    assert_contains(&stderr, "not available");
    // nothing was prepared
    assert!(!repo.path().join(".lintscope").exists());
}

#[test]
fn test_run_rejects_bad_timeout() {
    let repo = TestRepo::new();
    let output = repo.run_cli(&["run", "--timeout", "soon"]).unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[cfg(unix)]
mod with_fake_runtime {
    use super::*;
    use crate::common::test_repo::FakeRuntime;

    const FAILING_LOG: &str = "\
[MegaLinter init] ONE-SHOT RUN
❌ Linted [PYTHON] files with [flake8]: Found 2 error(s) - (1.20s)
app/main.py:1:1: error 'flask' imported but unused (F401)
app/util.py:2:5: warning Missing docstring (D103)
✅ Linted [PYTHON] files with [black] successfully - (0.40s)";

    const CLEAN_LOG: &str = "\
✅ Linted [PYTHON] files with [flake8] successfully - (0.90s)
✅ Linted [PYTHON] files with [black] successfully - (0.40s)";

    #[test]
    fn test_run_with_issues_exits_1() {
        let repo = TestRepo::new();
        repo.with_python_service();
        let runtime = FakeRuntime::new(FAILING_LOG, 0);

        let (code, stdout, stderr) =
            repo.run_cli_status(&["--runtime", &runtime.binary(), "run", "."]);
        assert_exit(code, 1, &stderr);

        let json = assert_valid_json(&stdout, "run results");
        assert_eq!(json["summary"]["total_issues"], 2);
        assert_eq!(json["summary"]["failed_linters"], 1);
        assert_eq!(json["linters"][0]["name"], "flake8");
        assert_eq!(json["linters"][0]["issues"][0]["severity"], "critical");
        assert_eq!(json["linters"][0]["issues"][1]["severity"], "high");
        assert_eq!(json["profile"]["primary"][0], "python");
        assert!(json["execution_id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[test]
    fn test_run_clean_exits_0_and_writes_plan() {
        let repo = TestRepo::new();
        repo.with_python_service();
        let runtime = FakeRuntime::new(CLEAN_LOG, 0);

        let (code, stdout, stderr) =
            repo.run_cli_status(&["--runtime", &runtime.binary(), "run"]);
        assert_exit(code, 0, &stderr);
        let json = assert_valid_json(&stdout, "clean run");
        assert_eq!(json["summary"]["total_issues"], 0);
        assert_eq!(json["summary"]["passed_linters"], 2);

        let plan = std::fs::read_to_string(repo.path().join(".lintscope/lint.env")).unwrap();
        assert!(plan.starts_with("# lintscope execution plan"));

        let args = runtime.run_args();
        assert_eq!(args.first().map(String::as_str), Some("run"));
        assert!(args.iter().any(|a| a.starts_with("ENABLE_LINTERS=")));
        assert!(args.iter().any(|a| a.ends_with(":/tmp/lint:rw")));
        assert_eq!(args.last().map(String::as_str), Some("oxsecurity/megalinter:v8"));
    }

    #[test]
    fn test_run_timeout_and_image_flags() {
        let repo = TestRepo::new();
        repo.with_python_service();
        let runtime = FakeRuntime::new(CLEAN_LOG, 0);

        let (code, stdout, stderr) = repo.run_cli_status(&[
            "--runtime",
            &runtime.binary(),
            "--image",
            "example/linter:1",
            "run",
            "--timeout",
            "2m",
        ]);
        assert_exit(code, 0, &stderr);
        let json = assert_valid_json(&stdout, "timeout run");
        assert_eq!(
            json["configuration"]["performance"]["max_execution_time"],
            120
        );
        assert_eq!(json["performance"]["time_budget_secs"], 120);

        let args = runtime.run_args();
        assert!(args.iter().any(|a| a == "MAX_EXECUTION_TIME=120"));
        assert_eq!(args.last().map(String::as_str), Some("example/linter:1"));
    }

    #[test]
    fn test_run_container_failure_exits_5() {
        let repo = TestRepo::new();
        repo.with_python_service();
        let runtime = FakeRuntime::new("boom", 7);

        let (code, stdout, stderr) =
            repo.run_cli_status(&["--runtime", &runtime.binary(), "run"]);
        assert_exit(code, 5, &stderr);
        assert!(stdout.is_empty());
        assert_contains(&stderr, "exited with code");
    }

    #[test]
    fn test_run_streams_events() {
        let repo = TestRepo::new();
        repo.with_python_service();
        let runtime = FakeRuntime::new(FAILING_LOG, 0);

        let (code, _stdout, stderr) =
            repo.run_cli_status(&["--runtime", &runtime.binary(), "run", "--events"]);
        assert_exit(code, 1, &stderr);

        let events: Vec<serde_json::Value> = stderr
            .lines()
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect();
        let types: Vec<&str> = events.iter().filter_map(|e| e["type"].as_str()).collect();
        assert_eq!(types.first(), Some(&"state_changed"));
        assert!(types.contains(&"tool_started"));
        assert!(types.contains(&"output"));

        let states: Vec<&str> = events
            .iter()
            .filter_map(|e| e["state"].as_str())
            .collect();
        assert_eq!(states, vec!["preparing", "running", "completed"]);
    }

    #[test]
    fn test_run_text_format() {
        let repo = TestRepo::new();
        repo.with_python_service();
        let runtime = FakeRuntime::new(FAILING_LOG, 0);

        let (code, stdout, stderr) = repo.run_cli_status(&[
            "--runtime",
            &runtime.binary(),
            "--format",
            "text",
            "-v",
            "run",
        ]);
        assert_exit(code, 1, &stderr);
        assert_contains(&stdout, "LINT RUN: ISSUES");
        assert_contains(&stdout, "✗ flake8");
        assert_contains(&stdout, "[app/main.py]");
    }
}
