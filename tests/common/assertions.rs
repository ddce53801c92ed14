//! Output checks shared by the CLI tests

use serde_json::Value;

/// Parse `output` as JSON, failing the test with the raw output otherwise
pub fn assert_valid_json(output: &str, context: &str) -> Value {
    match serde_json::from_str(output) {
        Ok(value) => value,
        Err(err) => panic!("{context}: output is not JSON ({err})\n---\n{output}"),
    }
}

/// TOON documents from the renderers always carry a `_type:` line
pub fn assert_valid_toon(output: &str, context: &str) {
    let has_marker = output.lines().any(|l| l.trim_start().starts_with("_type:"));
    assert!(has_marker, "{context}: no `_type:` line in TOON output\n---\n{output}");
}

pub fn assert_json_type(json: &Value, expected: &str) {
    match json.get("_type").and_then(Value::as_str) {
        Some(kind) => assert_eq!(kind, expected, "unexpected `_type`"),
        None => panic!("document has no `_type` field: {json}"),
    }
}

pub fn assert_contains(output: &str, needle: &str) {
    if !output.contains(needle) {
        panic!("`{needle}` not found in output\n---\n{output}");
    }
}

/// Collect the string elements of a JSON array; non-arrays give an empty list
pub fn string_array(json: &Value) -> Vec<String> {
    let Some(items) = json.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(Value::as_str)
        .map(String::from)
        .collect()
}

/// `configuration.linters.enabled[*].name`
pub fn enabled_linters(configuration: &Value) -> Vec<String> {
    let Some(enabled) = configuration["linters"]["enabled"].as_array() else {
        return Vec::new();
    };
    enabled
        .iter()
        .filter_map(|linter| linter.get("name").and_then(Value::as_str))
        .map(String::from)
        .collect()
}

pub fn assert_exit(exit: Option<i32>, expected: i32, stderr: &str) {
    assert_eq!(exit, Some(expected), "wrong exit status; stderr was:\n{stderr}");
}
