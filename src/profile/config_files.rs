//! Known tooling configuration files, tagged by kind and importance.

use std::collections::BTreeMap;

use glob::{MatchOptions, Pattern};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::walker::WalkEntry;

/// What a configuration file configures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigFileKind {
    Linter,
    Formatter,
    TypeChecker,
    Build,
    Ci,
    Editor,
    Security,
    Testing,
    Container,
}

/// How strongly a config file should influence the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Low,
    Medium,
    High,
}

/// A located configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Path relative to the repository root, `/`-separated
    pub path: String,
    #[serde(rename = "type")]
    pub kind: ConfigFileKind,
    pub importance: Importance,
}

struct ConfigPattern {
    key: &'static str,
    /// Matched against the file name, or the relative path when it contains `/`
    pattern: &'static str,
    kind: ConfigFileKind,
    importance: Importance,
}

const fn cfg(
    key: &'static str,
    pattern: &'static str,
    kind: ConfigFileKind,
    importance: Importance,
) -> ConfigPattern {
    ConfigPattern {
        key,
        pattern,
        kind,
        importance,
    }
}

use ConfigFileKind as K;
use Importance as I;

const CONFIG_PATTERNS: &[ConfigPattern] = &[
    // Linters
    cfg("eslint", ".eslintrc*", K::Linter, I::High),
    cfg("eslint", "eslint.config.*", K::Linter, I::High),
    cfg("stylelint", ".stylelintrc*", K::Linter, I::Medium),
    cfg("pylint", ".pylintrc", K::Linter, I::High),
    cfg("flake8", ".flake8", K::Linter, I::High),
    cfg("ruff", "ruff.toml", K::Linter, I::High),
    cfg("ruff", ".ruff.toml", K::Linter, I::High),
    cfg("golangci", ".golangci.y*ml", K::Linter, I::High),
    cfg("clippy", "clippy.toml", K::Linter, I::Medium),
    cfg("rubocop", ".rubocop.yml", K::Linter, I::High),
    cfg("checkstyle", "checkstyle*.xml", K::Linter, I::High),
    cfg("markdownlint", ".markdownlint*", K::Linter, I::Low),
    cfg("yamllint", ".yamllint*", K::Linter, I::Low),
    cfg("hadolint", ".hadolint.y*ml", K::Linter, I::Medium),
    cfg("megalinter", ".mega-linter.y*ml", K::Linter, I::High),
    // Formatters
    cfg("prettier", ".prettierrc*", K::Formatter, I::High),
    cfg("prettier", "prettier.config.*", K::Formatter, I::High),
    cfg("rustfmt", "rustfmt.toml", K::Formatter, I::Medium),
    cfg("rustfmt", ".rustfmt.toml", K::Formatter, I::Medium),
    cfg("pyproject", "pyproject.toml", K::Build, I::Medium),
    cfg("editorconfig", ".editorconfig", K::Editor, I::Low),
    // Type checkers
    cfg("typescript", "tsconfig*.json", K::TypeChecker, I::High),
    cfg("mypy", "mypy.ini", K::TypeChecker, I::Medium),
    // Build / test
    cfg("babel", "babel.config.*", K::Build, I::Low),
    cfg("babel", ".babelrc*", K::Build, I::Low),
    cfg("webpack", "webpack.config.*", K::Build, I::Low),
    cfg("setup_cfg", "setup.cfg", K::Build, I::Low),
    cfg("jest", "jest.config.*", K::Testing, I::Low),
    cfg("pytest", "pytest.ini", K::Testing, I::Low),
    // CI
    cfg("github_actions", ".github/workflows/*.y*ml", K::Ci, I::Medium),
    cfg("gitlab_ci", ".gitlab-ci.yml", K::Ci, I::Medium),
    cfg("circleci", ".circleci/config.yml", K::Ci, I::Medium),
    cfg("jenkins", "Jenkinsfile", K::Ci, I::Medium),
    cfg("pre_commit", ".pre-commit-config.yaml", K::Ci, I::Medium),
    // Security
    cfg("gitleaks", ".gitleaks.toml", K::Security, I::High),
    cfg("secretlint", ".secretlintrc*", K::Security, I::High),
    cfg("sonar", "sonar-project.properties", K::Security, I::Medium),
    // Containers
    cfg("docker", "Dockerfile", K::Container, I::Medium),
    cfg("docker_compose", "docker-compose.y*ml", K::Container, I::Low),
];

static COMPILED: Lazy<Vec<(Pattern, &'static ConfigPattern)>> = Lazy::new(|| {
    CONFIG_PATTERNS
        .iter()
        .filter_map(|p| Pattern::new(p.pattern).ok().map(|compiled| (compiled, p)))
        .collect()
});

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Match walked files against the known config patterns.
///
/// Each key keeps its shallowest match; between equally deep matches the
/// first one in walk order wins.
pub fn locate_config_files<'a>(
    files: impl IntoIterator<Item = &'a WalkEntry>,
) -> BTreeMap<String, ConfigFile> {
    let mut found: BTreeMap<String, (usize, ConfigFile)> = BTreeMap::new();

    for entry in files {
        let relative = entry.relative.to_string_lossy().replace('\\', "/");
        let file_name = relative.rsplit('/').next().unwrap_or(&relative);

        for (pattern, spec) in COMPILED.iter() {
            let subject = if spec.pattern.contains('/') {
                relative.as_str()
            } else {
                file_name
            };
            if !pattern.matches_with(subject, MATCH_OPTIONS) {
                continue;
            }

            let replace = match found.get(spec.key) {
                Some((depth, _)) => entry.depth < *depth,
                None => true,
            };
            if replace {
                found.insert(
                    spec.key.to_string(),
                    (
                        entry.depth,
                        ConfigFile {
                            path: relative.clone(),
                            kind: spec.kind,
                            importance: spec.importance,
                        },
                    ),
                );
            }
        }
    }

    found.into_iter().map(|(k, (_, file))| (k, file)).collect()
}
