//! Static catalog of linter templates and known tool conflicts.
//!
//! Catalog order matters: when two conflicting tools are both selected the
//! one listed first here is kept.

use crate::lang::Lang;
use crate::lint::types::{LinterCategory as C, LinterTemplate, Severity as S};

const JS_FILES: &[&str] = &["**/*.js", "**/*.jsx", "**/*.mjs", "**/*.cjs"];
const TS_JS_FILES: &[&str] = &["**/*.ts", "**/*.tsx", "**/*.js", "**/*.jsx"];
const PY_FILES: &[&str] = &["**/*.py"];
const GO_FILES: &[&str] = &["**/*.go"];
const RUST_FILES: &[&str] = &["**/*.rs"];
const JAVA_FILES: &[&str] = &["**/*.java"];
const RUBY_FILES: &[&str] = &["**/*.rb"];
const SHELL_FILES: &[&str] = &["**/*.sh", "**/*.bash"];
const C_FILES: &[&str] = &["**/*.c", "**/*.h", "**/*.cpp", "**/*.cc", "**/*.hpp"];
const ANY_FILE: &[&str] = &["**/*"];

const JS_VENDOR: &[&str] = &["node_modules/**", "dist/**", "build/**", "coverage/**"];
const PY_VENDOR: &[&str] = &[".venv/**", "venv/**", "**/__pycache__/**"];
const GO_VENDOR: &[&str] = &["vendor/**"];
const RUST_VENDOR: &[&str] = &["target/**"];
const NONE: &[&str] = &[];

const WEB_FRAMEWORKS: &[&str] = &["react", "vue", "angular", "svelte", "nextjs", "nuxt", "gatsby"];

macro_rules! template {
    (
        $name:literal, $langs:expr, $fws:expr, $cat:expr, $sev:expr,
        rules: $rules:expr, include: $inc:expr, exclude: $exc:expr, conflicts: $conf:expr
    ) => {
        LinterTemplate {
            name: $name,
            languages: $langs,
            frameworks: $fws,
            category: $cat,
            severity: $sev,
            rules: $rules,
            include: $inc,
            exclude: $exc,
            conflicts_with: $conf,
        }
    };
}

static TEMPLATES: &[LinterTemplate] = &[
    // JavaScript / TypeScript
    template!("eslint", &[Lang::TypeScript, Lang::JavaScript], NONE, C::Language, S::Error,
        rules: &["no-unused-vars", "no-undef", "eqeqeq"], include: TS_JS_FILES, exclude: JS_VENDOR,
        conflicts: &["standard"]),
    template!("standard", &[Lang::JavaScript], NONE, C::Language, S::Error,
        rules: NONE, include: JS_FILES, exclude: JS_VENDOR, conflicts: &["eslint"]),
    template!("tsc", &[Lang::TypeScript], NONE, C::Language, S::Error,
        rules: &["strict"], include: &["**/*.ts", "**/*.tsx"], exclude: JS_VENDOR, conflicts: NONE),
    template!("prettier", &[Lang::TypeScript, Lang::JavaScript, Lang::Css, Lang::Html], NONE,
        C::Format, S::Warning,
        rules: NONE, include: ANY_FILE, exclude: JS_VENDOR, conflicts: &["eslint-plugin-prettier"]),
    template!("eslint-plugin-prettier", &[Lang::TypeScript, Lang::JavaScript], NONE,
        C::Format, S::Warning,
        rules: &["prettier/prettier"], include: TS_JS_FILES, exclude: JS_VENDOR,
        conflicts: &["prettier"]),
    template!("eslint-plugin-security", &[Lang::TypeScript, Lang::JavaScript], NONE,
        C::Security, S::Error,
        rules: &["security/detect-eval-with-expression", "security/detect-non-literal-require"],
        include: TS_JS_FILES, exclude: JS_VENDOR, conflicts: NONE),
    template!("eslint-plugin-sonarjs", &[Lang::TypeScript, Lang::JavaScript], NONE,
        C::Quality, S::Warning,
        rules: &["sonarjs/cognitive-complexity"], include: TS_JS_FILES, exclude: JS_VENDOR,
        conflicts: NONE),
    template!("eslint-plugin-jsdoc", &[Lang::TypeScript, Lang::JavaScript], NONE,
        C::Documentation, S::Info,
        rules: &["jsdoc/require-jsdoc"], include: TS_JS_FILES, exclude: JS_VENDOR, conflicts: NONE),
    // Python
    template!("pylint", &[Lang::Python], NONE, C::Language, S::Warning,
        rules: &["C0114", "W0611"], include: PY_FILES, exclude: PY_VENDOR, conflicts: NONE),
    template!("flake8", &[Lang::Python], NONE, C::Language, S::Warning,
        rules: &["E9", "F63", "F7", "F82"], include: PY_FILES, exclude: PY_VENDOR,
        conflicts: &["ruff"]),
    template!("ruff", &[Lang::Python], NONE, C::Language, S::Warning,
        rules: &["E", "F"], include: PY_FILES, exclude: PY_VENDOR, conflicts: &["flake8"]),
    template!("mypy", &[Lang::Python], NONE, C::Language, S::Warning,
        rules: NONE, include: PY_FILES, exclude: PY_VENDOR, conflicts: NONE),
    template!("black", &[Lang::Python], NONE, C::Format, S::Warning,
        rules: NONE, include: PY_FILES, exclude: PY_VENDOR, conflicts: &["autopep8"]),
    template!("autopep8", &[Lang::Python], NONE, C::Format, S::Info,
        rules: NONE, include: PY_FILES, exclude: PY_VENDOR, conflicts: &["black"]),
    template!("isort", &[Lang::Python], NONE, C::Format, S::Info,
        rules: NONE, include: PY_FILES, exclude: PY_VENDOR, conflicts: NONE),
    template!("bandit", &[Lang::Python], NONE, C::Security, S::Error,
        rules: &["B101", "B602"], include: PY_FILES, exclude: PY_VENDOR, conflicts: NONE),
    template!("radon", &[Lang::Python], NONE, C::Quality, S::Info,
        rules: NONE, include: PY_FILES, exclude: PY_VENDOR, conflicts: NONE),
    template!("pydocstyle", &[Lang::Python], NONE, C::Documentation, S::Info,
        rules: &["D100", "D103"], include: PY_FILES, exclude: PY_VENDOR, conflicts: NONE),
    template!("perflint", &[Lang::Python], NONE, C::Performance, S::Info,
        rules: NONE, include: PY_FILES, exclude: PY_VENDOR, conflicts: NONE),
    // Go
    template!("golangci-lint", &[Lang::Go], NONE, C::Language, S::Error,
        rules: &["govet", "errcheck", "staticcheck"], include: GO_FILES, exclude: GO_VENDOR,
        conflicts: &["revive"]),
    template!("revive", &[Lang::Go], NONE, C::Language, S::Warning,
        rules: NONE, include: GO_FILES, exclude: GO_VENDOR, conflicts: &["golangci-lint"]),
    template!("gofmt", &[Lang::Go], NONE, C::Format, S::Warning,
        rules: NONE, include: GO_FILES, exclude: GO_VENDOR, conflicts: NONE),
    template!("gosec", &[Lang::Go], NONE, C::Security, S::Error,
        rules: NONE, include: GO_FILES, exclude: GO_VENDOR, conflicts: NONE),
    // Rust
    template!("clippy", &[Lang::Rust], NONE, C::Language, S::Warning,
        rules: &["clippy::all"], include: RUST_FILES, exclude: RUST_VENDOR, conflicts: NONE),
    template!("rustfmt", &[Lang::Rust], NONE, C::Format, S::Warning,
        rules: NONE, include: RUST_FILES, exclude: RUST_VENDOR, conflicts: NONE),
    template!("cargo-audit", &[Lang::Rust], NONE, C::Security, S::Error,
        rules: NONE, include: &["**/Cargo.lock"], exclude: NONE, conflicts: NONE),
    // JVM
    template!("checkstyle", &[Lang::Java], NONE, C::Language, S::Warning,
        rules: &["google_checks"], include: JAVA_FILES, exclude: &["target/**", "build/**"],
        conflicts: NONE),
    template!("pmd", &[Lang::Java], NONE, C::Quality, S::Warning,
        rules: &["category/java/bestpractices.xml"], include: JAVA_FILES,
        exclude: &["target/**", "build/**"], conflicts: NONE),
    template!("spotbugs", &[Lang::Java, Lang::Kotlin], NONE, C::Quality, S::Warning,
        rules: NONE, include: &["**/*.java", "**/*.kt"], exclude: &["target/**", "build/**"],
        conflicts: NONE),
    template!("ktlint", &[Lang::Kotlin], NONE, C::Language, S::Warning,
        rules: NONE, include: &["**/*.kt", "**/*.kts"], exclude: &["build/**"], conflicts: NONE),
    template!("detekt", &[Lang::Kotlin], NONE, C::Quality, S::Warning,
        rules: NONE, include: &["**/*.kt"], exclude: &["build/**"], conflicts: NONE),
    template!("scalafix", &[Lang::Scala], NONE, C::Language, S::Warning,
        rules: NONE, include: &["**/*.scala"], exclude: &["target/**"], conflicts: NONE),
    // Ruby / PHP
    template!("rubocop", &[Lang::Ruby], NONE, C::Language, S::Warning,
        rules: NONE, include: RUBY_FILES, exclude: &["vendor/**"], conflicts: &["standardrb"]),
    template!("standardrb", &[Lang::Ruby], NONE, C::Language, S::Warning,
        rules: NONE, include: RUBY_FILES, exclude: &["vendor/**"], conflicts: &["rubocop"]),
    template!("brakeman", &[Lang::Ruby], NONE, C::Security, S::Error,
        rules: NONE, include: RUBY_FILES, exclude: &["vendor/**"], conflicts: NONE),
    template!("phpcs", &[Lang::Php], NONE, C::Language, S::Warning,
        rules: &["PSR12"], include: &["**/*.php"], exclude: &["vendor/**"], conflicts: NONE),
    // Systems / misc languages
    template!("cppcheck", &[Lang::C, Lang::Cpp], NONE, C::Language, S::Warning,
        rules: NONE, include: C_FILES, exclude: NONE, conflicts: NONE),
    template!("clang-format", &[Lang::C, Lang::Cpp], NONE, C::Format, S::Info,
        rules: NONE, include: C_FILES, exclude: NONE, conflicts: NONE),
    template!("dotnet-format", &[Lang::CSharp], NONE, C::Format, S::Warning,
        rules: NONE, include: &["**/*.cs"], exclude: &["bin/**", "obj/**"], conflicts: NONE),
    template!("swiftlint", &[Lang::Swift], NONE, C::Language, S::Warning,
        rules: NONE, include: &["**/*.swift"], exclude: NONE, conflicts: NONE),
    template!("dart-analyze", &[Lang::Dart], NONE, C::Language, S::Warning,
        rules: NONE, include: &["**/*.dart"], exclude: NONE, conflicts: NONE),
    template!("luacheck", &[Lang::Lua], NONE, C::Language, S::Warning,
        rules: NONE, include: &["**/*.lua"], exclude: NONE, conflicts: NONE),
    template!("credo", &[Lang::Elixir], NONE, C::Language, S::Warning,
        rules: NONE, include: &["**/*.ex", "**/*.exs"], exclude: &["deps/**"], conflicts: NONE),
    template!("lintr", &[Lang::R], NONE, C::Language, S::Info,
        rules: NONE, include: &["**/*.R", "**/*.r"], exclude: NONE, conflicts: NONE),
    template!("perlcritic", &[Lang::Perl], NONE, C::Language, S::Warning,
        rules: NONE, include: &["**/*.pl", "**/*.pm"], exclude: NONE, conflicts: NONE),
    template!("psscriptanalyzer", &[Lang::PowerShell], NONE, C::Language, S::Warning,
        rules: NONE, include: &["**/*.ps1", "**/*.psm1"], exclude: NONE, conflicts: NONE),
    template!("shellcheck", &[Lang::Shell], NONE, C::Language, S::Warning,
        rules: NONE, include: SHELL_FILES, exclude: NONE, conflicts: NONE),
    template!("shfmt", &[Lang::Shell], NONE, C::Format, S::Info,
        rules: NONE, include: SHELL_FILES, exclude: NONE, conflicts: NONE),
    template!("sqlfluff", &[Lang::Sql], NONE, C::Language, S::Warning,
        rules: NONE, include: &["**/*.sql"], exclude: NONE, conflicts: NONE),
    template!("stylelint", &[Lang::Css], NONE, C::Language, S::Warning,
        rules: NONE, include: &["**/*.css", "**/*.scss"], exclude: JS_VENDOR, conflicts: NONE),
    template!("htmlhint", &[Lang::Html], NONE, C::Language, S::Warning,
        rules: NONE, include: &["**/*.html", "**/*.htm"], exclude: JS_VENDOR, conflicts: NONE),
    template!("hadolint", &[Lang::Dockerfile], NONE, C::Language, S::Warning,
        rules: NONE, include: &["**/Dockerfile", "**/Dockerfile.*"], exclude: NONE,
        conflicts: NONE),
    template!("checkmake", &[Lang::Makefile], NONE, C::Language, S::Info,
        rules: NONE, include: &["**/Makefile"], exclude: NONE, conflicts: NONE),
    template!("tflint", &[Lang::Terraform], NONE, C::Language, S::Warning,
        rules: NONE, include: &["**/*.tf"], exclude: &[".terraform/**"], conflicts: NONE),
    template!("trivy", &[Lang::Dockerfile, Lang::Terraform], NONE, C::Security, S::Error,
        rules: NONE, include: ANY_FILE, exclude: NONE, conflicts: NONE),
    // Framework-specific
    template!("eslint-plugin-react", NONE_LANGS, &["react", "nextjs", "gatsby"], C::Language,
        S::Warning,
        rules: &["react/jsx-key", "react-hooks/rules-of-hooks"], include: TS_JS_FILES,
        exclude: JS_VENDOR, conflicts: NONE),
    template!("eslint-plugin-jsx-a11y", NONE_LANGS, &["react", "nextjs", "gatsby"],
        C::Accessibility, S::Warning,
        rules: &["jsx-a11y/alt-text"], include: TS_JS_FILES, exclude: JS_VENDOR, conflicts: NONE),
    template!("eslint-plugin-vue", NONE_LANGS, &["vue", "nuxt"], C::Language, S::Warning,
        rules: &["vue/no-unused-vars"], include: &["**/*.vue", "**/*.js", "**/*.ts"],
        exclude: JS_VENDOR, conflicts: NONE),
    template!("eslint-plugin-vuejs-accessibility", NONE_LANGS, &["vue", "nuxt"],
        C::Accessibility, S::Warning,
        rules: NONE, include: &["**/*.vue"], exclude: JS_VENDOR, conflicts: NONE),
    template!("angular-eslint", NONE_LANGS, &["angular"], C::Language, S::Warning,
        rules: NONE, include: &["**/*.ts", "**/*.html"], exclude: JS_VENDOR, conflicts: NONE),
    template!("eslint-plugin-jest", NONE_LANGS, &["jest"], C::Quality, S::Info,
        rules: &["jest/no-focused-tests"], include: &["**/*.test.*", "**/*.spec.*"],
        exclude: JS_VENDOR, conflicts: NONE),
    template!("lighthouse", NONE_LANGS, WEB_FRAMEWORKS, C::Performance, S::Info,
        rules: NONE, include: &["**/*.html"], exclude: JS_VENDOR, conflicts: NONE),
    template!("pylint-django", NONE_LANGS, &["django"], C::Language, S::Warning,
        rules: NONE, include: PY_FILES, exclude: PY_VENDOR, conflicts: NONE),
    template!("flake8-bugbear", NONE_LANGS, &["flask", "fastapi"], C::Quality, S::Warning,
        rules: &["B"], include: PY_FILES, exclude: PY_VENDOR, conflicts: NONE),
    template!("rails-best-practices", NONE_LANGS, &["rails"], C::Quality, S::Info,
        rules: NONE, include: RUBY_FILES, exclude: &["vendor/**"], conflicts: NONE),
    template!("phpstan", NONE_LANGS, &["laravel", "symfony"], C::Quality, S::Warning,
        rules: NONE, include: &["**/*.php"], exclude: &["vendor/**"], conflicts: NONE),
    // Universal
    template!("gitleaks", NONE_LANGS, NONE, C::Security, S::Error,
        rules: NONE, include: ANY_FILE, exclude: NONE, conflicts: NONE),
    template!("secretlint", NONE_LANGS, NONE, C::Security, S::Warning,
        rules: NONE, include: ANY_FILE, exclude: JS_VENDOR, conflicts: NONE),
    template!("jscpd", NONE_LANGS, NONE, C::Quality, S::Info,
        rules: NONE, include: ANY_FILE, exclude: JS_VENDOR, conflicts: NONE),
    template!("editorconfig-checker", NONE_LANGS, NONE, C::Format, S::Info,
        rules: NONE, include: ANY_FILE, exclude: JS_VENDOR, conflicts: NONE),
    template!("markdownlint", NONE_LANGS, NONE, C::Documentation, S::Info,
        rules: &["MD013"], include: &["**/*.md"], exclude: JS_VENDOR, conflicts: NONE),
    template!("cspell", NONE_LANGS, NONE, C::Documentation, S::Info,
        rules: NONE, include: ANY_FILE, exclude: JS_VENDOR, conflicts: NONE),
];

const NONE_LANGS: &[Lang] = &[];

/// Pairs of tools that must never run together
pub const CONFLICT_PAIRS: &[(&str, &str)] = &[
    ("prettier", "eslint-plugin-prettier"),
    ("eslint", "standard"),
    ("black", "autopep8"),
    ("flake8", "ruff"),
    ("golangci-lint", "revive"),
    ("rubocop", "standardrb"),
];

/// Every template, in catalog order
pub fn templates() -> &'static [LinterTemplate] {
    TEMPLATES
}

pub fn find(name: &str) -> Option<&'static LinterTemplate> {
    TEMPLATES.iter().find(|t| t.name == name)
}

/// Whether `a` and `b` conflict, in either direction
pub fn conflicts(a: &str, b: &str) -> bool {
    if a == b {
        return false;
    }
    CONFLICT_PAIRS
        .iter()
        .any(|(x, y)| (*x == a && *y == b) || (*x == b && *y == a))
        || find(a).is_some_and(|t| t.conflicts_with.contains(&b))
        || find(b).is_some_and(|t| t.conflicts_with.contains(&a))
}

/// Templates bound to a language
pub fn for_language(lang: Lang) -> impl Iterator<Item = &'static LinterTemplate> {
    TEMPLATES.iter().filter(move |t| t.supports_language(lang))
}

/// Templates pulled in by a framework
pub fn for_framework(framework: &str) -> impl Iterator<Item = &'static str> + '_ {
    TEMPLATES
        .iter()
        .filter(move |t| t.supports_framework(framework))
        .map(|t| t.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let mut seen = HashSet::new();
        for t in templates() {
            assert!(seen.insert(t.name), "duplicate template {}", t.name);
        }
    }

    #[test]
    fn test_conflict_pairs_reference_known_templates() {
        for (a, b) in CONFLICT_PAIRS {
            let ta = find(a).unwrap();
            let tb = find(b).unwrap();
            assert!(ta.conflicts_with.contains(b), "{a} should list {b}");
            assert!(tb.conflicts_with.contains(a), "{b} should list {a}");
        }
    }

    #[test]
    fn test_conflicts_are_symmetric() {
        assert!(conflicts("prettier", "eslint-plugin-prettier"));
        assert!(conflicts("eslint-plugin-prettier", "prettier"));
        assert!(!conflicts("eslint", "prettier"));
        assert!(!conflicts("eslint", "eslint"));
    }

    #[test]
    fn test_templates_have_scope() {
        for t in templates() {
            assert!(!t.include.is_empty(), "{} has no include globs", t.name);
        }
    }

    #[test]
    fn test_language_lookup() {
        let python: Vec<_> = for_language(Lang::Python).map(|t| t.name).collect();
        assert!(python.contains(&"pylint"));
        assert!(python.contains(&"bandit"));
        assert!(!python.contains(&"eslint"));

        let react: Vec<_> = for_framework("react").collect();
        assert!(react.contains(&"eslint-plugin-react"));
    }

    #[test]
    fn test_template_scope_globs() {
        let eslint = find("eslint").unwrap();
        assert!(eslint.matches_file("src/app.ts"));
        assert!(!eslint.matches_file("node_modules/pkg/index.js"));
        assert!(!eslint.matches_file("main.py"));
    }
}
