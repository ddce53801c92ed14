//! Framework and build-tool detection from manifest files.
//!
//! Frameworks come from dependency names in the manifests that belong to
//! each detected language. A manifest that cannot be read or parsed only
//! costs the frameworks it would have contributed; the reason is kept as a
//! profile warning.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lang::Lang;

/// A framework inferred from a manifest dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framework {
    /// Framework name (e.g. "react", "django")
    pub name: String,
    /// Language whose manifest declared it
    pub language: Lang,
    /// Manifest file it was found in
    pub source: String,
}

/// A build tool inferred from a marker file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTool {
    pub name: String,
    pub file: String,
}

/// Frameworks found plus manifests that could not be used
#[derive(Debug, Clone, Default)]
pub struct FrameworkDetection {
    pub frameworks: Vec<Framework>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
enum ManifestFormat {
    /// package.json dependency maps
    PackageJson,
    /// composer.json require maps
    ComposerJson,
    /// pyproject.toml PEP 621 / Poetry tables
    PyProject,
    /// Cargo.toml dependency tables
    CargoToml,
    /// One dependency per line (requirements.txt, go.mod, Gemfile, ...)
    Lines,
}

struct ManifestGroup {
    applies_to: fn(Lang) -> bool,
    manifests: &'static [(&'static str, ManifestFormat)],
    /// (dependency substring, framework name)
    signatures: &'static [(&'static str, &'static str)],
}

const MANIFEST_GROUPS: &[ManifestGroup] = &[
    ManifestGroup {
        applies_to: |l| l.is_javascript_family(),
        manifests: &[("package.json", ManifestFormat::PackageJson)],
        signatures: &[
            ("react", "react"),
            ("vue", "vue"),
            ("@angular/core", "angular"),
            ("svelte", "svelte"),
            ("next", "nextjs"),
            ("nuxt", "nuxt"),
            ("express", "express"),
            ("@nestjs/core", "nestjs"),
            ("gatsby", "gatsby"),
            ("electron", "electron"),
            ("jest", "jest"),
        ],
    },
    ManifestGroup {
        applies_to: |l| l == Lang::Python,
        manifests: &[
            ("requirements.txt", ManifestFormat::Lines),
            ("pyproject.toml", ManifestFormat::PyProject),
            ("Pipfile", ManifestFormat::Lines),
        ],
        signatures: &[
            ("django", "django"),
            ("flask", "flask"),
            ("fastapi", "fastapi"),
            ("pyramid", "pyramid"),
            ("tornado", "tornado"),
            ("pytest", "pytest"),
        ],
    },
    ManifestGroup {
        applies_to: |l| l.is_jvm(),
        manifests: &[
            ("pom.xml", ManifestFormat::Lines),
            ("build.gradle", ManifestFormat::Lines),
            ("build.gradle.kts", ManifestFormat::Lines),
        ],
        signatures: &[
            ("spring-boot", "spring"),
            ("springframework", "spring"),
            ("quarkus", "quarkus"),
            ("micronaut", "micronaut"),
            ("junit", "junit"),
        ],
    },
    ManifestGroup {
        applies_to: |l| l == Lang::Go,
        manifests: &[("go.mod", ManifestFormat::Lines)],
        signatures: &[
            ("github.com/gin-gonic/gin", "gin"),
            ("github.com/labstack/echo", "echo"),
            ("github.com/gofiber/fiber", "fiber"),
            ("github.com/gorilla/mux", "gorilla"),
        ],
    },
    ManifestGroup {
        applies_to: |l| l == Lang::Rust,
        manifests: &[("Cargo.toml", ManifestFormat::CargoToml)],
        signatures: &[
            ("actix-web", "actix-web"),
            ("rocket", "rocket"),
            ("axum", "axum"),
            ("warp", "warp"),
            ("tauri", "tauri"),
        ],
    },
    ManifestGroup {
        applies_to: |l| l == Lang::Ruby,
        manifests: &[("Gemfile", ManifestFormat::Lines)],
        signatures: &[("rails", "rails"), ("sinatra", "sinatra"), ("rspec", "rspec")],
    },
    ManifestGroup {
        applies_to: |l| l == Lang::Php,
        manifests: &[("composer.json", ManifestFormat::ComposerJson)],
        signatures: &[("laravel/framework", "laravel"), ("symfony/", "symfony")],
    },
];

/// Marker files and the build tool they imply, in reporting order
const BUILD_TOOL_MARKERS: &[(&str, &str)] = &[
    ("package-lock.json", "npm"),
    ("yarn.lock", "yarn"),
    ("pnpm-lock.yaml", "pnpm"),
    ("bun.lockb", "bun"),
    ("webpack.config.js", "webpack"),
    ("vite.config.js", "vite"),
    ("vite.config.ts", "vite"),
    ("rollup.config.js", "rollup"),
    ("turbo.json", "turborepo"),
    ("nx.json", "nx"),
    ("pom.xml", "maven"),
    ("build.gradle", "gradle"),
    ("build.gradle.kts", "gradle"),
    ("Cargo.lock", "cargo"),
    ("Cargo.toml", "cargo"),
    ("go.sum", "go-modules"),
    ("go.mod", "go-modules"),
    ("poetry.lock", "poetry"),
    ("Pipfile.lock", "pipenv"),
    ("setup.py", "setuptools"),
    ("Gemfile.lock", "bundler"),
    ("composer.lock", "composer"),
    ("Makefile", "make"),
    ("CMakeLists.txt", "cmake"),
    ("WORKSPACE", "bazel"),
    ("BUILD.bazel", "bazel"),
];

/// Detect frameworks for the given languages from manifests at `root`.
pub fn detect_frameworks(root: &Path, languages: &[Lang]) -> FrameworkDetection {
    let mut detection = FrameworkDetection::default();

    for lang in languages {
        for group in MANIFEST_GROUPS.iter().filter(|g| (g.applies_to)(*lang)) {
            for (file, format) in group.manifests {
                let path = root.join(file);
                if !path.is_file() {
                    continue;
                }

                let deps = match read_dependencies(&path, *format) {
                    Ok(deps) => deps,
                    Err(reason) => {
                        debug!("Ignoring manifest {}: {}", path.display(), reason);
                        detection.warnings.push(format!("{}: {}", file, reason));
                        continue;
                    }
                };

                for (needle, framework) in group.signatures {
                    let found = deps.iter().any(|d| d.contains(needle));
                    let seen = detection.frameworks.iter().any(|f| f.name == *framework);
                    if found && !seen {
                        detection.frameworks.push(Framework {
                            name: framework.to_string(),
                            language: *lang,
                            source: file.to_string(),
                        });
                    }
                }
            }
        }
    }

    detection
}

/// Detect build tools purely by marker-file presence at `root`.
pub fn detect_build_tools(root: &Path) -> Vec<BuildTool> {
    let mut tools: Vec<BuildTool> = Vec::new();
    for (file, name) in BUILD_TOOL_MARKERS {
        if root.join(file).is_file() && !tools.iter().any(|t| t.name == *name) {
            tools.push(BuildTool {
                name: name.to_string(),
                file: file.to_string(),
            });
        }
    }
    tools
}

fn read_dependencies(path: &Path, format: ManifestFormat) -> Result<Vec<String>, String> {
    let content = std::fs::read_to_string(path).map_err(|e| format!("unreadable ({})", e))?;

    let deps = match format {
        ManifestFormat::PackageJson => json_keys(
            &content,
            &["dependencies", "devDependencies", "peerDependencies"],
        )?,
        ManifestFormat::ComposerJson => json_keys(&content, &["require", "require-dev"])?,
        ManifestFormat::PyProject => pyproject_dependencies(&content)?,
        ManifestFormat::CargoToml => cargo_dependencies(&content)?,
        ManifestFormat::Lines => content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with("//"))
            .map(str::to_string)
            .collect(),
    };

    Ok(deps.into_iter().map(|d| d.to_lowercase()).collect())
}

fn json_keys(content: &str, sections: &[&str]) -> Result<Vec<String>, String> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| format!("invalid JSON ({})", e))?;

    Ok(sections
        .iter()
        .filter_map(|s| value.get(*s).and_then(|v| v.as_object()))
        .flat_map(|map| map.keys().cloned())
        .collect())
}

fn pyproject_dependencies(content: &str) -> Result<Vec<String>, String> {
    let value: toml::Value = content
        .parse()
        .map_err(|e: toml::de::Error| format!("invalid TOML ({})", e.message()))?;

    let mut deps = Vec::new();

    if let Some(project) = value.get("project") {
        if let Some(list) = project.get("dependencies").and_then(|d| d.as_array()) {
            deps.extend(list.iter().filter_map(|d| d.as_str().map(str::to_string)));
        }
        if let Some(groups) = project
            .get("optional-dependencies")
            .and_then(|d| d.as_table())
        {
            for list in groups.values().filter_map(|g| g.as_array()) {
                deps.extend(list.iter().filter_map(|d| d.as_str().map(str::to_string)));
            }
        }
    }

    if let Some(poetry) = value.get("tool").and_then(|t| t.get("poetry")) {
        for section in ["dependencies", "dev-dependencies"] {
            if let Some(table) = poetry.get(section).and_then(|d| d.as_table()) {
                deps.extend(table.keys().cloned());
            }
        }
    }

    Ok(deps)
}

fn cargo_dependencies(content: &str) -> Result<Vec<String>, String> {
    let value: toml::Value = content
        .parse()
        .map_err(|e: toml::de::Error| format!("invalid TOML ({})", e.message()))?;

    let mut deps = Vec::new();
    for section in ["dependencies", "dev-dependencies", "build-dependencies"] {
        if let Some(table) = value.get(section).and_then(|d| d.as_table()) {
            deps.extend(table.keys().cloned());
        }
    }
    if let Some(table) = value
        .get("workspace")
        .and_then(|w| w.get("dependencies"))
        .and_then(|d| d.as_table())
    {
        deps.extend(table.keys().cloned());
    }
    Ok(deps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(detection: &FrameworkDetection) -> Vec<&str> {
        detection.frameworks.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_react_from_package_json() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"name":"app","dependencies":{"react":"^18.0.0","react-dom":"^18.0.0"}}"#,
        )
        .unwrap();

        let detection = detect_frameworks(dir.path(), &[Lang::TypeScript]);
        assert_eq!(names(&detection), vec!["react"]);
        assert_eq!(detection.frameworks[0].language, Lang::TypeScript);
        assert!(detection.warnings.is_empty());
    }

    #[test]
    fn test_manifest_ignored_for_undetected_language() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies":{"express":"4"}}"#,
        )
        .unwrap();

        let detection = detect_frameworks(dir.path(), &[Lang::Python]);
        assert!(detection.frameworks.is_empty());
    }

    #[test]
    fn test_broken_manifest_degrades_to_warning() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), "{ not json").unwrap();
        fs::write(dir.path().join("requirements.txt"), "Django==4.2\n").unwrap();

        let detection = detect_frameworks(dir.path(), &[Lang::JavaScript, Lang::Python]);
        assert_eq!(names(&detection), vec!["django"]);
        assert_eq!(detection.warnings.len(), 1);
        assert!(detection.warnings[0].starts_with("package.json"));
    }

    #[test]
    fn test_pyproject_and_cargo_tables() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("pyproject.toml"),
            "[project]\nname = \"svc\"\ndependencies = [\"fastapi>=0.100\"]\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"svc\"\n\n[dependencies]\nactix-web = \"4\"\n",
        )
        .unwrap();

        let detection = detect_frameworks(dir.path(), &[Lang::Python, Lang::Rust]);
        assert_eq!(names(&detection), vec!["fastapi", "actix-web"]);
    }

    #[test]
    fn test_go_mod_and_gradle_lines() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("go.mod"),
            "module x\n\nrequire github.com/gin-gonic/gin v1.9.1\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("build.gradle"),
            "implementation 'org.springframework.boot:spring-boot-starter-web'\n",
        )
        .unwrap();

        let detection = detect_frameworks(dir.path(), &[Lang::Go, Lang::Java]);
        assert_eq!(names(&detection), vec!["gin", "spring"]);
    }

    #[test]
    fn test_build_tools_by_presence() {
        let dir = TempDir::new().unwrap();
        for file in ["package-lock.json", "Makefile", "CMakeLists.txt", "vite.config.ts"] {
            fs::write(dir.path().join(file), "").unwrap();
        }

        let tools: Vec<String> = detect_build_tools(dir.path())
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(tools, vec!["npm", "vite", "make", "cmake"]);
    }
}
