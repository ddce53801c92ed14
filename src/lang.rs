//! Language detection from file names and extensions

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Languages the profiler recognizes.
///
/// Data and documentation formats (JSON, YAML, Markdown, ...) are not
/// languages here: they never compete with source languages for the
/// primary/secondary split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    TypeScript,
    JavaScript,
    Python,
    Java,
    Kotlin,
    Scala,
    Go,
    Rust,
    Ruby,
    Php,
    CSharp,
    C,
    Cpp,
    Swift,
    Dart,
    Lua,
    Elixir,
    R,
    Perl,
    PowerShell,
    Shell,
    Sql,
    Html,
    Css,
    Terraform,
    Dockerfile,
    Makefile,
}

/// Extension-less script names that are shell by convention.
const SHELL_SCRIPT_NAMES: &[&str] = &[
    "configure",
    "gradlew",
    "mvnw",
    ".bashrc",
    ".bash_profile",
    ".zshrc",
    ".profile",
];

impl Lang {
    /// Detect language from file path: extension first, then name heuristics.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name().and_then(|n| n.to_str())?;

        if let Some(lang) = Self::from_file_name(name) {
            return Some(lang);
        }

        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Detect language from file extension string
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "ts" | "tsx" | "mts" | "cts" => Some(Self::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Self::JavaScript),
            "py" | "pyi" | "pyw" => Some(Self::Python),
            "java" => Some(Self::Java),
            "kt" | "kts" => Some(Self::Kotlin),
            "scala" | "sc" => Some(Self::Scala),
            "go" => Some(Self::Go),
            "rs" => Some(Self::Rust),
            "rb" | "rake" | "gemspec" => Some(Self::Ruby),
            "php" => Some(Self::Php),
            "cs" | "csx" => Some(Self::CSharp),
            "c" | "h" => Some(Self::C),
            "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "hh" => Some(Self::Cpp),
            "swift" => Some(Self::Swift),
            "dart" => Some(Self::Dart),
            "lua" => Some(Self::Lua),
            "ex" | "exs" => Some(Self::Elixir),
            "r" => Some(Self::R),
            "pl" | "pm" => Some(Self::Perl),
            "ps1" | "psm1" | "psd1" => Some(Self::PowerShell),
            "sh" | "bash" | "zsh" | "ksh" => Some(Self::Shell),
            "sql" => Some(Self::Sql),
            "html" | "htm" => Some(Self::Html),
            "css" | "scss" | "sass" | "less" => Some(Self::Css),
            "tf" | "tfvars" | "hcl" => Some(Self::Terraform),
            "dockerfile" => Some(Self::Dockerfile),
            "mk" => Some(Self::Makefile),
            _ => None,
        }
    }

    /// Heuristics for files whose name, not extension, carries the language.
    fn from_file_name(name: &str) -> Option<Self> {
        if name == "Dockerfile" || name == "Containerfile" || name.starts_with("Dockerfile.") {
            return Some(Self::Dockerfile);
        }
        if matches!(name, "Makefile" | "makefile" | "GNUmakefile") {
            return Some(Self::Makefile);
        }
        if SHELL_SCRIPT_NAMES.contains(&name) {
            return Some(Self::Shell);
        }
        None
    }

    /// Get the canonical name of the language
    pub fn name(&self) -> &'static str {
        match self {
            Self::TypeScript => "typescript",
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Java => "java",
            Self::Kotlin => "kotlin",
            Self::Scala => "scala",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Ruby => "ruby",
            Self::Php => "php",
            Self::CSharp => "csharp",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Swift => "swift",
            Self::Dart => "dart",
            Self::Lua => "lua",
            Self::Elixir => "elixir",
            Self::R => "r",
            Self::Perl => "perl",
            Self::PowerShell => "powershell",
            Self::Shell => "shell",
            Self::Sql => "sql",
            Self::Html => "html",
            Self::Css => "css",
            Self::Terraform => "terraform",
            Self::Dockerfile => "dockerfile",
            Self::Makefile => "makefile",
        }
    }

    /// Languages whose frameworks come from the npm manifest
    pub fn is_javascript_family(&self) -> bool {
        matches!(self, Self::TypeScript | Self::JavaScript)
    }

    /// Languages whose build manifests live in Maven or Gradle files
    pub fn is_jvm(&self) -> bool {
        matches!(self, Self::Java | Self::Kotlin | Self::Scala)
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Lang {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "typescript" | "ts" => Ok(Self::TypeScript),
            "javascript" | "js" => Ok(Self::JavaScript),
            "python" | "py" => Ok(Self::Python),
            "java" => Ok(Self::Java),
            "kotlin" => Ok(Self::Kotlin),
            "scala" => Ok(Self::Scala),
            "go" | "golang" => Ok(Self::Go),
            "rust" => Ok(Self::Rust),
            "ruby" => Ok(Self::Ruby),
            "php" => Ok(Self::Php),
            "csharp" | "c#" => Ok(Self::CSharp),
            "c" => Ok(Self::C),
            "cpp" | "c++" => Ok(Self::Cpp),
            "swift" => Ok(Self::Swift),
            "dart" => Ok(Self::Dart),
            "lua" => Ok(Self::Lua),
            "elixir" => Ok(Self::Elixir),
            "r" => Ok(Self::R),
            "perl" => Ok(Self::Perl),
            "powershell" => Ok(Self::PowerShell),
            "shell" | "bash" => Ok(Self::Shell),
            "sql" => Ok(Self::Sql),
            "html" => Ok(Self::Html),
            "css" => Ok(Self::Css),
            "terraform" => Ok(Self::Terraform),
            "dockerfile" | "docker" => Ok(Self::Dockerfile),
            "makefile" | "make" => Ok(Self::Makefile),
            _ => Err(()),
        }
    }
}
