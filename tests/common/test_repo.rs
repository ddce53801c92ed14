//! Temporary repositories and a runner for the `lintscope` binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// A scratch repository that is removed when dropped
pub struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::Builder::new()
            .prefix("lintscope-test")
            .tempdir()
            .expect("tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn path_str(&self) -> String {
        self.path().display().to_string()
    }

    /// Write `content` at `relative_path`, creating directories on the way
    pub fn add_file(&self, relative_path: &str, content: &str) -> &Self {
        let target = self.path().join(relative_path);
        let dir = target.parent().unwrap_or(self.path());
        fs::create_dir_all(dir).expect("create fixture dirs");
        fs::write(&target, content).expect("write fixture file");
        self
    }

    /// Invoke the binary from the repo root.
    ///
    /// `LINTSCOPE_*` overrides and `RUST_LOG` are cleared, and the config
    /// home points inside the repo so a real preferences file never leaks in.
    pub fn run_cli(&self, args: &[&str]) -> std::io::Result<Output> {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_lintscope"));
        for var in [
            "LINTSCOPE_RUNTIME",
            "LINTSCOPE_IMAGE",
            "LINTSCOPE_GRACE_PERIOD",
            "LINTSCOPE_MAX_DEPTH",
            "RUST_LOG",
        ] {
            cmd.env_remove(var);
        }
        cmd.current_dir(self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env("HOME", self.path())
            .args(args)
            .output()
    }

    /// Stdout of a run that must exit 0
    pub fn run_cli_success(&self, args: &[&str]) -> String {
        let (code, stdout, stderr) = self.run_cli_status(args);
        assert_eq!(code, Some(0), "lintscope {args:?} failed:\n{stderr}");
        stdout
    }

    pub fn run_cli_status(&self, args: &[&str]) -> (Option<i32>, String, String) {
        let out = self.run_cli(args).expect("spawn lintscope");
        let text = |bytes: &[u8]| String::from_utf8_lossy(bytes).into_owned();
        (out.status.code(), text(&out.stdout), text(&out.stderr))
    }

    // ========================================================================
    // PRE-BUILT REPO STRUCTURES
    // ========================================================================

    /// Three TypeScript files and a React manifest
    pub fn with_react_typescript(&self) -> &Self {
        self.add_file(
            "package.json",
            r#"{"name": "web", "dependencies": {"react": "^18.2.0"}, "devDependencies": {"typescript": "^5.0.0"}}"#,
        )
        .add_file("src/index.ts", "export const main = () => 1;\n")
        .add_file("src/app.ts", "export function app() {\n  return 2;\n}\n")
        .add_file("src/util.ts", "export const util = 3;\n")
    }

    /// A small Python service
    pub fn with_python_service(&self) -> &Self {
        self.add_file("requirements.txt", "flask==3.0.0\n")
            .add_file("app/main.py", "from flask import Flask\napp = Flask(__name__)\n")
            .add_file("app/util.py", "def helper():\n    return 1\n")
    }

    /// Several languages spread over nested directories
    pub fn with_multilang(&self) -> &Self {
        self.add_file("web/src/app.ts", "export const a = 1;\n")
            .add_file("api/main.go", "package main\nfunc main() {}\n")
            .add_file("core/src/lib.rs", "pub fn f() {}\n")
            .add_file("scripts/deploy.py", "print('deploy')\n")
            .add_file("scripts/build.sh", "#!/bin/sh\necho build\n")
    }
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

/// A scripted stand-in for the container engine.
///
/// `info` and `stop` succeed; `run` prints `stdout`, writes its arguments to
/// `args.txt` next to the script and exits with `exit_code`.
#[cfg(unix)]
pub struct FakeRuntime {
    dir: TempDir,
}

#[cfg(unix)]
impl FakeRuntime {
    pub fn new(stdout: &str, exit_code: i32) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(dir.path().join("output.txt"), stdout).expect("Failed to write output");

        let script = format!(
            "#!/bin/sh\n\
             here=\"$(dirname \"$0\")\"\n\
             case \"$1\" in\n\
             \x20 run)\n\
             \x20   printf '%s\\n' \"$@\" > \"$here/args.txt\"\n\
             \x20   cat \"$here/output.txt\"\n\
             \x20   exit {exit_code}\n\
             \x20   ;;\n\
             \x20 *) exit 0 ;;\n\
             esac\n"
        );
        let path = dir.path().join("fake-runtime");
        fs::write(&path, script).expect("Failed to write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("Failed to chmod script");
        Self { dir }
    }

    pub fn binary(&self) -> String {
        self.dir.path().join("fake-runtime").to_string_lossy().to_string()
    }

    /// Arguments of the last `run` invocation, one per line
    pub fn run_args(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("args.txt"))
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
