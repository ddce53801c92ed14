//! Container runtime abstraction.
//!
//! The orchestrator only needs to know whether a runtime is reachable and
//! how to build the run and stop commands; [`DockerRuntime`] covers docker
//! and CLI-compatible runtimes such as podman.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::debug;

use crate::lint::{env_pairs, memory::runtime_memory_flag, Configuration};

/// Where the repository is mounted inside the container
pub const CONTAINER_WORKSPACE: &str = "/tmp/lint";

/// Default linting image
pub const DEFAULT_IMAGE: &str = "oxsecurity/megalinter:v8";

/// Resource-bounded description of one container run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSpec {
    pub image: String,
    pub container_name: String,
    /// Host path mounted read-write at [`CONTAINER_WORKSPACE`]
    pub repo_path: PathBuf,
    /// Runtime-style memory limit, e.g. "2048m"
    pub memory: Option<String>,
    pub cpus: u32,
    pub env: BTreeMap<String, String>,
}

impl RunSpec {
    pub fn from_configuration(
        config: &Configuration,
        repo_path: &Path,
        image: &str,
        container_name: &str,
    ) -> Self {
        let mut env: BTreeMap<String, String> = env_pairs(config)
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        env.insert(
            "DEFAULT_WORKSPACE".to_string(),
            CONTAINER_WORKSPACE.to_string(),
        );

        Self {
            image: image.to_string(),
            container_name: container_name.to_string(),
            repo_path: repo_path.to_path_buf(),
            memory: runtime_memory_flag(&config.performance.resource_limits.max_memory),
            cpus: config.performance.resource_limits.max_cpus.max(1),
            env,
        }
    }
}

/// A container engine the orchestrator can drive
pub trait ContainerRuntime: Send + Sync {
    /// Name used in errors and logs
    fn name(&self) -> &str;

    /// Whether the runtime is installed and its daemon answers.
    ///
    /// Callers bound this with a timeout and treat expiry as unavailable.
    fn is_available(&self) -> impl Future<Output = bool> + Send;

    /// Command that runs `spec` in the foreground
    fn run_command(&self, spec: &RunSpec) -> Command;

    /// Command that stops a running container, giving it `grace` to exit
    fn stop_command(&self, container_name: &str, grace: Duration) -> Option<Command>;

    /// Politely ask the foreground run process to exit.
    ///
    /// Used when there is no stop command. Returns false if nothing was sent.
    fn interrupt(&self, child: &Child) -> bool {
        send_terminate(child)
    }
}

/// SIGTERM to `child`
#[cfg(unix)]
pub fn send_terminate(child: &Child) -> bool {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let Some(pid) = child.id().and_then(|id| i32::try_from(id).ok()) else {
        return false;
    };
    match kill(Pid::from_raw(pid), Signal::SIGTERM) {
        Ok(()) => true,
        Err(e) => {
            debug!("SIGTERM to {} failed: {}", pid, e);
            false
        }
    }
}

#[cfg(not(unix))]
pub fn send_terminate(_child: &Child) -> bool {
    false
}

/// Docker-compatible CLI runtime
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    binary: String,
}

impl Default for DockerRuntime {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl DockerRuntime {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Arguments for `<binary> run ...`
    pub fn run_args(&self, spec: &RunSpec) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "--rm".to_string(),
            "--name".to_string(),
            spec.container_name.clone(),
            "-v".to_string(),
            format!("{}:{}:rw", spec.repo_path.display(), CONTAINER_WORKSPACE),
            "-w".to_string(),
            CONTAINER_WORKSPACE.to_string(),
        ];
        if let Some(memory) = &spec.memory {
            args.push("--memory".to_string());
            args.push(memory.clone());
        }
        args.push("--cpus".to_string());
        args.push(spec.cpus.to_string());
        for (key, value) in &spec.env {
            args.push("-e".to_string());
            args.push(format!("{key}={value}"));
        }
        args.push(spec.image.clone());
        args
    }
}

impl ContainerRuntime for DockerRuntime {
    fn name(&self) -> &str {
        &self.binary
    }

    async fn is_available(&self) -> bool {
        if which::which(&self.binary).is_err() {
            debug!("{} not found on PATH", self.binary);
            return false;
        }
        let mut info = Command::new(&self.binary);
        info.arg("info")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        match info.status().await {
            Ok(status) => status.success(),
            Err(e) => {
                debug!("{} info failed: {}", self.binary, e);
                false
            }
        }
    }

    fn run_command(&self, spec: &RunSpec) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(self.run_args(spec));
        cmd
    }

    fn stop_command(&self, container_name: &str, grace: Duration) -> Option<Command> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("stop")
            .arg("--time")
            .arg(grace.as_secs().to_string())
            .arg(container_name)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        Some(cmd)
    }
}
