//! Single-flight execution of a linting plan inside a container.
//!
//! State machine:
//!
//! ```text
//! Idle -> Preparing -> Running -> Completed | Failed | TimedOut | Cancelled
//! ```
//!
//! An [`Orchestrator`] runs at most one container at a time. A second
//! `execute` while one is in flight fails immediately with
//! [`ExecutionError::Busy`] and leaves the running call untouched.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ExecutionError;
use crate::execution::events::{EventBus, ExecutionEvent, OutputStream};
use crate::execution::parser::{parse_output, ToolMatcher};
use crate::execution::results::{LintingResults, LintingSummary, PerformanceMetrics};
use crate::execution::runtime::{ContainerRuntime, RunSpec, DEFAULT_IMAGE};
use crate::fs_utils::{normalize_path, write_atomic};
use crate::lint::{export, Configuration};
use crate::profile::LanguageProfile;

/// Directory (inside the repository) holding the exported plan
pub const PLAN_DIR: &str = ".lintscope";
pub const PLAN_FILE: &str = "lint.env";

pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Extra time allowed for the runtime's own stop command
const STOP_COMMAND_SLACK: Duration = Duration::from_secs(5);

/// Upper bound on the availability check, before the run's own budget
const AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(15);

/// Lines of stderr kept in a non-zero-exit error
const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    #[default]
    Idle,
    Preparing,
    Running,
    Completed,
    Failed,
    TimedOut,
    Cancelled,
}

impl ExecutionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionState::Idle => "idle",
            ExecutionState::Preparing => "preparing",
            ExecutionState::Running => "running",
            ExecutionState::Completed => "completed",
            ExecutionState::Failed => "failed",
            ExecutionState::TimedOut => "timed_out",
            ExecutionState::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionState::Completed
                | ExecutionState::Failed
                | ExecutionState::TimedOut
                | ExecutionState::Cancelled
        )
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorOptions {
    pub image: String,
    /// Time a stopping container gets before it is killed
    pub grace_period: Duration,
    /// Write the exported plan to `<repo>/.lintscope/lint.env`
    pub write_plan: bool,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE.to_string(),
            grace_period: DEFAULT_GRACE_PERIOD,
            write_plan: true,
        }
    }
}

type CancelSlot = Mutex<Option<watch::Sender<bool>>>;

/// Owns the busy flag and the cancel slot for one `execute` call.
///
/// Both are released however the call exits.
struct Flight<'a> {
    busy: &'a AtomicBool,
    cancel: &'a CancelSlot,
}

impl<'a> Flight<'a> {
    fn begin(busy: &'a AtomicBool, cancel: &'a CancelSlot) -> Option<(Self, watch::Receiver<bool>)> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        let (tx, rx) = watch::channel(false);
        *cancel.lock() = Some(tx);
        Some((Flight { busy, cancel }, rx))
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        *self.cancel.lock() = None;
        self.busy.store(false, Ordering::Release);
    }
}

/// Resolves once cancellation has been requested
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    let sender_gone = rx.wait_for(|requested| *requested).await.is_err();
    if sender_gone {
        std::future::pending::<()>().await;
    }
}

/// Output gathered from a container that exited on its own
struct Captured {
    stdout: String,
    output_lines: usize,
}

pub struct Orchestrator<R: ContainerRuntime> {
    runtime: R,
    options: OrchestratorOptions,
    busy: AtomicBool,
    state: Mutex<ExecutionState>,
    events: EventBus,
    cancel: CancelSlot,
}

impl<R: ContainerRuntime> Orchestrator<R> {
    pub fn new(runtime: R) -> Self {
        Self::with_options(runtime, OrchestratorOptions::default())
    }

    pub fn with_options(runtime: R, options: OrchestratorOptions) -> Self {
        Self {
            runtime,
            options,
            busy: AtomicBool::new(false),
            state: Mutex::new(ExecutionState::Idle),
            events: EventBus::new(),
            cancel: Mutex::new(None),
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// State of the current or most recent execution
    pub fn state(&self) -> ExecutionState {
        *self.state.lock()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Receive every event emitted from now on, in order
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ExecutionEvent> {
        self.events.subscribe()
    }

    /// Ask the in-flight execution to stop. Returns false when idle.
    pub fn cancel(&self) -> bool {
        match self.cancel.lock().as_ref() {
            Some(tx) => tx.send(true).is_ok(),
            None => false,
        }
    }

    /// Run `config` against the repository at `repo`.
    ///
    /// `profile` is only copied into the results.
    pub async fn execute(
        &self,
        config: &Configuration,
        repo: &Path,
        profile: Option<&LanguageProfile>,
    ) -> Result<LintingResults, ExecutionError> {
        let (_flight, mut cancel_rx) =
            Flight::begin(&self.busy, &self.cancel).ok_or(ExecutionError::Busy)?;

        let execution_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        let budget = Duration::from_secs(config.performance.max_execution_time);
        let deadline = tokio::time::Instant::now() + budget;

        let check = tokio::time::timeout(
            AVAILABILITY_TIMEOUT.min(budget),
            self.runtime.is_available(),
        );
        let available = tokio::select! {
            checked = check => checked.unwrap_or_else(|_| {
                warn!("{} did not answer in time", self.runtime.name());
                false
            }),
            _ = cancelled(&mut cancel_rx) => {
                self.transition(&execution_id, ExecutionState::Cancelled);
                return Err(ExecutionError::Cancelled);
            }
        };
        if !available {
            return Err(ExecutionError::RuntimeUnavailable {
                runtime: self.runtime.name().to_string(),
            });
        }

        let outcome = self
            .drive(&execution_id, config, repo, deadline, &mut cancel_rx)
            .await;
        *self.cancel.lock() = None;

        let final_state = match &outcome {
            Ok(_) => ExecutionState::Completed,
            Err(ExecutionError::TimedOut { .. }) => ExecutionState::TimedOut,
            Err(ExecutionError::Cancelled) => ExecutionState::Cancelled,
            Err(_) => ExecutionState::Failed,
        };
        self.transition(&execution_id, final_state);
        let captured = outcome?;

        let parsed = parse_output(&captured.stdout);
        for warning in &parsed.warnings {
            warn!("{}", warning);
        }
        let duration_ms = started.elapsed().as_millis() as u64;
        let summary = LintingSummary::from_linters(&parsed.linters);

        Ok(LintingResults {
            execution_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
            duration_ms,
            profile: profile.cloned(),
            configuration: config.clone(),
            performance: PerformanceMetrics {
                duration_ms,
                time_budget_secs: config.performance.max_execution_time,
                parallelism: config.performance.parallelism,
                linters_executed: parsed.linters.len(),
                output_lines: captured.output_lines,
            },
            linters: parsed.linters,
            summary,
            warnings: parsed.warnings,
        })
    }

    fn transition(&self, execution_id: &str, state: ExecutionState) {
        *self.state.lock() = state;
        info!("Execution {} -> {}", execution_id, state.as_str());
        self.events
            .emit(ExecutionEvent::state_changed(execution_id, state));
    }

    async fn drive(
        &self,
        execution_id: &str,
        config: &Configuration,
        repo: &Path,
        deadline: tokio::time::Instant,
        cancel_rx: &mut watch::Receiver<bool>,
    ) -> Result<Captured, ExecutionError> {
        self.transition(execution_id, ExecutionState::Preparing);

        let repo = prepare_repo(repo)?;
        if self.options.write_plan {
            let plan_path = repo.join(PLAN_DIR).join(PLAN_FILE);
            write_atomic(&plan_path, &export::export(config)).map_err(|source| {
                ExecutionError::Prepare {
                    path: plan_path.clone(),
                    source,
                }
            })?;
            debug!("Wrote plan to {}", plan_path.display());
        }

        let container_name = format!("lintscope-{}", execution_id);
        let spec =
            RunSpec::from_configuration(config, &repo, &self.options.image, &container_name);
        let mut cmd = self.runtime.run_command(&spec);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if *cancel_rx.borrow() {
            return Err(ExecutionError::Cancelled);
        }

        let mut child = cmd.spawn().map_err(|source| ExecutionError::Spawn {
            program: self.runtime.name().to_string(),
            source,
        })?;
        self.transition(execution_id, ExecutionState::Running);

        let (line_tx, mut line_rx) = mpsc::unbounded_channel();
        if let Some(stdout) = child.stdout.take() {
            spawn_reader(stdout, OutputStream::Stdout, line_tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_reader(stderr, OutputStream::Stderr, line_tx.clone());
        }
        drop(line_tx);

        let budget = Duration::from_secs(config.performance.max_execution_time);
        let deadline = tokio::time::sleep_until(deadline);
        tokio::pin!(deadline);

        let matcher = ToolMatcher::new(&config.linters.enabled_names());
        let mut current_tool: Option<String> = None;
        let mut stdout_buf = String::new();
        let mut stderr_buf = String::new();
        let mut output_lines = 0usize;
        let mut exit_status = None;
        let mut pipes_open = true;
        let mut cancel_open = true;

        let status = loop {
            if let (Some(status), false) = (exit_status, pipes_open) {
                break status;
            }
            tokio::select! {
                line = line_rx.recv(), if pipes_open => match line {
                    Some((stream, line)) => {
                        output_lines += 1;
                        if let Some(tool) = matcher.detect(&line) {
                            if current_tool.as_deref() != Some(tool.as_str()) {
                                self.events.emit(ExecutionEvent::tool_started(execution_id, &tool));
                                current_tool = Some(tool);
                            }
                        }
                        self.events.emit(ExecutionEvent::output(execution_id, stream, &line));
                        let buf = match stream {
                            OutputStream::Stdout => &mut stdout_buf,
                            OutputStream::Stderr => &mut stderr_buf,
                        };
                        buf.push_str(&line);
                        buf.push('\n');
                    }
                    None => pipes_open = false,
                },
                status = child.wait(), if exit_status.is_none() => {
                    let status = status.map_err(|source| ExecutionError::Spawn {
                        program: self.runtime.name().to_string(),
                        source,
                    })?;
                    exit_status = Some(status);
                }
                _ = &mut deadline => {
                    warn!("Execution {} exceeded {}s, terminating", execution_id, budget.as_secs());
                    self.terminate(&mut child, &container_name).await;
                    return Err(ExecutionError::TimedOut { after_secs: budget.as_secs() });
                }
                changed = cancel_rx.changed(), if cancel_open => {
                    if changed.is_err() {
                        cancel_open = false;
                    } else if *cancel_rx.borrow() {
                        warn!("Execution {} cancelled, terminating", execution_id);
                        self.terminate(&mut child, &container_name).await;
                        return Err(ExecutionError::Cancelled);
                    }
                }
            }
        };

        if !status.success() {
            return Err(ExecutionError::NonZeroExit {
                code: status.code(),
                stderr: tail_lines(&stderr_buf, STDERR_TAIL_LINES),
            });
        }

        Ok(Captured {
            stdout: stdout_buf,
            output_lines,
        })
    }

    /// Graceful stop through the runtime, then kill the child
    async fn terminate(&self, child: &mut Child, container_name: &str) {
        let grace = self.options.grace_period;

        match self.runtime.stop_command(container_name, grace) {
            Some(mut stop) => {
                match tokio::time::timeout(grace + STOP_COMMAND_SLACK, stop.status()).await {
                    Ok(Ok(status)) if status.success() => debug!("Stopped {}", container_name),
                    Ok(Ok(status)) => debug!("Stop of {} exited with {}", container_name, status),
                    Ok(Err(e)) => debug!("Stop of {} failed: {}", container_name, e),
                    Err(_) => debug!("Stop of {} did not finish in time", container_name),
                }
            }
            None => {
                if self.runtime.interrupt(child) {
                    debug!("Sent termination signal to {}", container_name);
                }
            }
        }

        if tokio::time::timeout(grace, child.wait()).await.is_err() {
            if let Err(e) = child.kill().await {
                warn!("Failed to kill container process: {}", e);
            }
        }
    }
}

fn prepare_repo(repo: &Path) -> Result<PathBuf, ExecutionError> {
    repo.canonicalize()
        .map(|p| normalize_path(&p))
        .map_err(|source| ExecutionError::Prepare {
            path: repo.to_path_buf(),
            source,
        })
}

fn spawn_reader<T>(pipe: T, stream: OutputStream, tx: mpsc::UnboundedSender<(OutputStream, String)>)
where
    T: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send((stream, line)).is_err() {
                break;
            }
        }
    });
}

fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::process::Command;

    use crate::lint::registry::find;

    struct ScriptRuntime {
        script: String,
        available: bool,
        check_delay: Duration,
    }

    impl ScriptRuntime {
        fn new(script: &str) -> Self {
            Self {
                script: script.to_string(),
                available: true,
                check_delay: Duration::ZERO,
            }
        }
    }

    impl ContainerRuntime for ScriptRuntime {
        fn name(&self) -> &str {
            "script"
        }

        async fn is_available(&self) -> bool {
            tokio::time::sleep(self.check_delay).await;
            self.available
        }

        fn run_command(&self, _spec: &RunSpec) -> Command {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&self.script);
            cmd
        }

        fn stop_command(&self, _container_name: &str, _grace: Duration) -> Option<Command> {
            None
        }
    }

    fn orchestrator(script: &str) -> Orchestrator<ScriptRuntime> {
        Orchestrator::with_options(
            ScriptRuntime::new(script),
            OrchestratorOptions {
                grace_period: Duration::from_millis(200),
                ..Default::default()
            },
        )
    }

    fn config(max_secs: u64) -> Configuration {
        let mut config = Configuration::default();
        config.linters.enabled = vec![
            find("eslint").unwrap().instantiate(None),
            find("prettier").unwrap().instantiate(None),
        ];
        config.performance.max_execution_time = max_secs;
        config
    }

    async fn wait_for(rx: &mut mpsc::UnboundedReceiver<ExecutionEvent>, wanted: ExecutionState) {
        while let Some(event) = rx.recv().await {
            if let ExecutionEvent::StateChanged { state, .. } = event {
                if state == wanted {
                    return;
                }
            }
        }
        panic!("event stream closed before {:?}", wanted);
    }

    const LOG: &str = r#"printf '%s\n' \
        '❌ Linted [TYPESCRIPT] files with [eslint]: Found 2 error(s) - (1.00s)' \
        'src/a.ts:1:1: error bad thing (no-undef)' \
        '✅ Linted [TYPESCRIPT] files with [prettier] successfully - (0.50s)'"#;

    #[tokio::test]
    async fn test_successful_run() {
        let repo = TempDir::new().unwrap();
        let orch = orchestrator(LOG);
        let mut rx = orch.subscribe();

        let results = orch.execute(&config(60), repo.path(), None).await.unwrap();

        assert_eq!(orch.state(), ExecutionState::Completed);
        assert!(orch.state().is_terminal());
        assert!(!orch.is_busy());
        assert_eq!(results.linters.len(), 2);
        assert_eq!(results.summary.total_issues, 2);
        assert!(results.has_issues());
        assert!(results.warnings.is_empty());
        assert_eq!(results.performance.output_lines, 3);

        let plan = std::fs::read_to_string(repo.path().join(PLAN_DIR).join(PLAN_FILE)).unwrap();
        assert!(plan.contains("ENABLE_LINTERS=eslint,prettier"));

        let mut states = Vec::new();
        let mut tools = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                ExecutionEvent::StateChanged { state, .. } => states.push(state),
                ExecutionEvent::ToolStarted { linter, .. } => tools.push(linter),
                ExecutionEvent::Output { .. } => {}
            }
        }
        assert_eq!(
            states,
            vec![
                ExecutionState::Preparing,
                ExecutionState::Running,
                ExecutionState::Completed
            ]
        );
        assert_eq!(tools, vec!["eslint", "prettier"]);
    }

    #[tokio::test]
    async fn test_unavailable_runtime_spawns_nothing() {
        let repo = TempDir::new().unwrap();
        let marker = repo.path().join("spawned");
        let mut runtime = ScriptRuntime::new(&format!("touch {}", marker.display()));
        runtime.available = false;
        let orch = Orchestrator::new(runtime);

        let err = orch.execute(&config(60), repo.path(), None).await.unwrap_err();

        assert!(matches!(err, ExecutionError::RuntimeUnavailable { .. }));
        assert!(!marker.exists());
        assert_eq!(orch.state(), ExecutionState::Idle);
        assert!(!orch.is_busy());
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_fatal_with_stderr() {
        let repo = TempDir::new().unwrap();
        let orch = orchestrator("echo 'image pull failed' >&2; exit 3");

        let err = orch.execute(&config(60), repo.path(), None).await.unwrap_err();

        match err {
            ExecutionError::NonZeroExit { code, stderr } => {
                assert_eq!(code, Some(3));
                assert!(stderr.contains("image pull failed"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(orch.state(), ExecutionState::Failed);
        assert!(!orch.is_busy());
    }

    #[tokio::test]
    async fn test_timeout_terminates() {
        let repo = TempDir::new().unwrap();
        let orch = orchestrator("sleep 30");
        let started = Instant::now();

        let err = orch.execute(&config(1), repo.path(), None).await.unwrap_err();

        assert!(matches!(err, ExecutionError::TimedOut { after_secs: 1 }));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(orch.state(), ExecutionState::TimedOut);
    }

    #[tokio::test]
    async fn test_cancel_resolves_to_cancelled() {
        let repo = TempDir::new().unwrap();
        let orch = Arc::new(orchestrator("sleep 30"));
        let mut rx = orch.subscribe();
        assert!(!orch.cancel());

        let handle = {
            let orch = Arc::clone(&orch);
            let path = repo.path().to_path_buf();
            tokio::spawn(async move { orch.execute(&config(60), &path, None).await })
        };

        wait_for(&mut rx, ExecutionState::Running).await;
        assert!(orch.cancel());

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, ExecutionError::Cancelled));
        assert_eq!(orch.state(), ExecutionState::Cancelled);
        assert!(!orch.is_busy());
    }

    #[tokio::test]
    async fn test_cancel_during_availability_check() {
        let repo = TempDir::new().unwrap();
        let marker = repo.path().join("spawned");
        let mut runtime = ScriptRuntime::new(&format!("touch {}", marker.display()));
        runtime.check_delay = Duration::from_millis(500);
        let orch = Arc::new(Orchestrator::new(runtime));

        let handle = {
            let orch = Arc::clone(&orch);
            let path = repo.path().to_path_buf();
            tokio::spawn(async move { orch.execute(&config(60), &path, None).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(orch.cancel());

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, ExecutionError::Cancelled));
        assert_eq!(orch.state(), ExecutionState::Cancelled);
        assert!(!marker.exists());
        assert!(!orch.is_busy());
        assert!(!orch.cancel());
    }

    #[tokio::test]
    async fn test_slow_availability_check_is_bounded_by_budget() {
        let repo = TempDir::new().unwrap();
        let mut runtime = ScriptRuntime::new(LOG);
        runtime.check_delay = Duration::from_secs(5);
        let orch = Orchestrator::new(runtime);
        let started = Instant::now();

        let err = orch.execute(&config(1), repo.path(), None).await.unwrap_err();

        assert!(matches!(err, ExecutionError::RuntimeUnavailable { .. }));
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(!orch.is_busy());
    }

    #[tokio::test]
    async fn test_cancel_sends_termination_signal_first() {
        let repo = TempDir::new().unwrap();
        let marker = repo.path().join("terminated");
        let script = format!(
            "trap 'touch {}; exit 0' TERM; while :; do sleep 0.1; done",
            marker.display()
        );
        let orch = Arc::new(Orchestrator::with_options(
            ScriptRuntime::new(&script),
            OrchestratorOptions {
                grace_period: Duration::from_secs(5),
                ..Default::default()
            },
        ));
        let mut rx = orch.subscribe();

        let handle = {
            let orch = Arc::clone(&orch);
            let path = repo.path().to_path_buf();
            tokio::spawn(async move { orch.execute(&config(60), &path, None).await })
        };
        wait_for(&mut rx, ExecutionState::Running).await;
        tokio::time::sleep(Duration::from_millis(200)).await;
        let started = Instant::now();
        assert!(orch.cancel());

        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, ExecutionError::Cancelled));
        // exited on the signal, well inside the grace period
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(marker.exists());
    }

    #[tokio::test]
    async fn test_second_execute_is_rejected_while_busy() {
        let repo = TempDir::new().unwrap();
        let orch = Arc::new(orchestrator(&format!("sleep 1; {LOG}")));
        let mut rx = orch.subscribe();

        let first = {
            let orch = Arc::clone(&orch);
            let path = repo.path().to_path_buf();
            tokio::spawn(async move { orch.execute(&config(60), &path, None).await })
        };
        wait_for(&mut rx, ExecutionState::Running).await;

        let second = orch.execute(&config(60), repo.path(), None).await;
        assert!(matches!(second, Err(ExecutionError::Busy)));

        let first = first.await.unwrap().unwrap();
        assert_eq!(first.linters.len(), 2);

        // The flag is released for the next call
        assert!(orch.execute(&config(60), repo.path(), None).await.is_ok());
    }

    #[test]
    fn test_tail_lines() {
        assert_eq!(tail_lines("a\nb\nc\n", 2), "b\nc");
        assert_eq!(tail_lines("only", 5), "only");
        assert_eq!(tail_lines("", 5), "");
    }
}
