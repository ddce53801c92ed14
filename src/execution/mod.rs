//! Container execution of a lint plan.
//!
//! - `runtime` - container runtime abstraction and run specifications
//! - `orchestrator` - single-flight state machine with timeout and cancel
//! - `events` - ordered progress events for subscribers
//! - `parser` - best-effort extraction of results from tool output
//! - `results` - the `LintingResults` record

pub mod events;
pub mod orchestrator;
pub mod parser;
pub mod results;
pub mod runtime;

pub use events::{EventBus, ExecutionEvent, OutputStream};
pub use orchestrator::{ExecutionState, Orchestrator, OrchestratorOptions, PLAN_DIR, PLAN_FILE};
pub use parser::{parse_output, ParsedOutput, ToolMatcher};
pub use results::{
    IssueSeverity, LinterIssue, LinterResult, LinterStatus, LintingResults, LintingSummary,
    PerformanceMetrics,
};
pub use runtime::{ContainerRuntime, DockerRuntime, RunSpec, CONTAINER_WORKSPACE, DEFAULT_IMAGE};
