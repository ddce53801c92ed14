//! Run command handler - Execute the plan in a container

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::commands::plan::build_plan;
use crate::commands::{banner, render_structured, section, CommandContext};
use crate::config::EngineSettings;
use crate::error::Result;
use crate::execution::{ExecutionEvent, LinterStatus, LintingResults, Orchestrator};

/// Rendered results plus whether any issue was found
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub output: String,
    pub has_issues: bool,
}

/// Run the run command
pub async fn run_run(
    args: &RunArgs,
    settings: &EngineSettings,
    ctx: &CommandContext,
) -> Result<RunOutcome> {
    let (profile, _prefs, mut config) =
        build_plan(&args.path, args.prefs.as_deref(), args.profile, settings)?;
    if let Some(timeout) = args.timeout {
        config.performance.max_execution_time = timeout.as_secs().max(1);
    }

    let orchestrator = Arc::new(Orchestrator::with_options(
        settings.container_runtime(),
        settings.orchestrator_options(),
    ));

    let interrupt = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if orchestrator.cancel() {
                    warn!("Interrupted, cancelling execution");
                } else {
                    warn!("Interrupted before execution started");
                }
            }
        })
    };

    let mut events = args.events.then(|| orchestrator.subscribe());
    let result = {
        let execution = orchestrator.execute(&config, &args.path, Some(&profile));
        tokio::pin!(execution);
        loop {
            tokio::select! {
                result = &mut execution => break result,
                Some(event) = next_event(&mut events) => print_event(&event),
            }
        }
    };
    if let Some(rx) = events.as_mut() {
        while let Ok(event) = rx.try_recv() {
            print_event(&event);
        }
    }
    interrupt.abort();

    let results = result?;
    info!(
        "Execution {} finished: {} issues across {} linters",
        results.execution_id, results.summary.total_issues, results.summary.total_linters
    );

    let has_issues = results.has_issues();
    let value = serde_json::to_value(&results)?;
    let output = match render_structured(&value, ctx)? {
        Some(output) => output,
        None => format_results_text(&results, ctx.verbose),
    };
    Ok(RunOutcome { output, has_issues })
}

async fn next_event(rx: &mut Option<UnboundedReceiver<ExecutionEvent>>) -> Option<ExecutionEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn print_event(event: &ExecutionEvent) {
    eprintln!("{}", event.to_json_line());
}

/// Human-readable results report
pub fn format_results_text(results: &LintingResults, verbose: bool) -> String {
    let status = if results.has_issues() { "issues" } else { "clean" };
    let mut output = banner(&format!("LINT RUN: {}", status.to_uppercase()));
    output.push_str(&format!("execution: {}\n", results.execution_id));

    let summary = &results.summary;
    output.push_str(&format!(
        "linters: {} (passed {}, failed {}) | files: {} | issues: {} | fixable: {} | duration: {}ms\n",
        summary.total_linters,
        summary.passed_linters,
        summary.failed_linters,
        summary.files_analyzed,
        summary.total_issues,
        summary.fixable_issues,
        results.duration_ms
    ));

    if !summary.by_severity.is_empty() {
        let parts: Vec<String> = summary
            .by_severity
            .iter()
            .rev()
            .map(|(sev, count)| format!("{}: {}", sev.as_str(), count))
            .collect();
        output.push_str(&format!("severity: {}\n", parts.join(" | ")));
    }

    if !results.linters.is_empty() {
        output.push_str("\nlinters:\n");
        for linter in &results.linters {
            let icon = match linter.status {
                LinterStatus::Success => "✓",
                LinterStatus::Failed => "✗",
            };
            let elapsed = linter
                .duration_ms
                .map(|ms| format!(", {}ms", ms))
                .unwrap_or_default();
            output.push_str(&format!(
                "  {} {} ({} files, E:{} W:{}{})\n",
                icon, linter.name, linter.files_linted, linter.errors, linter.warnings, elapsed
            ));
        }
    }

    let issues: Vec<_> = results
        .linters
        .iter()
        .flat_map(|l| l.issues.iter().map(move |i| (l.name.as_str(), i)))
        .collect();
    if verbose && !issues.is_empty() {
        output.push_str(&section("ISSUES"));
        let mut current_file = "";
        for (linter, issue) in issues {
            if issue.file != current_file {
                current_file = &issue.file;
                output.push_str(&format!("\n[{}]\n", current_file));
            }
            let location = match (issue.line, issue.column) {
                (Some(line), Some(col)) => format!("{}:{}", line, col),
                (Some(line), None) => line.to_string(),
                _ => "-".to_string(),
            };
            output.push_str(&format!(
                "  {} {} [{}{}] {}\n",
                location,
                issue.severity.as_str(),
                linter,
                issue
                    .rule
                    .as_ref()
                    .map(|r| format!("/{}", r))
                    .unwrap_or_default(),
                issue.message
            ));
        }
    }

    for warning in &results.warnings {
        output.push_str(&format!("\n⚠ {}\n", warning));
    }
    output
}
