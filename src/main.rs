//! lintscope CLI entry point

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use lintscope::cli::{Cli, Commands};
use lintscope::commands::{run_plan, run_profile, run_run, CommandContext};
use lintscope::config::EngineSettings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok((output, code)) => {
            print!("{}", output);
            code
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides the verbosity flag
fn init_tracing(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lintscope={}", level)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> lintscope::Result<(String, ExitCode)> {
    let settings = EngineSettings::from_cli(&cli);
    let ctx = CommandContext::from_cli(cli.format, cli.verbose);

    match &cli.command {
        Commands::Profile(args) => Ok((run_profile(args, &settings, &ctx)?, ExitCode::SUCCESS)),
        Commands::Plan(args) => Ok((run_plan(args, &settings, &ctx)?, ExitCode::SUCCESS)),
        Commands::Run(args) => {
            let outcome = run_run(args, &settings, &ctx).await?;
            let code = if outcome.has_issues {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
            Ok((outcome.output, code))
        }
    }
}
