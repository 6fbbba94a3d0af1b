//! Durastep demo CLI entry point.
//!
//! Binary name: `durastep`
//!
//! Thin I/O shell around the engine: parses CLI arguments, initializes
//! tracing, then dispatches to the workflow command handlers. The
//! interesting behavior lives in `durastep-core`; this binary exists to
//! demonstrate crash/resume against a real SQLite file.

mod cli;
mod onboarding;

use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,durastep_core=debug,durastep_infra=debug",
        _ => "trace",
    };

    durastep_observe::tracing_setup::init_with_filter(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = match cli.command {
        Commands::Run { workflow_id } => {
            cli::workflow::handle_run(&cli.db, &workflow_id, cli.json).await
        }
        Commands::Crash { workflow_id } => {
            cli::workflow::handle_crash(&cli.db, &workflow_id, cli.json).await
        }
        Commands::Status { workflow_id } => {
            cli::workflow::handle_status(&cli.db, &workflow_id, cli.json).await
        }
        Commands::Reset => cli::workflow::handle_reset(&cli.db, cli.json),
    };

    durastep_observe::tracing_setup::shutdown_tracing();
    result
}
