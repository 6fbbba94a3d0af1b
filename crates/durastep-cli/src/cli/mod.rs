//! CLI command definitions and dispatch for the `durastep` binary.
//!
//! Uses clap derive macros for argument parsing. The demo drives one
//! onboarding workflow under a fixed, stable workflow id so that `run`
//! after `crash` resumes instead of starting over.

pub mod workflow;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Durable execution engine demo.
#[derive(Parser)]
#[command(name = "durastep", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans via OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    /// SQLite file backing the step store.
    #[arg(long, default_value = "workflow.db", global = true)]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start or resume the onboarding demo workflow.
    Run {
        /// Workflow id; keep it stable across invocations so resume works.
        #[arg(long, default_value = "onboarding-001")]
        workflow_id: String,
    },

    /// Run the demo workflow but exit the process after step 1 commits.
    ///
    /// Run `durastep run` afterwards to watch the workflow resume from
    /// step 2 without repeating step 1.
    Crash {
        /// Workflow id; keep it stable across invocations so resume works.
        #[arg(long, default_value = "onboarding-001")]
        workflow_id: String,
    },

    /// Show the committed steps for a workflow id.
    Status {
        /// Workflow id to inspect.
        #[arg(long, default_value = "onboarding-001")]
        workflow_id: String,
    },

    /// Delete the backing database so the next run starts fresh.
    Reset,
}
