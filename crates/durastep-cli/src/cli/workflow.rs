//! Workflow demo subcommand handlers.
//!
//! Provides run, crash-simulation, status, and reset operations against the
//! SQLite-backed step store.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use durastep_core::engine::WorkflowEngine;
use durastep_core::store::StepStore;
use durastep_infra::sqlite::step::SqliteStepStore;
use durastep_types::run::RunStatus;

use crate::onboarding;

fn database_url(db: &Path) -> String {
    format!("sqlite://{}", db.display())
}

async fn open_engine(db: &Path) -> Result<WorkflowEngine<SqliteStepStore>> {
    let store = SqliteStepStore::open(&database_url(db)).await?;
    Ok(WorkflowEngine::new(store))
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

pub async fn handle_run(db: &Path, workflow_id: &str, json: bool) -> Result<()> {
    let engine = open_engine(db).await?;

    if !json {
        println!();
        println!(
            "  {} Starting/Resuming workflow '{}'",
            style("*").cyan().bold(),
            style(workflow_id).cyan()
        );
        println!();
    }

    let outcome = engine.run_workflow(workflow_id, onboarding::run).await;

    if json {
        let out = serde_json::json!({
            "workflow_id": outcome.workflow_id,
            "status": outcome.status,
            "error": outcome.error,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    match outcome.status {
        RunStatus::Succeeded => {
            println!(
                "  {} Workflow '{}' completed",
                style("*").green().bold(),
                style(workflow_id).cyan()
            );
        }
        RunStatus::Failed => {
            println!(
                "  {} Workflow '{}' failed: {}",
                style("x").red().bold(),
                style(workflow_id).cyan(),
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// Crash simulation
// ---------------------------------------------------------------------------

pub async fn handle_crash(db: &Path, workflow_id: &str, json: bool) -> Result<()> {
    let engine = open_engine(db).await?;

    if !json {
        println!();
        println!(
            "  {} CRASH MODE: the process will exit after step 1 commits.",
            style("!").yellow().bold()
        );
        println!("  Run `durastep run` afterwards to resume from step 2.");
        println!();
    }

    let outcome = engine
        .run_workflow(workflow_id, |ctx| async move {
            // Only run step 1, then die. The step name matches the full
            // onboarding workflow so the next run replays it.
            let employee_id = ctx
                .step("create_record", || async {
                    println!("     -> creating employee record in HR system...");
                    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
                    anyhow::Ok(format!("EMP-{}", onboarding::unix_millis()))
                })
                .await?;
            println!("     employee id: {employee_id}");
            println!();
            println!("  {} SIMULATED CRASH -- exiting now!", style("x").red().bold());
            std::process::exit(1)
        })
        .await;

    // Only reachable if step 1 itself failed before the simulated crash.
    if json {
        let out = serde_json::json!({
            "workflow_id": outcome.workflow_id,
            "status": outcome.status,
            "error": outcome.error,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "  {} Workflow '{}' failed before the crash point: {}",
            style("x").red().bold(),
            style(workflow_id).cyan(),
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

pub async fn handle_status(db: &Path, workflow_id: &str, json: bool) -> Result<()> {
    let store = SqliteStepStore::open(&database_url(db)).await?;
    let records = store.list_steps(workflow_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!();
    if records.is_empty() {
        println!(
            "  No committed steps for workflow '{}' yet.",
            style(workflow_id).cyan()
        );
        println!();
        return Ok(());
    }

    println!(
        "  {} Committed steps for workflow '{}':",
        style("*").cyan().bold(),
        style(workflow_id).cyan()
    );
    println!();

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Step key", "Status", "Output"]);

    for (idx, record) in records.iter().enumerate() {
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(&record.step_key),
            Cell::new(record.status.as_str()).fg(Color::Green),
            Cell::new(truncate(&record.output, 48)),
        ]);
    }

    println!("{table}");
    println!();

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{head}...")
    }
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

pub fn handle_reset(db: &Path, json: bool) -> Result<()> {
    let mut removed = false;

    // WAL mode leaves sidecar files next to the main database.
    let sidecars = [
        db.to_path_buf(),
        db.with_file_name(format!(
            "{}-wal",
            db.file_name().and_then(|n| n.to_str()).unwrap_or("workflow.db")
        )),
        db.with_file_name(format!(
            "{}-shm",
            db.file_name().and_then(|n| n.to_str()).unwrap_or("workflow.db")
        )),
    ];

    for path in &sidecars {
        match std::fs::remove_file(path) {
            Ok(()) => removed = true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    if json {
        println!("{}", serde_json::json!({ "reset": removed }));
        return Ok(());
    }

    println!();
    if removed {
        println!(
            "  {} Database reset. Next run will start fresh.",
            style("*").green().bold()
        );
    } else {
        println!(
            "  {} No database found (already fresh).",
            style("!").yellow().bold()
        );
    }
    println!();

    Ok(())
}
