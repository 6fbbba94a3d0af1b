//! Example employee onboarding workflow.
//!
//! Four steps: create the employee record, provision a laptop and system
//! access in parallel, then send the welcome email. Each step is durable;
//! killing the process between steps and re-running under the same workflow
//! id resumes from the first incomplete step without repeating side effects
//! (no duplicate record, no second welcome email).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use durastep_core::context::DurableContext;
use durastep_core::store::StepStore;

/// Run the onboarding workflow under the given context.
pub async fn run<S: StepStore>(ctx: DurableContext<S>) -> anyhow::Result<()> {
    // Step 1: create the employee record (sequential).
    let employee_id = ctx
        .step("create_record", || async {
            println!("     -> creating employee record in HR system...");
            tokio::time::sleep(Duration::from_millis(500)).await;
            anyhow::Ok(format!("EMP-{}", unix_millis()))
        })
        .await?;
    println!("     employee id: {employee_id}");

    // Steps 2 & 3: provision laptop and access in parallel. try_join! polls
    // in source order and the step key is claimed before the first await,
    // so key assignment stays deterministic across resumes. Spawned tasks
    // would not have that property.
    let laptop_owner = employee_id.clone();
    let access_owner = employee_id.clone();
    let (laptop, access) = tokio::try_join!(
        ctx.step("provision_laptop", || async move {
            println!("     -> provisioning laptop...");
            tokio::time::sleep(Duration::from_millis(1000)).await;
            anyhow::Ok(format!("LAPTOP-{laptop_owner}"))
        }),
        ctx.step("provision_access", || async move {
            println!("     -> provisioning system access...");
            tokio::time::sleep(Duration::from_millis(800)).await;
            anyhow::Ok(format!("ACCESS-GRANTED-{access_owner}"))
        }),
    )?;
    println!("     laptop: {laptop}");
    println!("     access: {access}");

    // Step 4: send the welcome email (sequential).
    let email_sent = ctx
        .step("send_welcome_email", || async {
            println!("     -> sending welcome email to new employee...");
            tokio::time::sleep(Duration::from_millis(300)).await;
            anyhow::Ok(true)
        })
        .await?;
    println!("     welcome email sent: {email_sent}");

    Ok(())
}

/// Milliseconds since the Unix epoch; seeds the demo employee id.
pub fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}
