//! Backends command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qconnect_core::{BackendHandle, list_backends, plan_label};

use super::common::{create_provider, load_environment};

/// Execute the backends command.
pub async fn execute(env_file: Option<&Path>, json: bool) -> Result<()> {
    let env = load_environment(env_file)?;
    let provider = create_provider(None);
    let backends = list_backends(&env, &provider).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&backends)?);
        return Ok(());
    }

    let label = plan_label(&env)?;
    if backends.is_empty() {
        println!("No backends visible on the {label}.");
        return Ok(());
    }

    println!(
        "{} {} backend(s) on the {}:\n",
        style("→").cyan().bold(),
        backends.len(),
        label
    );
    print_table(&backends);

    Ok(())
}

fn print_table(backends: &[BackendHandle]) {
    println!(
        "  {:<24}  {:<8}  {:<10}  {:<8}  {}",
        style("NAME").bold(),
        style("QUBITS").bold(),
        style("VERSION").bold(),
        style("PENDING").bold(),
        style("STATUS").bold()
    );
    println!("  {}", "-".repeat(68));

    for backend in backends {
        let status = if !backend.operational {
            style("offline").red()
        } else if backend.simulator {
            style("simulator").dim()
        } else {
            style("online").green()
        };

        println!(
            "  {:<24}  {:<8}  {:<10}  {:<8}  {}",
            backend.name,
            backend
                .num_qubits
                .map_or_else(|| "n/a".to_string(), |n| n.to_string()),
            backend.version.as_deref().unwrap_or("n/a"),
            backend
                .pending_jobs
                .map_or_else(|| "n/a".to_string(), |n| n.to_string()),
            status
        );
    }
}
