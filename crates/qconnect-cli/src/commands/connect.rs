//! Connect command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use qconnect_core::{connect, plan_label};

use super::common::{create_provider, load_environment};

/// Execute the connect command.
pub async fn execute(env_file: Option<&Path>) -> Result<()> {
    let env = load_environment(env_file)?;
    let label = plan_label(&env)?;
    let provider = create_provider(None);

    println!("{} Connecting on the {}...", style("→").cyan().bold(), label);
    let backend = connect(&env, &provider).await?;

    println!(
        "{} Least busy QPU: {}",
        style("✓").green().bold(),
        style(backend.summary()).bold()
    );
    if let Some(pending) = backend.pending_jobs {
        println!("  Pending jobs: {pending}");
    }

    Ok(())
}
