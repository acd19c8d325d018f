//! Save-account command implementation.

use std::path::{Path, PathBuf};

use anyhow::Result;
use console::style;

use qconnect_core::{SaveOutcome, save_account};

use super::common::{create_provider, load_environment};

/// Execute the save-account command.
///
/// Incomplete credentials are reported, not treated as an error.
pub async fn execute(env_file: Option<&Path>, store: Option<PathBuf>) -> Result<()> {
    let env = load_environment(env_file)?;
    let provider = create_provider(store);

    match save_account(&env, &provider).await? {
        SaveOutcome::Saved { name } => {
            println!(
                "{} Saved account '{}' as default",
                style("✓").green().bold(),
                name
            );
        }
        SaveOutcome::Skipped { missing } => {
            println!(
                "{} Account not saved, missing: {}",
                style("!").yellow().bold(),
                missing.join(", ")
            );
        }
    }

    Ok(())
}
