//! Plan command implementation.
//!
//! Purely local: resolves the plan and shows its credentials without
//! contacting the service.

use std::path::Path;

use anyhow::Result;
use console::style;

use qconnect_core::resolve;

use super::common::load_environment;

/// Execute the plan command.
pub fn execute(env_file: Option<&Path>) -> Result<()> {
    let env = load_environment(env_file)?;
    let (plan, credentials) = resolve(&env)?;

    println!("{} {}", style("→").cyan().bold(), style(plan.label()).bold());
    println!();
    println!("  Key:      {}", plan.key());
    println!("  Name:     {}", plan.name());
    println!("  Channel:  {}", or_unset(&credentials.channel));
    println!("  Instance: {}", or_unset(&credentials.instance));
    println!(
        "  Token:    {}",
        if credentials.token.is_empty() {
            style("not set").red().to_string()
        } else {
            style("set").green().to_string()
        }
    );

    let missing = credentials.missing_fields();
    if !missing.is_empty() {
        println!();
        println!(
            "{} Missing: {}",
            style("!").yellow().bold(),
            missing.join(", ")
        );
    }

    Ok(())
}

fn or_unset(value: &str) -> String {
    if value.is_empty() {
        style("(unset)").dim().to_string()
    } else {
        value.to_string()
    }
}
