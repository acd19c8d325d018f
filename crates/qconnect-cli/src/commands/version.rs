//! Version command implementation.

use console::style;

use qconnect_core::PLAN_SWITCHES;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - plan-aware connector for IBM Quantum backends",
        style("qconnect").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Plan switches:");
    for switch in PLAN_SWITCHES {
        println!("  {:<16}{}", switch.var, switch.label);
    }
}
