//! qconnect Command-Line Interface
//!
//! Resolve the active service plan from the environment and connect to the
//! least busy IBM Quantum backend.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{backends, connect, plan, save_account, version};

/// qconnect - plan-aware connector for IBM Quantum backends
#[derive(Parser)]
#[command(name = "qconnect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Read defaults from this file instead of searching for `.env`
    #[arg(long, global = true, value_name = "PATH")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active plan
    Plan,

    /// Connect to the least busy backend of the active plan
    Connect,

    /// List the backends visible to the active plan
    Backends {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Save the active plan's credentials as the default account
    SaveAccount {
        /// Account file (defaults to ~/.qiskit/qiskit-ibm.json)
        #[arg(long, env = "QCONNECT_ACCOUNT_FILE", value_name = "PATH")]
        store: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("QCONNECT_LOG").unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let env_file = cli.env_file.as_deref();

    // Execute command
    let result = match cli.command {
        Commands::Plan => plan::execute(env_file),
        Commands::Connect => connect::execute(env_file).await,
        Commands::Backends { format } => {
            backends::execute(env_file, format == OutputFormat::Json).await
        }
        Commands::SaveAccount { store } => save_account::execute(env_file, store).await,
        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan() {
        let cli = Cli::try_parse_from(["qconnect", "plan"]).unwrap();
        assert!(matches!(cli.command, Commands::Plan));
        assert_eq!(cli.verbose, 0);
        assert!(cli.env_file.is_none());
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["qconnect", "connect", "-vv", "--env-file", "prod.env"]).unwrap();
        assert!(matches!(cli.command, Commands::Connect));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.env_file, Some(PathBuf::from("prod.env")));
    }

    #[test]
    fn test_parse_backends_format() {
        let cli = Cli::try_parse_from(["qconnect", "backends"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Backends {
                format: OutputFormat::Table
            }
        ));

        let cli = Cli::try_parse_from(["qconnect", "backends", "--format", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Backends {
                format: OutputFormat::Json
            }
        ));
    }

    #[test]
    fn test_parse_backends_bad_format() {
        assert!(Cli::try_parse_from(["qconnect", "backends", "-f", "yaml"]).is_err());
    }

    #[test]
    fn test_parse_save_account_store() {
        let cli =
            Cli::try_parse_from(["qconnect", "save-account", "--store", "/tmp/acc.json"]).unwrap();
        match cli.command {
            Commands::SaveAccount { store } => {
                assert_eq!(store, Some(PathBuf::from("/tmp/acc.json")));
            }
            _ => panic!("expected save-account"),
        }
    }

    #[test]
    fn test_parse_requires_subcommand() {
        assert!(Cli::try_parse_from(["qconnect"]).is_err());
    }

    #[test]
    fn test_cli_debug_assert() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
