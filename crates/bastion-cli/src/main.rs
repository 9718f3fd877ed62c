//! `bastion` - check resource-allocation scenarios for deadlock safety.
//!
//! Scenarios are TOML or JSON files (or built-ins) listing resource totals
//! and each process's maximum need and current allocation. Reports go to
//! stdout, logs to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::CliConfig;

/// Check whether processes can all finish with the resources on hand
#[derive(Parser)]
#[command(name = "bastion")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML file with [ledger] limits and [report] labels
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// How reports and listings are printed
    #[arg(short = 'f', long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Log ledger events to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print nothing; rely on the exit status
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Rendering for command output.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Tables and a SAFE/UNSAFE verdict line
    #[default]
    Human,
    /// Indented JSON
    Json,
    /// JSON on a single line, for piping
    JsonCompact,
}

/// Subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Load a scenario and check whether it is safe
    Check(commands::check::CheckArgs),
    /// Load a scenario and print its matrices
    Show(commands::show::ShowArgs),
    /// Validate a scenario, reporting every rejected process
    Validate(commands::validate::ValidateArgs),
    /// List the built-in scenarios
    Scenarios(commands::scenarios::ScenariosArgs),
}

fn log_level(verbose: u8) -> &'static str {
    ["warn", "info", "debug"]
        .get(usize::from(verbose))
        .copied()
        .unwrap_or("trace")
}

/// `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bastion={}", log_level(verbose))));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = CliConfig::load(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Check(args) => commands::check::execute(args, &config, cli.format, cli.quiet),
        Commands::Show(args) => commands::show::execute(args, &config, cli.format),
        Commands::Validate(args) => commands::validate::execute(args, &config, cli.format),
        Commands::Scenarios(args) => commands::scenarios::execute(args, cli.format),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(0), "warn");
        assert_eq!(log_level(2), "debug");
        assert_eq!(log_level(7), "trace");
    }

    #[test]
    fn test_parse_check() {
        let cli = Cli::try_parse_from([
            "bastion", "-vv", "-f", "json-compact", "check", "--builtin", "classic", "--trace",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.format, OutputFormat::JsonCompact));
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.source.builtin.as_deref(), Some("classic"));
        assert!(args.trace);
    }

    #[test]
    fn test_scenario_source_is_required_and_exclusive() {
        assert!(Cli::try_parse_from(["bastion", "show"]).is_err());
        assert!(Cli::try_parse_from(["bastion", "show", "a.toml", "--builtin", "classic"]).is_err());
        assert!(Cli::try_parse_from(["bastion", "show", "a.toml"]).is_ok());
    }
}
