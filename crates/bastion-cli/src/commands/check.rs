//! Check command - Evaluate whether a scenario is safe.

use anyhow::{Context, Result};
use clap::Args;

use crate::commands::{print_json, simulator, ScenarioSource};
use crate::config::CliConfig;
use crate::OutputFormat;

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub source: ScenarioSource,

    /// Include the step-by-step evaluation trace
    #[arg(long)]
    pub trace: bool,

    /// Reject allocations that exceed what is still available
    #[arg(long)]
    pub strict: bool,

    /// Show collected metrics
    #[arg(long)]
    pub metrics: bool,
}

/// Execute the check command.
pub fn execute(args: CheckArgs, config: &CliConfig, format: OutputFormat, quiet: bool) -> Result<()> {
    let scenario = args.source.load()?;

    let mut config = config.clone();
    config.ledger.strict_allocation |= args.strict;
    let mut simulator = simulator(&config)?;

    simulator
        .load_scenario(&scenario)
        .with_context(|| format!("Scenario '{}' was rejected", scenario.name))?;

    let report = if args.trace {
        simulator.check_safety_traced()
    } else {
        simulator.check_safety()
    }
    .context("Safety check failed")?;

    match format {
        OutputFormat::Human => {
            if !quiet {
                println!("Scenario: {}", scenario.name);
                if let Some(description) = &scenario.description {
                    println!("  {}", description);
                }
                println!();
                print!("{}", report.to_text());

                if args.metrics {
                    let metrics = simulator.metrics().snapshot();
                    println!("\nMetrics:");
                    println!("  Processes admitted: {}", metrics.ledger.processes_admitted);
                    println!("  Checks: {}", metrics.evaluation.total_checks);
                    println!("  Passes: {}", report.verdict.passes);
                    println!("  Duration: {:?}", metrics.evaluation.last_duration);
                }
            }
        }
        OutputFormat::Json | OutputFormat::JsonCompact => {
            if args.metrics {
                let output = serde_json::json!({
                    "report": report,
                    "metrics": simulator.metrics().snapshot(),
                });
                print_json(&output, format)?;
            } else {
                print_json(&report, format)?;
            }
        }
    }

    if report.is_safe() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("Scenario '{}' is not in a safe state", scenario.name))
    }
}
