//! Validate command - Report every problem in a scenario.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::commands::{print_json, simulator, ScenarioSource};
use crate::config::CliConfig;
use crate::OutputFormat;

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: ScenarioSource,

    /// Reject allocations that exceed what is still available
    #[arg(long)]
    pub strict: bool,
}

/// A process the ledger refused.
#[derive(Debug, Serialize)]
struct Rejection {
    index: usize,
    error: String,
}

/// Validation result.
#[derive(Debug, Serialize)]
struct ValidationResult {
    valid: bool,
    scenario: String,
    resource_types: usize,
    processes: usize,
    admitted: usize,
    rejected: Vec<Rejection>,
    errors: Vec<String>,
}

/// Execute the validate command.
pub fn execute(args: ValidateArgs, config: &CliConfig, format: OutputFormat) -> Result<()> {
    let scenario = args.source.load()?;

    let mut config = config.clone();
    config.ledger.strict_allocation |= args.strict;
    let mut simulator = simulator(&config)?;

    let mut result = ValidationResult {
        valid: true,
        scenario: scenario.name.clone(),
        resource_types: scenario.totals.len(),
        processes: scenario.processes.len(),
        admitted: 0,
        rejected: Vec::new(),
        errors: Vec::new(),
    };

    match scenario.apply_lenient(&mut simulator) {
        Ok(rejected) => {
            result.admitted = simulator.ledger().process_count();
            result.rejected = rejected
                .into_iter()
                .map(|r| Rejection {
                    index: r.index,
                    error: r.error.to_string(),
                })
                .collect();

            // Over-allocation is only visible once everything is admitted
            if let Err(e) = simulator.snapshot() {
                result.errors.push(e.to_string());
            }
        }
        Err(e) => result.errors.push(e.to_string()),
    }
    result.valid = result.rejected.is_empty() && result.errors.is_empty();

    match format {
        OutputFormat::Human => {
            if result.valid {
                println!("Scenario is valid: {}", result.scenario);
                println!("  Resource types: {}", result.resource_types);
                println!("  Processes: {}", result.processes);
            } else {
                println!("Scenario is INVALID: {}", result.scenario);
                println!("  Admitted: {} of {}", result.admitted, result.processes);
                for rejection in &result.rejected {
                    println!("  Process #{}: {}", rejection.index, rejection.error);
                }
                for error in &result.errors {
                    println!("  Error: {}", error);
                }
            }
        }
        OutputFormat::Json | OutputFormat::JsonCompact => print_json(&result, format)?,
    }

    if result.valid {
        Ok(())
    } else {
        Err(anyhow::anyhow!("Validation failed"))
    }
}
