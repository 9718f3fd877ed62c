//! Show command - Print a scenario's ledger without evaluating it.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use bastion_core::Units;
use bastion_observe::render_matrix;

use crate::commands::{print_json, simulator, ScenarioSource};
use crate::config::CliConfig;
use crate::OutputFormat;

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: ScenarioSource,
}

/// Ledger tables.
#[derive(Debug, Serialize)]
struct LedgerView {
    scenario: String,
    totals: Vec<Units>,
    available: Vec<Units>,
    max: Vec<Vec<Units>>,
    allocation: Vec<Vec<Units>>,
    need: Vec<Vec<Units>>,
}

/// Execute the show command.
pub fn execute(args: ShowArgs, config: &CliConfig, format: OutputFormat) -> Result<()> {
    let scenario = args.source.load()?;
    let mut simulator = simulator(config)?;
    simulator
        .load_scenario(&scenario)
        .with_context(|| format!("Scenario '{}' was rejected", scenario.name))?;

    let ledger = simulator.ledger();
    let view = LedgerView {
        scenario: scenario.name.clone(),
        totals: ledger.totals().to_vec(),
        available: ledger.available_vector(),
        max: ledger.max_matrix(),
        allocation: ledger.allocation_matrix(),
        need: ledger.need_matrix(),
    };

    match format {
        OutputFormat::Human => {
            println!("Scenario: {}", view.scenario);
            println!("Resources: {:?}", view.totals);
            println!("Available: {:?}", view.available);
            for (title, matrix) in [
                ("Max", &view.max),
                ("Allocation", &view.allocation),
                ("Need", &view.need),
            ] {
                println!("\n{}:", title);
                print!("{}", render_matrix(matrix, simulator.report_config()));
            }
        }
        OutputFormat::Json | OutputFormat::JsonCompact => print_json(&view, format)?,
    }

    Ok(())
}
