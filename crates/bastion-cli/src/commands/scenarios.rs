//! Scenarios command - List or export the built-in scenarios.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use bastion::Scenario;

use crate::commands::print_json;
use crate::OutputFormat;

/// Arguments for the scenarios command.
#[derive(Args)]
pub struct ScenariosArgs {
    /// Print one built-in scenario as a TOML file
    #[arg(long, value_name = "NAME")]
    pub dump: Option<String>,
}

/// Summary of a built-in scenario.
#[derive(Debug, Serialize)]
struct ScenarioSummary {
    name: String,
    description: Option<String>,
    resource_types: usize,
    processes: usize,
}

/// Execute the scenarios command.
pub fn execute(args: ScenariosArgs, format: OutputFormat) -> Result<()> {
    if let Some(name) = args.dump {
        let scenario = Scenario::builtin(&name)?;
        match format {
            OutputFormat::Human => {
                let text = scenario
                    .to_toml_string()
                    .context("Failed to serialize scenario")?;
                print!("{}", text);
            }
            OutputFormat::Json | OutputFormat::JsonCompact => print_json(&scenario, format)?,
        }
        return Ok(());
    }

    let summaries: Vec<ScenarioSummary> = Scenario::builtins()
        .into_iter()
        .map(|s| ScenarioSummary {
            resource_types: s.totals.len(),
            processes: s.processes.len(),
            name: s.name,
            description: s.description,
        })
        .collect();

    match format {
        OutputFormat::Human => {
            println!("Built-in scenarios:");
            for summary in &summaries {
                println!(
                    "  {:<10} {} resource types, {} processes",
                    summary.name, summary.resource_types, summary.processes
                );
                if let Some(description) = &summary.description {
                    println!("  {:<10} {}", "", description);
                }
            }
        }
        OutputFormat::Json | OutputFormat::JsonCompact => print_json(&summaries, format)?,
    }

    Ok(())
}
