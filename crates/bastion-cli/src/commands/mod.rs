//! Subcommands and the helpers they share.

pub mod check;
pub mod scenarios;
pub mod show;
pub mod validate;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use bastion::prelude::*;
use bastion_observe::LoggingSubscriber;

use crate::config::CliConfig;
use crate::OutputFormat;

/// Where a scenario comes from.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ScenarioSource {
    /// Path to a scenario file (.toml or .json)
    pub scenario: Option<PathBuf>,

    /// Use a built-in scenario instead of a file
    #[arg(short, long)]
    pub builtin: Option<String>,
}

impl ScenarioSource {
    /// Read or look up the scenario.
    pub fn load(&self) -> Result<Scenario> {
        match (&self.scenario, &self.builtin) {
            (_, Some(name)) => Scenario::builtin(name)
                .with_context(|| format!("Available built-ins: {}", Scenario::builtin_names().join(", "))),
            (Some(path), None) => Scenario::from_path(path)
                .with_context(|| format!("Failed to load scenario {}", path.display())),
            (None, None) => Err(anyhow::anyhow!("No scenario given")),
        }
    }
}

/// Build a simulator from the loaded configuration.
pub fn simulator(config: &CliConfig) -> Result<Simulator> {
    Bastion::builder()
        .with_ledger_config(config.ledger.clone())
        .with_report_config(config.report.clone())
        .with_event_subscriber(Arc::new(LoggingSubscriber::new()))
        .build()
        .context("Failed to create simulator")
}

/// Print a value as JSON in the requested format.
///
/// Does nothing for [`OutputFormat::Human`].
pub fn print_json<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Human => {}
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::JsonCompact => println!("{}", serde_json::to_string(value)?),
    }
    Ok(())
}
