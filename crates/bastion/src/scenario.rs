//! Scenario files and built-in scenarios.
//!
//! A scenario is a complete ledger description: resource totals followed by
//! processes in admission order. Scenarios are read from TOML or JSON:
//!
//! ```toml
//! name = "classic"
//! totals = [10, 5, 7]
//!
//! [[processes]]
//! max = [7, 5, 3]
//! allocation = [0, 1, 0]
//!
//! [[processes]]
//! max = [3, 2, 2]
//! allocation = [2, 0, 0]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use bastion_core::{LedgerError, ProcessId, ResourceLedger, Units};

use crate::simulator::Simulator;
use crate::BastionResult;

/// Errors reading a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The file could not be read.
    #[error("Failed to read scenario {path}: {source}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The TOML was malformed.
    #[error("Invalid TOML scenario: {0}")]
    Toml(#[from] toml::de::Error),

    /// The JSON was malformed.
    #[error("Invalid JSON scenario: {0}")]
    Json(#[from] serde_json::Error),

    /// No built-in scenario with this name.
    #[error("Unknown built-in scenario: {0}")]
    UnknownBuiltin(String),
}

/// One process in a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessSpec {
    /// Maximum need per resource type.
    pub max: Vec<Units>,
    /// Current allocation per resource type.
    pub allocation: Vec<Units>,
}

impl ProcessSpec {
    /// Create a process description.
    pub fn new(max: impl Into<Vec<Units>>, allocation: impl Into<Vec<Units>>) -> Self {
        Self {
            max: max.into(),
            allocation: allocation.into(),
        }
    }
}

/// A process a lenient load skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedProcess {
    /// Position in the scenario's process list.
    pub index: usize,
    /// Why the ledger refused it.
    pub error: LedgerError,
}

/// A complete ledger description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Total units per resource type.
    pub totals: Vec<Units>,
    /// Processes in admission order.
    #[serde(default)]
    pub processes: Vec<ProcessSpec>,
}

const BUILTIN_NAMES: &[&str] = &["classic", "textbook", "exhausted"];

impl Scenario {
    /// Create an empty scenario with the given totals.
    pub fn new(name: impl Into<String>, totals: impl Into<Vec<Units>>) -> Self {
        Self {
            name: name.into(),
            description: None,
            totals: totals.into(),
            processes: Vec::new(),
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a process.
    pub fn with_process(mut self, max: impl Into<Vec<Units>>, allocation: impl Into<Vec<Units>>) -> Self {
        self.processes.push(ProcessSpec::new(max, allocation));
        self
    }

    /// Names of the built-in scenarios.
    pub fn builtin_names() -> &'static [&'static str] {
        BUILTIN_NAMES
    }

    /// Look up a built-in scenario.
    pub fn builtin(name: &str) -> Result<Self, ScenarioError> {
        let scenario = match name {
            "classic" => Self::new("classic", [10, 5, 7])
                .with_description("Two processes over three resource types")
                .with_process([7, 5, 3], [0, 1, 0])
                .with_process([3, 2, 2], [2, 0, 0]),
            "textbook" => Self::new("textbook", [10, 5, 7])
                .with_description("Five processes needing two passes")
                .with_process([7, 5, 3], [0, 1, 0])
                .with_process([3, 2, 2], [2, 0, 0])
                .with_process([9, 0, 2], [3, 0, 2])
                .with_process([2, 2, 2], [2, 1, 1])
                .with_process([4, 3, 3], [0, 0, 2]),
            "exhausted" => Self::new("exhausted", [2, 2, 2])
                .with_description("Every unit held, every process still short")
                .with_process([2, 2, 2], [1, 1, 1])
                .with_process([2, 2, 2], [1, 1, 1]),
            other => return Err(ScenarioError::UnknownBuiltin(other.to_string())),
        };
        Ok(scenario)
    }

    /// All built-in scenarios.
    pub fn builtins() -> Vec<Self> {
        BUILTIN_NAMES
            .iter()
            .filter_map(|name| Self::builtin(name).ok())
            .collect()
    }

    /// Parse a TOML scenario.
    pub fn from_toml_str(input: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(input)?)
    }

    /// Parse a JSON scenario.
    pub fn from_json_str(input: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read a scenario file.
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Read scenario file");

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&input)
        } else {
            Self::from_toml_str(&input)
        }
    }

    /// Serialize as TOML.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Replace the simulator's state with this scenario.
    ///
    /// The scenario is first replayed into a scratch ledger with the same
    /// configuration; the simulator is only touched if every step succeeds.
    ///
    /// # Errors
    ///
    /// Returns the first [`LedgerError`] the replay hits.
    pub fn apply(&self, simulator: &mut Simulator) -> BastionResult<Vec<ProcessId>> {
        let mut scratch = ResourceLedger::new(simulator.ledger().config().clone());
        scratch.set_resource_types(&self.totals)?;
        for process in &self.processes {
            scratch.add_process(&process.max, &process.allocation)?;
        }

        simulator.reset();
        simulator.set_resource_types(&self.totals)?;
        let ids = self
            .processes
            .iter()
            .map(|process| simulator.add_process(&process.max, &process.allocation))
            .collect::<BastionResult<Vec<_>>>()?;

        info!(
            scenario = %self.name,
            processes = ids.len(),
            "Loaded scenario"
        );
        Ok(ids)
    }

    /// Replace the simulator's state, skipping processes the ledger refuses.
    ///
    /// Rejected totals are still an error; there is nothing to add
    /// processes to.
    pub fn apply_lenient(&self, simulator: &mut Simulator) -> BastionResult<Vec<RejectedProcess>> {
        let mut scratch = ResourceLedger::new(simulator.ledger().config().clone());
        scratch.set_resource_types(&self.totals)?;

        simulator.reset();
        simulator.set_resource_types(&self.totals)?;

        let mut rejected = Vec::new();
        for (index, process) in self.processes.iter().enumerate() {
            if let Err(err) = simulator.add_process(&process.max, &process.allocation) {
                match err {
                    crate::BastionError::Ledger(error) => {
                        rejected.push(RejectedProcess { index, error })
                    }
                    other => return Err(other),
                }
            }
        }

        info!(
            scenario = %self.name,
            admitted = simulator.ledger().process_count(),
            rejected = rejected.len(),
            "Loaded scenario leniently"
        );
        Ok(rejected)
    }
}
