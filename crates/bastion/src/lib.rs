//! # Bastion - Banker's Algorithm Deadlock Avoidance
//!
//! Bastion keeps a ledger of resource totals, per-process maximum needs and
//! current allocations, and decides whether that state is *safe*: whether
//! some order exists in which every process can obtain its remaining need,
//! finish, and release what it holds.
//!
//! ## Features
//!
//! - **Validated ledger**: Every mutation is checked and rejected atomically
//! - **Deterministic evaluation**: Lowest-index-first safe sequences
//! - **Traces**: Step-by-step record of the work vector and blocked processes
//! - **Observability**: Events, metrics and renderable reports
//! - **Scenarios**: Built-in and file-based (TOML/JSON) ledger descriptions
//!
//! ## Quick Start
//!
//! ```
//! use bastion::prelude::*;
//!
//! let mut simulator = Bastion::builder().build()?;
//!
//! simulator.set_resource_types(&[10, 5, 7])?;
//! simulator.add_process(&[7, 5, 3], &[0, 1, 0])?;
//! simulator.add_process(&[3, 2, 2], &[2, 0, 0])?;
//!
//! let report = simulator.check_safety()?;
//! assert!(report.is_safe());
//! assert_eq!(report.sequence.as_deref(), Some("P0 → P1"));
//! # Ok::<(), BastionError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    Your Application                     │
//! ├─────────────────────────────────────────────────────────┤
//! │                    bastion (facade)                     │
//! │          ┌─────────────────┬──────────────┐             │
//! │          │ Bastion Builder │  Scenarios   │             │
//! │          └────────┬────────┴──────────────┘             │
//! │                   │                                     │
//! │  ┌────────────────┼────────────────┬─────────────────┐  │
//! │  │ bastion-core   │ bastion-safety │ bastion-observe │  │
//! │  │ (ledger,       │ (evaluator,    │ (events,        │  │
//! │  │  snapshots)    │  certificates) │  metrics)       │  │
//! │  └────────────────┴────────────────┴─────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use bastion_core::{LedgerConfig, LedgerError, ResourceLedger};
use bastion_observe::{EventDispatcher, EventSubscriber, ReportConfig};
use bastion_safety::{SafetyCheck, SafetyEvaluator};

pub mod scenario;
pub mod simulator;

pub use scenario::{ProcessSpec, RejectedProcess, Scenario, ScenarioError};
pub use simulator::Simulator;

// Re-export from sub-crates
pub use bastion_core;
pub use bastion_observe;
pub use bastion_safety;

/// Main entry point for Bastion.
pub struct Bastion;

impl Bastion {
    /// Create a new simulator builder.
    pub fn builder() -> BastionBuilder {
        BastionBuilder::new()
    }

    /// Create a simulator with default configuration.
    pub fn with_defaults() -> BastionResult<Simulator> {
        BastionBuilder::new().build()
    }
}

/// Builder for configuring a [`Simulator`].
pub struct BastionBuilder {
    ledger_config: LedgerConfig,
    report_config: ReportConfig,
    checker: Option<Arc<dyn SafetyCheck>>,
    event_subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl BastionBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            ledger_config: LedgerConfig::default(),
            report_config: ReportConfig::default(),
            checker: None,
            event_subscribers: Vec::new(),
        }
    }

    // Ledger configuration

    /// Set the whole ledger configuration.
    pub fn with_ledger_config(mut self, config: LedgerConfig) -> Self {
        self.ledger_config = config;
        self
    }

    /// Set the maximum number of resource types.
    pub fn with_max_resource_types(mut self, count: usize) -> Self {
        self.ledger_config.max_resource_types = count;
        self
    }

    /// Set the maximum number of processes.
    pub fn with_max_processes(mut self, count: usize) -> Self {
        self.ledger_config.max_processes = count;
        self
    }

    /// Reject allocations that exceed what is still available.
    pub fn with_strict_allocation(mut self, enabled: bool) -> Self {
        self.ledger_config.strict_allocation = enabled;
        self
    }

    // Reporting

    /// Set the whole report configuration.
    pub fn with_report_config(mut self, config: ReportConfig) -> Self {
        self.report_config = config;
        self
    }

    /// Include an evaluation trace in every report.
    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.report_config.include_trace = enabled;
        self
    }

    // Evaluation

    /// Replace the safety check.
    pub fn with_safety_check(mut self, checker: Arc<dyn SafetyCheck>) -> Self {
        self.checker = Some(checker);
        self
    }

    // Observability

    /// Add an event subscriber.
    pub fn with_event_subscriber(mut self, subscriber: Arc<dyn EventSubscriber>) -> Self {
        self.event_subscribers.push(subscriber);
        self
    }

    /// Build the simulator.
    pub fn build(self) -> BastionResult<Simulator> {
        if self.ledger_config.max_resource_types == 0 {
            return Err(BastionError::Config(
                "max_resource_types must be at least 1".to_string(),
            ));
        }

        let event_dispatcher = EventDispatcher::new();
        for subscriber in self.event_subscribers {
            event_dispatcher.subscribe(subscriber);
        }

        let checker = self
            .checker
            .unwrap_or_else(|| Arc::new(SafetyEvaluator::new()));

        Ok(Simulator::from_parts(
            ResourceLedger::new(self.ledger_config),
            checker,
            self.report_config,
            Arc::new(event_dispatcher),
        ))
    }
}

impl Default for BastionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors from the Bastion simulator.
#[derive(Debug, thiserror::Error)]
pub enum BastionError {
    /// Ledger error.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Scenario error.
    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl BastionError {
    /// Check if this is rejected input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, BastionError::Ledger(err) if err.is_invalid_input())
    }
}

/// Result type for simulator operations.
pub type BastionResult<T> = Result<T, BastionError>;

/// Prelude module for convenient imports.
pub mod prelude {
    // Main types
    pub use crate::{
        Bastion, BastionBuilder, BastionError, BastionResult, Scenario, ScenarioError, Simulator,
    };

    // Core types
    pub use bastion_core::{
        InvalidInput, LedgerConfig, LedgerError, LedgerSnapshot, ProcessId, ResourceId,
        ResourceLedger, Units,
    };

    // Safety types
    pub use bastion_safety::{SafetyCheck, SafetyEvaluator, SafetyTrace, SafetyVerdict};

    // Observability types
    pub use bastion_observe::{
        EventDispatcher, EventSubscriber, LedgerEvent, MetricsCollector, ReportConfig,
        SafetyReport,
    };

    // Common std types
    pub use std::sync::Arc;
}
