//! Bastion Observability
//!
//! This crate provides observability features for the Bastion
//! deadlock-avoidance engine, including:
//!
//! - [`EventDispatcher`]: Observable ledger and evaluation events
//! - [`MetricsCollector`]: Counters for mutations and verdicts
//! - [`SafetyReport`]: Complete, renderable evaluation reports
//!
//! # Event Subscription
//!
//! ```ignore
//! use bastion_observe::{EventDispatcher, LoggingSubscriber};
//! use std::sync::Arc;
//!
//! let dispatcher = EventDispatcher::new();
//! dispatcher.subscribe(Arc::new(LoggingSubscriber::new()));
//! ```
//!
//! # Reports
//!
//! ```ignore
//! use bastion_observe::{ReportConfig, SafetyReport};
//!
//! let report = SafetyReport::new(ledger.id(), &snapshot, verdict, None, &ReportConfig::default());
//! println!("{}", report.to_text());
//! ```

pub mod events;
pub mod metrics;
pub mod report;

// Re-export main types
pub use events::{
    CollectingSubscriber, EventDispatcher, EventSubscriber, LedgerEvent, LoggingSubscriber,
};
pub use metrics::{EvaluationMetrics, LedgerMetrics, MetricsCollector, MetricsSnapshot};
pub use report::{render_matrix, ReportConfig, ReportId, SafetyReport};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::events::{EventDispatcher, EventSubscriber, LedgerEvent};
    pub use crate::metrics::{MetricsCollector, MetricsSnapshot};
    pub use crate::report::{ReportConfig, SafetyReport};
}
