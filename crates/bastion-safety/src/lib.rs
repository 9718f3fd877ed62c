//! Bastion Safety - Banker's Algorithm
//!
//! This crate decides whether a [`LedgerSnapshot`](bastion_core::LedgerSnapshot)
//! is in a safe state:
//!
//! - [`SafetyEvaluator`]: the Banker's algorithm safety check
//! - [`SafetyCheck`]: the trait evaluators implement
//! - [`SafetyVerdict`] and [`SafetyTrace`]: what an evaluation produces
//! - [`verify_sequence`]: replays a safe sequence to confirm it
//!
//! Evaluation is a pure function of the snapshot. It never fails; a snapshot
//! either has a safe sequence or it does not.
//!
//! # Example
//!
//! ```
//! use bastion_core::ResourceLedger;
//! use bastion_safety::prelude::*;
//!
//! let mut ledger = ResourceLedger::with_defaults();
//! ledger.set_resource_types(&[10, 5, 7])?;
//! ledger.add_process(&[7, 5, 3], &[0, 1, 0])?;
//! ledger.add_process(&[3, 2, 2], &[2, 0, 0])?;
//!
//! let snapshot = ledger.snapshot()?;
//! let verdict = SafetyEvaluator::new().evaluate(&snapshot);
//! assert!(verdict.safe);
//! assert!(verify_sequence(&snapshot, &verdict.order).is_ok());
//! # Ok::<(), bastion_core::LedgerError>(())
//! ```

pub mod certificate;
pub mod evaluator;
pub mod verdict;

// Re-export main types
pub use certificate::{verify_sequence, CertificateError};
pub use evaluator::{can_proceed, SafetyCheck, SafetyEvaluator};
pub use verdict::{BlockedProcess, SafetyTrace, SafetyVerdict, TraceStep};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::certificate::{verify_sequence, CertificateError};
    pub use crate::evaluator::{SafetyCheck, SafetyEvaluator};
    pub use crate::verdict::{SafetyTrace, SafetyVerdict};
}
