//! Bastion Core - Resource Ledger
//!
//! This crate holds the data model for the Bastion deadlock-avoidance
//! engine:
//!
//! - [`ResourceLedger`]: resource totals plus per-process max need and allocation
//! - [`LedgerSnapshot`]: an immutable copy of the ledger matrices for evaluation
//! - [`LedgerConfig`]: size limits and admission policy
//! - [`LedgerError`]: the error taxonomy for ledger operations
//!
//! # Quick Start
//!
//! ```
//! use bastion_core::prelude::*;
//!
//! let mut ledger = ResourceLedger::with_defaults();
//! ledger.set_resource_types(&[10, 5, 7])?;
//! ledger.add_process(&[7, 5, 3], &[0, 1, 0])?;
//! ledger.add_process(&[3, 2, 2], &[2, 0, 0])?;
//!
//! assert_eq!(ledger.available_vector(), vec![8, 4, 7]);
//! assert_eq!(ledger.need_matrix(), vec![vec![7, 4, 3], vec![1, 2, 2]]);
//! # Ok::<(), LedgerError>(())
//! ```
//!
//! # Derived State
//!
//! Available units and remaining need are computed from totals and
//! allocations on every query. Nothing derived is cached, so there is no
//! state that can drift out of sync with the stored vectors.

pub mod config;
pub mod error;
pub mod id;
pub mod ledger;
pub mod snapshot;

/// Integer type for resource unit counts.
///
/// Signed so that an over-allocated available vector can be represented and
/// reported instead of wrapping.
pub type Units = i64;

// Re-export main types at crate root
pub use config::LedgerConfig;
pub use error::{InvalidInput, LedgerError, LedgerResult, VectorKind};
pub use id::{LedgerId, ProcessId, ResourceId};
pub use ledger::{ProcessEntry, ResourceLedger};
pub use snapshot::LedgerSnapshot;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::LedgerConfig;
    pub use crate::error::{InvalidInput, LedgerError, LedgerResult};
    pub use crate::id::{ProcessId, ResourceId};
    pub use crate::ledger::ResourceLedger;
    pub use crate::snapshot::LedgerSnapshot;
    pub use crate::Units;
}
