//! Error types for ledger operations.
//!
//! Mutations that fail validation return [`LedgerError::InvalidInput`] and
//! leave the ledger untouched. [`LedgerError::Inconsistency`] reports
//! allocations that exceed the declared totals.

use thiserror::Error;

use crate::id::{ProcessId, ResourceId};
use crate::Units;

/// Which input vector a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorKind {
    /// Resource totals.
    Totals,
    /// A process's maximum need.
    MaxNeed,
    /// A process's current allocation.
    Allocation,
    /// A derived need row.
    Need,
    /// The available vector.
    Available,
}

impl std::fmt::Display for VectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VectorKind::Totals => write!(f, "totals"),
            VectorKind::MaxNeed => write!(f, "max need"),
            VectorKind::Allocation => write!(f, "allocation"),
            VectorKind::Need => write!(f, "need"),
            VectorKind::Available => write!(f, "available"),
        }
    }
}

/// Reasons a ledger mutation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    /// No resource types were supplied.
    #[error("At least one resource type is required")]
    EmptyResourceTypes,

    /// A value was negative.
    #[error("Negative {field} value {value} for resource {resource}")]
    NegativeValue {
        /// The vector containing the value.
        field: VectorKind,
        /// The resource type at fault.
        resource: ResourceId,
        /// The offending value.
        value: Units,
    },

    /// A vector did not have one entry per resource type.
    #[error("Expected {expected} {field} entries, got {actual}")]
    LengthMismatch {
        /// The vector with the wrong length.
        field: VectorKind,
        /// Expected number of entries.
        expected: usize,
        /// Actual number of entries.
        actual: usize,
    },

    /// A process holds more than it declared it could ever need.
    #[error("Allocation {allocation} exceeds max need {max} for resource {resource}")]
    AllocationExceedsMax {
        /// The resource type at fault.
        resource: ResourceId,
        /// Requested allocation.
        allocation: Units,
        /// Declared maximum need.
        max: Units,
    },

    /// A process was added before the resource types were set.
    #[error("Resource types have not been configured")]
    ResourcesNotConfigured,

    /// More resource types than the configuration allows.
    #[error("{count} resource types exceeds the limit of {limit}")]
    TooManyResourceTypes {
        /// Requested number of resource types.
        count: usize,
        /// Configured limit.
        limit: usize,
    },

    /// The ledger already holds the maximum number of processes.
    #[error("Process limit of {limit} reached")]
    TooManyProcesses {
        /// Configured limit.
        limit: usize,
    },

    /// Summing allocations for a resource type overflowed.
    #[error("Arithmetic overflow accumulating resource {resource}")]
    Overflow {
        /// The resource type at fault.
        resource: ResourceId,
    },

    /// A stored snapshot vector disagrees with the one derived from
    /// available, allocation and need.
    #[error("Snapshot {field} does not match allocation and need")]
    Disagreement {
        /// The vector that disagrees.
        field: VectorKind,
    },

    /// Strict allocation: the allocation is larger than what is still free.
    #[error("Allocation {allocation} exceeds available {available} for resource {resource}")]
    ExceedsAvailable {
        /// The resource type at fault.
        resource: ResourceId,
        /// Requested allocation.
        allocation: Units,
        /// Units currently available.
        available: Units,
    },
}

/// Errors returned by [`ResourceLedger`](crate::ResourceLedger) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Input failed validation; the ledger was not modified.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// Allocations on a resource type exceed its declared total.
    #[error(
        "Ledger inconsistency: resource {resource} has {allocated} units allocated but a total of {total}"
    )]
    Inconsistency {
        /// The resource type at fault.
        resource: ResourceId,
        /// Declared total.
        total: Units,
        /// Sum of all allocations.
        allocated: Units,
    },

    /// No process with this ID exists.
    #[error("Unknown process: {0}")]
    UnknownProcess(ProcessId),
}

impl LedgerError {
    /// Check whether this error is an input validation failure.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, LedgerError::InvalidInput(_))
    }

    /// Check whether this error is a ledger inconsistency.
    pub fn is_inconsistency(&self) -> bool {
        matches!(self, LedgerError::Inconsistency { .. })
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = std::result::Result<T, LedgerError>;
