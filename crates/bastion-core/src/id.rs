//! Identifiers for processes, resource types and ledgers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Zero-based index of a process, assigned in admission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessId(usize);

impl ProcessId {
    /// Create a process ID from its index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The zero-based index of this process.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for ProcessId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Zero-based index of a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(usize);

impl ResourceId {
    /// Create a resource ID from its index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The zero-based index of this resource type.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for ResourceId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// Unique identifier for a ledger session.
///
/// A fresh ID is issued on creation and on every reset so log lines from
/// different sessions can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerId(Uuid);

impl LedgerId {
    /// Create a new random ledger ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LedgerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LedgerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
