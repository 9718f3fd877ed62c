//! Configuration for the resource ledger.

use serde::{Deserialize, Serialize};

/// Limits and admission policy for a [`ResourceLedger`](crate::ResourceLedger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Maximum number of resource types.
    ///
    /// Defaults to 64.
    pub max_resource_types: usize,

    /// Maximum number of processes.
    ///
    /// Defaults to 1,024.
    pub max_processes: usize,

    /// Reject allocations larger than what is currently available.
    ///
    /// When disabled, over-allocation is accepted by `add_process` and only
    /// surfaces as an inconsistency when a snapshot is taken.
    pub strict_allocation: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_resource_types: 64,
            max_processes: 1_024,
            strict_allocation: false,
        }
    }
}

impl LedgerConfig {
    /// Create a new ledger configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of resource types.
    pub fn with_max_resource_types(mut self, count: usize) -> Self {
        self.max_resource_types = count;
        self
    }

    /// Set the maximum number of processes.
    pub fn with_max_processes(mut self, count: usize) -> Self {
        self.max_processes = count;
        self
    }

    /// Enable or disable strict allocation checks.
    pub fn with_strict_allocation(mut self, enabled: bool) -> Self {
        self.strict_allocation = enabled;
        self
    }

    /// Standard limits, over-allocation detected at snapshot time.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Standard limits with over-allocation rejected at admission.
    pub fn strict() -> Self {
        Self {
            strict_allocation: true,
            ..Self::default()
        }
    }

    /// No size limits.
    pub fn permissive() -> Self {
        Self {
            max_resource_types: usize::MAX,
            max_processes: usize::MAX,
            strict_allocation: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_config_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.max_resource_types, 64);
        assert_eq!(config.max_processes, 1_024);
        assert!(!config.strict_allocation);
    }

    #[test]
    fn test_ledger_config_builder() {
        let config = LedgerConfig::new()
            .with_max_processes(4)
            .with_max_resource_types(2)
            .with_strict_allocation(true);

        assert_eq!(config.max_processes, 4);
        assert_eq!(config.max_resource_types, 2);
        assert!(config.strict_allocation);
    }

    #[test]
    fn test_ledger_config_presets() {
        assert!(LedgerConfig::strict().strict_allocation);
        assert!(!LedgerConfig::standard().strict_allocation);
        assert!(LedgerConfig::permissive().max_processes > LedgerConfig::standard().max_processes);
    }
}
