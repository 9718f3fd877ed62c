//! The resource ledger.
//!
//! [`ResourceLedger`] records resource totals and, per process, the maximum
//! need and the current allocation. Available units and remaining need are
//! derived from that state on every query and never stored.
//!
//! The process list is append-only. There is no way to remove
//! or edit a process: correcting a mistake means calling
//! [`reset`](ResourceLedger::reset) and adding the processes again.

use tracing::{debug, trace};

use crate::config::LedgerConfig;
use crate::error::{InvalidInput, LedgerError, LedgerResult, VectorKind};
use crate::id::{LedgerId, ProcessId, ResourceId};
use crate::snapshot::LedgerSnapshot;
use crate::Units;

/// A process admitted to the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    id: ProcessId,
    max_need: Vec<Units>,
    allocation: Vec<Units>,
}

impl ProcessEntry {
    /// The process ID.
    pub fn id(&self) -> ProcessId {
        self.id
    }

    /// Maximum units of each resource type the process may ever hold.
    pub fn max_need(&self) -> &[Units] {
        &self.max_need
    }

    /// Units of each resource type the process currently holds.
    pub fn allocation(&self) -> &[Units] {
        &self.allocation
    }

    /// Units the process may still request: `max_need - allocation`.
    pub fn need(&self) -> Vec<Units> {
        self.max_need
            .iter()
            .zip(&self.allocation)
            .map(|(max, alloc)| max - alloc)
            .collect()
    }
}

/// Resource totals and per-process allocation state.
#[derive(Debug, Clone)]
pub struct ResourceLedger {
    id: LedgerId,
    config: LedgerConfig,
    totals: Vec<Units>,
    processes: Vec<ProcessEntry>,
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl ResourceLedger {
    /// Create an empty ledger with the given configuration.
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            id: LedgerId::new(),
            config,
            totals: Vec::new(),
            processes: Vec::new(),
        }
    }

    /// Create an empty ledger with default configuration.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// The ID of the current session.
    pub fn id(&self) -> LedgerId {
        self.id
    }

    /// The ledger configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Declared resource totals.
    pub fn totals(&self) -> &[Units] {
        &self.totals
    }

    /// Number of resource types.
    pub fn resource_count(&self) -> usize {
        self.totals.len()
    }

    /// Number of admitted processes.
    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Whether resource types have been set.
    pub fn is_configured(&self) -> bool {
        !self.totals.is_empty()
    }

    /// All admitted processes in ID order.
    pub fn processes(&self) -> &[ProcessEntry] {
        &self.processes
    }

    /// Look up a process by ID.
    pub fn process(&self, id: ProcessId) -> LedgerResult<&ProcessEntry> {
        self.processes
            .get(id.index())
            .ok_or(LedgerError::UnknownProcess(id))
    }

    /// Replace the resource types and their totals.
    ///
    /// All processes are discarded, since their vectors were sized for the
    /// previous resource count.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidInput`] if `totals` is empty, longer
    /// than the configured limit, or contains a negative value. The ledger is
    /// unchanged on error.
    pub fn set_resource_types(&mut self, totals: &[Units]) -> LedgerResult<()> {
        if let Err(err) = self.validate_totals(totals) {
            trace!(ledger_id = %self.id, error = %err, "Rejected resource totals");
            return Err(err.into());
        }

        let discarded = self.processes.len();
        self.totals = totals.to_vec();
        self.processes.clear();

        trace!(
            ledger_id = %self.id,
            resources = totals.len(),
            totals = ?totals,
            discarded_processes = discarded,
            "Resource types configured"
        );

        Ok(())
    }

    fn validate_totals(&self, totals: &[Units]) -> Result<(), InvalidInput> {
        if totals.is_empty() {
            return Err(InvalidInput::EmptyResourceTypes);
        }
        if totals.len() > self.config.max_resource_types {
            return Err(InvalidInput::TooManyResourceTypes {
                count: totals.len(),
                limit: self.config.max_resource_types,
            });
        }
        check_non_negative(totals, VectorKind::Totals)
    }

    /// Admit a new process and return its ID.
    ///
    /// IDs are handed out sequentially starting at `P0`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidInput`] if resource types are not set,
    /// the process limit is reached, either vector has the wrong length or a
    /// negative entry, or an allocation exceeds the matching max need. With
    /// strict allocation enabled, an allocation larger than what is currently
    /// available is rejected too. No ID is consumed on error.
    pub fn add_process(&mut self, max_need: &[Units], allocation: &[Units]) -> LedgerResult<ProcessId> {
        if let Err(err) = self.validate_process(max_need, allocation) {
            trace!(
                ledger_id = %self.id,
                error = %err,
                "Rejected process"
            );
            return Err(err.into());
        }

        let id = ProcessId::new(self.processes.len());
        self.processes.push(ProcessEntry {
            id,
            max_need: max_need.to_vec(),
            allocation: allocation.to_vec(),
        });

        trace!(
            ledger_id = %self.id,
            process = %id,
            max_need = ?max_need,
            allocation = ?allocation,
            "Process added"
        );

        Ok(id)
    }

    fn validate_process(&self, max_need: &[Units], allocation: &[Units]) -> Result<(), InvalidInput> {
        if !self.is_configured() {
            return Err(InvalidInput::ResourcesNotConfigured);
        }
        if self.processes.len() >= self.config.max_processes {
            return Err(InvalidInput::TooManyProcesses {
                limit: self.config.max_processes,
            });
        }

        let resources = self.resource_count();
        check_length(max_need, resources, VectorKind::MaxNeed)?;
        check_length(allocation, resources, VectorKind::Allocation)?;
        check_non_negative(max_need, VectorKind::MaxNeed)?;
        check_non_negative(allocation, VectorKind::Allocation)?;

        for (r, (alloc, max)) in allocation.iter().zip(max_need).enumerate() {
            if alloc > max {
                return Err(InvalidInput::AllocationExceedsMax {
                    resource: ResourceId::new(r),
                    allocation: *alloc,
                    max: *max,
                });
            }
        }

        // Every allocation column must stay summable.
        for (r, alloc) in allocation.iter().enumerate() {
            let resource = ResourceId::new(r);
            let allocated = self
                .allocated(r)
                .filter(|sum| sum.checked_add(*alloc).is_some())
                .ok_or(InvalidInput::Overflow { resource })?;

            if self.config.strict_allocation {
                let available = self.totals[r] - allocated;
                if *alloc > available {
                    return Err(InvalidInput::ExceedsAvailable {
                        resource,
                        allocation: *alloc,
                        available,
                    });
                }
            }
        }

        Ok(())
    }

    /// Sum of allocations on resource type `r`, or `None` on overflow.
    fn allocated(&self, r: usize) -> Option<Units> {
        self.processes
            .iter()
            .try_fold(0, |acc: Units, p| acc.checked_add(p.allocation[r]))
    }

    /// Units of each resource type not allocated to any process.
    ///
    /// Recomputed from the totals and allocations on every call. Entries are
    /// negative only if allocations exceed the declared totals.
    pub fn available_vector(&self) -> Vec<Units> {
        (0..self.resource_count())
            .map(|r| {
                let allocated: Units = self.processes.iter().map(|p| p.allocation[r]).sum();
                self.totals[r] - allocated
            })
            .collect()
    }

    /// Remaining need of a process.
    pub fn need_vector(&self, id: ProcessId) -> LedgerResult<Vec<Units>> {
        self.process(id).map(ProcessEntry::need)
    }

    /// Max-need rows for all processes.
    pub fn max_matrix(&self) -> Vec<Vec<Units>> {
        self.processes.iter().map(|p| p.max_need.clone()).collect()
    }

    /// Allocation rows for all processes.
    pub fn allocation_matrix(&self) -> Vec<Vec<Units>> {
        self.processes.iter().map(|p| p.allocation.clone()).collect()
    }

    /// Need rows for all processes.
    pub fn need_matrix(&self) -> Vec<Vec<Units>> {
        self.processes.iter().map(ProcessEntry::need).collect()
    }

    /// Verify that no resource type is over-allocated.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Inconsistency`] for the first resource type
    /// whose allocations exceed its total.
    pub fn check_consistency(&self) -> LedgerResult<()> {
        for (r, available) in self.available_vector().into_iter().enumerate() {
            if available < 0 {
                let total = self.totals[r];
                let err = LedgerError::Inconsistency {
                    resource: ResourceId::new(r),
                    total,
                    allocated: total - available,
                };
                trace!(ledger_id = %self.id, error = %err, "Ledger is inconsistent");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Take an immutable snapshot for evaluation.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Inconsistency`] if any resource type is
    /// over-allocated.
    pub fn snapshot(&self) -> LedgerResult<LedgerSnapshot> {
        self.check_consistency()?;

        debug!(
            ledger_id = %self.id,
            processes = self.process_count(),
            resources = self.resource_count(),
            "Taking ledger snapshot"
        );

        Ok(LedgerSnapshot::new(
            self.totals.clone(),
            self.available_vector(),
            self.max_matrix(),
            self.allocation_matrix(),
            self.need_matrix(),
        ))
    }

    /// Clear resource types and processes, starting a new session.
    pub fn reset(&mut self) {
        let previous = self.id;
        self.totals.clear();
        self.processes.clear();
        self.id = LedgerId::new();

        trace!(previous_ledger_id = %previous, ledger_id = %self.id, "Ledger reset");
    }
}

fn check_length(values: &[Units], expected: usize, field: VectorKind) -> Result<(), InvalidInput> {
    if values.len() != expected {
        return Err(InvalidInput::LengthMismatch {
            field,
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

fn check_non_negative(values: &[Units], field: VectorKind) -> Result<(), InvalidInput> {
    match values.iter().enumerate().find(|(_, v)| **v < 0) {
        Some((r, value)) => Err(InvalidInput::NegativeValue {
            field,
            resource: ResourceId::new(r),
            value: *value,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic() -> ResourceLedger {
        let mut ledger = ResourceLedger::with_defaults();
        ledger.set_resource_types(&[10, 5, 7]).unwrap();
        ledger.add_process(&[7, 5, 3], &[0, 1, 0]).unwrap();
        ledger.add_process(&[3, 2, 2], &[2, 0, 0]).unwrap();
        ledger
    }

    #[test]
    fn test_ledger_creation() {
        let ledger = ResourceLedger::with_defaults();
        assert!(!ledger.is_configured());
        assert_eq!(ledger.process_count(), 0);
        assert!(ledger.available_vector().is_empty());
    }

    #[test]
    fn test_classic_derived_vectors() {
        let ledger = classic();
        assert_eq!(ledger.available_vector(), vec![8, 4, 7]);
        assert_eq!(ledger.need_matrix(), vec![vec![7, 4, 3], vec![1, 2, 2]]);
        assert_eq!(ledger.need_vector(ProcessId::new(1)).unwrap(), vec![1, 2, 2]);
    }

    #[test]
    fn test_sequential_ids() {
        let mut ledger = ResourceLedger::with_defaults();
        ledger.set_resource_types(&[3]).unwrap();
        assert_eq!(ledger.add_process(&[1], &[0]).unwrap(), ProcessId::new(0));
        assert_eq!(ledger.add_process(&[1], &[1]).unwrap(), ProcessId::new(1));
        assert_eq!(ledger.add_process(&[2], &[1]).unwrap(), ProcessId::new(2));
    }

    #[test]
    fn test_process_entries_match_admission() {
        let mut ledger = classic();
        assert!(ledger.add_process(&[1, 1, 1], &[2, 0, 0]).is_err());

        let entries = ledger.processes();
        assert_eq!(entries.len(), 2);
        for entry in entries {
            assert!(entry.need().iter().all(|n| *n >= 0));
            assert_eq!(entry.need(), ledger.need_vector(entry.id()).unwrap());
        }
        assert_eq!(entries[1].max_need(), &[3, 2, 2]);
        assert_eq!(entries[1].allocation(), &[2, 0, 0]);
    }

    #[test]
    fn test_set_resource_types_rejects_empty_and_negative() {
        let mut ledger = ResourceLedger::with_defaults();
        assert_eq!(
            ledger.set_resource_types(&[]).unwrap_err(),
            LedgerError::InvalidInput(InvalidInput::EmptyResourceTypes)
        );
        assert!(matches!(
            ledger.set_resource_types(&[1, -1]).unwrap_err(),
            LedgerError::InvalidInput(InvalidInput::NegativeValue { .. })
        ));
        assert!(!ledger.is_configured());
    }

    #[test]
    fn test_set_resource_types_clears_processes() {
        let mut ledger = classic();
        let id = ledger.id();
        ledger.set_resource_types(&[1, 1]).unwrap();
        assert_eq!(ledger.process_count(), 0);
        assert_eq!(ledger.resource_count(), 2);
        assert_eq!(ledger.id(), id);
    }

    #[test]
    fn test_rejected_resize_keeps_processes() {
        let mut ledger = classic();
        assert!(ledger.set_resource_types(&[]).is_err());
        assert_eq!(ledger.process_count(), 2);
        assert_eq!(ledger.totals(), &[10, 5, 7]);
    }

    #[test]
    fn test_allocation_exceeding_max_rejected() {
        let mut ledger = ResourceLedger::with_defaults();
        ledger.set_resource_types(&[5, 5]).unwrap();
        ledger.add_process(&[1, 1], &[0, 0]).unwrap();

        let err = ledger.add_process(&[3, 3], &[4, 0]).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InvalidInput(InvalidInput::AllocationExceedsMax {
                resource: ResourceId::new(0),
                allocation: 4,
                max: 3,
            })
        );
        assert_eq!(ledger.process_count(), 1);
        assert_eq!(ledger.add_process(&[1, 1], &[1, 1]).unwrap(), ProcessId::new(1));
    }

    #[test]
    fn test_add_process_validation() {
        let mut ledger = ResourceLedger::with_defaults();
        assert_eq!(
            ledger.add_process(&[1], &[0]).unwrap_err(),
            LedgerError::InvalidInput(InvalidInput::ResourcesNotConfigured)
        );

        ledger.set_resource_types(&[4, 4]).unwrap();
        assert!(matches!(
            ledger.add_process(&[1], &[0, 0]).unwrap_err(),
            LedgerError::InvalidInput(InvalidInput::LengthMismatch {
                field: VectorKind::MaxNeed,
                expected: 2,
                actual: 1
            })
        ));
        assert!(matches!(
            ledger.add_process(&[1, 1], &[0, 0, 0]).unwrap_err(),
            LedgerError::InvalidInput(InvalidInput::LengthMismatch {
                field: VectorKind::Allocation,
                ..
            })
        ));
        assert!(matches!(
            ledger.add_process(&[1, -2], &[0, 0]).unwrap_err(),
            LedgerError::InvalidInput(InvalidInput::NegativeValue {
                field: VectorKind::MaxNeed,
                value: -2,
                ..
            })
        ));
        assert!(matches!(
            ledger.add_process(&[1, 1], &[-1, 0]).unwrap_err(),
            LedgerError::InvalidInput(InvalidInput::NegativeValue {
                field: VectorKind::Allocation,
                ..
            })
        ));
        assert_eq!(ledger.process_count(), 0);
    }

    #[test]
    fn test_process_limit() {
        let mut ledger = ResourceLedger::new(LedgerConfig::new().with_max_processes(1));
        ledger.set_resource_types(&[1]).unwrap();
        ledger.add_process(&[1], &[0]).unwrap();
        assert_eq!(
            ledger.add_process(&[1], &[0]).unwrap_err(),
            LedgerError::InvalidInput(InvalidInput::TooManyProcesses { limit: 1 })
        );
    }

    #[test]
    fn test_resource_type_limit() {
        let mut ledger = ResourceLedger::new(LedgerConfig::new().with_max_resource_types(2));
        assert!(matches!(
            ledger.set_resource_types(&[1, 1, 1]).unwrap_err(),
            LedgerError::InvalidInput(InvalidInput::TooManyResourceTypes { count: 3, limit: 2 })
        ));
    }

    #[test]
    fn test_available_conservation() {
        let ledger = classic();
        let available = ledger.available_vector();
        for (r, total) in ledger.totals().iter().enumerate() {
            let allocated: Units = ledger.processes().iter().map(|p| p.allocation()[r]).sum();
            assert_eq!(available[r] + allocated, *total);
        }
    }

    #[test]
    fn test_need_non_negative() {
        let ledger = classic();
        assert!(ledger.need_matrix().iter().flatten().all(|n| *n >= 0));
    }

    #[test]
    fn test_over_allocation_detected_at_snapshot() {
        let mut ledger = ResourceLedger::with_defaults();
        ledger.set_resource_types(&[2]).unwrap();
        ledger.add_process(&[2], &[2]).unwrap();
        ledger.add_process(&[2], &[1]).unwrap();

        assert_eq!(ledger.available_vector(), vec![-1]);
        assert_eq!(
            ledger.snapshot().unwrap_err(),
            LedgerError::Inconsistency {
                resource: ResourceId::new(0),
                total: 2,
                allocated: 3,
            }
        );
    }

    #[test]
    fn test_strict_allocation_rejects_over_allocation() {
        let mut ledger = ResourceLedger::new(LedgerConfig::strict());
        ledger.set_resource_types(&[2]).unwrap();
        ledger.add_process(&[2], &[2]).unwrap();

        assert_eq!(
            ledger.add_process(&[2], &[1]).unwrap_err(),
            LedgerError::InvalidInput(InvalidInput::ExceedsAvailable {
                resource: ResourceId::new(0),
                allocation: 1,
                available: 0,
            })
        );
        assert!(ledger.snapshot().is_ok());
    }

    #[test]
    fn test_allocation_overflow_rejected() {
        let mut ledger = ResourceLedger::with_defaults();
        ledger.set_resource_types(&[Units::MAX]).unwrap();
        ledger.add_process(&[Units::MAX], &[Units::MAX]).unwrap();
        assert_eq!(
            ledger.add_process(&[1], &[1]).unwrap_err(),
            LedgerError::InvalidInput(InvalidInput::Overflow {
                resource: ResourceId::new(0)
            })
        );
    }

    #[test]
    fn test_snapshot_matches_ledger() {
        let ledger = classic();
        let snapshot = ledger.snapshot().unwrap();
        assert_eq!(snapshot.available(), &[8, 4, 7]);
        assert_eq!(snapshot.need(ProcessId::new(0)), &[7, 4, 3]);
        assert_eq!(snapshot.allocation(ProcessId::new(1)), &[2, 0, 0]);
        assert_eq!(snapshot.totals(), ledger.totals());
        assert_eq!(snapshot.max_matrix(), ledger.max_matrix().as_slice());
    }

    #[test]
    fn test_unknown_process() {
        let ledger = classic();
        assert_eq!(
            ledger.need_vector(ProcessId::new(5)).unwrap_err(),
            LedgerError::UnknownProcess(ProcessId::new(5))
        );
    }

    #[test]
    fn test_reset() {
        let mut ledger = classic();
        let before = ledger.id();
        ledger.reset();

        assert!(!ledger.is_configured());
        assert_eq!(ledger.process_count(), 0);
        assert_ne!(ledger.id(), before);
    }
}
