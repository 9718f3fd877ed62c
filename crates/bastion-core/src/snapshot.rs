//! Immutable views of ledger state handed to the safety evaluator.

use serde::{Deserialize, Serialize};

use crate::error::{InvalidInput, VectorKind};
use crate::id::{ProcessId, ResourceId};
use crate::Units;

/// A frozen copy of the ledger matrices.
///
/// Snapshots taken through [`ResourceLedger::snapshot`](crate::ResourceLedger::snapshot)
/// are guaranteed to have a non-negative available vector. Snapshots built
/// with [`LedgerSnapshot::from_parts`] or deserialized are checked for shape
/// and non-negative need, and deserialized totals and max need must match
/// what the other parts imply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSnapshot")]
pub struct LedgerSnapshot {
    totals: Vec<Units>,
    available: Vec<Units>,
    max_need: Vec<Vec<Units>>,
    allocation: Vec<Vec<Units>>,
    need: Vec<Vec<Units>>,
}

impl LedgerSnapshot {
    pub(crate) fn new(
        totals: Vec<Units>,
        available: Vec<Units>,
        max_need: Vec<Vec<Units>>,
        allocation: Vec<Vec<Units>>,
        need: Vec<Vec<Units>>,
    ) -> Self {
        Self {
            totals,
            available,
            max_need,
            allocation,
            need,
        }
    }

    /// Build a snapshot from an available vector and the allocation and need
    /// matrices.
    ///
    /// Totals and max need are reconstructed from the parts. Zero resource
    /// types is accepted here, unlike on the ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the matrices disagree in shape, if a need entry is
    /// negative, or if reconstructing totals overflows.
    pub fn from_parts(
        available: Vec<Units>,
        allocation: Vec<Vec<Units>>,
        need: Vec<Vec<Units>>,
    ) -> Result<Self, InvalidInput> {
        let resources = available.len();

        if allocation.len() != need.len() {
            return Err(InvalidInput::LengthMismatch {
                field: VectorKind::Need,
                expected: allocation.len(),
                actual: need.len(),
            });
        }

        for (alloc_row, need_row) in allocation.iter().zip(&need) {
            check_row(alloc_row, resources, VectorKind::Allocation)?;
            check_row(need_row, resources, VectorKind::Need)?;
        }

        let max_need = allocation
            .iter()
            .zip(&need)
            .map(|(alloc_row, need_row)| {
                alloc_row
                    .iter()
                    .zip(need_row)
                    .enumerate()
                    .map(|(r, (a, n))| {
                        a.checked_add(*n).ok_or(InvalidInput::Overflow {
                            resource: ResourceId::new(r),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let totals = available
            .iter()
            .enumerate()
            .map(|(r, avail)| {
                allocation.iter().try_fold(*avail, |acc, row| {
                    acc.checked_add(row[r]).ok_or(InvalidInput::Overflow {
                        resource: ResourceId::new(r),
                    })
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(totals, available, max_need, allocation, need))
    }

    /// Number of resource types.
    pub fn resource_count(&self) -> usize {
        self.available.len()
    }

    /// Number of processes.
    pub fn process_count(&self) -> usize {
        self.allocation.len()
    }

    /// Iterate over all process IDs in index order.
    pub fn process_ids(&self) -> impl Iterator<Item = ProcessId> + '_ {
        (0..self.process_count()).map(ProcessId::new)
    }

    /// Declared resource totals.
    pub fn totals(&self) -> &[Units] {
        &self.totals
    }

    /// Units not allocated to any process.
    pub fn available(&self) -> &[Units] {
        &self.available
    }

    /// Allocation row for a process.
    ///
    /// # Panics
    ///
    /// Panics if `process` is out of range.
    pub fn allocation(&self, process: ProcessId) -> &[Units] {
        &self.allocation[process.index()]
    }

    /// Need row for a process.
    ///
    /// # Panics
    ///
    /// Panics if `process` is out of range.
    pub fn need(&self, process: ProcessId) -> &[Units] {
        &self.need[process.index()]
    }

    /// The full max-need matrix.
    pub fn max_matrix(&self) -> &[Vec<Units>] {
        &self.max_need
    }

    /// The full allocation matrix.
    pub fn allocation_matrix(&self) -> &[Vec<Units>] {
        &self.allocation
    }

    /// The full need matrix.
    pub fn need_matrix(&self) -> &[Vec<Units>] {
        &self.need
    }

    /// Check whether `process` is a valid ID for this snapshot.
    pub fn contains(&self, process: ProcessId) -> bool {
        process.index() < self.process_count()
    }
}

/// Unvalidated wire form of a [`LedgerSnapshot`].
#[derive(Deserialize)]
struct RawSnapshot {
    totals: Vec<Units>,
    available: Vec<Units>,
    max_need: Vec<Vec<Units>>,
    allocation: Vec<Vec<Units>>,
    need: Vec<Vec<Units>>,
}

impl TryFrom<RawSnapshot> for LedgerSnapshot {
    type Error = InvalidInput;

    fn try_from(raw: RawSnapshot) -> Result<Self, Self::Error> {
        let snapshot = Self::from_parts(raw.available, raw.allocation, raw.need)?;
        if snapshot.totals != raw.totals {
            return Err(InvalidInput::Disagreement {
                field: VectorKind::Totals,
            });
        }
        if snapshot.max_need != raw.max_need {
            return Err(InvalidInput::Disagreement {
                field: VectorKind::MaxNeed,
            });
        }
        Ok(snapshot)
    }
}

fn check_row(row: &[Units], expected: usize, field: VectorKind) -> Result<(), InvalidInput> {
    if row.len() != expected {
        return Err(InvalidInput::LengthMismatch {
            field,
            expected,
            actual: row.len(),
        });
    }
    if let Some((r, value)) = row.iter().enumerate().find(|(_, v)| **v < 0) {
        return Err(InvalidInput::NegativeValue {
            field,
            resource: ResourceId::new(r),
            value: *value,
        });
    }
    Ok(())
}
