//! Replaying a safe sequence against a snapshot.

use thiserror::Error;

use bastion_core::{LedgerSnapshot, ProcessId, ResourceId, Units};

/// Why a proposed sequence is not a valid safe sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertificateError {
    /// The sequence does not name every process exactly once.
    #[error("Sequence has {actual} entries but the snapshot holds {expected} processes")]
    WrongLength {
        /// Number of processes in the snapshot.
        expected: usize,
        /// Number of entries in the sequence.
        actual: usize,
    },

    /// The sequence names a process that does not exist.
    #[error("Unknown process: {0}")]
    UnknownProcess(ProcessId),

    /// The sequence names a process twice.
    #[error("Process {0} appears more than once")]
    Duplicate(ProcessId),

    /// A process's need exceeds the work vector at its turn.
    #[error(
        "Process {process} cannot proceed at step {step}: needs {need} of resource {resource}, only {work} available"
    )]
    Blocked {
        /// Zero-based position in the sequence.
        step: usize,
        /// The process that cannot proceed.
        process: ProcessId,
        /// The first resource type that is short.
        resource: ResourceId,
        /// The process's need on that resource type.
        need: Units,
        /// Work available on that resource type.
        work: Units,
    },
}

/// Check that `order` is a safe sequence for `snapshot`.
///
/// The order must be a permutation of all process IDs, and replaying it from
/// the available vector must never hit a process whose need exceeds the
/// running work vector.
///
/// # Errors
///
/// Returns the first problem found.
pub fn verify_sequence(snapshot: &LedgerSnapshot, order: &[ProcessId]) -> Result<(), CertificateError> {
    let process_count = snapshot.process_count();
    if order.len() != process_count {
        return Err(CertificateError::WrongLength {
            expected: process_count,
            actual: order.len(),
        });
    }

    let mut seen = vec![false; process_count];
    for process in order {
        if !snapshot.contains(*process) {
            return Err(CertificateError::UnknownProcess(*process));
        }
        if std::mem::replace(&mut seen[process.index()], true) {
            return Err(CertificateError::Duplicate(*process));
        }
    }

    let mut work = snapshot.available().to_vec();
    for (step, process) in order.iter().enumerate() {
        let need = snapshot.need(*process);
        if let Some((r, (n, w))) = need.iter().zip(&work).enumerate().find(|(_, (n, w))| n > w) {
            return Err(CertificateError::Blocked {
                step,
                process: *process,
                resource: ResourceId::new(r),
                need: *n,
                work: *w,
            });
        }
        for (w, a) in work.iter_mut().zip(snapshot.allocation(*process)) {
            *w += a;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{SafetyCheck, SafetyEvaluator};

    fn textbook() -> LedgerSnapshot {
        LedgerSnapshot::from_parts(
            vec![3, 3, 2],
            vec![
                vec![0, 1, 0],
                vec![2, 0, 0],
                vec![3, 0, 2],
                vec![2, 1, 1],
                vec![0, 0, 2],
            ],
            vec![
                vec![7, 4, 3],
                vec![1, 2, 2],
                vec![6, 0, 0],
                vec![0, 1, 1],
                vec![4, 3, 1],
            ],
        )
        .unwrap()
    }

    fn order(indices: &[usize]) -> Vec<ProcessId> {
        indices.iter().copied().map(ProcessId::new).collect()
    }

    #[test]
    fn test_evaluator_output_verifies() {
        let snapshot = textbook();
        let verdict = SafetyEvaluator::new().evaluate(&snapshot);
        assert!(verdict.safe);
        assert!(verify_sequence(&snapshot, &verdict.order).is_ok());
    }

    #[test]
    fn test_other_valid_sequence_verifies() {
        assert!(verify_sequence(&textbook(), &order(&[3, 1, 4, 2, 0])).is_ok());
    }

    #[test]
    fn test_blocked_step() {
        let err = verify_sequence(&textbook(), &order(&[0, 1, 2, 3, 4])).unwrap_err();
        assert_eq!(
            err,
            CertificateError::Blocked {
                step: 0,
                process: ProcessId::new(0),
                resource: ResourceId::new(0),
                need: 7,
                work: 3,
            }
        );
    }

    #[test]
    fn test_not_a_permutation() {
        let snapshot = textbook();
        assert_eq!(
            verify_sequence(&snapshot, &order(&[1, 3])).unwrap_err(),
            CertificateError::WrongLength {
                expected: 5,
                actual: 2
            }
        );
        assert_eq!(
            verify_sequence(&snapshot, &order(&[1, 3, 4, 0, 1])).unwrap_err(),
            CertificateError::Duplicate(ProcessId::new(1))
        );
        assert_eq!(
            verify_sequence(&snapshot, &order(&[1, 3, 4, 0, 9])).unwrap_err(),
            CertificateError::UnknownProcess(ProcessId::new(9))
        );
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = LedgerSnapshot::from_parts(vec![1], vec![], vec![]).unwrap();
        assert!(verify_sequence(&snapshot, &[]).is_ok());
    }
}
