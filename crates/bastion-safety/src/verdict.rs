//! Evaluation results.

use serde::{Deserialize, Serialize};

use bastion_core::{ProcessId, ResourceId, Units};

/// Outcome of a safety evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyVerdict {
    /// Whether every process can run to completion.
    pub safe: bool,
    /// A safe execution order. Empty when the state is unsafe.
    pub order: Vec<ProcessId>,
    /// Number of full passes over the unfinished processes.
    pub passes: usize,
    /// Number of `need <= work` comparisons performed.
    pub checks: usize,
}

impl SafetyVerdict {
    /// Check if the state is safe.
    pub fn is_safe(&self) -> bool {
        self.safe
    }

    /// The safe sequence, if one was found.
    pub fn safe_sequence(&self) -> Option<&[ProcessId]> {
        self.safe.then_some(self.order.as_slice())
    }
}

/// A process that finished during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    /// One-based pass in which the process finished.
    pub pass: usize,
    /// The process that finished.
    pub process: ProcessId,
    /// Its remaining need.
    pub need: Vec<Units>,
    /// Work vector before the process released its allocation.
    pub work_before: Vec<Units>,
    /// Work vector after the release.
    pub work_after: Vec<Units>,
}

/// A process that could never proceed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedProcess {
    /// The stuck process.
    pub process: ProcessId,
    /// Resource types on which need exceeded the final work vector, with the
    /// missing amount.
    pub shortfall: Vec<(ResourceId, Units)>,
}

/// Step-by-step record of an evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyTrace {
    /// Processes in the order they finished.
    pub steps: Vec<TraceStep>,
    /// Processes left unfinished. Empty when the state is safe.
    pub blocked: Vec<BlockedProcess>,
    /// Work vector when evaluation stopped.
    pub final_work: Vec<Units>,
}

impl SafetyTrace {
    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.blocked.is_empty()
    }
}
