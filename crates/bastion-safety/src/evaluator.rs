//! The Banker's algorithm safety check.
//!
//! Starting from the available vector, the evaluator repeatedly sweeps the
//! unfinished processes in ascending index order. A process whose remaining
//! need fits in the current work vector is assumed to run to completion and
//! release its allocation back into work. Sweeping stops once a full pass
//! finishes nothing or every process has finished; the state is safe exactly
//! when all processes finished.
//!
//! The resulting order is the lowest-index-first greedy discovery order, so
//! two evaluations of the same snapshot always agree.

use tracing::{debug, info};

use bastion_core::{LedgerSnapshot, ProcessId, ResourceId, Units};

use crate::verdict::{BlockedProcess, SafetyTrace, SafetyVerdict, TraceStep};

/// A strategy for deciding whether a snapshot is safe.
pub trait SafetyCheck: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Evaluate a snapshot.
    fn evaluate(&self, snapshot: &LedgerSnapshot) -> SafetyVerdict;

    /// Evaluate a snapshot and record how the verdict was reached.
    ///
    /// The default implementation returns an empty trace.
    fn evaluate_traced(&self, snapshot: &LedgerSnapshot) -> (SafetyVerdict, SafetyTrace) {
        (self.evaluate(snapshot), SafetyTrace::default())
    }
}

/// The standard Banker's algorithm safety evaluator.
///
/// Stateless; runs in O(P² · R) for P processes and R resource types.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyEvaluator;

impl SafetyEvaluator {
    /// Create a new evaluator.
    pub fn new() -> Self {
        Self
    }

    fn run(&self, snapshot: &LedgerSnapshot, mut trace: Option<&mut SafetyTrace>) -> SafetyVerdict {
        let process_count = snapshot.process_count();
        let mut work = snapshot.available().to_vec();
        let mut finished = vec![false; process_count];
        let mut order = Vec::with_capacity(process_count);
        let mut passes = 0;
        let mut checks = 0;

        while order.len() < process_count {
            passes += 1;
            let mut progressed = false;

            for (index, done) in finished.iter_mut().enumerate() {
                if *done {
                    continue;
                }

                let process = ProcessId::new(index);
                let need = snapshot.need(process);
                checks += 1;
                if !can_proceed(need, &work) {
                    continue;
                }

                let work_before = trace.as_ref().map(|_| work.clone());
                release(&mut work, snapshot.allocation(process));
                *done = true;
                order.push(process);
                progressed = true;

                debug!(process = %process, pass = passes, work = ?work, "Process can finish");

                if let (Some(trace), Some(work_before)) = (trace.as_deref_mut(), work_before) {
                    trace.steps.push(TraceStep {
                        pass: passes,
                        process,
                        need: need.to_vec(),
                        work_before,
                        work_after: work.clone(),
                    });
                }
            }

            if !progressed {
                break;
            }
        }

        let safe = order.len() == process_count;

        if let Some(trace) = trace {
            trace.blocked = finished
                .iter()
                .enumerate()
                .filter(|(_, done)| !**done)
                .map(|(index, _)| {
                    let process = ProcessId::new(index);
                    BlockedProcess {
                        process,
                        shortfall: shortfall(snapshot.need(process), &work),
                    }
                })
                .collect();
            trace.final_work = work;
        }

        if !safe {
            order.clear();
        }

        info!(
            safe,
            processes = process_count,
            order = ?order,
            passes,
            checks,
            "Safety evaluation completed"
        );

        SafetyVerdict {
            safe,
            order,
            passes,
            checks,
        }
    }
}

impl SafetyCheck for SafetyEvaluator {
    fn name(&self) -> &'static str {
        "bankers"
    }

    fn evaluate(&self, snapshot: &LedgerSnapshot) -> SafetyVerdict {
        self.run(snapshot, None)
    }

    fn evaluate_traced(&self, snapshot: &LedgerSnapshot) -> (SafetyVerdict, SafetyTrace) {
        let mut trace = SafetyTrace::default();
        let verdict = self.run(snapshot, Some(&mut trace));
        (verdict, trace)
    }
}

/// Whether `need <= work` holds on every resource type.
pub fn can_proceed(need: &[Units], work: &[Units]) -> bool {
    need.iter().zip(work).all(|(n, w)| n <= w)
}

fn release(work: &mut [Units], allocation: &[Units]) {
    // Bounded by the totals, which were summed without overflow.
    for (w, a) in work.iter_mut().zip(allocation) {
        *w += a;
    }
}

fn shortfall(need: &[Units], work: &[Units]) -> Vec<(ResourceId, Units)> {
    need.iter()
        .zip(work)
        .enumerate()
        .filter(|(_, (n, w))| n > w)
        .map(|(r, (n, w))| (ResourceId::new(r), n - w))
        .collect()
}
