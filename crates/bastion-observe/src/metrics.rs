//! Counters for ledger activity and safety evaluations.

use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use bastion_safety::SafetyVerdict;

/// Collects metrics across a simulator session.
#[derive(Default)]
pub struct MetricsCollector {
    ledger: RwLock<LedgerMetrics>,
    evaluation: RwLock<EvaluationMetrics>,
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful resource configuration.
    pub fn record_resources_configured(&self) {
        self.ledger.write().configurations += 1;
    }

    /// Record an admitted process.
    pub fn record_process_admitted(&self) {
        self.ledger.write().processes_admitted += 1;
    }

    /// Record a rejected mutation.
    pub fn record_input_rejected(&self) {
        self.ledger.write().inputs_rejected += 1;
    }

    /// Record a ledger reset.
    pub fn record_reset(&self) {
        self.ledger.write().resets += 1;
    }

    /// Record a snapshot refused for inconsistency.
    pub fn record_inconsistency(&self) {
        self.evaluation.write().inconsistencies += 1;
    }

    /// Record a completed evaluation.
    pub fn record_evaluation(&self, verdict: &SafetyVerdict, duration: Duration) {
        let mut evaluation = self.evaluation.write();
        evaluation.evaluations += 1;
        if verdict.safe {
            evaluation.safe_verdicts += 1;
        } else {
            evaluation.unsafe_verdicts += 1;
        }
        evaluation.total_checks += verdict.checks as u64;
        evaluation.last_duration = duration;
        evaluation.total_duration += duration;
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            ledger: self.ledger.read().clone(),
            evaluation: self.evaluation.read().clone(),
        }
    }

    /// Reset all metrics.
    pub fn reset(&self) {
        *self.ledger.write() = LedgerMetrics::default();
        *self.evaluation.write() = EvaluationMetrics::default();
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollector")
            .field("ledger", &*self.ledger.read())
            .field("evaluation", &*self.evaluation.read())
            .finish()
    }
}

/// Snapshot of collected metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Ledger mutation counters.
    pub ledger: LedgerMetrics,
    /// Evaluation counters.
    pub evaluation: EvaluationMetrics,
}

/// Ledger mutation counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerMetrics {
    /// Successful `set_resource_types` calls.
    pub configurations: u64,
    /// Processes admitted.
    pub processes_admitted: u64,
    /// Mutations rejected as invalid input.
    pub inputs_rejected: u64,
    /// Resets.
    pub resets: u64,
}

/// Evaluation counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Completed evaluations.
    pub evaluations: u64,
    /// Evaluations that found a safe sequence.
    pub safe_verdicts: u64,
    /// Evaluations that found none.
    pub unsafe_verdicts: u64,
    /// Snapshots refused because allocations exceed totals.
    pub inconsistencies: u64,
    /// `need <= work` comparisons across all evaluations.
    pub total_checks: u64,
    /// Duration of the most recent evaluation.
    #[serde(with = "duration_serde")]
    pub last_duration: Duration,
    /// Accumulated evaluation time.
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

/// Custom serde for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_nanos() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(safe: bool, checks: usize) -> SafetyVerdict {
        SafetyVerdict {
            safe,
            order: Vec::new(),
            passes: 1,
            checks,
        }
    }

    #[test]
    fn test_metrics_collector_ledger() {
        let collector = MetricsCollector::new();
        collector.record_resources_configured();
        collector.record_process_admitted();
        collector.record_process_admitted();
        collector.record_input_rejected();
        collector.record_reset();

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.ledger.configurations, 1);
        assert_eq!(snapshot.ledger.processes_admitted, 2);
        assert_eq!(snapshot.ledger.inputs_rejected, 1);
        assert_eq!(snapshot.ledger.resets, 1);
    }

    #[test]
    fn test_metrics_collector_evaluations() {
        let collector = MetricsCollector::new();
        collector.record_evaluation(&verdict(true, 3), Duration::from_micros(5));
        collector.record_evaluation(&verdict(false, 4), Duration::from_micros(7));
        collector.record_inconsistency();

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.evaluation.evaluations, 2);
        assert_eq!(snapshot.evaluation.safe_verdicts, 1);
        assert_eq!(snapshot.evaluation.unsafe_verdicts, 1);
        assert_eq!(snapshot.evaluation.inconsistencies, 1);
        assert_eq!(snapshot.evaluation.total_checks, 7);
        assert_eq!(snapshot.evaluation.last_duration, Duration::from_micros(7));
        assert_eq!(snapshot.evaluation.total_duration, Duration::from_micros(12));
    }

    #[test]
    fn test_metrics_snapshot_serializes() {
        let collector = MetricsCollector::new();
        collector.record_evaluation(&verdict(true, 1), Duration::from_nanos(1500));

        let json = serde_json::to_value(collector.snapshot()).unwrap();
        assert_eq!(json["evaluation"]["last_duration"], 1500);
    }

    #[test]
    fn test_metrics_collector_reset() {
        let collector = MetricsCollector::new();
        collector.record_process_admitted();
        collector.reset();
        assert_eq!(collector.snapshot().ledger.processes_admitted, 0);
    }
}
