//! A ledger session wired to evaluation, events and metrics.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use bastion_core::{
    LedgerConfig, LedgerError, LedgerSnapshot, ProcessId, ResourceLedger, Units,
};
use bastion_observe::{
    EventDispatcher, LedgerEvent, MetricsCollector, ReportConfig, SafetyReport,
};
use bastion_safety::{SafetyCheck, SafetyEvaluator};

use crate::scenario::Scenario;
use crate::BastionResult;

/// An interactive deadlock-avoidance session.
///
/// Wraps a [`ResourceLedger`] and forwards every mutation to it, emitting a
/// [`LedgerEvent`] and updating metrics along the way. Rejected mutations
/// leave the ledger exactly as it was.
pub struct Simulator {
    ledger: ResourceLedger,
    checker: Arc<dyn SafetyCheck>,
    report_config: ReportConfig,
    events: Arc<EventDispatcher>,
    metrics: Arc<MetricsCollector>,
}

impl Simulator {
    /// Create a simulator with the standard evaluator and no subscribers.
    pub fn new(config: LedgerConfig) -> Self {
        Self::from_parts(
            ResourceLedger::new(config),
            Arc::new(SafetyEvaluator::new()),
            ReportConfig::default(),
            Arc::new(EventDispatcher::new()),
        )
    }

    pub(crate) fn from_parts(
        ledger: ResourceLedger,
        checker: Arc<dyn SafetyCheck>,
        report_config: ReportConfig,
        events: Arc<EventDispatcher>,
    ) -> Self {
        info!(
            ledger_id = %ledger.id(),
            checker = checker.name(),
            "Created simulator"
        );

        Self {
            ledger,
            checker,
            report_config,
            events,
            metrics: Arc::new(MetricsCollector::new()),
        }
    }

    /// The underlying ledger.
    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// The report configuration.
    pub fn report_config(&self) -> &ReportConfig {
        &self.report_config
    }

    /// The event dispatcher.
    pub fn event_dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    /// Collected metrics.
    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    /// Replace the resource types and totals, discarding all processes.
    pub fn set_resource_types(&mut self, totals: &[Units]) -> BastionResult<()> {
        match self.ledger.set_resource_types(totals) {
            Ok(()) => {
                self.metrics.record_resources_configured();
                self.events.emit(LedgerEvent::ResourcesConfigured {
                    ledger: self.ledger.id(),
                    totals: totals.to_vec(),
                });
                Ok(())
            }
            Err(err) => Err(self.rejected("set_resource_types", err)),
        }
    }

    /// Admit a process and return its ID.
    pub fn add_process(&mut self, max_need: &[Units], allocation: &[Units]) -> BastionResult<ProcessId> {
        match self.ledger.add_process(max_need, allocation) {
            Ok(process) => {
                self.metrics.record_process_admitted();
                self.events.emit(LedgerEvent::ProcessAdded {
                    ledger: self.ledger.id(),
                    process,
                    max_need: max_need.to_vec(),
                    allocation: allocation.to_vec(),
                });
                Ok(process)
            }
            Err(err) => Err(self.rejected("add_process", err)),
        }
    }

    fn rejected(&self, operation: &'static str, err: LedgerError) -> crate::BastionError {
        self.metrics.record_input_rejected();
        self.events.emit(LedgerEvent::InputRejected {
            ledger: self.ledger.id(),
            operation,
            reason: err.to_string(),
        });
        err.into()
    }

    /// Clear all resource types and processes.
    pub fn reset(&mut self) {
        let previous = self.ledger.id();
        self.ledger.reset();
        self.metrics.record_reset();
        self.events.emit(LedgerEvent::LedgerReset {
            previous,
            ledger: self.ledger.id(),
        });
    }

    /// Replace the current state with a scenario.
    ///
    /// The scenario is validated in full before anything is changed, so a
    /// bad scenario leaves the current state untouched.
    pub fn load_scenario(&mut self, scenario: &Scenario) -> BastionResult<Vec<ProcessId>> {
        scenario.apply(self)
    }

    /// Take a snapshot, reporting over-allocation as an inconsistency.
    pub fn snapshot(&self) -> BastionResult<LedgerSnapshot> {
        self.ledger.snapshot().map_err(|err| {
            if err.is_inconsistency() {
                self.metrics.record_inconsistency();
                self.events.emit(LedgerEvent::InconsistencyDetected {
                    ledger: self.ledger.id(),
                    message: err.to_string(),
                });
            }
            err.into()
        })
    }

    /// Evaluate the current state.
    ///
    /// Includes a trace when the report configuration asks for one.
    pub fn check_safety(&self) -> BastionResult<SafetyReport> {
        self.evaluate(self.report_config.include_trace)
    }

    /// Evaluate the current state and always include a trace.
    pub fn check_safety_traced(&self) -> BastionResult<SafetyReport> {
        self.evaluate(true)
    }

    fn evaluate(&self, traced: bool) -> BastionResult<SafetyReport> {
        let snapshot = self.snapshot()?;

        debug!(
            ledger_id = %self.ledger.id(),
            checker = self.checker.name(),
            traced,
            "Checking safety"
        );

        let start = Instant::now();
        let (verdict, trace) = if traced {
            let (verdict, trace) = self.checker.evaluate_traced(&snapshot);
            (verdict, Some(trace))
        } else {
            (self.checker.evaluate(&snapshot), None)
        };
        let duration = start.elapsed();

        self.metrics.record_evaluation(&verdict, duration);
        self.events.emit(LedgerEvent::SafetyEvaluated {
            ledger: self.ledger.id(),
            safe: verdict.safe,
            order: verdict.order.clone(),
            duration,
        });

        Ok(SafetyReport::new(
            self.ledger.id(),
            &snapshot,
            verdict,
            trace,
            &self.report_config,
        ))
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl std::fmt::Debug for Simulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("ledger", &self.ledger)
            .field("checker", &self.checker.name())
            .field("report_config", &self.report_config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BastionError;
    use bastion_core::InvalidInput;
    use bastion_observe::{CollectingSubscriber, EventSubscriber, LoggingSubscriber};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    fn with_collector() -> (Simulator, Arc<CollectingSubscriber>) {
        let simulator = Simulator::default();
        let collector = Arc::new(CollectingSubscriber::new(100));
        simulator
            .event_dispatcher()
            .subscribe(Arc::clone(&collector) as Arc<dyn EventSubscriber>);
        (simulator, collector)
    }

    #[test]
    fn test_classic_session() {
        let (mut simulator, collector) = with_collector();
        simulator.set_resource_types(&[10, 5, 7]).unwrap();
        simulator.add_process(&[7, 5, 3], &[0, 1, 0]).unwrap();
        simulator.add_process(&[3, 2, 2], &[2, 0, 0]).unwrap();

        let report = simulator.check_safety().unwrap();
        assert!(report.is_safe());
        assert_eq!(report.available, vec![8, 4, 7]);
        assert_eq!(report.need_matrix, vec![vec![7, 4, 3], vec![1, 2, 2]]);
        assert!(report.trace.is_none());

        assert_eq!(
            collector.event_types(),
            vec![
                "resources_configured",
                "process_added",
                "process_added",
                "safety_evaluated"
            ]
        );

        let metrics = simulator.metrics().snapshot();
        assert_eq!(metrics.ledger.processes_admitted, 2);
        assert_eq!(metrics.evaluation.safe_verdicts, 1);
    }

    #[test]
    fn test_rejected_process_leaves_state() {
        let (mut simulator, collector) = with_collector();
        simulator.set_resource_types(&[5, 5]).unwrap();

        let err = simulator.add_process(&[3, 3], &[4, 0]).unwrap_err();
        assert!(matches!(
            err,
            BastionError::Ledger(LedgerError::InvalidInput(
                InvalidInput::AllocationExceedsMax { .. }
            ))
        ));
        assert_eq!(simulator.ledger().process_count(), 0);
        assert_eq!(
            simulator.add_process(&[1, 1], &[0, 0]).unwrap(),
            ProcessId::new(0)
        );

        assert_eq!(
            collector.event_types(),
            vec!["resources_configured", "input_rejected", "process_added"]
        );
        assert_eq!(simulator.metrics().snapshot().ledger.inputs_rejected, 1);
    }

    #[test]
    fn test_inconsistency_surfaces() {
        let (mut simulator, collector) = with_collector();
        simulator.set_resource_types(&[1]).unwrap();
        simulator.add_process(&[1], &[1]).unwrap();
        simulator.add_process(&[1], &[1]).unwrap();

        let err = simulator.check_safety().unwrap_err();
        assert!(matches!(
            err,
            BastionError::Ledger(LedgerError::Inconsistency { .. })
        ));
        assert!(collector.event_types().contains(&"inconsistency_detected"));
        assert!(!collector.event_types().contains(&"safety_evaluated"));
        assert_eq!(simulator.metrics().snapshot().evaluation.inconsistencies, 1);
    }

    #[test]
    fn test_traced_check() {
        let mut simulator = Simulator::default();
        simulator.set_resource_types(&[2, 2, 2]).unwrap();
        simulator.add_process(&[2, 2, 2], &[1, 1, 1]).unwrap();
        simulator.add_process(&[2, 2, 2], &[1, 1, 1]).unwrap();

        let report = simulator.check_safety_traced().unwrap();
        assert!(!report.is_safe());
        assert!(report.verdict.order.is_empty());
        assert_eq!(report.trace.map(|t| t.blocked.len()), Some(2));
    }

    #[test]
    fn test_reset() {
        let (mut simulator, collector) = with_collector();
        simulator.set_resource_types(&[1]).unwrap();
        let before = simulator.ledger().id();

        simulator.reset();
        assert!(!simulator.ledger().is_configured());
        assert_ne!(simulator.ledger().id(), before);
        assert_eq!(collector.event_types().last(), Some(&"ledger_reset"));
    }

    /// Counts events at debug level or more severe.
    struct CountingLayer(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for CountingLayer {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() <= tracing::Level::DEBUG {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn test_one_log_line_per_mutation() {
        let mut simulator = Simulator::default();
        simulator
            .event_dispatcher()
            .subscribe(Arc::new(LoggingSubscriber::new()));

        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(CountingLayer(Arc::clone(&count)));
        tracing::subscriber::with_default(subscriber, || {
            simulator.set_resource_types(&[4]).unwrap();
            simulator.add_process(&[2], &[1]).unwrap();
            simulator.add_process(&[1], &[2]).unwrap_err();
            simulator.reset();
        });

        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_empty_ledger_is_safe() {
        let simulator = Simulator::default();
        let report = simulator.check_safety().unwrap();
        assert!(report.is_safe());
        assert_eq!(report.sequence.as_deref(), Some(""));
    }
}
