//! Observable ledger and evaluation events.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use bastion_core::{LedgerId, ProcessId, Units};

/// Events emitted while a ledger is built and evaluated.
#[derive(Debug, Clone)]
pub enum LedgerEvent {
    /// Resource types were (re)configured.
    ResourcesConfigured {
        /// Ledger session.
        ledger: LedgerId,
        /// New resource totals.
        totals: Vec<Units>,
    },
    /// A process was admitted.
    ProcessAdded {
        /// Ledger session.
        ledger: LedgerId,
        /// Assigned process ID.
        process: ProcessId,
        /// Declared maximum need.
        max_need: Vec<Units>,
        /// Current allocation.
        allocation: Vec<Units>,
    },
    /// A mutation was rejected.
    InputRejected {
        /// Ledger session.
        ledger: LedgerId,
        /// The operation that was rejected.
        operation: &'static str,
        /// Why it was rejected.
        reason: String,
    },
    /// The ledger was cleared.
    LedgerReset {
        /// The session that ended.
        previous: LedgerId,
        /// The session that started.
        ledger: LedgerId,
    },
    /// A safety evaluation finished.
    SafetyEvaluated {
        /// Ledger session.
        ledger: LedgerId,
        /// Whether the state is safe.
        safe: bool,
        /// Safe sequence; empty when unsafe.
        order: Vec<ProcessId>,
        /// Evaluation time.
        duration: Duration,
    },
    /// A snapshot was refused because allocations exceed totals.
    InconsistencyDetected {
        /// Ledger session.
        ledger: LedgerId,
        /// Description of the inconsistency.
        message: String,
    },
}

impl LedgerEvent {
    /// Get the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::ResourcesConfigured { .. } => "resources_configured",
            LedgerEvent::ProcessAdded { .. } => "process_added",
            LedgerEvent::InputRejected { .. } => "input_rejected",
            LedgerEvent::LedgerReset { .. } => "ledger_reset",
            LedgerEvent::SafetyEvaluated { .. } => "safety_evaluated",
            LedgerEvent::InconsistencyDetected { .. } => "inconsistency_detected",
        }
    }
}

/// Subscriber for ledger events.
pub trait EventSubscriber: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &LedgerEvent);

    /// Filter for event types this subscriber is interested in.
    /// Returns `None` to receive all events.
    fn event_filter(&self) -> Option<Vec<&'static str>> {
        None
    }
}

/// A subscriber that forwards events to `tracing`.
#[derive(Debug, Default)]
pub struct LoggingSubscriber;

impl LoggingSubscriber {
    /// Create a new logging subscriber.
    pub fn new() -> Self {
        Self
    }
}

impl EventSubscriber for LoggingSubscriber {
    fn on_event(&self, event: &LedgerEvent) {
        match event {
            LedgerEvent::ResourcesConfigured { ledger, totals } => {
                tracing::debug!(
                    event = "resources_configured",
                    ledger_id = %ledger,
                    totals = ?totals,
                    "Resources configured"
                );
            }
            LedgerEvent::ProcessAdded {
                ledger,
                process,
                max_need,
                allocation,
            } => {
                tracing::debug!(
                    event = "process_added",
                    ledger_id = %ledger,
                    process = %process,
                    max_need = ?max_need,
                    allocation = ?allocation,
                    "Process added"
                );
            }
            LedgerEvent::InputRejected {
                ledger,
                operation,
                reason,
            } => {
                tracing::warn!(
                    event = "input_rejected",
                    ledger_id = %ledger,
                    operation = operation,
                    reason = reason,
                    "Input rejected"
                );
            }
            LedgerEvent::LedgerReset { previous, ledger } => {
                tracing::debug!(
                    event = "ledger_reset",
                    previous_ledger_id = %previous,
                    ledger_id = %ledger,
                    "Ledger reset"
                );
            }
            LedgerEvent::SafetyEvaluated {
                ledger,
                safe,
                order,
                duration,
            } => {
                tracing::info!(
                    event = "safety_evaluated",
                    ledger_id = %ledger,
                    safe = safe,
                    order = ?order,
                    duration_us = duration.as_micros(),
                    "Safety evaluated"
                );
            }
            LedgerEvent::InconsistencyDetected { ledger, message } => {
                tracing::error!(
                    event = "inconsistency_detected",
                    ledger_id = %ledger,
                    message = message,
                    "Ledger inconsistency"
                );
            }
        }
    }
}

/// A subscriber that collects events for later analysis.
pub struct CollectingSubscriber {
    events: RwLock<Vec<(Instant, LedgerEvent)>>,
    max_events: usize,
}

impl CollectingSubscriber {
    /// Create a new collecting subscriber.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            max_events,
        }
    }

    /// Get collected events.
    pub fn events(&self) -> Vec<(Instant, LedgerEvent)> {
        self.events.read().clone()
    }

    /// Get the type names of collected events, in order.
    pub fn event_types(&self) -> Vec<&'static str> {
        self.events.read().iter().map(|(_, e)| e.event_type()).collect()
    }

    /// Clear collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Get event count.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl EventSubscriber for CollectingSubscriber {
    fn on_event(&self, event: &LedgerEvent) {
        let mut events = self.events.write();
        if events.len() < self.max_events {
            events.push((Instant::now(), event.clone()));
        }
    }
}

/// Event dispatcher that manages subscribers.
#[derive(Default)]
pub struct EventDispatcher {
    subscribers: RwLock<Vec<Arc<dyn EventSubscriber>>>,
}

impl EventDispatcher {
    /// Create a new event dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber.
    pub fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) {
        self.subscribers.write().push(subscriber);
    }

    /// Remove all subscribers.
    pub fn clear_subscribers(&self) {
        self.subscribers.write().clear();
    }

    /// Get subscriber count.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: LedgerEvent) {
        let subscribers = self.subscribers.read();
        for subscriber in subscribers.iter() {
            if let Some(filter) = subscriber.event_filter() {
                if !filter.contains(&event.event_type()) {
                    continue;
                }
            }
            subscriber.on_event(&event);
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
