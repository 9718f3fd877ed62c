//! Safety reports.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bastion_core::{LedgerId, LedgerSnapshot, ProcessId, Units};
use bastion_safety::{SafetyTrace, SafetyVerdict};

/// Unique identifier for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(Uuid);

impl ReportId {
    /// Create a new random report ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReportId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How reports label and render processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Prefix for process labels.
    ///
    /// Defaults to `"P"`, giving `P0`, `P1`, ...
    pub label_prefix: String,

    /// Separator between labels in a safe sequence.
    ///
    /// Defaults to `" → "`.
    pub separator: String,

    /// Record and render the step-by-step evaluation trace.
    pub include_trace: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            label_prefix: "P".to_string(),
            separator: " → ".to_string(),
            include_trace: false,
        }
    }
}

impl ReportConfig {
    /// Create a report configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the process label prefix.
    pub fn with_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    /// Set the sequence separator.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Enable or disable the evaluation trace.
    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.include_trace = enabled;
        self
    }

    /// Label for a process, e.g. `P0`.
    pub fn label(&self, process: ProcessId) -> String {
        format!("{}{}", self.label_prefix, process.index())
    }

    /// Join process labels with the configured separator.
    pub fn format_sequence(&self, order: &[ProcessId]) -> String {
        order
            .iter()
            .map(|p| self.label(*p))
            .collect::<Vec<_>>()
            .join(&self.separator)
    }
}

/// Render a per-process matrix as aligned text rows.
///
/// An empty matrix renders as `No processes yet`.
pub fn render_matrix(matrix: &[Vec<Units>], config: &ReportConfig) -> String {
    if matrix.is_empty() {
        return "  No processes yet\n".to_string();
    }

    let width = matrix
        .iter()
        .flatten()
        .map(|v| v.to_string().len())
        .max()
        .unwrap_or(1);
    let label_width = config.label(ProcessId::new(matrix.len() - 1)).len();

    let mut output = String::new();
    for (index, row) in matrix.iter().enumerate() {
        let cells = row
            .iter()
            .map(|v| format!("{:>width$}", v, width = width))
            .collect::<Vec<_>>()
            .join(" ");
        output.push_str(&format!(
            "  {:<label_width$} | {}\n",
            config.label(ProcessId::new(index)),
            cells,
            label_width = label_width
        ));
    }
    output
}

/// Complete safety report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyReport {
    /// Unique report ID.
    pub report_id: ReportId,
    /// The ledger session evaluated.
    pub ledger_id: LedgerId,
    /// Resource totals.
    pub totals: Vec<Units>,
    /// Available units.
    pub available: Vec<Units>,
    /// Max-need matrix.
    pub max_matrix: Vec<Vec<Units>>,
    /// Allocation matrix.
    pub allocation_matrix: Vec<Vec<Units>>,
    /// Need matrix.
    pub need_matrix: Vec<Vec<Units>>,
    /// The verdict.
    pub verdict: SafetyVerdict,
    /// Labelled safe sequence, e.g. `P1 → P0`.
    pub sequence: Option<String>,
    /// Evaluation trace, if requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<SafetyTrace>,
    /// Labels and separator used when rendering.
    #[serde(default)]
    config: ReportConfig,
}

impl SafetyReport {
    /// Create a report from a snapshot and its verdict.
    pub fn new(
        ledger_id: LedgerId,
        snapshot: &LedgerSnapshot,
        verdict: SafetyVerdict,
        trace: Option<SafetyTrace>,
        config: &ReportConfig,
    ) -> Self {
        let sequence = verdict
            .safe_sequence()
            .map(|order| config.format_sequence(order));

        Self {
            report_id: ReportId::new(),
            ledger_id,
            totals: snapshot.totals().to_vec(),
            available: snapshot.available().to_vec(),
            max_matrix: snapshot.max_matrix().to_vec(),
            allocation_matrix: snapshot.allocation_matrix().to_vec(),
            need_matrix: snapshot.need_matrix().to_vec(),
            verdict,
            sequence,
            trace,
            config: config.clone(),
        }
    }

    /// Check if the evaluated state is safe.
    pub fn is_safe(&self) -> bool {
        self.verdict.safe
    }

    /// Format as human-readable text.
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Safety Report: {}\n", self.report_id));
        output.push_str(&format!("Ledger: {}\n\n", self.ledger_id));

        output.push_str(&format!("Resources: {:?}\n", self.totals));
        output.push_str(&format!("Available: {:?}\n\n", self.available));

        for (title, matrix) in [
            ("Max", &self.max_matrix),
            ("Allocation", &self.allocation_matrix),
            ("Need", &self.need_matrix),
        ] {
            output.push_str(&format!("{}:\n", title));
            output.push_str(&render_matrix(matrix, &self.config));
            output.push('\n');
        }

        if self.is_safe() {
            output.push_str("System is in a SAFE state!\n");
            output.push_str(&format!(
                "Safe Sequence: {}\n",
                self.sequence.as_deref().unwrap_or_default()
            ));
        } else {
            output.push_str("System is in an UNSAFE state!\n");
            output.push_str("No safe sequence exists.\n");
        }

        if let Some(trace) = &self.trace {
            output.push_str("\nTrace:\n");
            for step in &trace.steps {
                output.push_str(&format!(
                    "  pass {}: {} need {:?} fits {:?} -> {:?}\n",
                    step.pass,
                    self.config.label(step.process),
                    step.need,
                    step.work_before,
                    step.work_after
                ));
            }
            for blocked in &trace.blocked {
                let short = blocked
                    .shortfall
                    .iter()
                    .map(|(resource, missing)| format!("{} by {}", resource, missing))
                    .collect::<Vec<_>>()
                    .join(", ");
                output.push_str(&format!(
                    "  blocked: {} short on {}\n",
                    self.config.label(blocked.process),
                    short
                ));
            }
        }

        output
    }

    /// Format as JSON.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Format as pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_safety::{SafetyCheck, SafetyEvaluator};

    fn classic() -> LedgerSnapshot {
        LedgerSnapshot::from_parts(
            vec![8, 4, 7],
            vec![vec![0, 1, 0], vec![2, 0, 0]],
            vec![vec![7, 4, 3], vec![1, 2, 2]],
        )
        .unwrap()
    }

    fn exhausted() -> LedgerSnapshot {
        LedgerSnapshot::from_parts(
            vec![0, 0, 0],
            vec![vec![1, 1, 1], vec![1, 1, 1]],
            vec![vec![1, 1, 1], vec![1, 1, 1]],
        )
        .unwrap()
    }

    fn report(snapshot: &LedgerSnapshot, config: &ReportConfig) -> SafetyReport {
        let (verdict, trace) = SafetyEvaluator::new().evaluate_traced(snapshot);
        let trace = config.include_trace.then_some(trace);
        SafetyReport::new(LedgerId::new(), snapshot, verdict, trace, config)
    }

    #[test]
    fn test_report_ids_unique() {
        assert_ne!(ReportId::new(), ReportId::new());
    }

    #[test]
    fn test_format_sequence() {
        let config = ReportConfig::default();
        let order = vec![ProcessId::new(1), ProcessId::new(0)];
        assert_eq!(config.format_sequence(&order), "P1 → P0");

        let config = ReportConfig::new().with_label_prefix("T").with_separator(", ");
        assert_eq!(config.format_sequence(&order), "T1, T0");
    }

    #[test]
    fn test_render_empty_matrix() {
        assert_eq!(
            render_matrix(&[], &ReportConfig::default()),
            "  No processes yet\n"
        );
    }

    #[test]
    fn test_render_matrix_alignment() {
        let rendered = render_matrix(&[vec![7, 10], vec![3, 2]], &ReportConfig::default());
        assert_eq!(rendered, "  P0 |  7 10\n  P1 |  3  2\n");
    }

    #[test]
    fn test_safe_report_text() {
        let report = report(&classic(), &ReportConfig::default());
        assert!(report.is_safe());
        assert_eq!(report.sequence.as_deref(), Some("P0 → P1"));

        let text = report.to_text();
        assert!(text.contains("System is in a SAFE state!"));
        assert!(text.contains("Safe Sequence: P0 → P1"));
        assert!(text.contains("Available: [8, 4, 7]"));
        assert!(!text.contains("Trace:"));
    }

    #[test]
    fn test_unsafe_report_text() {
        let report = report(&exhausted(), &ReportConfig::default());
        assert!(!report.is_safe());
        assert_eq!(report.sequence, None);

        let text = report.to_text();
        assert!(text.contains("System is in an UNSAFE state!"));
        assert!(text.contains("No safe sequence exists."));
    }

    #[test]
    fn test_report_trace_rendering() {
        let report = report(&exhausted(), &ReportConfig::new().with_trace(true));
        let text = report.to_text();
        assert!(text.contains("Trace:"));
        assert!(text.contains("blocked: P0 short on R0 by 1, R1 by 1, R2 by 1"));
    }

    #[test]
    fn test_report_json_keeps_labels() {
        let config = ReportConfig::new().with_label_prefix("T").with_separator(", ");
        let report = report(&classic(), &config);

        let parsed: SafetyReport = serde_json::from_str(&report.to_json_pretty()).unwrap();
        let text = parsed.to_text();
        assert!(text.contains("Safe Sequence: T0, T1"));
        assert!(text.contains("  T0 | "));
    }

    #[test]
    fn test_report_json() {
        let report = report(&classic(), &ReportConfig::default());
        let json = report.to_json();
        assert_eq!(json["verdict"]["safe"], true);
        assert_eq!(json["verdict"]["order"], serde_json::json!([0, 1]));
        assert_eq!(json["available"], serde_json::json!([8, 4, 7]));
        assert!(json.get("trace").is_none());
        assert!(report.to_json_pretty().contains("\"need_matrix\""));
    }
}
