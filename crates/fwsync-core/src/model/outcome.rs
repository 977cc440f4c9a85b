// ── Reconciliation outcomes and the batch report ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What one reconciliation pass did to one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// No rule with that name existed; one was created.
    Created,
    /// The existing rule differed and was replaced.
    Updated,
    /// The existing rule already matched; zero write calls were made.
    Unchanged,
    /// Reconciliation of this rule failed; the rest of the batch is
    /// unaffected.
    Failed { reason: String },
}

impl ReconcileOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Short label for table rendering.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
            Self::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for ReconcileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { reason } => write!(f, "failed: {reason}"),
            other => f.write_str(other.label()),
        }
    }
}

/// One (project, rule) slot in the report, written at most once.
#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub project: String,
    pub rule_name: String,
    #[serde(flatten)]
    pub outcome: ReconcileOutcome,
}

/// Aggregate result of one batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub entries: Vec<ReportEntry>,
}

impl BatchReport {
    /// True iff every entry is non-`Failed`. The transport layer maps
    /// this to its status code.
    pub fn is_success(&self) -> bool {
        !self.entries.iter().any(|e| e.outcome.is_failed())
    }

    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_failed())
            .count()
    }

    /// Look up the outcome for one (project, rule) pair.
    pub fn outcome(&self, project: &str, rule_name: &str) -> Option<&ReconcileOutcome> {
        self.entries
            .iter()
            .find(|e| e.project == project && e.rule_name == rule_name)
            .map(|e| &e.outcome)
    }
}
