// Domain model: rule specs as users declare them, resolved/existing rules
// as the reconciler compares them, and per-rule outcomes.

mod outcome;
mod rule;

pub use outcome::{BatchReport, ReconcileOutcome, ReportEntry};
pub use rule::{AllowedEntry, ExistingRule, Payload, Permission, ResolvedRule, RuleSpec};
