// fwsync-core: the reconciliation engine between desired rule specs and
// the provider's firewall state.

pub mod error;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod reconcile;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use normalize::{normalize, rules_match};
pub use orchestrator::{BatchOptions, Orchestrator, SpecIssue, validate_specs};
pub use reconcile::{ReconcileOptions, Reconciler, RetryPolicy};
pub use store::{ComputeRuleStore, MemoryRuleStore, RuleStore};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AllowedEntry, BatchReport, ExistingRule, Payload, Permission, ReconcileOutcome, ReportEntry,
    ResolvedRule, RuleSpec,
};
