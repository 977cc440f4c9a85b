// ── Rule store capability ──
//
// The reconciler is polymorphic over this trait so the full reconciliation
// logic can be driven against an in-memory store in tests. The production
// binding is `ComputeRuleStore`.

mod compute;
pub mod memory;

pub use compute::ComputeRuleStore;
pub use memory::MemoryRuleStore;

use crate::error::CoreError;
use crate::model::{ExistingRule, ResolvedRule};

/// Read/create/update access to one project's named firewall rules.
///
/// Absence of a rule is `Ok(None)`, never an error. Both mutating
/// operations replace the rule's allowed-set and source-ranges in full,
/// atomically from the provider's perspective.
#[allow(async_fn_in_trait)]
pub trait RuleStore {
    async fn get_rule(
        &self,
        project: &str,
        rule_name: &str,
    ) -> Result<Option<ExistingRule>, CoreError>;

    async fn create_rule(&self, project: &str, rule: &ResolvedRule) -> Result<(), CoreError>;

    /// Replace the rule named `rule.name`. `fingerprint` carries the
    /// existing rule's concurrency token when the provider requires one.
    async fn update_rule(
        &self,
        project: &str,
        rule: &ResolvedRule,
        fingerprint: Option<&str>,
    ) -> Result<(), CoreError>;
}

// Shared references are stores too, so callers can keep inspecting a
// store they handed to an orchestrator.
impl<S: RuleStore> RuleStore for &S {
    async fn get_rule(
        &self,
        project: &str,
        rule_name: &str,
    ) -> Result<Option<ExistingRule>, CoreError> {
        (**self).get_rule(project, rule_name).await
    }

    async fn create_rule(&self, project: &str, rule: &ResolvedRule) -> Result<(), CoreError> {
        (**self).create_rule(project, rule).await
    }

    async fn update_rule(
        &self,
        project: &str,
        rule: &ResolvedRule,
        fingerprint: Option<&str>,
    ) -> Result<(), CoreError> {
        (**self).update_rule(project, rule, fingerprint).await
    }
}
