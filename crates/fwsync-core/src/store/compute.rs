// Production rule store: adapts `fwsync_api::FirewallClient` to the
// `RuleStore` capability. Owns the domain↔wire translation; nothing
// outside this file sees the provider's resource shape.

use fwsync_api::FirewallClient;
use fwsync_api::models::{FirewallAllowed, FirewallResource};

use super::RuleStore;
use crate::error::CoreError;
use crate::model::{ExistingRule, Permission, ResolvedRule};

/// Rules managed by this tool are ingress rules on one network at a fixed
/// priority, matching what the upstream vendor lists are for.
const DIRECTION_INGRESS: &str = "INGRESS";
const DEFAULT_NETWORK: &str = "global/networks/default";
const DEFAULT_PRIORITY: i32 = 1000;

/// `RuleStore` backed by the provider firewall API.
pub struct ComputeRuleStore {
    client: FirewallClient,
    network: String,
    priority: i32,
}

impl ComputeRuleStore {
    pub fn new(client: FirewallClient) -> Self {
        Self {
            client,
            network: DEFAULT_NETWORK.to_owned(),
            priority: DEFAULT_PRIORITY,
        }
    }

    /// Override the network the managed rules attach to.
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    /// Override the priority assigned to created/updated rules.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    fn to_wire(&self, rule: &ResolvedRule, fingerprint: Option<&str>) -> FirewallResource {
        FirewallResource {
            name: rule.name.clone(),
            description: Some(rule.description.clone()),
            network: self.network.clone(),
            priority: self.priority,
            direction: DIRECTION_INGRESS.to_owned(),
            allowed: rule
                .allowed
                .iter()
                .map(|p| FirewallAllowed {
                    ip_protocol: p.protocol.clone(),
                    ports: p.ports.iter().cloned().collect(),
                })
                .collect(),
            source_ranges: rule.source_ranges.iter().cloned().collect(),
            fingerprint: fingerprint.map(str::to_owned),
        }
    }
}

fn from_wire(resource: FirewallResource) -> ExistingRule {
    ExistingRule {
        name: resource.name,
        description: resource.description,
        source_ranges: resource.source_ranges.into_iter().collect(),
        allowed: resource
            .allowed
            .into_iter()
            .map(|a| Permission {
                protocol: a.ip_protocol,
                ports: a.ports.into_iter().collect(),
            })
            .collect(),
        fingerprint: resource.fingerprint,
    }
}

impl RuleStore for ComputeRuleStore {
    async fn get_rule(
        &self,
        project: &str,
        rule_name: &str,
    ) -> Result<Option<ExistingRule>, CoreError> {
        let resource = self.client.get_firewall(project, rule_name).await?;
        Ok(resource.map(from_wire))
    }

    async fn create_rule(&self, project: &str, rule: &ResolvedRule) -> Result<(), CoreError> {
        let resource = self.to_wire(rule, None);
        self.client.insert_firewall(project, &resource).await?;
        Ok(())
    }

    async fn update_rule(
        &self,
        project: &str,
        rule: &ResolvedRule,
        fingerprint: Option<&str>,
    ) -> Result<(), CoreError> {
        let resource = self.to_wire(rule, fingerprint);
        self.client
            .update_firewall(project, &rule.name, &resource)
            .await?;
        Ok(())
    }
}
