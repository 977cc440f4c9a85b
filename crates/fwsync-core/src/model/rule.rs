// ── Rule domain types ──

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The request payload handed to the orchestrator by the trigger layer:
/// `{"configs": [ ... ]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Payload {
    pub configs: Vec<RuleSpec>,
}

/// Declarative intent for one firewall rule.
///
/// `rule_name` is the sole identity used to locate the existing rule in a
/// project's firewall namespace. The IP source is either `endpoint_url`
/// (fetched fresh each pass) or an inline `ip_list`; the URL takes
/// precedence when both are present.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    pub rule_name: String,

    #[serde(default)]
    pub description: String,

    /// URL serving one IP or CIDR per line.
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Static allow-list used when no endpoint URL is given.
    #[serde(default)]
    pub ip_list: Option<Vec<String>>,

    /// Per-spec project override. When absent the spec targets every
    /// project supplied by the environment.
    #[serde(default)]
    pub project: Option<String>,

    #[serde(default)]
    pub allowed: Vec<AllowedEntry>,
}

/// One allowed protocol/port entry as it appears in the payload.
///
/// The wire name `IPProtocol` matches the provider schema. An empty
/// `ports` list means every port for that protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedEntry {
    #[serde(rename = "IPProtocol")]
    pub protocol: String,

    #[serde(default)]
    pub ports: Vec<String>,
}

/// A canonical protocol/port permission.
///
/// Ports are a set: deduplicated, sorted, order-independent. An empty set
/// means "all ports" and is distinct from any specific port list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permission {
    pub protocol: String,
    pub ports: BTreeSet<String>,
}

impl Permission {
    /// Comparison key: protocols compare case-insensitively, port sets
    /// exactly.
    pub(crate) fn key(&self) -> (String, BTreeSet<String>) {
        (self.protocol.to_ascii_lowercase(), self.ports.clone())
    }
}

/// The target state for one rule, derived from a spec and a freshly
/// resolved IP set. Ephemeral: recomputed on every pass, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedRule {
    pub name: String,
    pub description: String,
    pub source_ranges: BTreeSet<String>,
    pub allowed: Vec<Permission>,
}

/// A rule as read back from the store.
///
/// Same shape as [`ResolvedRule`] plus the provider's opaque fingerprint,
/// which is echoed on update for optimistic concurrency and never
/// interpreted here.
#[derive(Debug, Clone)]
pub struct ExistingRule {
    pub name: String,
    pub description: Option<String>,
    pub source_ranges: BTreeSet<String>,
    pub allowed: Vec<Permission>,
    pub fingerprint: Option<String>,
}
