// ── Rule normalization and equality ──
//
// Converts a desired-rule spec plus a resolved IP set into the canonical
// form the reconciler compares against store state. Pure functions, no
// failure modes: malformed specs are rejected by validation before this
// layer runs.

use std::collections::BTreeSet;

use crate::model::{ExistingRule, Permission, ResolvedRule, RuleSpec};

/// Build the canonical target state for one rule.
///
/// Permissions are deduplicated as (case-insensitive protocol, port-set)
/// pairs; the protocol string is stored as given. Ports are deduplicated
/// and sorted. An entry with no ports means "all ports" and survives as
/// an empty set -- it is never conflated with a specific port list.
pub fn normalize(spec: &RuleSpec, ip_set: BTreeSet<String>) -> ResolvedRule {
    let mut seen = BTreeSet::new();
    let mut allowed = Vec::new();

    for entry in &spec.allowed {
        let permission = Permission {
            protocol: entry.protocol.clone(),
            ports: entry.ports.iter().cloned().collect(),
        };
        if seen.insert(permission.key()) {
            allowed.push(permission);
        }
    }

    ResolvedRule {
        name: spec.rule_name.clone(),
        description: spec.description.clone(),
        source_ranges: ip_set,
        allowed,
    }
}

/// Equality under the reconciliation contract.
///
/// Two rules match iff their source-range sets are equal and their
/// permissions are equal as sets of (protocol, port-set) pairs. When
/// `sync_description` is set, the descriptions must match as well -- an
/// existing rule with no description compares as the empty string.
pub fn rules_match(resolved: &ResolvedRule, existing: &ExistingRule, sync_description: bool) -> bool {
    if resolved.source_ranges != existing.source_ranges {
        return false;
    }

    let desired: BTreeSet<_> = resolved.allowed.iter().map(Permission::key).collect();
    let current: BTreeSet<_> = existing.allowed.iter().map(Permission::key).collect();
    if desired != current {
        return false;
    }

    if sync_description && existing.description.as_deref().unwrap_or("") != resolved.description {
        return false;
    }

    true
}
