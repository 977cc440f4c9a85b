// Wire-level types for the provider firewall API.
//
// These mirror the provider's JSON schema exactly (camelCase fields,
// `IPProtocol` capitalization). Domain translation lives in fwsync-core;
// nothing here interprets the data.

use serde::{Deserialize, Serialize};

/// A firewall rule resource as the provider serializes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallResource {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Network URL, e.g. `global/networks/default`.
    pub network: String,

    pub priority: i32,

    /// `INGRESS` or `EGRESS`.
    pub direction: String,

    #[serde(default)]
    pub allowed: Vec<FirewallAllowed>,

    #[serde(default)]
    pub source_ranges: Vec<String>,

    /// Opaque concurrency token. Present on reads; must be echoed back
    /// on update so the provider can detect concurrent modification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

/// One allowed protocol/port entry.
///
/// The provider omits `ports` entirely when every port is allowed for the
/// protocol, so an absent field and an empty list both deserialize to an
/// empty `Vec` and serialize back to an absent field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirewallAllowed {
    #[serde(rename = "IPProtocol")]
    pub ip_protocol: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<String>,
}

/// The provider's JSON error envelope: `{"error": {"code": N, "message": "..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
