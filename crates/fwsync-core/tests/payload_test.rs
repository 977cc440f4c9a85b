#![allow(clippy::unwrap_used)]
// Payload deserialization and report serialization shapes.

use pretty_assertions::assert_eq;
use serde_json::json;

use fwsync_core::{BatchReport, Payload, ReconcileOutcome, ReportEntry};

#[test]
fn test_payload_wire_shape() {
    let raw = json!({
        "configs": [
            {
                "rule_name": "allow-vendor-ssh",
                "description": "Vendor SSH access",
                "endpoint_url": "https://vendor.example/ips.txt",
                "allowed": [
                    { "IPProtocol": "tcp", "ports": ["22"] },
                    { "IPProtocol": "icmp" }
                ]
            },
            {
                "rule_name": "allow-static",
                "description": "Static office range",
                "ip_list": ["198.51.100.0/24"],
                "project": "acme-special",
                "allowed": [{ "IPProtocol": "tcp", "ports": [] }]
            }
        ]
    });

    let payload: Payload = serde_json::from_value(raw).unwrap();
    assert_eq!(payload.configs.len(), 2);

    let first = &payload.configs[0];
    assert_eq!(first.rule_name, "allow-vendor-ssh");
    assert_eq!(
        first.endpoint_url.as_deref(),
        Some("https://vendor.example/ips.txt")
    );
    assert!(first.ip_list.is_none());
    assert!(first.project.is_none());
    assert_eq!(first.allowed[0].protocol, "tcp");
    assert_eq!(first.allowed[0].ports, vec!["22"]);
    // Absent ports deserializes to empty (all ports).
    assert_eq!(first.allowed[1].protocol, "icmp");
    assert!(first.allowed[1].ports.is_empty());

    let second = &payload.configs[1];
    assert_eq!(second.endpoint_url, None);
    assert_eq!(second.project.as_deref(), Some("acme-special"));
    assert_eq!(second.ip_list.as_deref(), Some(&["198.51.100.0/24".to_owned()][..]));
}

#[test]
fn test_report_entry_serialization() {
    let ok = ReportEntry {
        project: "acme-prod".into(),
        rule_name: "allow-vendor-ssh".into(),
        outcome: ReconcileOutcome::Created,
    };
    assert_eq!(
        serde_json::to_value(&ok).unwrap(),
        json!({
            "project": "acme-prod",
            "rule_name": "allow-vendor-ssh",
            "status": "created"
        })
    );

    let failed = ReportEntry {
        project: "acme-prod".into(),
        rule_name: "allow-vendor-ssh".into(),
        outcome: ReconcileOutcome::Failed {
            reason: "HTTP 500".into(),
        },
    };
    assert_eq!(
        serde_json::to_value(&failed).unwrap(),
        json!({
            "project": "acme-prod",
            "rule_name": "allow-vendor-ssh",
            "status": "failed",
            "reason": "HTTP 500"
        })
    );
}

#[test]
fn test_report_success_accounting() {
    let now = chrono::Utc::now();
    let report = BatchReport {
        started_at: now,
        finished_at: now,
        entries: vec![
            ReportEntry {
                project: "acme-prod".into(),
                rule_name: "a".into(),
                outcome: ReconcileOutcome::Unchanged,
            },
            ReportEntry {
                project: "acme-prod".into(),
                rule_name: "b".into(),
                outcome: ReconcileOutcome::Failed {
                    reason: "boom".into(),
                },
            },
        ],
    };

    assert!(!report.is_success());
    assert_eq!(report.failed_count(), 1);
    assert_eq!(
        report.outcome("acme-prod", "a"),
        Some(&ReconcileOutcome::Unchanged)
    );
    assert_eq!(report.outcome("acme-prod", "missing"), None);
}
