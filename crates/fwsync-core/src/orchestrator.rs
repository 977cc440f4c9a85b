// ── Batch orchestrator ──
//
// Runs the reconciler over a full payload of rule specs. Validation
// happens up front with no network traffic; each spec's IP list is then
// resolved once and applied across every target project. One spec's
// failure never blocks another -- every (project, rule) pair gets exactly
// one report entry.

use std::collections::HashMap;

use chrono::Utc;
use futures_util::StreamExt;
use futures_util::stream;
use tracing::info;

use fwsync_api::IpListClient;

use crate::model::{BatchReport, ReconcileOutcome, ReportEntry, ResolvedRule, RuleSpec};
use crate::reconcile::{ReconcileOptions, Reconciler};
use crate::store::RuleStore;

/// Batch-level tunables.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Upper bound on in-flight fetch/store operations. A tunable to
    /// respect provider rate limits, not a correctness invariant.
    pub concurrency: usize,
    pub reconcile: ReconcileOptions,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 8,
            reconcile: ReconcileOptions::standard(),
        }
    }
}

/// A validation problem with one spec, reported before reconciliation.
#[derive(Debug, Clone)]
pub struct SpecIssue {
    pub index: usize,
    pub rule_name: String,
    pub message: String,
}

/// Validate a batch of specs without any fetch/store traffic.
///
/// Duplicate rule names are rejected outright -- every spec sharing the
/// duplicated name fails, since which of them should win is exactly the
/// ambiguity we refuse to guess at. At most one issue is reported per
/// spec.
pub fn validate_specs(specs: &[RuleSpec]) -> Vec<SpecIssue> {
    let mut name_counts: HashMap<&str, usize> = HashMap::new();
    for spec in specs {
        if !spec.rule_name.is_empty() {
            *name_counts.entry(spec.rule_name.as_str()).or_default() += 1;
        }
    }

    let mut issues = Vec::new();
    for (index, spec) in specs.iter().enumerate() {
        let message = if spec.rule_name.is_empty() {
            Some("rule_name must not be empty".to_owned())
        } else if name_counts.get(spec.rule_name.as_str()).copied().unwrap_or(0) > 1 {
            Some(format!(
                "duplicate rule_name {:?} in payload",
                spec.rule_name
            ))
        } else {
            match (&spec.endpoint_url, &spec.ip_list) {
                (Some(raw), _) if raw.trim().is_empty() => {
                    Some("endpoint_url must not be empty".to_owned())
                }
                (Some(raw), _) => url::Url::parse(raw)
                    .err()
                    .map(|e| format!("invalid endpoint_url {raw:?}: {e}")),
                (None, Some(_)) => None,
                (None, None) => {
                    Some("neither endpoint_url nor ip_list provided".to_owned())
                }
            }
        };

        if let Some(message) = message {
            issues.push(SpecIssue {
                index,
                rule_name: spec.rule_name.clone(),
                message,
            });
        }
    }

    issues
}

/// Runs one reconciliation pass over a payload of rule specs.
pub struct Orchestrator<S> {
    fetcher: IpListClient,
    store: S,
    options: BatchOptions,
}

impl<S: RuleStore> Orchestrator<S> {
    pub fn new(fetcher: IpListClient, store: S, options: BatchOptions) -> Self {
        Self {
            fetcher,
            store,
            options,
        }
    }

    /// Reconcile every spec against its target projects.
    ///
    /// `projects` is the environment-supplied target list; a spec with its
    /// own `project` field targets that single project instead. The report
    /// holds one entry per (project, rule) pair, sorted for deterministic
    /// output.
    pub async fn run(&self, projects: &[String], specs: &[RuleSpec]) -> BatchReport {
        let started_at = Utc::now();
        info!(
            specs = specs.len(),
            projects = projects.len(),
            "starting reconciliation pass"
        );

        let reconciler = Reconciler::new(
            &self.fetcher,
            &self.store,
            self.options.reconcile.clone(),
        );
        let concurrency = self.options.concurrency.max(1);

        let issues: HashMap<usize, String> = validate_specs(specs)
            .into_iter()
            .map(|issue| (issue.index, issue.message))
            .collect();

        // Resolve each valid spec's IP set once, concurrently. The result
        // is reused for every target project of that spec.
        let resolutions: HashMap<usize, Result<ResolvedRule, String>> = stream::iter(
            specs
                .iter()
                .enumerate()
                .filter(|(index, _)| !issues.contains_key(index))
                .map(|(index, spec)| {
                    let reconciler = &reconciler;
                    async move {
                        let resolved =
                            reconciler.resolve(spec).await.map_err(|e| e.to_string());
                        (index, resolved)
                    }
                }),
        )
        .buffer_unordered(concurrency)
        .collect()
        .await;

        // Expand specs into per-project work, recording validation and
        // resolution failures as entries without any store traffic.
        let mut entries = Vec::new();
        let mut jobs: Vec<(String, &ResolvedRule)> = Vec::new();

        for (index, spec) in specs.iter().enumerate() {
            let targets: Vec<String> = match &spec.project {
                Some(project) => vec![project.clone()],
                None => projects.to_vec(),
            };

            let failure = issues.get(&index).cloned().or_else(|| {
                match resolutions.get(&index) {
                    Some(Err(reason)) => Some(reason.clone()),
                    _ => None,
                }
            });

            if targets.is_empty() {
                entries.push(ReportEntry {
                    project: String::new(),
                    rule_name: spec.rule_name.clone(),
                    outcome: ReconcileOutcome::Failed {
                        reason: failure
                            .unwrap_or_else(|| "no target projects configured".to_owned()),
                    },
                });
                continue;
            }

            match failure {
                Some(reason) => {
                    for project in targets {
                        entries.push(ReportEntry {
                            project,
                            rule_name: spec.rule_name.clone(),
                            outcome: ReconcileOutcome::Failed {
                                reason: reason.clone(),
                            },
                        });
                    }
                }
                None => {
                    if let Some(Ok(resolved)) = resolutions.get(&index) {
                        for project in targets {
                            jobs.push((project, resolved));
                        }
                    }
                }
            }
        }

        // Apply phase: bounded fan-out, one outcome slot per pair.
        let applied: Vec<ReportEntry> = stream::iter(jobs.iter().map(|(project, resolved)| {
            let reconciler = &reconciler;
            async move {
                let outcome = reconciler.apply_outcome(project, resolved).await;
                ReportEntry {
                    project: project.clone(),
                    rule_name: resolved.name.clone(),
                    outcome,
                }
            }
        }))
        .buffer_unordered(concurrency)
        .collect()
        .await;

        entries.extend(applied);
        entries.sort_by(|a, b| {
            (a.project.as_str(), a.rule_name.as_str())
                .cmp(&(b.project.as_str(), b.rule_name.as_str()))
        });

        let report = BatchReport {
            started_at,
            finished_at: Utc::now(),
            entries,
        };
        info!(
            entries = report.entries.len(),
            failed = report.failed_count(),
            "reconciliation pass complete"
        );
        report
    }
}
