// ── Reconciler ──
//
// The central algorithm: resolve a spec's IP set, normalize, compare
// against the store, and converge with the minimal mutation. A pass that
// finds the rule already consistent performs zero write operations, which
// is what makes wholesale retries of a whole batch safe.

use std::collections::BTreeSet;
use std::time::Duration;

use fwsync_api::IpListClient;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::CoreError;
use crate::model::{ReconcileOutcome, ResolvedRule, RuleSpec};
use crate::normalize::{normalize, rules_match};
use crate::store::RuleStore;

/// Bounded retry with exponential backoff for transient store errors.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first. `1` disables retries.
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Per-rule reconciliation tunables.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    pub retry: RetryPolicy,
    /// When set, a description mismatch alone triggers an update.
    pub sync_description: bool,
}

impl ReconcileOptions {
    /// Defaults used by the orchestrator: descriptions kept in sync.
    pub fn standard() -> Self {
        Self {
            retry: RetryPolicy::default(),
            sync_description: true,
        }
    }
}

/// Reconciles one desired rule against one project's firewall state.
pub struct Reconciler<'a, S> {
    fetcher: &'a IpListClient,
    store: &'a S,
    options: ReconcileOptions,
}

impl<'a, S: RuleStore> Reconciler<'a, S> {
    pub fn new(fetcher: &'a IpListClient, store: &'a S, options: ReconcileOptions) -> Self {
        Self {
            fetcher,
            store,
            options,
        }
    }

    /// Full reconciliation of one (project, spec) pair.
    ///
    /// Never returns an error: every failure becomes a `Failed` outcome
    /// carrying the reason, so one rule's failure stays its own.
    pub async fn reconcile(&self, project: &str, spec: &RuleSpec) -> ReconcileOutcome {
        match self.resolve(spec).await {
            Ok(resolved) => self.apply_outcome(project, &resolved).await,
            Err(err) => ReconcileOutcome::Failed {
                reason: err.to_string(),
            },
        }
    }

    /// Resolve the spec's IP source and normalize.
    ///
    /// Factored out of [`apply`](Self::apply) so the orchestrator fetches
    /// each list once and applies it across every target project.
    pub async fn resolve(&self, spec: &RuleSpec) -> Result<ResolvedRule, CoreError> {
        let ip_set = match (&spec.endpoint_url, &spec.ip_list) {
            (Some(raw), _) => {
                let url: Url = raw.parse().map_err(|e| {
                    CoreError::config(format!("invalid endpoint_url {raw:?}: {e}"))
                })?;
                self.fetcher
                    .fetch(&url)
                    .await
                    .map_err(|e| CoreError::fetch(&url, &e))?
            }
            (None, Some(list)) => list
                .iter()
                .map(|entry| entry.trim())
                .filter(|entry| !entry.is_empty())
                .map(str::to_owned)
                .collect::<BTreeSet<_>>(),
            (None, None) => {
                return Err(CoreError::config(format!(
                    "rule {:?} has neither endpoint_url nor ip_list",
                    spec.rule_name
                )));
            }
        };

        Ok(normalize(spec, ip_set))
    }

    /// Converge one project's rule onto the resolved state, as an outcome.
    pub async fn apply_outcome(&self, project: &str, resolved: &ResolvedRule) -> ReconcileOutcome {
        match self.apply(project, resolved).await {
            Ok(outcome) => outcome,
            Err(err) => ReconcileOutcome::Failed {
                reason: err.to_string(),
            },
        }
    }

    /// Steps 3–6 of the algorithm: read, compare, create/update/no-op.
    ///
    /// An empty `source_ranges` set is written like any other -- an
    /// intentionally empty allow-list must converge, not be skipped.
    pub async fn apply(
        &self,
        project: &str,
        resolved: &ResolvedRule,
    ) -> Result<ReconcileOutcome, CoreError> {
        let name = resolved.name.as_str();

        let existing = self
            .with_retry(|| self.store.get_rule(project, name))
            .await?;

        match existing {
            None => {
                info!(project, rule = name, "creating firewall rule");
                self.with_retry(|| self.store.create_rule(project, resolved))
                    .await?;
                Ok(ReconcileOutcome::Created)
            }
            Some(current) if rules_match(resolved, &current, self.options.sync_description) => {
                debug!(project, rule = name, "rule already consistent");
                Ok(ReconcileOutcome::Unchanged)
            }
            Some(current) => {
                info!(project, rule = name, "updating firewall rule");
                let fingerprint = current.fingerprint.as_deref();
                self.with_retry(|| self.store.update_rule(project, resolved, fingerprint))
                    .await?;
                Ok(ReconcileOutcome::Updated)
            }
        }
    }

    /// Run a store operation, retrying transient failures with backoff.
    async fn with_retry<T, F, Fut>(&self, mut op: F) -> Result<T, CoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let mut attempt = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt + 1 < self.options.retry.attempts => {
                    let delay = self
                        .options
                        .retry
                        .base_delay
                        .saturating_mul(1 << attempt.min(16));
                    warn!(attempt, ?delay, error = %err, "transient store error, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
