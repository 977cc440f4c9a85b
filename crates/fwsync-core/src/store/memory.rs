// In-memory rule store for tests and dry runs.
//
// A mapping from (project, rule_name) to the stored rule, with call
// counters and scriptable failures so reconciliation logic can be tested
// without a live provider. Fingerprints rotate on every write and
// mismatched fingerprints are rejected, mirroring the provider's
// optimistic concurrency.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::RuleStore;
use crate::error::CoreError;
use crate::model::{ExistingRule, ResolvedRule};

#[derive(Default)]
pub struct MemoryRuleStore {
    rules: Mutex<HashMap<(String, String), ExistingRule>>,
    fingerprint_counter: AtomicUsize,
    get_calls: AtomicUsize,
    create_calls: AtomicUsize,
    update_calls: AtomicUsize,
    create_failures: Mutex<VecDeque<CoreError>>,
    update_failures: Mutex<VecDeque<CoreError>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a rule, as if a previous pass (or an operator) had
    /// written it. Assigns a fresh fingerprint.
    pub fn seed(&self, project: &str, rule: &ResolvedRule) {
        let existing = ExistingRule {
            name: rule.name.clone(),
            description: Some(rule.description.clone()),
            source_ranges: rule.source_ranges.clone(),
            allowed: rule.allowed.clone(),
            fingerprint: Some(self.next_fingerprint()),
        };
        self.seed_existing(project, existing);
    }

    pub fn seed_existing(&self, project: &str, rule: ExistingRule) {
        self.lock_rules()
            .insert((project.to_owned(), rule.name.clone()), rule);
    }

    /// Queue an error to be returned by the next create call(s).
    pub fn fail_next_create(&self, err: CoreError) {
        lock(&self.create_failures).push_back(err);
    }

    /// Queue an error to be returned by the next update call(s).
    pub fn fail_next_update(&self, err: CoreError) {
        lock(&self.update_failures).push_back(err);
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn mutation_calls(&self) -> usize {
        self.create_calls() + self.update_calls()
    }

    /// Read the stored rule back, bypassing counters.
    pub fn stored(&self, project: &str, rule_name: &str) -> Option<ExistingRule> {
        self.lock_rules()
            .get(&(project.to_owned(), rule_name.to_owned()))
            .cloned()
    }

    fn next_fingerprint(&self) -> String {
        let n = self.fingerprint_counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("fp-{n}")
    }

    fn lock_rules(&self) -> std::sync::MutexGuard<'_, HashMap<(String, String), ExistingRule>> {
        lock(&self.rules)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl RuleStore for MemoryRuleStore {
    async fn get_rule(
        &self,
        project: &str,
        rule_name: &str,
    ) -> Result<Option<ExistingRule>, CoreError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.stored(project, rule_name))
    }

    async fn create_rule(&self, project: &str, rule: &ResolvedRule) -> Result<(), CoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.create_failures).pop_front() {
            return Err(err);
        }

        let key = (project.to_owned(), rule.name.clone());
        let mut rules = self.lock_rules();
        if rules.contains_key(&key) {
            return Err(CoreError::Store {
                message: format!("rule {:?} already exists", rule.name),
                code: Some("ALREADY_EXISTS".into()),
                transient: false,
            });
        }
        rules.insert(
            key,
            ExistingRule {
                name: rule.name.clone(),
                description: Some(rule.description.clone()),
                source_ranges: rule.source_ranges.clone(),
                allowed: rule.allowed.clone(),
                fingerprint: Some(self.next_fingerprint()),
            },
        );
        Ok(())
    }

    async fn update_rule(
        &self,
        project: &str,
        rule: &ResolvedRule,
        fingerprint: Option<&str>,
    ) -> Result<(), CoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.update_failures).pop_front() {
            return Err(err);
        }

        let key = (project.to_owned(), rule.name.clone());
        let mut rules = self.lock_rules();
        let Some(current) = rules.get(&key) else {
            return Err(CoreError::Store {
                message: format!("rule {:?} does not exist", rule.name),
                code: Some("NOT_FOUND".into()),
                transient: false,
            });
        };
        if current.fingerprint.as_deref() != fingerprint {
            return Err(CoreError::Store {
                message: "fingerprint mismatch".into(),
                code: Some("CONDITION_NOT_MET".into()),
                transient: false,
            });
        }

        rules.insert(
            key,
            ExistingRule {
                name: rule.name.clone(),
                description: Some(rule.description.clone()),
                source_ranges: rule.source_ranges.clone(),
                allowed: rule.allowed.clone(),
                fingerprint: Some(self.next_fingerprint()),
            },
        );
        Ok(())
    }
}
