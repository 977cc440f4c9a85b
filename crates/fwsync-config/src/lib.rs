//! Shared configuration for the fwsync CLI.
//!
//! TOML config file, environment overrides, provider token resolution,
//! and translation into `fwsync_api`/`fwsync_core` config structs. The
//! core crates never read config files -- everything is resolved here and
//! handed in.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Data, Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fwsync_api::{TlsMode, TransportConfig};
use fwsync_core::{BatchOptions, ReconcileOptions, RetryPolicy};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no provider token configured (set {hint})")]
    NoCredentials { hint: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Projects every rule targets by default (a spec's own `project`
    /// field narrows that spec to a single project).
    #[serde(default)]
    pub projects: Vec<String>,

    #[serde(default)]
    pub provider: Provider,

    #[serde(default)]
    pub transport: Transport,

    #[serde(default)]
    pub reconcile: Reconcile,
}

/// Provider endpoint and credentials.
#[derive(Debug, Deserialize, Serialize)]
pub struct Provider {
    /// Firewall API root.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the access token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Plaintext token (prefer `token_env`).
    pub token: Option<String>,

    /// Network the managed rules attach to.
    #[serde(default = "default_network")]
    pub network: String,

    /// Priority assigned to created/updated rules.
    #[serde(default = "default_priority")]
    pub priority: i32,
}

impl Default for Provider {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token_env: default_token_env(),
            token: None,
            network: default_network(),
            priority: default_priority(),
        }
    }
}

fn default_base_url() -> String {
    fwsync_api::firewall::DEFAULT_BASE_URL.to_owned()
}
fn default_token_env() -> String {
    "FWSYNC_TOKEN".into()
}
fn default_network() -> String {
    "global/networks/default".into()
}
fn default_priority() -> i32 {
    1000
}

/// HTTP transport tuning.
#[derive(Debug, Deserialize, Serialize)]
pub struct Transport {
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification (test/staging endpoints only).
    #[serde(default)]
    pub insecure: bool,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            ca_cert: None,
            insecure: false,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// Reconciliation tunables.
#[derive(Debug, Deserialize, Serialize)]
pub struct Reconcile {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,

    /// Keep rule descriptions in sync (a description-only drift then
    /// counts as a change).
    #[serde(default = "default_sync_description")]
    pub sync_description: bool,
}

impl Default for Reconcile {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            retry_attempts: default_retry_attempts(),
            retry_base_ms: default_retry_base_ms(),
            sync_description: default_sync_description(),
        }
    }
}

fn default_concurrency() -> usize {
    8
}
fn default_retry_attempts() -> u32 {
    3
}
fn default_retry_base_ms() -> u64 {
    500
}
fn default_sync_description() -> bool {
    true
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "fwsync", "fwsync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fwsync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full `Config` from the canonical file + environment.
///
/// Environment keys use a double-underscore separator for nesting, e.g.
/// `FWSYNC_RECONCILE__CONCURRENCY=16`.
pub fn load_config() -> Result<Config, ConfigError> {
    load_from_figment(Toml::file(config_path()))
}

/// Load from an explicit path (`--config`); the file must exist.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file not found: {}", path.display()),
        )));
    }
    load_from_figment(Toml::file(path))
}

fn load_from_figment(file: Data<Toml>) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(file)
        .merge(Env::prefixed("FWSYNC_").split("__"));

    let config: Config = figment.extract()?;
    validate(&config)?;
    Ok(config)
}

/// Load config, returning defaults if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    url::Url::parse(&config.provider.base_url).map_err(|e| ConfigError::Validation {
        field: "provider.base_url".into(),
        reason: format!("invalid URL: {e}"),
    })?;

    if config.reconcile.retry_attempts == 0 {
        return Err(ConfigError::Validation {
            field: "reconcile.retry_attempts".into(),
            reason: "must be at least 1 (the first attempt counts)".into(),
        });
    }

    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the provider access token: environment variable first, then
/// plaintext config.
pub fn resolve_token(provider: &Provider) -> Result<SecretString, ConfigError> {
    if let Ok(val) = std::env::var(&provider.token_env) {
        if !val.is_empty() {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(ref token) = provider.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        hint: provider.token_env.clone(),
    })
}

// ── Translation to core/api structs ─────────────────────────────────

impl Config {
    pub fn transport(&self) -> TransportConfig {
        let tls = if self.transport.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.transport.ca_cert {
            TlsMode::CustomCa(ca_path.clone())
        } else {
            TlsMode::System
        };

        TransportConfig {
            tls,
            timeout: Duration::from_secs(self.transport.timeout_secs),
        }
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            concurrency: self.reconcile.concurrency,
            reconcile: ReconcileOptions {
                retry: RetryPolicy {
                    attempts: self.reconcile.retry_attempts,
                    base_delay: Duration::from_millis(self.reconcile.retry_base_ms),
                },
                sync_description: self.reconcile.sync_description,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert!(config.projects.is_empty());
        assert_eq!(config.reconcile.concurrency, 8);
        assert!(config.reconcile.sync_description);
        assert_eq!(config.provider.priority, 1000);
    }

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
projects = ["acme-prod", "acme-staging"]

[provider]
network = "global/networks/corp"

[reconcile]
concurrency = 2
sync_description = false
"#
        )
        .unwrap();

        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.projects, vec!["acme-prod", "acme-staging"]);
        assert_eq!(config.provider.network, "global/networks/corp");
        assert_eq!(config.reconcile.concurrency, 2);
        assert!(!config.reconcile.sync_description);
        // Unset fields keep their defaults.
        assert_eq!(config.transport.timeout_secs, 30);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let result = load_config_from(Path::new("/nonexistent/fwsync.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[provider]\nbase_url = \"not a url\"").unwrap();

        let result = load_config_from(file.path());
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn zero_retry_attempts_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[reconcile]\nretry_attempts = 0").unwrap();

        let result = load_config_from(file.path());
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn token_resolution_prefers_env() {
        use secrecy::ExposeSecret;

        let provider = Provider {
            token_env: "FWSYNC_TEST_TOKEN_UNSET".into(),
            token: Some("plaintext-token".into()),
            ..Provider::default()
        };
        let token = resolve_token(&provider).unwrap();
        assert_eq!(token.expose_secret(), "plaintext-token");

        let no_token = Provider {
            token_env: "FWSYNC_TEST_TOKEN_UNSET".into(),
            token: None,
            ..Provider::default()
        };
        assert!(matches!(
            resolve_token(&no_token),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn translates_transport_and_batch_options() {
        let mut config = Config::default();
        config.transport.insecure = true;
        config.transport.timeout_secs = 5;
        config.reconcile.retry_attempts = 4;
        config.reconcile.retry_base_ms = 100;

        let transport = config.transport();
        assert!(matches!(transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(transport.timeout, Duration::from_secs(5));

        let batch = config.batch_options();
        assert_eq!(batch.reconcile.retry.attempts, 4);
        assert_eq!(
            batch.reconcile.retry.base_delay,
            Duration::from_millis(100)
        );
    }
}
