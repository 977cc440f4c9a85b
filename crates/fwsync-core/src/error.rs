// ── Core error types ──
//
// Per-rule failures from fwsync-core. These are NOT transport-specific --
// consumers never see reqwest errors or JSON parse failures directly.
// The `From<fwsync_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants, preserving the transient/permanent
// classification that drives retry decisions.

use thiserror::Error;

/// Error type for everything the core crate does.
///
/// Every variant renders to a human-readable reason string; `Failed`
/// outcomes carry that string verbatim, so nothing is silently swallowed.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The IP list endpoint was unreachable, returned a non-success
    /// status, or the response could not be read. Fatal to one rule only.
    #[error("fetching IP list from {url} failed: {message}")]
    Fetch { url: String, message: String },

    /// The provider rejected or failed a read/write on the rule store.
    #[error("firewall store error: {message}")]
    Store {
        message: String,
        /// Provider error code (e.g. `PERMISSION_DENIED`), when present.
        code: Option<String>,
        /// Whether a bounded retry is worthwhile (timeouts, 5xx, 429).
        transient: bool,
    },

    /// A malformed rule spec, detected before any fetch/store traffic.
    #[error("invalid rule spec: {message}")]
    Config { message: String },

    /// A bug on our side (should not happen in normal operation).
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` if this error is worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Store { transient: true, .. })
    }

    /// Wrap an api-layer error from an IP list fetch, carrying the URL.
    pub fn fetch(url: &url::Url, err: &fwsync_api::Error) -> Self {
        Self::Fetch {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────
//
// This covers the store path; fetch errors are wrapped explicitly via
// `CoreError::fetch` because only the caller knows the URL.

impl From<fwsync_api::Error> for CoreError {
    fn from(err: fwsync_api::Error) -> Self {
        let transient = err.is_transient();
        match err {
            fwsync_api::Error::Authentication { message } => CoreError::Store {
                message: format!("authentication failed: {message}"),
                code: None,
                transient: false,
            },
            fwsync_api::Error::Api {
                message,
                code,
                status,
            } => CoreError::Store {
                message: format!("HTTP {status}: {message}"),
                code,
                transient,
            },
            fwsync_api::Error::Http { status, message } => CoreError::Store {
                message: format!("HTTP {status}: {message}"),
                code: None,
                transient,
            },
            fwsync_api::Error::Transport(e) => CoreError::Store {
                message: e.to_string(),
                code: None,
                transient,
            },
            fwsync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            fwsync_api::Error::Tls(message) => CoreError::Store {
                message: format!("TLS error: {message}"),
                code: None,
                transient: false,
            },
            fwsync_api::Error::Deserialization { message, .. } => {
                CoreError::Internal(format!("deserialization error: {message}"))
            }
        }
    }
}
