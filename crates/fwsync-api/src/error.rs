use thiserror::Error;

/// Top-level error type for the `fwsync-api` crate.
///
/// Covers every failure mode across both transport surfaces: the plain-text
/// IP list endpoints and the provider firewall API. `fwsync-core` maps these
/// into its own taxonomy and never exposes them raw.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Authentication ──────────────────────────────────────────────
    /// The provider rejected our credentials.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Provider API ────────────────────────────────────────────────
    /// Structured error parsed from the provider's JSON error envelope.
    #[error("Provider API error (HTTP {status}): {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: u16,
    },

    // ── Plain HTTP ──────────────────────────────────────────────────
    /// Non-success status with no structured body (e.g. an IP list
    /// endpoint returning 500).
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } | Self::Http { status, .. } => {
                *status == 429 || *status >= 500
            }
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } | Self::Http { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Extract the provider error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
