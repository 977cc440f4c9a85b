// Hand-crafted async HTTP client for the provider's firewall REST API.
//
// Resource path: projects/{project}/global/firewalls[/{name}]
// Auth: Bearer token in the Authorization header

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::models::{ErrorResponse, FirewallResource};

/// Async client for the provider firewall API.
///
/// Uses bearer-token authentication and communicates via JSON REST
/// endpoints under the configured base URL (the production endpoint by
/// default; injectable for tests and regional endpoints).
pub struct FirewallClient {
    http: reqwest::Client,
    base_url: Url,
}

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://compute.googleapis.com/compute/v1/";

impl FirewallClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a pre-acquired access token and transport config.
    ///
    /// Injects `Authorization: Bearer …` as a default header on every
    /// request. Token acquisition (service accounts, metadata server) is
    /// the caller's concern.
    pub fn new(
        base_url: &str,
        token: &secrecy::SecretString,
        transport: &crate::TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid token header value: {e}"),
            })?;
        auth_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Parse and normalize the base URL so it always ends with `/`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if !url.path().ends_with('/') {
            url.set_path(&format!("{}/", url.path()));
        }
        Ok(url)
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}projects/{project}/global/firewalls`
    fn collection_url(&self, project: &str) -> Result<Url, Error> {
        Ok(self
            .base_url
            .join(&format!("projects/{project}/global/firewalls"))?)
    }

    /// `{base}projects/{project}/global/firewalls/{name}`
    fn resource_url(&self, project: &str, name: &str) -> Result<Url, Error> {
        Ok(self
            .base_url
            .join(&format!("projects/{project}/global/firewalls/{name}"))?)
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Read one firewall rule by name.
    ///
    /// A 404 means the rule does not exist and returns `Ok(None)` --
    /// callers decide whether absence is an error.
    pub async fn get_firewall(
        &self,
        project: &str,
        name: &str,
    ) -> Result<Option<FirewallResource>, Error> {
        let url = self.resource_url(project, name)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let firewall = handle_response(resp).await?;
        Ok(Some(firewall))
    }

    /// Create a firewall rule.
    pub async fn insert_firewall(
        &self,
        project: &str,
        firewall: &FirewallResource,
    ) -> Result<(), Error> {
        let url = self.collection_url(project)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(firewall).send().await?;
        check_status(resp).await
    }

    /// Replace a firewall rule in full.
    ///
    /// The provider applies the new allowed-set and source-ranges
    /// atomically; `firewall.fingerprint` should carry the value read from
    /// the existing rule so concurrent modification is detected.
    pub async fn update_firewall(
        &self,
        project: &str,
        name: &str,
        firewall: &FirewallResource,
    ) -> Result<(), Error> {
        let url = self.resource_url(project, name)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(firewall).send().await?;
        check_status(resp).await
    }
}

// ── Response handling ────────────────────────────────────────────────

/// Parse a JSON body, mapping error statuses through the provider's
/// error envelope.
async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(parse_error_body(status.as_u16(), &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        let preview = &body[..body.len().min(200)];
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}

/// Check status only, discarding the response body on success.
///
/// Mutating calls return a long-running operation object we don't
/// track -- the next reconciliation pass observes the settled state.
async fn check_status(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(parse_error_body(status.as_u16(), &body))
}

/// Map a non-success response to an [`Error`] via the provider envelope.
fn parse_error_body(status: u16, body: &str) -> Error {
    if let Ok(wrapper) = serde_json::from_str::<ErrorResponse>(body) {
        if let Some(err) = wrapper.error {
            let message = err.message.unwrap_or_default();
            if err.code == Some(401) || status == 401 {
                return Error::Authentication { message };
            }
            return Error::Api {
                message,
                code: err.status,
                status,
            };
        }
    }

    if status == 401 {
        return Error::Authentication {
            message: "invalid or expired access token".into(),
        };
    }

    Error::Http {
        status,
        message: body[..body.len().min(200)].to_owned(),
    }
}
