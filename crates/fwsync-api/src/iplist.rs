// Plain-text IP allow-list fetching.
//
// Vendors publish their source IPs as newline-delimited text at a stable
// URL. The response is split on line boundaries, trimmed, and deduplicated;
// no address-format validation happens here -- the provider rejects
// malformed entries at write time, which is where that failure belongs.

use std::collections::BTreeSet;

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Fetches newline-delimited IP/CIDR lists over HTTP.
pub struct IpListClient {
    http: reqwest::Client,
}

impl IpListClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch the list at `url` and return the distinct non-blank lines.
    ///
    /// An empty body is a valid (empty) list, not an error -- a vendor that
    /// currently publishes no addresses still gets its rule written.
    /// Non-2xx statuses and transport failures map to [`Error`].
    pub async fn fetch(&self, url: &Url) -> Result<BTreeSet<String>, Error> {
        debug!("GET {url}");

        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                message: body[..body.len().min(200)].to_owned(),
            });
        }

        let body = resp.text().await?;
        let entries = parse_ip_list(&body);
        debug!(count = entries.len(), "fetched IP list from {url}");
        Ok(entries)
    }
}

/// Split a response body into distinct non-blank lines.
pub fn parse_ip_list(body: &str) -> BTreeSet<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}
