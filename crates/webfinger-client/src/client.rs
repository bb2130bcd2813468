//! Async WebFinger resolver.
//!
//! The [`WebFingerClient`] issues the well-known GET and hands the response
//! body to the parser selected by content negotiation. One client holds one
//! `reqwest` connection pool; dropping the client releases it.
//!
//! # Usage
//!
//! ```rust,no_run
//! use webfinger_client::WebFingerClient;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = WebFingerClient::new();
//!     let jrd = client.finger("alice@example.com", None).await.unwrap();
//!     println!("{}", jrd.subject());
//! }
//! ```

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{self, HeaderValue};
use tracing::debug;
use url::Url;
use webfinger_core::Jrd;

use crate::accept;
use crate::endpoints;
use crate::error::{WebFingerError, WebFingerResult};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ─── Client ──────────────────────────────────────────────────────────────────

/// Async client for the `/.well-known/webfinger` endpoint.
///
/// Every finger call issues exactly one GET; there are no implicit retries
/// and no parallel fan-out. The configured timeout bounds each request and
/// surfaces as a network error when exceeded.
pub struct WebFingerClient {
    http: Client,
    accept: HeaderValue,
    official: bool,
}

impl WebFingerClient {
    /// Create a client with the default 30 second timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("webfinger-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build reqwest client");
        Self::from_http(http)
    }

    /// Reuse a caller-configured `reqwest::Client`. Timeout and User-Agent
    /// are then the caller's responsibility.
    pub fn from_http(http: Client) -> Self {
        let accept = HeaderValue::from_str(&accept::accept_header())
            .expect("accept header is valid ASCII");
        Self { http, accept, official: false }
    }

    /// Query provider hosts directly, skipping the unofficial-mirror
    /// rewrite for hosts that never deployed WebFinger.
    pub fn official_only(mut self) -> Self {
        self.official = true;
        self
    }

    // ── Resolution ──────────────────────────────────────────────────────────

    /// Resolve `resource` into a descriptor, optionally asking the server
    /// to filter links to one relation.
    pub async fn finger(&self, resource: &str, rel: Option<&str>) -> WebFingerResult<Jrd> {
        self.finger_at(resource, None, rel).await
    }

    /// Resolve `resource` against an explicit `host` instead of the one
    /// derived from the identifier.
    pub async fn finger_at(
        &self,
        resource: &str,
        host: Option<&str>,
        rel: Option<&str>,
    ) -> WebFingerResult<Jrd> {
        let response = self.fetch(resource, host, rel).await?;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .ok_or(WebFingerError::MissingContentType)?;
        let media = match content_type.to_str() {
            Ok(value) => accept::media_type(value).to_owned(),
            Err(_) => {
                let raw = String::from_utf8_lossy(content_type.as_bytes()).into_owned();
                return Err(WebFingerError::Content(raw));
            }
        };
        debug!("response content type: {media}");

        let Some(parser) = accept::parser_for(&media) else {
            return Err(WebFingerError::Content(media));
        };

        let body = response.text().await?;
        Ok(parser.parse(&body)?)
    }

    /// Fetch the raw response body without content-type checking or
    /// parsing.
    pub async fn finger_raw(
        &self,
        resource: &str,
        host: Option<&str>,
        rel: Option<&str>,
    ) -> WebFingerResult<String> {
        let response = self.fetch(resource, host, rel).await?;
        Ok(response.text().await?)
    }

    /// Issue the well-known GET and check the response status.
    async fn fetch(
        &self,
        resource: &str,
        host: Option<&str>,
        rel: Option<&str>,
    ) -> WebFingerResult<reqwest::Response> {
        let host = match host {
            Some(host) => host,
            None => endpoints::endpoint_host(endpoints::parse_host(resource), self.official),
        };
        let url = Url::parse(&format!("https://{host}/.well-known/webfinger"))?;

        let mut query = vec![("resource", resource)];
        if let Some(rel) = rel {
            query.push(("rel", rel));
        }

        debug!("fetching JRD from {url}");
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, self.accept.clone())
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebFingerError::Http { host: host.to_owned(), status });
        }
        Ok(response)
    }
}

impl Default for WebFingerClient {
    fn default() -> Self {
        Self::new()
    }
}
