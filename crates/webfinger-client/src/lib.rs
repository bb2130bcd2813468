//! # webfinger-client
//!
//! Async resolver for WebFinger (RFC 7033).
//!
//! Given an identifier like `alice@example.com`, the resolver derives the
//! serving host, issues a GET against `/.well-known/webfinger`, negotiates
//! an acceptable content type, and parses the response into a
//! [`Jrd`](webfinger_core::Jrd) from `webfinger-core`.
//!
//! ## Key concepts
//!
//! - **Client** ([`WebFingerClient`], `client.rs`): reusable resolver with a
//!   pooled HTTP connection, a bounded per-request timeout, and no implicit
//!   retries.
//! - **Content negotiation** ([`Parser`], `accept.rs`): the fixed preference
//!   list of media types and the wire parser each one selects.
//! - **Host derivation** (`endpoints.rs`): identifier-to-host parsing plus
//!   the unofficial-mirror table for providers without WebFinger support.
//!
//! One-shot lookups can skip client construction:
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), webfinger_client::WebFingerError> {
//! let jrd = webfinger_client::finger("alice@example.com", None).await?;
//! # Ok(())
//! # }
//! ```

pub mod accept;
pub mod client;
pub mod endpoints;
pub mod error;

pub use accept::Parser;
pub use client::WebFingerClient;
pub use error::{WebFingerError, WebFingerResult};

use webfinger_core::Jrd;

/// Resolve `resource` with a transient default client.
pub async fn finger(resource: &str, rel: Option<&str>) -> WebFingerResult<Jrd> {
    WebFingerClient::new().finger(resource, rel).await
}
