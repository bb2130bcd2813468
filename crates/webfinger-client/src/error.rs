//! Resolver-specific error types.

use thiserror::Error;

/// Errors that can occur while resolving a WebFinger resource.
///
/// Transport failures stay distinct from content failures, and document
/// errors from `webfinger-core` pass through transparently, so a caller can
/// tell an unreachable host from a hostile or broken response body.
#[derive(Debug, Error)]
pub enum WebFingerError {
    // ── Content ─────────────────────────────────────────────────────────────

    #[error("response carried no Content-Type header")]
    MissingContentType,

    #[error("unacceptable content type '{0}'")]
    Content(String),

    // ── Transport ───────────────────────────────────────────────────────────

    #[error("server '{host}' returned HTTP {status}")]
    Http {
        host: String,
        status: reqwest::StatusCode,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    // ── Document ────────────────────────────────────────────────────────────

    #[error(transparent)]
    Rd(#[from] webfinger_core::RdError),
}

/// Convenience type alias for Results using WebFingerError.
pub type WebFingerResult<T> = Result<T, WebFingerError>;
