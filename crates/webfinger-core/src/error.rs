//! Resource-descriptor error types.

use thiserror::Error;

/// Errors raised while parsing, mutating, or serialising a resource
/// descriptor.
///
/// Parse failures (malformed JSON or XML) are kept distinct from validation
/// failures (a well-formed document or builder argument with the wrong
/// shape), so callers can tell a broken wire payload from a caller bug.
#[derive(Debug, Error)]
pub enum RdError {
    // ── Parsing ─────────────────────────────────────────────────────────────
    #[error("error parsing JRD: {0}")]
    Json(#[from] serde_json::Error),

    #[error("error parsing XRD: {0}")]
    Xml(String),

    #[error("JRD must be a JSON object")]
    NotAnObject,

    #[error("subject is required in JRD")]
    MissingSubject,

    // ── Field validation ────────────────────────────────────────────────────
    #[error("invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },

    // ── Field access ────────────────────────────────────────────────────────
    #[error("link has no field '{0}'")]
    MissingLinkField(String),

    // ── XML serialisation ───────────────────────────────────────────────────
    #[error("cannot serialise link field '{0}' into XRD")]
    UnsupportedXmlField(String),
}

/// Convenience type alias for Results using RdError.
pub type RdResult<T> = Result<T, RdError>;
