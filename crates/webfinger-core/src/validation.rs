//! Input validation helpers.

/// Coarse syntactic URI check: true iff `s` contains a scheme separator.
///
/// This is deliberately not RFC 3986 conformance. It exists to catch the
/// common "forgot the scheme" mistake, and callers must not rely on it
/// rejecting every malformed URI.
pub fn is_uri(s: &str) -> bool {
    s.contains(':')
}
