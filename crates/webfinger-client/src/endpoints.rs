//! Host derivation for finger requests.
//!
//! The host serving a resource's descriptor is the part of the identifier
//! after the last `@`. A few large providers never deployed WebFinger;
//! community-run mirrors answer for them, and lookups are rewritten to those
//! mirrors unless the caller insists on official endpoints only.

use tracing::debug;

/// Hosts with no WebFinger support and the unofficial endpoints that answer
/// for them.
const UNOFFICIAL_ENDPOINTS: [(&str, &str); 2] = [
    ("facebook.com", "facebook-webfinger.appspot.com"),
    ("twitter.com", "twitter-webfinger.appspot.com"),
];

/// The host part of a resource identifier: everything after the last `@`.
///
/// Identifiers without an `@` are returned whole and will fail resolution
/// later with a transport error, matching how an unknown host fails.
pub fn parse_host(resource: &str) -> &str {
    resource.rsplit('@').next().unwrap_or(resource)
}

/// The endpoint host to query for `host`, applying the unofficial-mirror
/// rewrite unless `official` is set.
pub(crate) fn endpoint_host<'a>(host: &'a str, official: bool) -> &'a str {
    if official {
        return host;
    }
    match UNOFFICIAL_ENDPOINTS.iter().find(|(h, _)| *h == host) {
        Some(&(_, mirror)) => {
            debug!("host {host} has no official endpoint, using {mirror}");
            mirror
        }
        None => host,
    }
}
