//! Relation name table.
//!
//! WebFinger link relations are identified by long canonical URIs. A handful
//! of well-known relations also carry short mnemonic names (`profile`,
//! `avatar`, ...) that callers may use interchangeably with the URI form.
//! The table is fixed at compile time and never mutated, so unsynchronised
//! concurrent reads are safe.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Canonical relation URI → mnemonic, in mnemonic alphabetical order.
const REL_TABLE: [(&str, &str); 9] = [
    ("http://activitystrea.ms/spec/1.0", "activity_streams"),
    ("http://webfinger.net/rel/avatar", "avatar"),
    ("http://microformats.org/profile/hcard", "hcard"),
    ("http://specs.openid.net/auth/2.0/provider", "open_id"),
    ("http://ns.opensocial.org/2008/opensocial/activitystreams", "opensocial"),
    ("http://portablecontacts.net/spec/1.0", "portable_contacts"),
    ("http://webfinger.net/rel/profile-page", "profile"),
    ("http://webfist.org/spec/rel", "webfist"),
    ("http://gmpg.org/xfn/11", "xfn"),
];

fn uri_to_name_map() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| REL_TABLE.iter().copied().collect())
}

fn name_to_uri_map() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| REL_TABLE.iter().map(|&(uri, name)| (name, uri)).collect())
}

/// Map a canonical relation URI to its mnemonic. Unknown URIs pass through
/// unchanged.
pub fn uri_to_name(uri: &str) -> &str {
    uri_to_name_map().get(uri).copied().unwrap_or(uri)
}

/// Map a mnemonic to its canonical relation URI. Unknown names pass through
/// unchanged.
pub fn name_to_uri(name: &str) -> &str {
    name_to_uri_map().get(name).copied().unwrap_or(name)
}

/// The full `(canonical URI, mnemonic)` table.
pub fn table() -> &'static [(&'static str, &'static str)] {
    &REL_TABLE
}
