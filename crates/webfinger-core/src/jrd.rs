//! The JRD resource descriptor.
//!
//! [`Jrd`] is the root entity of a WebFinger response: a subject identifier
//! plus aliases, properties, and an ordered list of link relations. One type
//! serves both directions of the data flow. Parsing a wire document (JSON or
//! legacy XRD) and building a response incrementally converge on the same
//! invariants:
//!
//! - `subject` is always present;
//! - every link appears in exactly one bucket of the relation index, keyed
//!   by its mnemonic-resolved `rel`, in `links` order;
//! - the raw key-ordered document and the derived fields never diverge — a
//!   rejected mutation leaves both untouched.

use std::collections::HashMap;

use serde_json::Value;

use crate::JsonMap;
use crate::error::{RdError, RdResult};
use crate::link::{self, Link, LinkBuilder};
use crate::rels;
use crate::validation::is_uri;
use crate::xrd;

/// A WebFinger resource descriptor.
///
/// Holds the raw wire document alongside derived, validated fields. All
/// mutation goes through the `add_*` methods, which validate first and only
/// then commit to both representations.
#[derive(Debug, Clone, PartialEq)]
pub struct Jrd {
    raw: JsonMap,
    subject: String,
    aliases: Vec<String>,
    properties: JsonMap,
    links: Vec<Link>,
    /// Relation index: mnemonic-resolved rel → positions in `links`.
    link_rels: HashMap<String, Vec<usize>>,
}

impl Jrd {
    // ── Construction ─────────────────────────────────────────────────────────

    /// Parse a decoded JSON value as a JRD.
    pub fn from_value(value: Value) -> RdResult<Self> {
        match value {
            Value::Object(map) => Self::from_map(map),
            _ => Err(RdError::NotAnObject),
        }
    }

    /// Parse a key-ordered mapping as a JRD.
    pub fn from_map(raw: JsonMap) -> RdResult<Self> {
        let subject = match raw.get("subject") {
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(RdError::InvalidField {
                    field: "subject",
                    reason: "must be a string",
                });
            }
            None => return Err(RdError::MissingSubject),
        };

        let aliases = match raw.get("aliases") {
            None => Vec::new(),
            Some(Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => out.push(s.clone()),
                        _ => {
                            return Err(RdError::InvalidField {
                                field: "aliases",
                                reason: "must be strings",
                            });
                        }
                    }
                }
                out
            }
            Some(_) => {
                return Err(RdError::InvalidField {
                    field: "aliases",
                    reason: "must be an array",
                });
            }
        };

        let properties = match raw.get("properties") {
            None => JsonMap::new(),
            Some(value) => link::expect_properties(value.clone())?,
        };

        let mut links = Vec::new();
        match raw.get("links") {
            None => {}
            Some(Value::Array(items)) => {
                links.reserve(items.len());
                for item in items {
                    links.push(Link::from_value(item.clone())?);
                }
            }
            Some(_) => {
                return Err(RdError::InvalidField {
                    field: "links",
                    reason: "must be an array",
                });
            }
        }

        let mut link_rels: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, l) in links.iter().enumerate() {
            link_rels
                .entry(rels::uri_to_name(l.rel()).to_owned())
                .or_default()
                .push(idx);
        }

        Ok(Self { raw, subject, aliases, properties, links, link_rels })
    }

    /// Parse a JSON-encoded JRD string.
    pub fn from_json(text: &str) -> RdResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Parse a legacy XRD (XML) document.
    pub fn from_xml(text: &str) -> RdResult<Self> {
        Self::from_map(xrd::parse(text)?)
    }

    /// Start a minimal descriptor for `subject`.
    ///
    /// The subject must look like `user@host`; the `acct:` scheme is
    /// prepended when missing.
    pub fn build(subject: &str) -> RdResult<Self> {
        if !subject.contains('@') {
            return Err(RdError::InvalidField {
                field: "subject",
                reason: "must be in user@host format",
            });
        }
        let subject = if subject.starts_with("acct:") {
            subject.to_owned()
        } else {
            format!("acct:{subject}")
        };

        let mut raw = JsonMap::new();
        raw.insert("subject".to_owned(), Value::String(subject.clone()));
        Ok(Self {
            raw,
            subject,
            aliases: Vec::new(),
            properties: JsonMap::new(),
            links: Vec::new(),
            link_rels: HashMap::new(),
        })
    }

    // ── Access ───────────────────────────────────────────────────────────────

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn properties(&self) -> &JsonMap {
        &self.properties
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// The raw key-ordered wire document.
    pub fn raw(&self) -> &JsonMap {
        &self.raw
    }

    /// All links for `relation` (URI or mnemonic), in document order.
    ///
    /// Returns `None` when the document carries no such relation — absence
    /// is not an error.
    pub fn rel(&self, relation: &str) -> Option<Vec<&Link>> {
        let key = rels::uri_to_name(relation);
        let indices = self.link_rels.get(key)?;
        Some(indices.iter().map(|&i| &self.links[i]).collect())
    }

    /// The `attr` field of every link matching `relation`, in document
    /// order.
    ///
    /// Fails if any matching link lacks the field; callers that want
    /// absence-tolerant projection should walk [`Jrd::rel`] themselves.
    pub fn rel_values(&self, relation: &str, attr: &str) -> RdResult<Option<Vec<Value>>> {
        let Some(links) = self.rel(relation) else {
            return Ok(None);
        };
        let mut out = Vec::with_capacity(links.len());
        for l in links {
            match l.get(attr) {
                Some(value) => out.push(value),
                None => return Err(RdError::MissingLinkField(attr.to_owned())),
            }
        }
        Ok(Some(out))
    }

    // ── Mutation ─────────────────────────────────────────────────────────────
    // Every method validates before touching state, so the raw document and
    // the derived fields always move together.

    /// Append an alternate identifier.
    pub fn add_alias(&mut self, alias: &str) -> RdResult<()> {
        if !is_uri(alias) {
            return Err(RdError::InvalidField { field: "alias", reason: "must be a URI" });
        }
        self.aliases.push(alias.to_owned());
        let rebuilt = self.aliases.iter().cloned().map(Value::String).collect();
        self.raw.insert("aliases".to_owned(), Value::Array(rebuilt));
        Ok(())
    }

    /// Set a document-level property. A second call with the same URI
    /// overwrites.
    pub fn add_property(&mut self, uri: &str, value: Option<&str>) -> RdResult<()> {
        if !is_uri(uri) {
            return Err(RdError::InvalidField { field: "property", reason: "key must be a URI" });
        }
        let value = value.map_or(Value::Null, |v| Value::String(v.to_owned()));
        self.properties.insert(uri.to_owned(), value);
        self.raw
            .insert("properties".to_owned(), Value::Object(self.properties.clone()));
        Ok(())
    }

    /// Append a link. The builder's `rel` may be a mnemonic, which is stored
    /// in its long canonical form; lookup via [`Jrd::rel`] accepts either.
    pub fn add_link(&mut self, link: LinkBuilder) -> RdResult<()> {
        let mut map = link.into_map();

        let canonical_rel = match map.get("rel") {
            Some(Value::String(rel)) => {
                let canonical = rels::name_to_uri(rel);
                if !is_uri(canonical) {
                    return Err(RdError::InvalidField {
                        field: "rel",
                        reason: "must be a valid URI",
                    });
                }
                if canonical != rel.as_str() {
                    Some(canonical.to_owned())
                } else {
                    None
                }
            }
            // Missing or non-string rel is rejected by Link::from_map below.
            _ => None,
        };
        if let Some(canonical) = canonical_rel {
            map.insert("rel".to_owned(), Value::String(canonical));
        }

        let link = Link::from_map(map)?;
        let bucket = rels::uri_to_name(link.rel()).to_owned();

        match self.raw.get_mut("links") {
            Some(Value::Array(items)) => items.push(link.to_value()),
            _ => {
                self.raw
                    .insert("links".to_owned(), Value::Array(vec![link.to_value()]));
            }
        }
        self.links.push(link);
        self.link_rels
            .entry(bucket)
            .or_default()
            .push(self.links.len() - 1);
        Ok(())
    }

    /// Set an arbitrary top-level field on the raw document.
    ///
    /// Passthrough for forward-compatible fields the index does not need to
    /// understand; derived fields are deliberately untouched.
    pub fn add_misc(&mut self, key: impl Into<String>, value: Value) {
        self.raw.insert(key.into(), value);
    }

    // ── Serialisation ────────────────────────────────────────────────────────

    /// Serialise the raw document to a JSON string.
    pub fn to_json(&self) -> RdResult<String> {
        Ok(serde_json::to_string(&self.raw)?)
    }

    /// Serialise subject, aliases, properties, and links into the XRD 1.0
    /// XML dialect. Top-level extension fields have no XRD representation
    /// and are skipped.
    pub fn to_xml(&self) -> RdResult<String> {
        xrd::serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "subject": "acct:alice@example.com",
            "aliases": ["https://example.com/@alice",
                        "https://example.com/users/alice"],
            "properties": {"http://example.com/ns/role": "musician"},
            "links": [
                {"rel": "http://webfinger.net/rel/profile-page",
                 "href": "https://example.com/alice",
                 "type": "text/html"},
                {"rel": "self",
                 "href": "https://example.com/users/alice",
                 "type": "application/activity+json"},
                {"rel": "http://ostatus.org/schema/1.0/subscribe",
                 "template": "https://example.com/authorize_follow?acct={uri}"}
            ]
        })
    }

    #[test]
    fn parse_round_trip() {
        let once = Jrd::from_value(sample()).unwrap();
        let twice = Jrd::from_json(&once.to_json().unwrap()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_subject_is_fatal() {
        assert!(matches!(Jrd::from_value(json!({})), Err(RdError::MissingSubject)));
        assert!(matches!(Jrd::from_json("[]"), Err(RdError::NotAnObject)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(Jrd::from_json("{not json"), Err(RdError::Json(_))));
    }

    #[test]
    fn subject_only_document_gets_defaults() {
        let jrd = Jrd::from_value(json!({"subject": "acct:a@b"})).unwrap();
        assert_eq!(jrd.subject(), "acct:a@b");
        assert!(jrd.aliases().is_empty());
        assert!(jrd.properties().is_empty());
        assert!(jrd.links().is_empty());
    }

    #[test]
    fn rel_accepts_mnemonic_and_uri() {
        let jrd = Jrd::from_value(sample()).unwrap();
        let by_name = jrd.rel_values("profile", "href").unwrap().unwrap();
        let by_uri = jrd
            .rel_values("http://webfinger.net/rel/profile-page", "href")
            .unwrap()
            .unwrap();
        assert_eq!(by_name, vec![json!("https://example.com/alice")]);
        assert_eq!(by_name, by_uri);
    }

    #[test]
    fn unknown_relation_is_absent_not_an_error() {
        let jrd = Jrd::from_value(sample()).unwrap();
        assert!(jrd.rel("").is_none());
        assert!(jrd.rel("avatar").is_none());
        assert!(jrd.rel_values("avatar", "href").unwrap().is_none());
    }

    #[test]
    fn rel_values_requires_the_field_on_every_match() {
        let jrd = Jrd::from_value(sample()).unwrap();
        // The subscribe link has a template, not an href.
        let err = jrd
            .rel_values("http://ostatus.org/schema/1.0/subscribe", "href")
            .unwrap_err();
        assert!(matches!(err, RdError::MissingLinkField(f) if f == "href"));
    }

    #[test]
    fn unmapped_rel_falls_back_to_identity_both_ways() {
        let mut jrd = Jrd::build("alice@example.com").unwrap();
        jrd.add_link(LinkBuilder::new("http://example.com/rel/blog")).unwrap();
        let links = jrd.rel("http://example.com/rel/blog").unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].rel(), "http://example.com/rel/blog");
    }

    #[test]
    fn build_normalises_subject() {
        assert_eq!(Jrd::build("user@host").unwrap().subject(), "acct:user@host");
        assert_eq!(Jrd::build("acct:user@host").unwrap().subject(), "acct:user@host");
        assert!(matches!(
            Jrd::build("no-at-sign"),
            Err(RdError::InvalidField { field: "subject", .. })
        ));
    }

    #[test]
    fn add_link_canonicalises_mnemonics() {
        let mut jrd = Jrd::build("alice@example.com").unwrap();
        jrd.add_link(
            LinkBuilder::new("profile")
                .media_type("text/html")
                .href("https://example.com/alice"),
        )
        .unwrap();

        // Stored in long form, queryable by either.
        assert_eq!(jrd.links()[0].rel(), "http://webfinger.net/rel/profile-page");
        assert!(jrd.rel("profile").is_some());
        assert!(jrd.rel("http://webfinger.net/rel/profile-page").is_some());
    }

    #[test]
    fn rejected_link_leaves_document_unmodified() {
        let mut jrd = Jrd::build("alice@example.com").unwrap();
        jrd.add_link(LinkBuilder::new("self").href("https://example.com/u/alice")).unwrap();

        let before = jrd.clone();
        let err = jrd
            .add_link(LinkBuilder::new("http://test.example").field("type", json!(4)))
            .unwrap_err();
        assert!(matches!(err, RdError::InvalidField { field: "type", .. }));
        assert_eq!(jrd, before);

        let err = jrd.add_link(LinkBuilder::new("invalid")).unwrap_err();
        assert!(matches!(err, RdError::InvalidField { field: "rel", .. }));
        assert_eq!(jrd, before);

        let err = jrd
            .add_link(LinkBuilder::new("http://test.example").field("href", json!("invalid")))
            .unwrap_err();
        assert!(matches!(err, RdError::InvalidField { field: "href", .. }));
        assert_eq!(jrd, before);
    }

    #[test]
    fn rejected_alias_and_property_leave_document_unmodified() {
        let mut jrd = Jrd::build("alice@example.com").unwrap();
        let before = jrd.clone();

        assert!(jrd.add_alias("not a uri").is_err());
        assert!(jrd.add_property("not a uri", Some("x")).is_err());
        assert_eq!(jrd, before);
    }

    #[test]
    fn index_matches_insertion_order_per_bucket() {
        let mut jrd = Jrd::build("alice@example.com").unwrap();
        jrd.add_link(LinkBuilder::new("profile").href("https://example.com/one")).unwrap();
        jrd.add_link(LinkBuilder::new("self").href("https://example.com/actor")).unwrap();
        jrd.add_link(
            LinkBuilder::new("http://webfinger.net/rel/profile-page")
                .href("https://example.com/two"),
        )
        .unwrap();

        let hrefs = jrd.rel_values("profile", "href").unwrap().unwrap();
        assert_eq!(hrefs, vec![json!("https://example.com/one"), json!("https://example.com/two")]);
        assert_eq!(jrd.rel("self").unwrap().len(), 1);

        // Every link is indexed exactly once.
        let indexed: usize = ["profile", "self"]
            .iter()
            .map(|r| jrd.rel(r).map_or(0, |l| l.len()))
            .sum();
        assert_eq!(indexed, jrd.links().len());
    }

    #[test]
    fn property_overwrite_and_null_values() {
        let mut jrd = Jrd::build("alice@example.com").unwrap();
        jrd.add_property("http://example.com/ns/role", Some("musician")).unwrap();
        jrd.add_property("http://example.com/ns/role", Some("luthier")).unwrap();
        jrd.add_property("http://example.com/ns/retired", None).unwrap();

        assert_eq!(jrd.properties().get("http://example.com/ns/role"), Some(&json!("luthier")));
        assert_eq!(jrd.properties().get("http://example.com/ns/retired"), Some(&Value::Null));
    }

    #[test]
    fn add_misc_is_raw_only_passthrough() {
        let mut jrd = Jrd::build("alice@example.com").unwrap();
        jrd.add_misc("test-extra", json!("123"));

        assert_eq!(jrd.raw().get("test-extra"), Some(&json!("123")));
        let reparsed = Jrd::from_json(&jrd.to_json().unwrap()).unwrap();
        assert_eq!(reparsed.raw().get("test-extra"), Some(&json!("123")));
    }

    #[test]
    fn built_document_round_trips_like_a_parsed_one() {
        let mut built = Jrd::build("alice@example.com").unwrap();
        built.add_property("http://example.com/ns/role", Some("musician")).unwrap();
        built
            .add_link(
                LinkBuilder::new("profile")
                    .media_type("text/html")
                    .href("https://example.com/alice")
                    .field("test", json!("test extra param")),
            )
            .unwrap();
        built.add_alias("https://example.org/@alice").unwrap();
        built.add_misc("test-extra", json!("123"));

        let reparsed = Jrd::from_json(&built.to_json().unwrap()).unwrap();
        assert_eq!(reparsed.subject(), "acct:alice@example.com");
        assert_eq!(reparsed.aliases(), ["https://example.org/@alice"]);
        assert_eq!(
            reparsed.links()[0].to_value(),
            json!({"rel": "http://webfinger.net/rel/profile-page",
                   "type": "text/html",
                   "href": "https://example.com/alice",
                   "test": "test extra param"})
        );
        assert_eq!(reparsed, Jrd::from_value(Value::Object(built.raw().clone())).unwrap());
    }
}
