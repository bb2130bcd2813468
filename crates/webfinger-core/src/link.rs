//! Link entries of a resource descriptor.
//!
//! A [`Link`] is one entry of the JRD `links` array: a required relation
//! type plus optional metadata about the link target. The JRD format is
//! extensible, so unknown fields are preserved verbatim rather than
//! rejected.

use serde_json::Value;

use crate::JsonMap;
use crate::error::{RdError, RdResult};
use crate::validation::is_uri;

/// A single link relation of a JRD document.
///
/// The named fields mirror RFC 7033 §4.4.4; everything else the peer sent
/// lives in the extension map in insertion order. A field that is absent
/// reads as `None` from the named accessors and as absent from [`Link::get`],
/// which keeps it distinguishable from an explicit JSON `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    rel: String,
    media_type: Option<String>,
    href: Option<String>,
    titles: Option<JsonMap>,
    properties: Option<JsonMap>,
    extra: JsonMap,
}

impl Link {
    /// Build a link from one untrusted element of a `links` array.
    pub(crate) fn from_value(value: Value) -> RdResult<Self> {
        match value {
            Value::Object(map) => Self::from_map(map),
            _ => Err(RdError::InvalidField {
                field: "links",
                reason: "entries must be objects",
            }),
        }
    }

    /// Build a link from a key-ordered field map, validating every named
    /// field's shape. Extension fields pass through untouched.
    pub(crate) fn from_map(map: JsonMap) -> RdResult<Self> {
        let mut rel = None;
        let mut media_type = None;
        let mut href = None;
        let mut titles = None;
        let mut properties = None;
        let mut extra = JsonMap::new();

        for (key, value) in map {
            match key.as_str() {
                "rel" => match value {
                    Value::String(s) if !s.is_empty() => rel = Some(s),
                    _ => {
                        return Err(RdError::InvalidField {
                            field: "rel",
                            reason: "must be a non-empty string",
                        });
                    }
                },
                "type" => match value {
                    Value::String(s) => media_type = Some(s),
                    _ => {
                        return Err(RdError::InvalidField {
                            field: "type",
                            reason: "must be a string",
                        });
                    }
                },
                "href" => match value {
                    Value::String(s) if is_uri(&s) => href = Some(s),
                    Value::String(_) => {
                        return Err(RdError::InvalidField {
                            field: "href",
                            reason: "must be a valid URI",
                        });
                    }
                    _ => {
                        return Err(RdError::InvalidField {
                            field: "href",
                            reason: "must be a string",
                        });
                    }
                },
                "titles" => titles = Some(expect_titles(value)?),
                "properties" => properties = Some(expect_properties(value)?),
                _ => {
                    extra.insert(key, value);
                }
            }
        }

        let rel = rel.ok_or(RdError::InvalidField {
            field: "rel",
            reason: "is required",
        })?;

        Ok(Self { rel, media_type, href, titles, properties, extra })
    }

    /// The relation type, always present.
    pub fn rel(&self) -> &str {
        &self.rel
    }

    /// Advisory MIME type of the link target (wire key `type`).
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    /// Target URI of the link.
    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    /// Human-readable labels, keyed by title text with language-tag values.
    pub fn titles(&self) -> Option<&JsonMap> {
        self.titles.as_ref()
    }

    /// Link-level properties: URI keys with string-or-null values.
    pub fn properties(&self) -> Option<&JsonMap> {
        self.properties.as_ref()
    }

    /// Extension fields preserved verbatim from the wire.
    pub fn extra(&self) -> &JsonMap {
        &self.extra
    }

    /// Look up any field by wire name, named or extension.
    ///
    /// Returns `None` for fields that are not present.
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "rel" => Some(Value::String(self.rel.clone())),
            "type" => self.media_type.clone().map(Value::String),
            "href" => self.href.clone().map(Value::String),
            "titles" => self.titles.clone().map(Value::Object),
            "properties" => self.properties.clone().map(Value::Object),
            _ => self.extra.get(key).cloned(),
        }
    }

    /// All present fields as `(wire key, value)` pairs: the named fields
    /// first, then extensions in insertion order.
    pub fn entries(&self) -> Vec<(&str, Value)> {
        let mut out = Vec::with_capacity(self.len());
        out.push(("rel", Value::String(self.rel.clone())));
        if let Some(t) = &self.media_type {
            out.push(("type", Value::String(t.clone())));
        }
        if let Some(h) = &self.href {
            out.push(("href", Value::String(h.clone())));
        }
        if let Some(t) = &self.titles {
            out.push(("titles", Value::Object(t.clone())));
        }
        if let Some(p) = &self.properties {
            out.push(("properties", Value::Object(p.clone())));
        }
        for (key, value) in &self.extra {
            out.push((key.as_str(), value.clone()));
        }
        out
    }

    /// Number of present fields.
    pub fn len(&self) -> usize {
        1 + self.media_type.is_some() as usize
            + self.href.is_some() as usize
            + self.titles.is_some() as usize
            + self.properties.is_some() as usize
            + self.extra.len()
    }

    pub fn is_empty(&self) -> bool {
        false // rel is always present
    }

    /// The wire-format JSON object for this link.
    pub fn to_value(&self) -> Value {
        let mut map = JsonMap::new();
        for (key, value) in self.entries() {
            map.insert(key.to_owned(), value);
        }
        Value::Object(map)
    }
}

fn expect_titles(value: Value) -> RdResult<JsonMap> {
    let Value::Object(map) = value else {
        return Err(RdError::InvalidField { field: "titles", reason: "must be a mapping" });
    };
    for title_value in map.values() {
        if !title_value.is_string() {
            return Err(RdError::InvalidField {
                field: "titles",
                reason: "languages must be strings",
            });
        }
    }
    Ok(map)
}

/// Shared by link-level and document-level `properties` maps.
pub(crate) fn expect_properties(value: Value) -> RdResult<JsonMap> {
    let Value::Object(map) = value else {
        return Err(RdError::InvalidField { field: "properties", reason: "must be a mapping" });
    };
    for (key, prop_value) in &map {
        if !is_uri(key) {
            return Err(RdError::InvalidField {
                field: "properties",
                reason: "keys must be URIs",
            });
        }
        if !(prop_value.is_string() || prop_value.is_null()) {
            return Err(RdError::InvalidField {
                field: "properties",
                reason: "values must be strings or null",
            });
        }
    }
    Ok(map)
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Accumulates the fields of a link to be committed with
/// [`Jrd::add_link`](crate::Jrd::add_link).
///
/// The builder itself performs no validation; everything is checked when the
/// link is added to a document, so a rejected link never leaves a partially
/// mutated document behind.
#[derive(Debug, Clone, Default)]
pub struct LinkBuilder {
    map: JsonMap,
}

impl LinkBuilder {
    /// Start a link for `rel`, either a relation URI or a known mnemonic.
    pub fn new(rel: impl Into<String>) -> Self {
        let mut map = JsonMap::new();
        map.insert("rel".to_owned(), Value::String(rel.into()));
        Self { map }
    }

    /// Advisory MIME type of the link target.
    pub fn media_type(mut self, media_type: impl Into<String>) -> Self {
        self.map.insert("type".to_owned(), Value::String(media_type.into()));
        self
    }

    /// Target URI of the link.
    pub fn href(mut self, href: impl Into<String>) -> Self {
        self.map.insert("href".to_owned(), Value::String(href.into()));
        self
    }

    /// Add one title with its language tag.
    pub fn title(mut self, title: impl Into<String>, language: impl Into<String>) -> Self {
        let titles = self
            .map
            .entry("titles")
            .or_insert_with(|| Value::Object(JsonMap::new()));
        if let Value::Object(map) = titles {
            map.insert(title.into(), Value::String(language.into()));
        }
        self
    }

    /// Add one link-level property.
    pub fn property(mut self, uri: impl Into<String>, value: Option<&str>) -> Self {
        let properties = self
            .map
            .entry("properties")
            .or_insert_with(|| Value::Object(JsonMap::new()));
        if let Value::Object(map) = properties {
            map.insert(uri.into(), value.map_or(Value::Null, |v| Value::String(v.to_owned())));
        }
        self
    }

    /// Set an arbitrary field. Named fields set this way are still validated
    /// on commit; unknown fields pass through unvalidated.
    pub fn field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.map.insert(key.into(), value);
        self
    }

    pub(crate) fn into_map(self) -> JsonMap {
        self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn link(value: Value) -> RdResult<Link> {
        Link::from_value(value)
    }

    #[test]
    fn minimal_link() {
        let l = link(json!({"rel": "self"})).unwrap();
        assert_eq!(l.rel(), "self");
        assert_eq!(l.media_type(), None);
        assert_eq!(l.href(), None);
        assert_eq!(l.len(), 1);
    }

    #[test]
    fn named_and_extension_fields() {
        let l = link(json!({
            "rel": "http://webfinger.net/rel/profile-page",
            "type": "text/html",
            "href": "https://example.com/alice",
            "template": "https://example.com/follow?acct={uri}"
        }))
        .unwrap();
        assert_eq!(l.media_type(), Some("text/html"));
        assert_eq!(l.href(), Some("https://example.com/alice"));
        assert_eq!(
            l.get("template"),
            Some(json!("https://example.com/follow?acct={uri}"))
        );
        assert_eq!(l.get("missing"), None);
        assert_eq!(l.len(), 4);
    }

    #[test]
    fn rel_is_required() {
        assert!(matches!(
            link(json!({"href": "https://example.com"})),
            Err(RdError::InvalidField { field: "rel", .. })
        ));
        assert!(matches!(
            link(json!({"rel": ""})),
            Err(RdError::InvalidField { field: "rel", .. })
        ));
    }

    #[test]
    fn non_string_type_rejected() {
        assert!(matches!(
            link(json!({"rel": "self", "type": 4})),
            Err(RdError::InvalidField { field: "type", .. })
        ));
    }

    #[test]
    fn href_must_be_uri_shaped() {
        assert!(matches!(
            link(json!({"rel": "self", "href": "invalid"})),
            Err(RdError::InvalidField { field: "href", .. })
        ));
        assert!(matches!(
            link(json!({"rel": "self", "href": 42})),
            Err(RdError::InvalidField { field: "href", .. })
        ));
    }

    #[test]
    fn titles_shape_checked() {
        assert!(matches!(
            link(json!({"rel": "self", "titles": "nope"})),
            Err(RdError::InvalidField { field: "titles", .. })
        ));
        assert!(matches!(
            link(json!({"rel": "self", "titles": {"Home": 3}})),
            Err(RdError::InvalidField { field: "titles", .. })
        ));
        let l = link(json!({"rel": "self", "titles": {"Home": "en"}})).unwrap();
        assert_eq!(l.titles().unwrap().get("Home"), Some(&json!("en")));
    }

    #[test]
    fn properties_shape_checked() {
        assert!(matches!(
            link(json!({"rel": "self", "properties": {"not-a-uri": "x"}})),
            Err(RdError::InvalidField { field: "properties", .. })
        ));
        assert!(matches!(
            link(json!({"rel": "self", "properties": {"http://k.example": 9}})),
            Err(RdError::InvalidField { field: "properties", .. })
        ));
        let l = link(json!({"rel": "self", "properties": {"http://k.example": null}})).unwrap();
        assert_eq!(l.properties().unwrap().get("http://k.example"), Some(&Value::Null));
    }

    #[test]
    fn round_trips_to_wire_object() {
        let wire = json!({
            "rel": "self",
            "type": "application/activity+json",
            "href": "https://example.com/users/alice",
            "titles": {"Alice": "en"},
            "properties": {"http://k.example": null},
            "busy": true
        });
        let l = link(wire.clone()).unwrap();
        assert_eq!(l.to_value(), wire);
    }
}
