//! Content negotiation for the well-known endpoint.
//!
//! The resolver accepts a fixed, priority-ordered set of media types. Each
//! acceptable type is bound at compile time to the wire parser that decodes
//! it, so content-type dispatch is an ordinary match instead of a lookup of
//! parser names at runtime.

use webfinger_core::{Jrd, RdResult};

/// Wire parser selected by content negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parser {
    /// `application/jrd+json` and legacy `application/json`.
    Json,
    /// Legacy `application/xrd+xml` and `application/xml`.
    Xml,
}

impl Parser {
    /// Decode a response body with this parser.
    pub fn parse(self, body: &str) -> RdResult<Jrd> {
        match self {
            Parser::Json => Jrd::from_json(body),
            Parser::Xml => Jrd::from_xml(body),
        }
    }
}

/// Acceptable media types, most to least preferred, with their relative
/// quality weights.
const ACCEPTABLE: [(&str, &str, Parser); 4] = [
    ("application/jrd+json", "1.0", Parser::Json),
    ("application/json", "0.9", Parser::Json),
    ("application/xrd+xml", "0.5", Parser::Xml),
    ("application/xml", "0.4", Parser::Xml),
];

/// The `Accept` header value sent with every finger request.
pub(crate) fn accept_header() -> String {
    let mut parts = Vec::with_capacity(ACCEPTABLE.len());
    for (media_type, weight, _) in ACCEPTABLE {
        if weight == "1.0" {
            parts.push(media_type.to_owned());
        } else {
            parts.push(format!("{media_type}; q={weight}"));
        }
    }
    parts.join(", ")
}

/// The parser bound to `media_type`, or `None` if the type is unacceptable.
pub(crate) fn parser_for(media_type: &str) -> Option<Parser> {
    ACCEPTABLE
        .iter()
        .find(|(accepted, _, _)| *accepted == media_type)
        .map(|&(_, _, parser)| parser)
}

/// Strip the parameters from a `Content-Type` header value.
pub(crate) fn media_type(content_type: &str) -> &str {
    content_type
        .split_once(';')
        .map_or(content_type, |(media, _)| media)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lists_types_by_preference() {
        assert_eq!(
            accept_header(),
            "application/jrd+json, application/json; q=0.9, \
             application/xrd+xml; q=0.5, application/xml; q=0.4"
        );
    }

    #[test]
    fn acceptable_types_map_to_their_parsers() {
        assert_eq!(parser_for("application/jrd+json"), Some(Parser::Json));
        assert_eq!(parser_for("application/json"), Some(Parser::Json));
        assert_eq!(parser_for("application/xrd+xml"), Some(Parser::Xml));
        assert_eq!(parser_for("application/xml"), Some(Parser::Xml));
        assert_eq!(parser_for("text/plain"), None);
        assert_eq!(parser_for("text/html"), None);
    }

    #[test]
    fn parameters_are_ignored() {
        assert_eq!(media_type("application/jrd+json; charset=utf-8"), "application/jrd+json");
        assert_eq!(media_type("application/json;charset=utf-8"), "application/json");
        assert_eq!(media_type(" application/xml "), "application/xml");
    }

    #[test]
    fn parsers_dispatch_to_the_right_codec() {
        let jrd = Parser::Json.parse(r#"{"subject": "acct:a@b"}"#).unwrap();
        assert_eq!(jrd.subject(), "acct:a@b");

        let xrd = Parser::Xml
            .parse(
                r#"<XRD xmlns="http://docs.oasis-open.org/ns/xri/xrd-1.0">
                     <Subject>acct:a@b</Subject></XRD>"#,
            )
            .unwrap();
        assert_eq!(xrd.subject(), "acct:a@b");

        assert!(Parser::Xml.parse(r#"{"subject": "acct:a@b"}"#).is_err());
    }
}
