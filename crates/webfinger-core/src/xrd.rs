//! XRD 1.0 wire codec.
//!
//! The legacy XML dialect of the resource descriptor. Parsing produces the
//! same key-ordered mapping shape as decoded JSON, so both wire formats
//! converge on one validation path in [`Jrd::from_map`](crate::Jrd::from_map).
//!
//! Input is untrusted network data; quick-xml performs no DTD or external
//! entity resolution, so entity-expansion payloads fail to parse instead of
//! being dereferenced.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use quick_xml::writer::Writer;
use serde_json::Value;

use crate::JsonMap;
use crate::error::{RdError, RdResult};
use crate::jrd::Jrd;

const XRD_NS: &str = "http://docs.oasis-open.org/ns/xri/xrd-1.0";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

fn xml_err(err: impl std::fmt::Display) -> RdError {
    RdError::Xml(err.to_string())
}

fn in_ns(resolution: &ResolveResult<'_>, ns: &str) -> bool {
    matches!(resolution, ResolveResult::Bound(Namespace(bound)) if *bound == ns.as_bytes())
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Parse an XRD document into the key-ordered mapping shape of a decoded
/// JRD.
pub(crate) fn parse(text: &str) -> RdResult<JsonMap> {
    let mut reader = NsReader::from_str(text);
    reader.config_mut().trim_text(true);

    // The root element must be an XRD in its canonical namespace.
    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(root) => {
                let (ns, local) = reader.resolve_element(root.name());
                if !in_ns(&ns, XRD_NS) || local.as_ref() != b"XRD" {
                    return Err(RdError::Xml("root element must be XRD".to_owned()));
                }
                break;
            }
            Event::Empty(root) => {
                let (ns, local) = reader.resolve_element(root.name());
                if !in_ns(&ns, XRD_NS) || local.as_ref() != b"XRD" {
                    return Err(RdError::Xml("root element must be XRD".to_owned()));
                }
                // A childless root cannot carry a subject.
                return Err(RdError::MissingSubject);
            }
            Event::Eof => return Err(RdError::Xml("document has no root element".to_owned())),
            _ => {}
        }
    }

    let mut subject = None;
    let mut aliases = Vec::new();
    let mut properties = JsonMap::new();
    let mut links = Vec::new();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(elem) => {
                let (ns, local) = reader.resolve_element(elem.name());
                if !in_ns(&ns, XRD_NS) {
                    // Foreign-namespace subtrees carry no JRD data.
                    reader.read_to_end(elem.name()).map_err(xml_err)?;
                    continue;
                }
                match local.as_ref() {
                    b"Subject" => {
                        let text = reader.read_text(elem.name()).map_err(xml_err)?;
                        subject = Some(text.into_owned());
                    }
                    b"Alias" => {
                        let text = reader.read_text(elem.name()).map_err(xml_err)?;
                        if text.is_empty() {
                            return Err(RdError::Xml("Alias element had no content".to_owned()));
                        }
                        aliases.push(Value::String(text.into_owned()));
                    }
                    b"Property" => {
                        let (key, value) = parse_property(&mut reader, &elem, false)?;
                        properties.insert(key, value);
                    }
                    b"Link" => links.push(parse_link(&mut reader, &elem, false)?),
                    _ => {
                        reader.read_to_end(elem.name()).map_err(xml_err)?;
                    }
                }
            }
            Event::Empty(elem) => {
                let (ns, local) = reader.resolve_element(elem.name());
                if !in_ns(&ns, XRD_NS) {
                    continue;
                }
                match local.as_ref() {
                    b"Subject" => subject = Some(String::new()),
                    b"Alias" => {
                        return Err(RdError::Xml("Alias element had no content".to_owned()));
                    }
                    b"Property" => {
                        let (key, value) = parse_property(&mut reader, &elem, true)?;
                        properties.insert(key, value);
                    }
                    b"Link" => links.push(parse_link(&mut reader, &elem, true)?),
                    _ => {}
                }
            }
            Event::End(_) => break,
            Event::Eof => {
                return Err(RdError::Xml("unexpected end of document".to_owned()));
            }
            _ => {}
        }
    }

    let Some(subject) = subject else {
        return Err(RdError::MissingSubject);
    };

    let mut map = JsonMap::new();
    map.insert("subject".to_owned(), Value::String(subject));
    if !aliases.is_empty() {
        map.insert("aliases".to_owned(), Value::Array(aliases));
    }
    if !properties.is_empty() {
        map.insert("properties".to_owned(), Value::Object(properties));
    }
    if !links.is_empty() {
        map.insert("links".to_owned(), Value::Array(links));
    }
    Ok(map)
}

/// Decode one `Property` element into its `(type, value)` pair. A property
/// with an `xsi:nil="true"` attribute or no text content reads as null.
fn parse_property(
    reader: &mut NsReader<&[u8]>,
    elem: &BytesStart<'_>,
    empty: bool,
) -> RdResult<(String, Value)> {
    let mut key = None;
    let mut nil = false;

    for attr in elem.attributes() {
        let attr = attr.map_err(xml_err)?;
        if attr.key.as_ref() == b"type" {
            key = Some(attr.unescape_value().map_err(xml_err)?.into_owned());
            continue;
        }
        let (ns, local) = reader.resolve_attribute(attr.key);
        // Some producers never declare the xsi prefix, so the raw qualified
        // name is accepted alongside a properly bound one.
        let is_nil = local.as_ref() == b"nil"
            && (in_ns(&ns, XSI_NS) || attr.key.as_ref() == b"xsi:nil");
        if is_nil {
            nil = attr
                .unescape_value()
                .map_err(xml_err)?
                .eq_ignore_ascii_case("true");
        }
    }

    let Some(key) = key else {
        return Err(RdError::Xml("Property element requires a type attribute".to_owned()));
    };

    let value = if empty {
        Value::Null
    } else {
        let text = reader.read_text(elem.name()).map_err(xml_err)?;
        if nil || text.is_empty() {
            Value::Null
        } else {
            Value::String(text.into_owned())
        }
    };
    Ok((key, value))
}

/// Decode one `Link` element: attributes become fields verbatim, nested
/// `Property` and `Title` children become the `properties` and `titles`
/// mappings.
fn parse_link(reader: &mut NsReader<&[u8]>, elem: &BytesStart<'_>, empty: bool) -> RdResult<Value> {
    let mut map = JsonMap::new();
    let mut titles = JsonMap::new();
    let mut properties = JsonMap::new();

    for attr in elem.attributes() {
        let attr = attr.map_err(xml_err)?;
        if attr.key.as_ref().starts_with(b"xmlns") {
            continue;
        }
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(xml_err)?;
        let value = attr.unescape_value().map_err(xml_err)?;
        map.insert(key.to_owned(), Value::String(value.into_owned()));
    }

    if !empty {
        loop {
            match reader.read_event().map_err(xml_err)? {
                Event::Start(child) => {
                    let (ns, local) = reader.resolve_element(child.name());
                    if in_ns(&ns, XRD_NS) && local.as_ref() == b"Property" {
                        let (key, value) = parse_property(reader, &child, false)?;
                        properties.insert(key, value);
                    } else if in_ns(&ns, XRD_NS) && local.as_ref() == b"Title" {
                        let lang = title_language(reader, &child)?;
                        let text = reader.read_text(child.name()).map_err(xml_err)?;
                        titles.insert(text.into_owned(), Value::String(lang));
                    } else {
                        reader.read_to_end(child.name()).map_err(xml_err)?;
                    }
                }
                Event::Empty(child) => {
                    let (ns, local) = reader.resolve_element(child.name());
                    if in_ns(&ns, XRD_NS) && local.as_ref() == b"Property" {
                        let (key, value) = parse_property(reader, &child, true)?;
                        properties.insert(key, value);
                    }
                    // An empty Title carries no text to key on.
                }
                Event::End(_) => break,
                Event::Eof => {
                    return Err(RdError::Xml("unexpected end of document".to_owned()));
                }
                _ => {}
            }
        }
    }

    if !titles.is_empty() {
        map.insert("titles".to_owned(), Value::Object(titles));
    }
    if !properties.is_empty() {
        map.insert("properties".to_owned(), Value::Object(properties));
    }
    Ok(Value::Object(map))
}

/// The `xml:lang` tag of a `Title` element, defaulting to `und`.
fn title_language(reader: &NsReader<&[u8]>, elem: &BytesStart<'_>) -> RdResult<String> {
    for attr in elem.attributes() {
        let attr = attr.map_err(xml_err)?;
        let (ns, local) = reader.resolve_attribute(attr.key);
        if local.as_ref() == b"lang" && (in_ns(&ns, XML_NS) || attr.key.as_ref() == b"xml:lang") {
            return Ok(attr.unescape_value().map_err(xml_err)?.into_owned());
        }
    }
    Ok("und".to_owned())
}

// ─── Serialisation ───────────────────────────────────────────────────────────

/// Serialise a descriptor into XRD 1.0.
///
/// String-valued link fields map to XML attributes, `titles` and
/// `properties` mappings to child elements. Any other field shape has no XRD
/// representation and fails with [`RdError::UnsupportedXmlField`].
pub(crate) fn serialize(jrd: &Jrd) -> RdResult<String> {
    let mut writer = Writer::new(Vec::new());

    let mut root = BytesStart::new("XRD");
    root.push_attribute(("xmlns", XRD_NS));
    root.push_attribute(("xmlns:xsi", XSI_NS));
    write(&mut writer, Event::Start(root))?;

    write_text_element(&mut writer, "Subject", jrd.subject())?;
    for alias in jrd.aliases() {
        write_text_element(&mut writer, "Alias", alias)?;
    }
    write_properties(&mut writer, jrd.properties())?;

    for link in jrd.links() {
        let mut elem = BytesStart::new("Link");
        let mut titles = Vec::new();
        let mut nested = Vec::new();

        for (key, value) in link.entries() {
            match value {
                Value::String(s) => elem.push_attribute((key, s.as_str())),
                Value::Object(map) if key.eq_ignore_ascii_case("titles") => {
                    titles.push((key, map));
                }
                Value::Object(map) if key.eq_ignore_ascii_case("properties") => {
                    nested.push(map);
                }
                _ => return Err(RdError::UnsupportedXmlField(key.to_owned())),
            }
        }

        if titles.is_empty() && nested.is_empty() {
            write(&mut writer, Event::Empty(elem))?;
            continue;
        }

        write(&mut writer, Event::Start(elem))?;
        for (key, map) in titles {
            for (title, language) in &map {
                let Value::String(language) = language else {
                    return Err(RdError::UnsupportedXmlField(key.to_owned()));
                };
                let mut title_elem = BytesStart::new("Title");
                title_elem.push_attribute(("xml:lang", language.as_str()));
                write(&mut writer, Event::Start(title_elem))?;
                write(&mut writer, Event::Text(BytesText::new(title)))?;
                write(&mut writer, Event::End(BytesEnd::new("Title")))?;
            }
        }
        for map in nested {
            write_properties(&mut writer, &map)?;
        }
        write(&mut writer, Event::End(BytesEnd::new("Link")))?;
    }

    write(&mut writer, Event::End(BytesEnd::new("XRD")))?;
    String::from_utf8(writer.into_inner()).map_err(xml_err)
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> RdResult<()> {
    writer.write_event(event).map_err(xml_err)
}

fn write_text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> RdResult<()> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write_properties(writer: &mut Writer<Vec<u8>>, properties: &JsonMap) -> RdResult<()> {
    for (key, value) in properties {
        let mut elem = BytesStart::new("Property");
        elem.push_attribute(("type", key.as_str()));
        match value {
            Value::String(s) => {
                write(writer, Event::Start(elem))?;
                write(writer, Event::Text(BytesText::new(s)))?;
                write(writer, Event::End(BytesEnd::new("Property")))?;
            }
            Value::Null => {
                elem.push_attribute(("xsi:nil", "true"));
                write(writer, Event::Empty(elem))?;
            }
            _ => return Err(RdError::UnsupportedXmlField("properties".to_owned())),
        }
    }
    Ok(())
}
