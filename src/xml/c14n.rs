use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::str;

use super::entities::Entities;
use crate::xml::{ParseError, Result};

const XML_NAMESPACE: &[u8] = b"http://www.w3.org/XML/1998/namespace";

type NsMap = BTreeMap<Vec<u8>, Vec<u8>>;

/// Perform Exclusive XML Canonicalization (without comments) with optional
/// inclusive namespace prefixes.
///
/// The XML declaration, DOCTYPE, comments and processing instructions are
/// not part of the output.
pub fn canonicalize(xml: impl AsRef<str>, inclusive_ns: Option<&[&str]>) -> Result<String> {
    let xml = xml.as_ref();
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);
    reader.config_mut().expand_empty_elements = true;

    let mut out = String::with_capacity(xml.len());
    let mut depth = 0usize;
    let mut entities = Entities::default();

    // Stack of declared namespace maps
    let mut ns_declared_stack = vec![NsMap::new()];
    // Stack of rendered namespace maps
    let mut ns_rendered_stack = vec![NsMap::new()];

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                handle_start(
                    &mut out,
                    &e,
                    &entities,
                    &mut ns_declared_stack,
                    &mut ns_rendered_stack,
                    inclusive_ns,
                )?;
            }
            Ok(Event::End(e)) => {
                depth = depth.saturating_sub(1);
                out.push_str("</");
                out.push_str(str::from_utf8(e.name().as_ref())?);
                out.push('>');
                ns_declared_stack.pop();
                ns_rendered_stack.pop();
            }
            // Whitespace outside the document element is not part of the canonical form
            Ok(Event::Text(e)) if depth > 0 => {
                let text = e
                    .xml_content()
                    .map_err(|err| ParseError::malformed(position, err))?;
                out.push_str(&escape_text_value(&text));
            }
            Ok(Event::CData(e)) => {
                // CDATA is normalized to text content
                let v = e.into_inner();
                let normalized = normalize_line_endings(&v);
                out.push_str(&escape_text_value(str::from_utf8(&normalized)?));
            }
            Ok(Event::GeneralRef(e)) => {
                let resolved = entities.resolve(&e, position)?;
                out.push_str(&escape_text_value(&resolved));
            }
            Ok(Event::DocType(e)) => {
                entities = Entities::from_doctype(str::from_utf8(&e)?, position)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ParseError::malformed(reader.error_position(), e)),
        }
    }
    Ok(out)
}

/// Normalize line endings to LF
fn normalize_line_endings(text: &[u8]) -> Cow<'_, [u8]> {
    if !text.contains(&b'\r') {
        return Cow::Borrowed(text);
    }

    let mut result = Vec::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        if text[i] == b'\r' {
            // CRLF and lone CR both become LF
            result.push(b'\n');
            i += if text.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
        } else {
            result.push(text[i]);
            i += 1;
        }
    }
    Cow::Owned(result)
}

/// Escape attribute value per C14N rules.
fn escape_attr_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 4);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape text node value per C14N rules.
fn escape_text_value(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 4);
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
    out
}

fn prefix_of(qname: &[u8]) -> Option<&[u8]> {
    qname
        .iter()
        .position(|&b| b == b':')
        .map(|pos| &qname[..pos])
}

/// Handle a Start tag event: writes the start tag with canonicalized attributes & namespaces.
fn handle_start(
    out: &mut String,
    e: &BytesStart,
    entities: &Entities,
    ns_declared_stack: &mut Vec<NsMap>,
    ns_rendered_stack: &mut Vec<NsMap>,
    inclusive_namespaces: Option<&[&str]>,
) -> Result<()> {
    let mut current_declared = ns_declared_stack.last().cloned().unwrap_or_default();
    let ns_rendered = ns_rendered_stack.last().cloned().unwrap_or_default();

    // Separate namespace declarations vs regular attributes
    let mut regular_attrs = vec![];
    let mut local_ns_decls = vec![];

    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|err| ParseError::malformed(0, err))?;
        let key = attr.key.as_ref();
        if key == b"xmlns" {
            local_ns_decls.push((vec![], attr.value.to_vec()));
        } else if let Some(prefix) = key.strip_prefix(b"xmlns:") {
            local_ns_decls.push((prefix.to_vec(), attr.value.to_vec()));
        } else {
            let value = attr
                .unescape_value_with(|name| entities.get(name))
                .map_err(|err| ParseError::malformed(0, err))?;
            regular_attrs.push((key.to_vec(), value.into_owned()));
        }
    }

    for (prefix, uri) in &local_ns_decls {
        if uri.is_empty() {
            current_declared.remove(prefix);
        } else {
            current_declared.insert(prefix.clone(), uri.clone());
        }
    }

    // Determine visibly-utilized prefixes
    let mut visibly_utilized = BTreeSet::new();
    let name = e.name();
    let name_bytes = name.as_ref();
    visibly_utilized.insert(prefix_of(name_bytes).unwrap_or_default().to_vec());

    for (key_bytes, _) in &regular_attrs {
        // xml: prefix is never rendered as it's implicitly bound
        if let Some(prefix) = prefix_of(key_bytes).filter(|p| *p != b"xml") {
            visibly_utilized.insert(prefix.to_vec());
        }
    }

    if let Some(prefixes) = inclusive_namespaces {
        for prefix_str in prefixes {
            if current_declared.contains_key(prefix_str.as_bytes()) {
                visibly_utilized.insert(prefix_str.as_bytes().to_vec());
            }
        }
    }

    // Compute which namespace declarations to render (BTreeSet keeps prefix order)
    let mut render_ns = Vec::new();
    for prefix in &visibly_utilized {
        if let Some(current_uri) = current_declared.get(prefix) {
            let already_rendered = ns_rendered
                .get(prefix)
                .is_some_and(|rendered_uri| rendered_uri == current_uri);

            if !already_rendered {
                render_ns.push((prefix.clone(), current_uri.clone()));
            }
        }
    }

    out.push('<');
    out.push_str(str::from_utf8(name_bytes)?);

    for (prefix, uri) in &render_ns {
        if prefix.is_empty() {
            out.push_str(" xmlns=\"");
        } else {
            out.push_str(" xmlns:");
            out.push_str(str::from_utf8(prefix)?);
            out.push_str("=\"");
        }
        out.push_str(&escape_attr_value(str::from_utf8(uri)?));
        out.push('"');
    }

    // Attributes sorted by (namespace URI, local name)
    let mut attr_info = vec![];
    for (key_bytes, value) in &regular_attrs {
        let (ns_uri, local_name) = match prefix_of(key_bytes) {
            Some(prefix) => {
                let uri = if prefix == b"xml" {
                    XML_NAMESPACE.to_vec()
                } else {
                    current_declared.get(prefix).cloned().unwrap_or_default()
                };
                (uri, key_bytes[prefix.len() + 1..].to_vec())
            }
            None => (vec![], key_bytes.clone()),
        };
        attr_info.push((ns_uri, local_name, key_bytes, value));
    }
    attr_info.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    for (_, _, key_bytes, value) in attr_info {
        out.push(' ');
        out.push_str(str::from_utf8(key_bytes)?);
        out.push_str("=\"");
        out.push_str(&escape_attr_value(value));
        out.push('"');
    }

    out.push('>');

    ns_declared_stack.push(current_declared);

    let mut new_rendered = ns_rendered;
    for (prefix, uri) in render_ns {
        new_rendered.insert(prefix, uri);
    }
    ns_rendered_stack.push(new_rendered);
    Ok(())
}
