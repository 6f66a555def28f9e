use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::BytesRef;
use std::collections::HashMap;

use crate::xml::{ParseError, Result};

/// Nesting limit when expanding entities that reference other entities
const MAX_EXPANSION_DEPTH: usize = 16;
/// Upper bound for a single expanded replacement text
const MAX_EXPANSION_LEN: usize = 1024 * 1024;

#[derive(Debug, Clone)]
enum Declaration {
    Internal(String),
    External,
}

/// General entities declared in a document's internal DTD subset, on top of
/// the five predefined ones.
#[derive(Debug, Clone, Default)]
pub(crate) struct Entities {
    expanded: HashMap<String, String>,
    external: Vec<String>,
}

impl Entities {
    /// Collect `<!ENTITY name "value">` declarations from the content of a
    /// `<!DOCTYPE ...>` event.
    pub(crate) fn from_doctype(doctype: &str, position: u64) -> Result<Self> {
        let declarations = scan_declarations(doctype, position)?;

        let mut entities = Entities::default();
        for (name, declaration) in &declarations {
            match declaration {
                Declaration::Internal(_) => {
                    let value = expand(name, &declarations, 0, position)?;
                    entities.expanded.insert(name.clone(), value);
                }
                Declaration::External => entities.external.push(name.clone()),
            }
        }
        Ok(entities)
    }

    /// Replacement text of a named entity, predefined ones included
    pub(crate) fn get(&self, name: &str) -> Option<&str> {
        resolve_predefined_entity(name).or_else(|| self.expanded.get(name).map(String::as_str))
    }

    /// Resolve a character reference or a declared entity reference.
    pub(crate) fn resolve(&self, reference: &BytesRef, position: u64) -> Result<String> {
        if let Some(ch) = reference
            .resolve_char_ref()
            .map_err(|e| ParseError::malformed(position, e))?
        {
            return Ok(ch.to_string());
        }

        let name = reference
            .decode()
            .map_err(|e| ParseError::malformed(position, e))?;
        if let Some(value) = self.get(&name) {
            return Ok(value.to_owned());
        }
        if self.external.iter().any(|external| *external == name) {
            return Err(ParseError::UnsupportedEntity(name.into_owned()));
        }
        Err(ParseError::UndeclaredEntity(name.into_owned()))
    }
}

fn scan_declarations(doctype: &str, position: u64) -> Result<HashMap<String, Declaration>> {
    let mut declarations = HashMap::new();
    let mut rest = doctype;

    while let Some(ch) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix("<!--") {
            let end = after
                .find("-->")
                .ok_or_else(|| ParseError::malformed(position, "unterminated comment in DOCTYPE"))?;
            rest = &after[end + 3..];
        } else if let Some(after) = rest.strip_prefix("<!ENTITY") {
            let (declaration, remaining) = parse_declaration(after, position)?;
            if let Some((name, declaration)) = declaration {
                // The first declaration of an entity is binding
                declarations.entry(name).or_insert(declaration);
            }
            rest = remaining;
        } else if ch == '"' || ch == '\'' {
            rest = skip_quoted(rest, ch, position)?;
        } else {
            rest = &rest[ch.len_utf8()..];
        }
    }
    Ok(declarations)
}

/// Parse the part of an entity declaration after `<!ENTITY`. Parameter
/// entities are skipped and yield `None`.
fn parse_declaration(
    text: &str,
    position: u64,
) -> Result<(Option<(String, Declaration)>, &str)> {
    let text = text.trim_start();
    if let Some(after) = text.strip_prefix('%') {
        return Ok((None, skip_to_declaration_end(after, position)?));
    }

    let name_end = text
        .find(|c: char| c.is_whitespace())
        .ok_or_else(|| ParseError::malformed(position, "incomplete ENTITY declaration"))?;
    let name = &text[..name_end];
    let text = text[name_end..].trim_start();

    let declaration = match text.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let body = &text[1..];
            let end = body.find(quote).ok_or_else(|| {
                ParseError::malformed(position, format!("unterminated value of entity {name}"))
            })?;
            let value = &body[..end];
            if value.contains('<') {
                return Err(ParseError::UnsupportedEntity(name.to_owned()));
            }
            Declaration::Internal(value.to_owned())
        }
        _ => Declaration::External,
    };

    let remaining = skip_to_declaration_end(text, position)?;
    Ok((Some((name.to_owned(), declaration)), remaining))
}

fn skip_to_declaration_end(text: &str, position: u64) -> Result<&str> {
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        match ch {
            '>' => return Ok(&rest[1..]),
            '"' | '\'' => rest = skip_quoted(rest, ch, position)?,
            _ => rest = &rest[ch.len_utf8()..],
        }
    }
    Err(ParseError::malformed(position, "unterminated ENTITY declaration"))
}

fn skip_quoted(text: &str, quote: char, position: u64) -> Result<&str> {
    let body = &text[1..];
    let end = body
        .find(quote)
        .ok_or_else(|| ParseError::malformed(position, "unterminated literal in DOCTYPE"))?;
    Ok(&body[end + 1..])
}

/// Replacement text of `name` with character and entity references expanded
fn expand(
    name: &str,
    declarations: &HashMap<String, Declaration>,
    depth: usize,
    position: u64,
) -> Result<String> {
    if depth > MAX_EXPANSION_DEPTH {
        return Err(ParseError::malformed(
            position,
            format!("entity {name} is recursive or nested too deeply"),
        ));
    }
    let raw = match declarations.get(name) {
        Some(Declaration::Internal(raw)) => raw,
        Some(Declaration::External) => return Err(ParseError::UnsupportedEntity(name.to_owned())),
        None => return Err(ParseError::UndeclaredEntity(name.to_owned())),
    };

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw.as_str();
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find(';')
            .ok_or_else(|| ParseError::malformed(position, format!("bad reference in entity {name}")))?;
        let reference = &after[..end];

        if let Some(code) = reference.strip_prefix('#') {
            out.push(char_reference(code).ok_or_else(|| {
                ParseError::malformed(position, format!("invalid character reference &{reference};"))
            })?);
        } else if let Some(predefined) = resolve_predefined_entity(reference) {
            out.push_str(predefined);
        } else {
            out.push_str(&expand(reference, declarations, depth + 1, position)?);
        }

        if out.len() > MAX_EXPANSION_LEN {
            return Err(ParseError::malformed(
                position,
                format!("expansion of entity {name} is too large"),
            ));
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn char_reference(code: &str) -> Option<char> {
    let value = match code.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => code.parse().ok()?,
    };
    char::from_u32(value)
}
