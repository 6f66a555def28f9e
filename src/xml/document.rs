use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::str;

use super::c14n;
use super::entities::Entities;
use crate::xml::{ParseError, Result};

/// An element of a parsed document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    local_name: String,
    depth: usize,
    text: String,
    text_content: String,
}

impl Element {
    fn from_start(
        start: &BytesStart,
        depth: usize,
        entities: &Entities,
        position: u64,
    ) -> Result<Self> {
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ParseError::malformed(position, e))?;
            attr.unescape_value_with(|name| entities.get(name))
                .map_err(|e| ParseError::malformed(position, e))?;
        }

        Ok(Self {
            name: str::from_utf8(start.name().as_ref())?.to_owned(),
            local_name: str::from_utf8(start.local_name().as_ref())?.to_owned(),
            depth,
            text: String::new(),
            text_content: String::new(),
        })
    }

    /// Qualified name as written, prefix included
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name without namespace prefix
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Nesting depth, 0 for the root element
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Character data that is a direct child of this element, entities resolved
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All character data inside this element, descendants included, in
    /// document order
    pub fn text_content(&self) -> &str {
        &self.text_content
    }
}

#[derive(Debug, Clone, Copy)]
enum RootClose {
    /// Byte offset of the root's `</name>` tag
    EndTag(usize),
    /// Byte span of a self-closing root `<name/>`
    Empty { start: usize, end: usize },
}

/// A well-formed XML document.
///
/// The source text is kept verbatim; the element index built during parsing
/// is used for lookups and for locating the root's closing tag.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    elements: Vec<Element>,
    root_close: RootClose,
}

impl Document {
    /// Parse and check well-formedness of `text`.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(false);
        reader.config_mut().check_end_names = true;

        let mut elements: Vec<Element> = Vec::new();
        let mut open: Vec<usize> = Vec::new();
        let mut root_close = None;
        let mut entities = Entities::default();

        loop {
            let position = reader.buffer_position();
            let event = reader
                .read_event()
                .map_err(|e| ParseError::malformed(reader.error_position(), e))?;

            match event {
                Event::Start(e) => {
                    if open.is_empty() && root_close.is_some() {
                        return Err(ParseError::MultipleRoots(position));
                    }
                    let element = Element::from_start(&e, open.len(), &entities, position)?;
                    open.push(elements.len());
                    elements.push(element);
                }
                Event::Empty(e) => {
                    if open.is_empty() && root_close.is_some() {
                        return Err(ParseError::MultipleRoots(position));
                    }
                    let element = Element::from_start(&e, open.len(), &entities, position)?;
                    if open.is_empty() {
                        root_close = Some(RootClose::Empty {
                            start: position as usize,
                            end: reader.buffer_position() as usize,
                        });
                    }
                    elements.push(element);
                }
                Event::End(_) => {
                    open.pop();
                    if open.is_empty() {
                        root_close = Some(RootClose::EndTag(position as usize));
                    }
                }
                Event::Text(e) => {
                    let content = e
                        .xml_content()
                        .map_err(|err| ParseError::malformed(position, err))?;
                    append_text(&mut elements, &open, &content, position)?;
                }
                Event::CData(e) => {
                    let content = str::from_utf8(&e)?;
                    if open.is_empty() {
                        return Err(ParseError::ContentOutsideRoot(position));
                    }
                    append_text(&mut elements, &open, content, position)?;
                }
                Event::GeneralRef(e) => {
                    if open.is_empty() {
                        return Err(ParseError::ContentOutsideRoot(position));
                    }
                    let resolved = entities.resolve(&e, position)?;
                    append_text(&mut elements, &open, &resolved, position)?;
                }
                Event::DocType(e) => {
                    if !elements.is_empty() {
                        return Err(ParseError::malformed(position, "DOCTYPE after root element"));
                    }
                    entities = Entities::from_doctype(str::from_utf8(&e)?, position)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(&innermost) = open.last() {
            return Err(ParseError::Unclosed(elements[innermost].name.clone()));
        }
        let root_close = root_close.ok_or(ParseError::MissingRoot)?;

        Ok(Self {
            source: text.to_owned(),
            elements,
            root_close,
        })
    }

    /// The root element
    pub fn root(&self) -> &Element {
        // parse() guarantees at least one element
        &self.elements[0]
    }

    /// All elements in document order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// First element (document order) whose local name is exactly `local_name`
    pub fn find(&self, local_name: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.local_name == local_name)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn into_string(self) -> String {
        self.source
    }

    /// Exclusive canonical form of the document (comments and prolog dropped)
    pub fn canonicalize(&self) -> Result<String> {
        c14n::canonicalize(&self.source, None)
    }

    /// Insert `fragment` as the last child of the root element and re-parse.
    ///
    /// All original content is preserved byte for byte; a self-closing root
    /// is expanded into a start/end tag pair.
    pub fn append_to_root(&self, fragment: &str) -> Result<Document> {
        let mut out = String::with_capacity(self.source.len() + fragment.len() + 16);

        match self.root_close {
            RootClose::EndTag(offset) => {
                out.push_str(&self.source[..offset]);
                out.push_str(fragment);
                out.push_str(&self.source[offset..]);
            }
            RootClose::Empty { start, end } => {
                let tag = &self.source[start..end];
                let open_tag = tag.strip_suffix("/>").unwrap_or(tag);
                out.push_str(&self.source[..start]);
                out.push_str(open_tag);
                out.push('>');
                out.push_str(fragment);
                out.push_str("</");
                out.push_str(self.root().name());
                out.push('>');
                out.push_str(&self.source[end..]);
            }
        }

        Document::parse(&out)
    }
}

fn append_text(elements: &mut [Element], open: &[usize], text: &str, position: u64) -> Result<()> {
    match open.last() {
        Some(&index) => {
            elements[index].text.push_str(text);
            for &ancestor in open {
                elements[ancestor].text_content.push_str(text);
            }
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ParseError::ContentOutsideRoot(position)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_document() {
        let doc = Document::parse("<test>content</test>").unwrap();
        assert_eq!(doc.root().name(), "test");
        assert_eq!(doc.root().text(), "content");
        assert_eq!(doc.elements().len(), 1);
    }

    #[test]
    fn test_local_names_and_depth() {
        let xml = r#"<?xml version="1.0"?>
<a:root xmlns:a="urn:a"><a:child>x</a:child><other/></a:root>"#;
        let doc = Document::parse(xml).unwrap();

        let names: Vec<_> = doc.elements().iter().map(|e| e.local_name()).collect();
        assert_eq!(names, ["root", "child", "other"]);
        assert_eq!(doc.find("child").unwrap().name(), "a:child");
        assert_eq!(doc.find("child").unwrap().depth(), 1);
    }

    #[test]
    fn test_entities_resolved_in_text() {
        let doc = Document::parse("<r>a &amp; b &#65;</r>").unwrap();
        assert_eq!(doc.root().text(), "a & b A");
    }

    #[test]
    fn test_rejects_plain_text() {
        assert!(matches!(
            Document::parse("not xml"),
            Err(ParseError::ContentOutsideRoot(_))
        ));
    }

    #[test]
    fn test_rejects_empty_input() {
        assert!(matches!(Document::parse("  \n"), Err(ParseError::Empty)));
    }

    #[test]
    fn test_rejects_mismatched_tags() {
        assert!(Document::parse("<a><b></a></b>").is_err());
    }

    #[test]
    fn test_rejects_unclosed_root() {
        assert!(Document::parse("<a><b></b>").is_err());
    }

    #[test]
    fn test_rejects_multiple_roots() {
        assert!(matches!(
            Document::parse("<a/><b/>"),
            Err(ParseError::MultipleRoots(_))
        ));
    }

    #[test]
    fn test_rejects_undeclared_entity() {
        assert!(matches!(
            Document::parse("<a>&nbsp;</a>"),
            Err(ParseError::UndeclaredEntity(name)) if name == "nbsp"
        ));
    }

    #[test]
    fn test_internal_subset_entities_resolved() {
        let doc =
            Document::parse(r#"<!DOCTYPE test [<!ENTITY e "x">]><test a="&e;">&e;</test>"#).unwrap();
        assert_eq!(doc.root().text(), "x");
    }

    #[test]
    fn test_external_entity_rejected() {
        let xml = r#"<!DOCTYPE test [<!ENTITY ext SYSTEM "ext.xml">]><test>&ext;</test>"#;
        assert!(matches!(
            Document::parse(xml),
            Err(ParseError::UnsupportedEntity(name)) if name == "ext"
        ));
    }

    #[test]
    fn test_text_content_includes_descendants() {
        let doc = Document::parse("<a>1<b>2<c>3</c></b>4</a>").unwrap();

        assert_eq!(doc.root().text(), "14");
        assert_eq!(doc.root().text_content(), "1234");
        assert_eq!(doc.find("b").unwrap().text_content(), "23");
    }

    #[test]
    fn test_rejects_duplicate_attribute() {
        assert!(Document::parse(r#"<a x="1" x="2"/>"#).is_err());
    }

    #[test]
    fn test_append_to_root() {
        let doc = Document::parse("<?xml version=\"1.0\"?><test>content</test>").unwrap();
        let signed = doc.append_to_root("<sig>v</sig>").unwrap();

        assert_eq!(
            signed.as_str(),
            "<?xml version=\"1.0\"?><test>content<sig>v</sig></test>"
        );
        assert_eq!(signed.find("sig").unwrap().depth(), 1);
    }

    #[test]
    fn test_append_to_self_closing_root() {
        let doc = Document::parse(r#"<test id="1"/>"#).unwrap();
        let signed = doc.append_to_root("<sig/>").unwrap();

        assert_eq!(signed.as_str(), r#"<test id="1"><sig/></test>"#);
    }
}
