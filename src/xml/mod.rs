//! XML document tree and retrieval
//!
//! TMDB's v2.1 responses are schema-less as far as this crate is concerned:
//! which children a `<movie>` carries varies by endpoint and by entry. The
//! response is therefore parsed into a small owned element tree which the
//! extractors walk by tag name.

mod fetcher;

pub use fetcher::{HttpXmlFetcher, XmlSource};

use crate::text::normalize;
use crate::{Result, TmdbError};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// A parsed XML element with its attributes, text and child elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// The element's tag name, including any namespace prefix
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the value of the named attribute, if present
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// The element's character data, or `None` when it has none
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Direct child elements in document order
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Whether the element has at least one child element
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns the first direct child with the given tag
    pub fn find(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// Iterates over all direct children with the given tag
    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }
}

/// Parses an XML document into its root element
///
/// # Errors
///
/// Returns `TmdbError::Parse` if the document is malformed, has mismatched or
/// unclosed tags, or contains no root element at all.
pub fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            TmdbError::Parse(format!(
                "error at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(start) => {
                stack.push(element_from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start)?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| TmdbError::Parse("unexpected closing tag".to_string()))?;
                attach(element, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| TmdbError::Parse(format!("invalid character data: {e}")))?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                let text = normalize(&data.into_inner());
                append_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(TmdbError::Parse(format!(
            "unclosed element <{}> at end of document",
            open.tag
        )));
    }

    root.ok_or_else(|| TmdbError::Parse("document has no root element".to_string()))
}

/// Builds an element (without children) from a start or empty tag.
fn element_from_start(start: &BytesStart<'_>) -> Result<Element> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).to_string();

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute
            .map_err(|e| TmdbError::Parse(format!("invalid attribute on <{tag}>: {e}")))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).to_string();
        let value = attribute
            .unescape_value()
            .map_err(|e| TmdbError::Parse(format!("invalid attribute value on <{tag}>: {e}")))?;
        attributes.push((key, value.to_string()));
    }

    Ok(Element {
        tag,
        attributes,
        text: None,
        children: Vec::new(),
    })
}

/// Attaches a completed element to its parent, or makes it the root.
fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }

    if root.is_some() {
        return Err(TmdbError::Parse(format!(
            "second root element <{}>",
            element.tag
        )));
    }
    *root = Some(element);
    Ok(())
}

fn append_text(stack: &mut [Element], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(current) => {
            current.append_text(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(TmdbError::Parse(
            "character data outside of the root element".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <OpenSearchDescription>
              <movies>
                <movie>
                  <name>Fight &amp; Club</name>
                  <images>
                    <image type="poster" size="thumb" url="http://x/a.jpg" id="1"/>
                  </images>
                </movie>
              </movies>
            </OpenSearchDescription>"#;

        let root = parse_document(xml).unwrap();
        assert_eq!(root.tag(), "OpenSearchDescription");

        let movie = root.find("movies").unwrap().find("movie").unwrap();
        assert!(movie.has_children());
        assert_eq!(movie.find("name").unwrap().text(), Some("Fight & Club"));

        let image = movie.find("images").unwrap().find("image").unwrap();
        assert_eq!(image.attr("url"), Some("http://x/a.jpg"));
        assert_eq!(image.attr("missing"), None);
        assert_eq!(image.text(), None);
    }

    #[test]
    fn test_parse_cdata_and_find_all() {
        let xml = "<people><person><![CDATA[<b>bold</b>]]></person><person/><other/></people>";

        let root = parse_document(xml).unwrap();
        let people: Vec<_> = root.find_all("person").collect();
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].text(), Some("<b>bold</b>"));
        assert_eq!(people[1].text(), None);
    }

    #[test]
    fn test_parse_rejects_mismatched_tags() {
        let result = parse_document("<movies><movie></movies></movie>");
        assert!(matches!(result, Err(TmdbError::Parse(_))));
    }

    #[test]
    fn test_parse_rejects_unclosed_tags() {
        let result = parse_document("<movies><movie>");
        assert!(matches!(result, Err(TmdbError::Parse(_))));
    }

    #[test]
    fn test_parse_rejects_empty_document() {
        assert!(matches!(parse_document(""), Err(TmdbError::Parse(_))));
        assert!(matches!(
            parse_document("not xml at all"),
            Err(TmdbError::Parse(_))
        ));
    }
}
