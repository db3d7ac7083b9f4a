use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use thiserror::Error;

use crate::tree::XmlNode;

/// Errors that can occur while reading a configuration document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input could not be tokenized as XML.
    #[error("failed to parse XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// A tag, attribute, or CDATA section was not valid UTF-8.
    #[error("invalid UTF-8 in XML: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// An entity or character reference could not be decoded.
    #[error("failed to decode XML text: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
    /// Failed to read the input file.
    #[error("failed to read XML file: {0}")]
    Io(#[from] std::io::Error),
    /// The document is not a single well-nested element.
    #[error("malformed XML: {0}")]
    Malformed(String),
}

/// Parse XML bytes into an [`XmlNode`] tree.
pub fn parse(xml: &[u8]) -> Result<XmlNode, ParseError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut builder = TreeBuilder::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => builder.open(element(&e, &reader)?),
            Event::Empty(e) => builder.leaf(element(&e, &reader)?)?,
            Event::Text(e) => builder.text(&e.unescape()?),
            Event::CData(e) => builder.text(std::str::from_utf8(e.as_ref())?),
            Event::End(_) => builder.close()?,
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) | Event::Comment(_) => {}
        }
        buf.clear();
    }

    builder.finish()
}

/// Parse an XML file into an [`XmlNode`] tree.
pub fn parse_file(path: &Path) -> Result<XmlNode, ParseError> {
    let bytes = fs::read(path)?;
    parse(&bytes)
}

/// Accumulates elements into a tree as parse events arrive.
#[derive(Default)]
struct TreeBuilder {
    open: Vec<XmlNode>,
    root: Option<XmlNode>,
}

impl TreeBuilder {
    fn open(&mut self, node: XmlNode) {
        self.open.push(node);
    }

    fn leaf(&mut self, node: XmlNode) -> Result<(), ParseError> {
        self.attach(node)
    }

    fn close(&mut self) -> Result<(), ParseError> {
        let node = self
            .open
            .pop()
            .ok_or_else(|| ParseError::Malformed("closing tag without open tag".to_string()))?;
        self.attach(node)
    }

    // Whitespace between elements is formatting, not content.
    fn text(&mut self, text: &str) {
        let Some(current) = self.open.last_mut() else {
            return;
        };
        if text.trim().is_empty() {
            return;
        }
        current
            .text
            .get_or_insert_with(String::new)
            .push_str(text);
    }

    fn attach(&mut self, node: XmlNode) -> Result<(), ParseError> {
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(node);
            return Ok(());
        }
        if self.root.is_some() {
            return Err(ParseError::Malformed(
                "multiple top-level elements".to_string(),
            ));
        }
        self.root = Some(node);
        Ok(())
    }

    fn finish(self) -> Result<XmlNode, ParseError> {
        if let Some(unclosed) = self.open.last() {
            return Err(ParseError::Malformed(format!(
                "element <{}> not closed at end of document",
                unclosed.tag
            )));
        }
        self.root
            .ok_or_else(|| ParseError::Malformed("no root element".to_string()))
    }
}

fn element(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<XmlNode, ParseError> {
    let mut node = XmlNode::new(qname(e.name())?);

    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())?
            .into_owned();
        node.attributes.insert(qname(attr.key)?, value);
    }

    Ok(node)
}

fn qname(name: QName<'_>) -> Result<String, ParseError> {
    Ok(std::str::from_utf8(name.as_ref())?.to_string())
}

#[cfg(test)]
mod tests {
    use super::{parse, ParseError};

    #[test]
    fn parses_entries_with_names() {
        let node = parse(
            br#"<gre><entry name="t1"><ttl>42</ttl></entry><entry name="t2"/></gre>"#,
        )
        .expect("parse");

        assert_eq!(node.entries().count(), 2);
        assert_eq!(node.get_entry("t1").and_then(|e| e.get_text(&["ttl"])), Some("42"));
        assert!(node.get_entry("t2").is_some());
    }

    #[test]
    fn ignores_formatting_whitespace() {
        let node = parse(b"<a>\n  <b>x</b>\n</a>").expect("parse");
        assert_eq!(node.text, None);
        assert_eq!(node.get_text(&["b"]), Some("x"));
    }

    #[test]
    fn rejects_unclosed_element() {
        let err = parse(b"<config><devices>").expect_err("should fail");
        assert!(matches!(err, ParseError::Malformed(_) | ParseError::Xml(_)));
    }
}
