use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;

use crate::error::MetaError;

// ════════════════════════════════════════════════════════════════
//  Element tree
// ════════════════════════════════════════════════════════════════

/// Parsed element. Attributes are not used by the step format and are dropped.
#[derive(Debug, Default)]
pub(crate) struct Element {
    pub name: String,
    /// Concatenated text directly inside the element, verbatim.
    pub text: String,
    pub children: Vec<Element>,
}

impl Element {
    fn new(name: String) -> Self {
        Self { name, ..Self::default() }
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first child with that name; `""` when absent.
    pub fn child_text(&self, name: &str) -> &str {
        self.child(name).map(|c| c.text.as_str()).unwrap_or("")
    }
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

/// Parse a whole document into its root element.
pub(crate) fn parse_document(xml: &str) -> Result<Element, MetaError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            MetaError::MalformedConfig(format!("xml at byte {}: {e}", reader.buffer_position()))
        })?;
        match event {
            Event::Start(e) => stack.push(Element::new(element_name(&e))),
            Event::Empty(e) => attach(&mut stack, &mut root, Element::new(element_name(&e)))?,
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| MetaError::MalformedConfig("unbalanced closing tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| MetaError::MalformedConfig(format!("xml text: {e}")))?;
                    top.text.push_str(&text);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(MetaError::MalformedConfig(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| MetaError::MalformedConfig("document has no root element".into()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> Result<(), MetaError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(MetaError::MalformedConfig(format!(
                "second root element <{}>",
                element.name
            )));
        }
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════
//  Writer
// ════════════════════════════════════════════════════════════════

pub(crate) struct XmlWriter {
    inner: Writer<Vec<u8>>,
}

fn write_err(e: impl std::fmt::Display) -> MetaError {
    MetaError::Io(std::io::Error::other(format!("xml write: {e}")))
}

impl XmlWriter {
    /// `indent = 0` writes everything on one line.
    pub fn new(indent: usize) -> Self {
        let inner = if indent == 0 {
            Writer::new(Vec::new())
        } else {
            Writer::new_with_indent(Vec::new(), b' ', indent)
        };
        Self { inner }
    }

    pub fn open(&mut self, name: &str) -> Result<(), MetaError> {
        self.inner
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(write_err)
    }

    pub fn close(&mut self, name: &str) -> Result<(), MetaError> {
        self.inner
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(write_err)
    }

    /// `<name>value</name>`, or `<name/>` for an empty value.
    pub fn leaf(&mut self, name: &str, value: &str) -> Result<(), MetaError> {
        if value.is_empty() {
            return self
                .inner
                .write_event(Event::Empty(BytesStart::new(name)))
                .map_err(write_err);
        }
        self.open(name)?;
        self.inner
            .write_event(Event::Text(BytesText::new(value)))
            .map_err(write_err)?;
        self.close(name)
    }

    pub fn finish(self) -> Result<String, MetaError> {
        String::from_utf8(self.inner.into_inner())
            .map_err(|e| MetaError::InvariantViolation(format!("xml output is not utf-8: {e}")))
    }
}
