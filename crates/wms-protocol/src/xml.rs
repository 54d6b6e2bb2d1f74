//! XML reading and writing shared by the request codecs.
//!
//! Documents are read with quick-xml's pull parser into a small owned
//! element tree. Requests are written by plain string building.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use wms_common::{WmsError, WmsResult};

use crate::attributes::XmlAttribute;
use crate::exceptions::OgcException;
use crate::kvp::keys;

/// Fixed declaration every built document starts with.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// An element of a parsed document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Qualified name as written
    pub name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlElement>,
    /// Concatenated, unescaped text content
    pub text: String,
}

impl XmlElement {
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// First child with the given local name, whatever its prefix.
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.local_name() == local)
    }

    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.local_name() == local)
    }

    /// Trimmed text of the first child with the given local name.
    pub fn child_text(&self, local: &str) -> Option<&str> {
        self.child(local).map(|c| c.text.trim())
    }

    /// Value of an unprefixed attribute.
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.prefix.is_none() && a.local == local)
            .map(|a| a.value.as_str())
    }
}

/// Strip the prefix from a qualified name.
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}

/// Parse a complete document into its root element.
pub fn parse_document(doc: &[u8]) -> WmsResult<XmlElement> {
    let mut reader = Reader::from_reader(doc);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if root.is_some() {
                    return Err(WmsError::MalformedXml(
                        "content after the root element".to_string(),
                    ));
                }
                stack.push(element_from(&e)?);
            }
            Ok(Event::Empty(e)) => {
                let element = element_from(&e)?;
                attach(element, &mut stack, &mut root)?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| {
                    WmsError::MalformedXml("unexpected closing tag".to_string())
                })?;
                attach(element, &mut stack, &mut root)?;
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| WmsError::MalformedXml(e.to_string()))?;
                push_text(&mut stack, &text)?;
            }
            Ok(Event::CData(t)) => {
                let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                push_text(&mut stack, &text)?;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(WmsError::MalformedXml(format!(
                    "at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(WmsError::MalformedXml("unclosed element".to_string()));
    }
    root.ok_or_else(|| WmsError::MalformedXml("document has no root element".to_string()))
}

fn element_from(start: &BytesStart<'_>) -> WmsResult<XmlElement> {
    let mut attributes = Vec::new();
    // Repeated names are tolerated here and collapsed by the codecs.
    for attr in start.attributes().with_checks(false) {
        let attr = attr.map_err(|e| WmsError::MalformedXml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| WmsError::MalformedXml(e.to_string()))?;
        attributes.push(XmlAttribute::from_qualified(&key, value.into_owned()));
    }

    Ok(XmlElement {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn attach(
    element: XmlElement,
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
) -> WmsResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(WmsError::MalformedXml(
                "more than one root element".to_string(),
            ))
        }
    }
    Ok(())
}

fn push_text(stack: &mut [XmlElement], text: &str) -> WmsResult<()> {
    match stack.last_mut() {
        Some(element) => {
            element.text.push_str(text);
            Ok(())
        }
        None => Err(WmsError::MalformedXml(
            "text outside the root element".to_string(),
        )),
    }
}

/// Parse a request document and check its root element.
///
/// Input that is not well-formed yields a MissingParameterValue without a
/// locator. A well-formed document with the wrong root yields one with the
/// REQUEST locator.
pub fn parse_request_root(doc: &[u8], expected: &str) -> Result<XmlElement, OgcException> {
    let root = parse_document(doc).map_err(|e| structural_exception(&e))?;
    if root.local_name() != expected {
        let err = WmsError::UnexpectedRoot {
            expected: expected.to_string(),
            found: root.name.clone(),
        };
        return Err(structural_exception(&err));
    }
    Ok(root)
}

/// Translate a structural failure into the exception reported to clients.
pub(crate) fn structural_exception(err: &WmsError) -> OgcException {
    tracing::debug!(error = %err, "rejecting XML request");
    if err.is_malformed() {
        OgcException::unreadable_request()
    } else {
        OgcException::missing_parameter(keys::REQUEST)
    }
}

/// Read an optional number from element text. Empty text is absent.
pub(crate) fn parse_number<T: std::str::FromStr>(
    element: &XmlElement,
    local: &str,
) -> WmsResult<Option<T>> {
    match element.child_text(local) {
        None | Some("") => Ok(None),
        Some(text) => text
            .parse()
            .map(Some)
            .map_err(|_| WmsError::InvalidContent {
                element: local.to_string(),
                message: format!("not a number: {}", text),
            }),
    }
}

/// Read optional text. Empty text is absent.
pub(crate) fn optional_text(element: &XmlElement, local: &str) -> Option<String> {
    element
        .child_text(local)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Builds an indented document as a string.
///
/// Elements are indented by one space per level. Elements with no content
/// are collapsed into self-closing tags when the document is finished.
pub(crate) struct XmlWriter {
    lines: Vec<String>,
    depth: usize,
    /// The last line is a start tag with nothing written inside it yet
    open_pending: bool,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            lines: vec![XML_DECLARATION.to_string()],
            depth: 0,
            open_pending: false,
        }
    }

    pub fn open(&mut self, name: &str, attributes: &[(&str, &str)]) {
        let line = format!(
            "{}<{}{}>",
            " ".repeat(self.depth),
            name,
            format_attributes(attributes)
        );
        self.lines.push(line);
        self.depth += 1;
        self.open_pending = true;
    }

    pub fn close(&mut self, name: &str) {
        self.depth = self.depth.saturating_sub(1);
        let closing = format!("</{}>", name);
        match self.lines.last_mut() {
            Some(last) if self.open_pending => last.push_str(&closing),
            _ => self
                .lines
                .push(format!("{}{}", " ".repeat(self.depth), closing)),
        }
        self.open_pending = false;
    }

    pub fn leaf(&mut self, name: &str, attributes: &[(&str, &str)], text: &str) {
        let line = format!(
            "{}<{}{}>{}</{}>",
            " ".repeat(self.depth),
            name,
            format_attributes(attributes),
            escape(text),
            name
        );
        self.lines.push(line);
        self.open_pending = false;
    }

    pub fn finish(self) -> String {
        collapse_empty_elements(&self.lines.join("\n"))
    }
}

fn format_attributes(attributes: &[(&str, &str)]) -> String {
    attributes
        .iter()
        .map(|(name, value)| format!(" {}=\"{}\"", name, escape(value)))
        .collect()
}

/// Rewrite `<Tag attr="v"></Tag>` as `<Tag attr="v"/>`.
pub fn collapse_empty_elements(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;

    while let Some(pos) = rest.find("></") {
        let (head, tail) = rest.split_at(pos);
        let collapsed = head.rfind('<').and_then(|lt| {
            let start_tag = &head[lt + 1..];
            if start_tag.starts_with(|c| matches!(c, '/' | '?' | '!')) || start_tag.ends_with('/')
            {
                return None;
            }
            let name = start_tag.split_whitespace().next()?;
            let closing = format!("></{}>", name);
            tail.starts_with(&closing)
                .then(|| (lt, start_tag, closing.len()))
        });

        match collapsed {
            Some((lt, start_tag, consumed)) => {
                out.push_str(&head[..lt]);
                out.push('<');
                out.push_str(start_tag);
                out.push_str("/>");
                rest = &tail[consumed..];
            }
            None => {
                out.push_str(head);
                out.push_str("></");
                rest = &tail[3..];
            }
        }
    }

    out.push_str(rest);
    out
}
