//! Owned, namespace-resolved XML element tree.
//!
//! Capabilities and DescribeCoverage documents are small, so they are read
//! once with quick-xml's namespace-aware reader into an owned tree that can be
//! cached and queried repeatedly. Tags and attribute names are stored in
//! Clark notation (`{uri}local`); unqualified names are stored bare.
//!
//! Names, text and attribute values are decoded with the encoding declared
//! in the XML declaration (UTF-8 when absent).

use quick_xml::encoding::Decoder;
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use serde::Serialize;

use wcs_common::{WcsError, WcsResult};

/// A parsed XML element with its attributes, direct text and children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XmlElement {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create an empty element; mostly useful for assembling trees in tests.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Parse a complete document and return its root element.
    pub fn parse(xml: &[u8]) -> WcsResult<Self> {
        let mut reader = NsReader::from_reader(xml);
        reader.trim_text(true);
        reader.expand_empty_elements(true);

        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root = None;

        loop {
            // Taken before the read: the declaration that may switch the
            // encoding has nothing to decode itself.
            let decoder = reader.decoder();
            let (ns, event) = reader.read_resolved_event_into(&mut buf)?;
            let namespace = resolved_uri(decoder, ns)?;

            match event {
                Event::Start(e) => {
                    let tag = clark(namespace.as_deref(), &decoder.decode(e.local_name().as_ref())?);
                    let mut attributes = Vec::new();
                    for attr in e.attributes() {
                        let attr = attr.map_err(quick_xml::Error::from)?;
                        let raw = attr.key.as_ref();
                        if raw == b"xmlns" || raw.starts_with(b"xmlns:") {
                            continue;
                        }
                        let (attr_ns, local) = reader.resolve_attribute(attr.key);
                        let attr_ns = resolved_uri(decoder, attr_ns)?;
                        let name = clark(attr_ns.as_deref(), &decoder.decode(local.as_ref())?);
                        let value = unescape(&decoder.decode(&attr.value)?)
                            .map_err(quick_xml::Error::from)?
                            .into_owned();
                        attributes.push((name, value));
                    }
                    stack.push(XmlElement {
                        tag,
                        attributes,
                        text: None,
                        children: Vec::new(),
                    });
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| WcsError::Xml("unbalanced end tag".to_string()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => {
                            root = Some(element);
                        }
                    }
                }
                Event::Text(t) => {
                    if let Some(current) = stack.last_mut() {
                        current.push_text(&t.unescape()?);
                    }
                }
                Event::CData(c) => {
                    if let Some(current) = stack.last_mut() {
                        current.push_text(&decoder.decode(&c)?);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(WcsError::Xml("document ended inside an element".to_string()));
        }
        root.ok_or_else(|| WcsError::Xml("document has no root element".to_string()))
    }

    /// Tag in Clark notation.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Tag without its namespace.
    pub fn local_name(&self) -> &str {
        match self.tag.rfind('}') {
            Some(idx) => &self.tag[idx + 1..],
            None => &self.tag,
        }
    }

    /// Namespace URI of the tag, if any.
    pub fn namespace(&self) -> Option<&str> {
        if self.tag.starts_with('{') {
            self.tag.find('}').map(|end| &self.tag[1..end])
        } else {
            None
        }
    }

    /// Direct text content; `None` when the element has no text.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Attribute value by (Clark-notation) name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// First element matching a slash-separated path relative to this one.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        self.findall(path).into_iter().next()
    }

    /// All elements matching a slash-separated path, in document order.
    pub fn findall(&self, path: &str) -> Vec<&XmlElement> {
        let mut current = vec![self];
        for segment in split_path(path) {
            current = current
                .into_iter()
                .flat_map(|e| e.children.iter().filter(move |c| c.tag == segment))
                .collect();
        }
        current
    }

    /// Text of the first element matching `path`.
    pub fn find_text(&self, path: &str) -> Option<&str> {
        self.find(path).and_then(XmlElement::text)
    }

    /// This element and all of its descendants, depth first.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Append a text event. Events are trimmed, so chunks split by a child
    /// element are joined with a single space.
    fn push_text(&mut self, text: &str) {
        match &mut self.text {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(text);
            }
            None => self.text = Some(text.to_string()),
        }
    }
}

/// Depth-first iterator over an element subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

fn resolved_uri(decoder: Decoder, ns: ResolveResult) -> WcsResult<Option<String>> {
    match ns {
        ResolveResult::Bound(namespace) => {
            Ok(Some(decoder.decode(namespace.as_ref())?.into_owned()))
        }
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(WcsError::Xml(format!(
            "unknown namespace prefix '{}'",
            decoder.decode(&prefix)?
        ))),
    }
}

fn clark(namespace: Option<&str>, local: &str) -> String {
    match namespace {
        Some(uri) => format!("{{{}}}{}", uri, local),
        None => local.to_string(),
    }
}

/// Split a path on `/`, ignoring slashes inside `{uri}` prefixes.
fn split_path(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in path.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                if idx > start {
                    segments.push(&path[start..idx]);
                }
                start = idx + 1;
            }
            _ => {}
        }
    }
    if start < path.len() {
        segments.push(&path[start..]);
    }
    segments
}
