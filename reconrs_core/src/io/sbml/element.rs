//! Owned XML element tree, read and written with quick-xml
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::io::sbml::SbmlError;

/// A node in the element tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

/// An XML element with its attributes in document order
///
/// Names are kept as written, including any namespace prefix.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Strip the namespace prefix from a qualified name
pub(crate) fn local_name(name: &str) -> &str {
    match name.rsplit_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}

impl Element {
    pub fn new(name: &str) -> Element {
        Element {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Name without namespace prefix
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Value of the attribute with the exact (possibly prefixed) name `name`
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Value of the first attribute whose local name is `local`
    pub fn attribute_local(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| local_name(key) == local)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing its value if present, appending it otherwise
    pub fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    /// The `id` attribute, present on every SBML component
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            _ => None,
        })
    }

    /// First child element with local name `local`
    pub fn find_child(&self, local: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.local_name() == local)
    }

    /// Position in [`Element::children`] of the first child element with local name `local`
    pub fn position_of_child(&self, local: &str) -> Option<usize> {
        self.children.iter().position(|node| match node {
            Node::Element(element) => element.local_name() == local,
            _ => false,
        })
    }

    /// Child element at position `index` of [`Element::children`]
    pub fn element_at(&self, index: usize) -> Option<&Element> {
        match self.children.get(index) {
            Some(Node::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn element_at_mut(&mut self, index: usize) -> Option<&mut Element> {
        match self.children.get_mut(index) {
            Some(Node::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Visit every element below this one, depth first
    pub fn for_each_descendant_mut<F: FnMut(&mut Element)>(&mut self, f: &mut F) {
        for child in self.child_elements_mut() {
            f(child);
            child.for_each_descendant_mut(f);
        }
    }

    /// Concatenated text content of this element's direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) | Node::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn to_start(&self) -> BytesStart<'_> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            start.push_attribute((key.as_str(), value.as_str()));
        }
        start
    }

    fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> std::io::Result<()> {
        if self.children.is_empty() {
            return writer.write_event(Event::Empty(self.to_start()));
        }
        writer.write_event(Event::Start(self.to_start()))?;
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_to(writer)?,
                Node::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
                Node::CData(text) => writer.write_event(Event::CData(BytesCData::new(text)))?,
                Node::Comment(text) => {
                    writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
                }
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))
    }
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq)]
pub struct SbmlDocument {
    pub root: Element,
}

impl SbmlDocument {
    /// Parse a document from a string
    pub fn from_str(source: &str) -> Result<SbmlDocument, SbmlError> {
        let mut reader = Reader::from_str(source);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let mut element = stack.pop().ok_or_else(|| {
                        SbmlError::MalformedModel("unexpected closing tag".to_string())
                    })?;
                    element.children.retain(|node| match node {
                        Node::Text(text) => !text.trim().is_empty(),
                        _ => true,
                    });
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = std::str::from_utf8(&text)?;
                    push_text(&mut stack, text);
                }
                Event::GeneralRef(reference) => {
                    let name = std::str::from_utf8(&reference)?;
                    let escaped = format!("&{};", name);
                    let resolved = unescape(&escaped).map_err(quick_xml::Error::from)?;
                    push_text(&mut stack, &resolved);
                }
                Event::CData(data) => {
                    let data = std::str::from_utf8(&data)?.to_string();
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::CData(data));
                    }
                }
                Event::Comment(comment) => {
                    let comment = std::str::from_utf8(&comment)?.to_string();
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(Node::Comment(comment));
                    }
                }
                Event::Eof => break,
                // The declaration is rewritten on output, processing instructions and
                // doctypes do not occur in SBML
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(SbmlError::MalformedModel(format!(
                "unclosed element <{}>",
                stack[stack.len() - 1].name
            )));
        }
        let root = root.ok_or_else(|| SbmlError::MalformedModel("empty document".to_string()))?;
        Ok(SbmlDocument { root })
    }

    /// Parse a document from any reader
    pub fn from_reader<R: Read>(mut reader: R) -> Result<SbmlDocument, SbmlError> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        SbmlDocument::from_str(&source)
    }

    /// Read a document from a file
    pub fn read<P: AsRef<Path>>(path: P) -> Result<SbmlDocument, SbmlError> {
        let file = File::open(path)?;
        SbmlDocument::from_reader(BufReader::new(file))
    }

    /// Serialize the document, indented by two spaces
    pub fn to_xml_string(&self) -> Result<String, SbmlError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| SbmlError::Encoding(e.utf8_error()))
    }

    /// Serialize the document into `writer`
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), SbmlError> {
        let mut writer = Writer::new_with_indent(writer, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.root.write_to(&mut writer)?;
        Ok(())
    }

    /// Write the document to a file
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), SbmlError> {
        let file = File::create(path)?;
        self.write_to(file)
    }
}

fn element_from_start(start: &BytesStart) -> Result<Element, SbmlError> {
    let name = std::str::from_utf8(start.name().as_ref())?.to_string();
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(quick_xml::Error::from)?;
        let key = std::str::from_utf8(attribute.key.as_ref())?.to_string();
        let raw = std::str::from_utf8(&attribute.value)?;
        let value: Cow<str> = unescape(raw).map_err(quick_xml::Error::from)?;
        attributes.push((key, value.into_owned()));
    }
    Ok(Element {
        name,
        attributes,
        children: Vec::new(),
    })
}

/// Append text to the open element, merging with a preceding text node
fn push_text(stack: &mut [Element], text: &str) {
    let Some(parent) = stack.last_mut() else {
        return;
    };
    match parent.children.last_mut() {
        Some(Node::Text(existing)) => existing.push_str(text),
        _ => parent.children.push(Node::Text(text.to_string())),
    }
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), SbmlError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(SbmlError::MalformedModel(
                "more than one root element".to_string(),
            ))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sbml xmlns="http://www.sbml.org/sbml/level2/version4" level="2" version="4">
  <!-- a comment -->
  <model id="m">
    <notes><p>Na &amp; K</p></notes>
    <listOfCompartments>
      <compartment id="c" name="cytosol &lt;main&gt;"/>
    </listOfCompartments>
  </model>
</sbml>"#;

    #[test]
    fn parse_tree() {
        let document = SbmlDocument::from_str(SOURCE).unwrap();
        assert_eq!(document.root.local_name(), "sbml");
        assert_eq!(document.root.attribute("level"), Some("2"));
        let model = document.root.find_child("model").unwrap();
        assert_eq!(model.id(), Some("m"));
        let compartment = model
            .find_child("listOfCompartments")
            .unwrap()
            .find_child("compartment")
            .unwrap();
        assert_eq!(compartment.attribute("name"), Some("cytosol <main>"));
        let paragraph = model.find_child("notes").unwrap().find_child("p").unwrap();
        assert_eq!(paragraph.text(), "Na & K");
        assert!(matches!(document.root.children[0], Node::Comment(_)));
    }

    #[test]
    fn write_then_parse() {
        let document = SbmlDocument::from_str(SOURCE).unwrap();
        let written = document.to_xml_string().unwrap();
        assert!(written.starts_with("<?xml"));
        assert!(written.contains("cytosol &lt;main&gt;"));
        let reparsed = SbmlDocument::from_str(&written).unwrap();
        assert_eq!(reparsed, document);
    }

    #[test]
    fn prefixed_names() {
        let source = r##"<a xmlns:rdf="r"><rdf:Description rdf:about="#M_x"/></a>"##;
        let document = SbmlDocument::from_str(source).unwrap();
        let description = document.root.find_child("Description").unwrap();
        assert_eq!(description.name, "rdf:Description");
        assert_eq!(description.attribute_local("about"), Some("#M_x"));
        assert_eq!(description.attribute("rdf:about"), Some("#M_x"));
    }

    #[test]
    fn set_attribute() {
        let mut element = Element::new("species");
        element.set_attribute("id", "a");
        element.set_attribute("id", "b");
        element.set_attribute("compartment", "c");
        assert_eq!(element.attributes.len(), 2);
        assert_eq!(element.id(), Some("b"));
    }

    #[test]
    fn mismatched_tags() {
        assert!(SbmlDocument::from_str("<a><b></a>").is_err());
        assert!(SbmlDocument::from_str("").is_err());
    }
}
