// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! RSS document model
//!
//! Keeps the parsed feed as a tree of owned XML events so that everything
//! except item descriptions is written back exactly as it was read.

use encoding_rs::{Encoding, UTF_8};
use quick_xml::events::{BytesCData, BytesDecl, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

/// Title used in logs for items without one
pub const UNTITLED_ITEM: &str = "No Title";

/// Errors raised while reading or writing a feed document
#[derive(Debug, Error)]
pub enum FeedError {
    /// Not well-formed XML
    #[error("Failed to parse the RSS feed: {0}")]
    Malformed(String),

    /// Root element has no `<channel>` child
    #[error("No <channel> element found")]
    MissingChannel,

    /// Writer failure
    #[error("Failed to serialize the RSS feed: {0}")]
    Serialize(String),
}

/// Snapshot of one `<item>`'s fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    /// Trimmed `<link>` text; `None` when missing or blank
    pub link: Option<String>,
    /// Trimmed `<title>` text; `None` when missing or blank
    pub title: Option<String>,
    /// Untrimmed `<description>` content, text and CDATA combined
    pub description: Option<String>,
}

impl FeedItem {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED_ITEM)
    }
}

#[derive(Debug, Clone)]
enum Node {
    Element(Element),
    Other(Event<'static>),
}

#[derive(Debug, Clone)]
struct Element {
    start: BytesStart<'static>,
    children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    fn new(name: &str) -> Self {
        Self {
            start: BytesStart::new(name.to_string()),
            children: Vec::new(),
            self_closing: false,
        }
    }

    fn is_named(&self, name: &str) -> bool {
        self.start.name().as_ref() == name.as_bytes()
    }

    fn child_elements(&self) -> impl Iterator<Item = (usize, &Element)> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(idx, node)| match node {
                Node::Element(element) => Some((idx, element)),
                Node::Other(_) => None,
            })
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.child_elements()
            .map(|(_, element)| element)
            .find(|element| element.is_named(name))
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(element) if element.is_named(name) => Some(element),
            _ => None,
        })
    }

    /// Concatenated text and CDATA content of the direct children
    fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                Node::Other(Event::Text(t)) => match t.unescape() {
                    Ok(unescaped) => text.push_str(&unescaped),
                    Err(_) => text.push_str(&String::from_utf8_lossy(t)),
                },
                Node::Other(Event::CData(c)) => text.push_str(&String::from_utf8_lossy(c)),
                _ => {}
            }
        }
        text
    }

    fn trimmed_child_text(&self, name: &str) -> Option<String> {
        self.child(name)
            .map(|element| element.text().trim().to_string())
            .filter(|text| !text.is_empty())
    }

    /// Whitespace used to indent child elements, taken from the last child element
    fn child_indent(&self) -> Option<Node> {
        let (last_idx, _) = self.child_elements().last()?;
        match last_idx.checked_sub(1).map(|idx| &self.children[idx]) {
            Some(node @ Node::Other(Event::Text(t))) if is_whitespace(t) => Some(node.clone()),
            _ => None,
        }
    }
}

fn is_whitespace(text: &BytesText) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

/// Nodes that may not appear outside the root element
fn is_content(node: &Node) -> bool {
    match node {
        Node::Element(_) => true,
        Node::Other(Event::Text(t)) => !is_whitespace(t),
        Node::Other(Event::CData(_)) => true,
        Node::Other(_) => false,
    }
}

fn decode(bytes: &[u8]) -> Result<String, FeedError> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (declared_encoding(bytes)?.unwrap_or(UTF_8), bytes),
    };
    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        return Err(FeedError::Malformed(format!(
            "invalid {} byte sequence",
            encoding.name()
        )));
    }
    Ok(text.into_owned())
}

/// Encoding named by the XML declaration, if the document starts with one
fn declared_encoding(bytes: &[u8]) -> Result<Option<&'static Encoding>, FeedError> {
    let Ok(Event::Decl(decl)) = Reader::from_reader(bytes).read_event() else {
        return Ok(None);
    };
    let label = match decl.encoding() {
        Some(Ok(label)) => label,
        Some(Err(e)) => return Err(FeedError::Malformed(e.to_string())),
        None => return Ok(None),
    };
    Encoding::for_label(&label)
        // 8-bit text cannot be UTF-16 without a byte order mark
        .map(Encoding::output_encoding)
        .map(Some)
        .ok_or_else(|| {
            FeedError::Malformed(format!(
                "unsupported encoding '{}'",
                String::from_utf8_lossy(&label)
            ))
        })
}

/// CDATA sections holding `content`, split wherever it contains `]]>`
fn cdata_nodes(content: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut rest = content;
    while let Some(pos) = rest.find("]]>") {
        nodes.push(cdata_node(&rest[..pos + 2]));
        rest = &rest[pos + 2..];
    }
    nodes.push(cdata_node(rest));
    nodes
}

fn cdata_node(content: &str) -> Node {
    Node::Other(Event::CData(BytesCData::new(content.to_string())))
}

/// A parsed RSS feed
///
/// Items are the direct `<item>` children of the root's `<channel>`.
#[derive(Debug, Clone)]
pub struct FeedDocument {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
    channel: usize,
    items: Vec<usize>,
    had_declaration: bool,
}

impl FeedDocument {
    /// Parse a feed from raw file contents
    ///
    /// The bytes are decoded per the byte order mark, else the encoding named
    /// in the XML declaration, else UTF-8.
    pub fn parse_bytes(bytes: &[u8]) -> Result<Self, FeedError> {
        let xml = decode(bytes)?;
        Self::parse(&xml)
    }

    /// Parse a feed from XML text
    pub fn parse(xml: &str) -> Result<Self, FeedError> {
        let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();
        let mut had_declaration = false;

        loop {
            let event = reader.read_event().map_err(|e| {
                FeedError::Malformed(format!("{} (at byte {})", e, reader.error_position()))
            })?;

            let node = match event {
                Event::Start(start) => {
                    stack.push(Element {
                        start: start.into_owned(),
                        children: Vec::new(),
                        self_closing: false,
                    });
                    continue;
                }
                Event::End(end) => {
                    let element = stack.pop().ok_or_else(|| {
                        FeedError::Malformed(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(end.name().as_ref())
                        ))
                    })?;
                    Node::Element(element)
                }
                Event::Empty(start) => Node::Element(Element {
                    start: start.into_owned(),
                    children: Vec::new(),
                    self_closing: true,
                }),
                Event::Decl(decl) => {
                    had_declaration = true;
                    Node::Other(Event::Decl(decl.into_owned()))
                }
                Event::Eof => break,
                other => Node::Other(other.into_owned()),
            };

            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => nodes.push(node),
            }
        }

        if let Some(open) = stack.last() {
            return Err(FeedError::Malformed(format!(
                "unclosed element <{}>",
                String::from_utf8_lossy(open.start.name().as_ref())
            )));
        }

        let root_idx = nodes
            .iter()
            .position(|node| matches!(node, Node::Element(_)))
            .ok_or_else(|| FeedError::Malformed("no root element".to_string()))?;
        let epilog = nodes.split_off(root_idx + 1);
        let Some(Node::Element(root)) = nodes.pop() else {
            return Err(FeedError::Malformed("no root element".to_string()));
        };
        let prolog = nodes;
        if prolog.iter().any(is_content) {
            return Err(FeedError::Malformed("content before document element".to_string()));
        }
        if epilog.iter().any(is_content) {
            return Err(FeedError::Malformed("junk after document element".to_string()));
        }

        let (channel, channel_element) = root
            .child_elements()
            .find(|(_, element)| element.is_named("channel"))
            .ok_or(FeedError::MissingChannel)?;
        let items = channel_element
            .child_elements()
            .filter(|(_, element)| element.is_named("item"))
            .map(|(idx, _)| idx)
            .collect();

        Ok(Self {
            prolog,
            root,
            epilog,
            channel,
            items,
            had_declaration,
        })
    }

    fn channel(&self) -> Option<&Element> {
        match self.root.children.get(self.channel)? {
            Node::Element(channel) => Some(channel),
            Node::Other(_) => None,
        }
    }

    fn item_element(&self, index: usize) -> Option<&Element> {
        let position = *self.items.get(index)?;
        match self.channel()?.children.get(position)? {
            Node::Element(item) => Some(item),
            Node::Other(_) => None,
        }
    }

    fn item_element_mut(&mut self, index: usize) -> Option<&mut Element> {
        let position = *self.items.get(index)?;
        let Node::Element(channel) = self.root.children.get_mut(self.channel)? else {
            return None;
        };
        match channel.children.get_mut(position)? {
            Node::Element(item) => Some(item),
            Node::Other(_) => None,
        }
    }

    /// Channel `<title>`, if present
    pub fn channel_title(&self) -> Option<String> {
        self.channel()?.trimmed_child_text("title")
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Snapshot of the item at `index` (0-based, document order)
    pub fn item(&self, index: usize) -> Option<FeedItem> {
        let element = self.item_element(index)?;
        Some(FeedItem {
            link: element.trimmed_child_text("link"),
            title: element.trimmed_child_text("title"),
            description: element.child("description").map(Element::text),
        })
    }

    /// Snapshots of every item, in document order
    pub fn items(&self) -> Vec<FeedItem> {
        (0..self.item_count()).filter_map(|idx| self.item(idx)).collect()
    }

    /// Replace the item's description with a CDATA section holding `markup`
    ///
    /// Creates the `<description>` element when the item has none.
    /// Returns `false` if `index` is out of range.
    pub fn set_description(&mut self, index: usize, markup: &str) -> bool {
        let Some(item) = self.item_element_mut(index) else {
            return false;
        };

        if let Some(description) = item.child_mut("description") {
            description.children = cdata_nodes(markup);
            description.self_closing = false;
            return true;
        }

        let mut description = Element::new("description");
        description.children = cdata_nodes(markup);
        let description = Node::Element(description);

        let trailing_whitespace = matches!(
            item.children.last(),
            Some(Node::Other(Event::Text(t))) if is_whitespace(t)
        );
        match (trailing_whitespace, item.child_indent()) {
            (true, Some(indent)) => {
                let at = item.children.len() - 1;
                item.children.splice(at..at, [indent, description]);
            }
            _ => item.children.push(description),
        }
        true
    }

    /// Serialize to UTF-8 XML, always starting with an XML declaration
    pub fn to_xml(&self) -> Result<String, FeedError> {
        let mut writer = Writer::new(Vec::new());
        write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        if !self.had_declaration {
            write_event(&mut writer, Event::Text(BytesText::from_escaped("\n")))?;
        }

        for node in &self.prolog {
            if matches!(node, Node::Other(Event::Decl(_))) {
                continue;
            }
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }

        String::from_utf8(writer.into_inner()).map_err(|e| FeedError::Serialize(e.to_string()))
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<(), FeedError> {
    match node {
        Node::Other(event) => write_event(writer, event.clone()),
        Node::Element(element) => write_element(writer, element),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), FeedError> {
    if element.self_closing && element.children.is_empty() {
        return write_event(writer, Event::Empty(element.start.clone()));
    }
    write_event(writer, Event::Start(element.start.clone()))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    write_event(writer, Event::End(element.start.to_end()))
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), FeedError> {
    writer
        .write_event(event)
        .map_err(|e| FeedError::Serialize(e.to_string()))
}
