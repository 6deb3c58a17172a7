//! Owned XML tree with ElementTree-style `text`/`tail` slots.
//!
//! The output document is assembled as a tree of [`Element`]s, indented by
//! rewriting whitespace-only `text`/`tail` values, and serialised through
//! `quick_xml` (which handles all escaping). Reading existing documents goes
//! through `roxmltree`; [`Element::from_node`] lifts a parsed node into an
//! owned subtree for verbatim copies.

use anyhow::Result;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

const INDENT_STEP: &str = "  ";

/// One element of the output tree. `text` is the character data before the
/// first child, `tail` the character data following this element's end tag
/// inside its parent. Attribute order is preserved.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub tail: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            ..Element::default()
        }
    }

    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut el = Element::new(name);
        el.text = Some(text.into());
        el
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    /// First direct child with the given tag name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Lift a parsed `roxmltree` element into an owned subtree, preserving
    /// attributes and character data (including whitespace-only runs, which
    /// the indentation pass is free to rewrite).
    pub fn from_node(node: roxmltree::Node<'_, '_>) -> Element {
        let mut el = Element::new(node.tag_name().name());
        for attr in node.attributes() {
            el.attrs.push((attr.name().to_string(), attr.value().to_string()));
        }
        let mut last_child: Option<usize> = None;
        for child in node.children() {
            if child.is_element() {
                el.children.push(Element::from_node(child));
                last_child = Some(el.children.len() - 1);
            } else if child.is_text() {
                let run = child.text().unwrap_or("");
                let slot = match last_child {
                    None => &mut el.text,
                    Some(i) => &mut el.children[i].tail,
                };
                match slot {
                    Some(existing) => existing.push_str(run),
                    None => *slot = Some(run.to_string()),
                }
            }
        }
        el
    }

    /// Serialise this element (and its tail, if any) as a UTF-8 string with no
    /// XML declaration.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        write_element(&mut writer, self)?;
        if let Some(tail) = &self.tail {
            writer.write_event(Event::Text(BytesText::new(tail)))?;
        }
        Ok(String::from_utf8(writer.into_inner())?)
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, el: &Element) -> Result<()> {
    let mut start = BytesStart::new(el.name.as_str());
    for (name, value) in &el.attrs {
        start.push_attribute((name.as_str(), value.as_str()));
    }
    if el.text.is_none() && el.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    if let Some(text) = &el.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &el.children {
        write_element(writer, child)?;
        if let Some(tail) = &child.tail {
            writer.write_event(Event::Text(BytesText::new(tail)))?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(el.name.as_str())))?;
    Ok(())
}

/// Re-indent a tree in place with two spaces per nesting level.
///
/// Only whitespace-only (or absent) `text`/`tail` values are rewritten, so the
/// pass is idempotent and never corrupts character data it did not add itself.
pub fn indent(el: &mut Element) {
    indent_at(el, 0);
}

fn indent_at(el: &mut Element, level: usize) {
    if !el.children.is_empty() {
        if whitespace_only(&el.text) {
            el.text = Some(format!("\n{}", INDENT_STEP.repeat(level + 1)));
        }
        let count = el.children.len();
        for (i, child) in el.children.iter_mut().enumerate() {
            indent_at(child, level + 1);
            let pad = if i + 1 < count { level + 1 } else { level };
            if whitespace_only(&child.tail) {
                child.tail = Some(format!("\n{}", INDENT_STEP.repeat(pad)));
            }
        }
    } else if level > 0 && whitespace_only(&el.tail) {
        el.tail = Some(format!("\n{}", INDENT_STEP.repeat(level)));
    }
}

fn whitespace_only(value: &Option<String>) -> bool {
    value.as_ref().is_none_or(|s| s.trim().is_empty())
}
