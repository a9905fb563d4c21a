//! Headless element tree
//!
//! A small stand-in for the browser DOM: an [`Element`] builder for
//! renderers, and [`DomMount`], a container whose children carry a key
//! (`id` attribute) and an opaque [`NodeHandle`].
//!
//! # Example
//!
//! ```
//! use drum::view::dom::{p, span, DomMount};
//! use drum::view::Mount;
//!
//! let mut mount = DomMount::new("wallets");
//! let node = p().class("walletdetails").child(span().class("wallet").text("0xabc"));
//! mount.append("wallets-0xabc".to_string(), node);
//!
//! assert_eq!(
//!     mount.to_html(),
//!     r#"<div id="wallets"><p class="walletdetails" id="wallets-0xabc"><span class="wallet">0xabc</span></p></div>"#
//! );
//! ```

use std::fmt;

use super::mount::{Mount, MountError};

/// A rendered element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    class: Option<String>,
    id: Option<String>,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// Create an empty element with the given tag name
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            class: None,
            id: None,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Builder method: set the class list (empty string clears it)
    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        self.class = if class.is_empty() { None } else { Some(class) };
        self
    }

    /// Builder method: set the id attribute
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder method: set any other attribute
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder method: set text content, dropping any children
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self.children.clear();
        self
    }

    /// Builder method: append a child element
    pub fn child(mut self, child: Element) -> Self {
        self.text = None;
        self.children.push(child);
        self
    }

    /// Builder method: append several child elements
    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.text = None;
        self.children.extend(children);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn id_attr(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn child_elements(&self) -> &[Element] {
        &self.children
    }

    /// Concatenated text of this element and all descendants
    pub fn text_content(&self) -> String {
        match &self.text {
            Some(text) => text.clone(),
            None => self.children.iter().map(Element::text_content).collect(),
        }
    }

    /// Serialize to HTML
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        if let Some(class) = &self.class {
            push_attr(out, "class", class);
        }
        if let Some(id) = &self.id {
            push_attr(out, "id", id);
        }
        for (name, value) in &self.attributes {
            push_attr(out, name, value);
        }
        out.push('>');
        match &self.text {
            Some(text) => out.push_str(&escape(text)),
            None => {
                for child in &self.children {
                    child.write_html(out);
                }
            }
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_html())
    }
}

pub fn div() -> Element {
    Element::new("div")
}

pub fn span() -> Element {
    Element::new("span")
}

pub fn p() -> Element {
    Element::new("p")
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape(value));
    out.push('"');
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Handle to a child attached to a [`DomMount`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(u64);

#[derive(Debug)]
struct MountedNode {
    handle: NodeHandle,
    element: Element,
}

/// Container element whose children are managed through handles
#[derive(Debug)]
pub struct DomMount {
    base_id: String,
    children: Vec<MountedNode>,
    next_handle: u64,
}

impl DomMount {
    pub fn new(base_id: impl Into<String>) -> Self {
        Self {
            base_id: base_id.into(),
            children: Vec::new(),
            next_handle: 0,
        }
    }

    /// Keys (`id` attributes) of the children, in order
    pub fn keys(&self) -> Vec<&str> {
        self.children
            .iter()
            .filter_map(|c| c.element.id_attr())
            .collect()
    }

    /// Children in order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().map(|c| &c.element)
    }

    pub fn get(&self, handle: NodeHandle) -> Option<&Element> {
        self.position(handle).map(|i| &self.children[i].element)
    }

    pub fn child_by_key(&self, key: &str) -> Option<&Element> {
        self.elements().find(|e| e.id_attr() == Some(key))
    }

    /// Remove a child by key without going through its owner
    ///
    /// This is the equivalent of a foreign script calling `removeChild`;
    /// whatever list owns the mount will report the node as missing.
    pub fn take_by_key(&mut self, key: &str) -> Option<Element> {
        let index = self
            .children
            .iter()
            .position(|c| c.element.id_attr() == Some(key))?;
        Some(self.children.remove(index).element)
    }

    /// Serialize the mount and its children to HTML
    pub fn to_html(&self) -> String {
        div()
            .id(self.base_id.clone())
            .children(self.elements().cloned())
            .to_html()
    }

    fn position(&self, handle: NodeHandle) -> Option<usize> {
        self.children.iter().position(|c| c.handle == handle)
    }

    fn mounted(&mut self, key: String, node: Element) -> MountedNode {
        let handle = NodeHandle(self.next_handle);
        self.next_handle += 1;
        MountedNode {
            handle,
            element: node.id(key),
        }
    }

    fn not_attached(&self) -> MountError {
        MountError::NotAttached(self.base_id.clone())
    }
}

impl Mount for DomMount {
    type Node = Element;
    type Handle = NodeHandle;

    fn base_id(&self) -> &str {
        &self.base_id
    }

    fn len(&self) -> usize {
        self.children.len()
    }

    fn contains(&self, handle: NodeHandle) -> bool {
        self.position(handle).is_some()
    }

    fn append(&mut self, key: String, node: Element) -> NodeHandle {
        let mounted = self.mounted(key, node);
        let handle = mounted.handle;
        self.children.push(mounted);
        handle
    }

    fn insert_before(
        &mut self,
        key: String,
        node: Element,
        before: NodeHandle,
    ) -> Result<NodeHandle, MountError> {
        let index = self.position(before).ok_or_else(|| self.not_attached())?;
        let mounted = self.mounted(key, node);
        let handle = mounted.handle;
        self.children.insert(index, mounted);
        Ok(handle)
    }

    fn replace(&mut self, handle: NodeHandle, node: Element) -> Result<(), MountError> {
        let index = self.position(handle).ok_or_else(|| self.not_attached())?;
        let slot = &mut self.children[index];
        let key = slot.element.id_attr().unwrap_or_default().to_string();
        slot.element = node.id(key);
        Ok(())
    }

    fn detach(&mut self, handle: NodeHandle) -> Result<Element, MountError> {
        let index = self.position(handle).ok_or_else(|| self.not_attached())?;
        Ok(self.children.remove(index).element)
    }

    fn clear(&mut self) {
        self.children.clear();
    }
}
