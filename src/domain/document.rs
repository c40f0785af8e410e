//! In-memory page document.
//!
//! Elements live in an arena owned by [`Document`] and are addressed by
//! [`NodeId`]. Removing an element detaches it (and its subtree) from the tree;
//! the id stays valid so callers can still inspect or re-attach it, the same
//! way a script keeps a reference to a removed node.

use crate::utils::error::{PageError, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Inline `display` style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    None,
}

#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    value: String,
    text: String,
    display: Option<Display>,
    files: Vec<PathBuf>,
    scroll_top: usize,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            value: String::new(),
            text: String::new(),
            display: None,
            files: Vec::new(),
            scroll_top: 0,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Adds the class when `force` is true, removes it otherwise.
    pub fn toggle_class(&mut self, class: &str, force: bool) {
        if force {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    /// `data-*` attribute lookup: `dataset("rate")` reads `data-rate`.
    pub fn dataset(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(&format!("data-{}", key))
            .map(String::as_str)
    }

    pub fn set_dataset(&mut self, key: &str, value: impl Into<String>) {
        self.attributes.insert(format!("data-{}", key), value.into());
    }

    pub fn is_required(&self) -> bool {
        self.has_attribute("required")
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn display(&self) -> Option<Display> {
        self.display
    }

    pub fn set_display(&mut self, display: Display) {
        self.display = Some(display);
    }

    /// Files selected in an `<input type="file">`.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn set_files(&mut self, files: Vec<PathBuf>) {
        self.files = files;
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Declarative description of an element to create.
#[derive(Debug, Clone)]
pub struct ElementSpec {
    tag: String,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    value: Option<String>,
    text: Option<String>,
}

impl ElementSpec {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: Vec::new(),
            attributes: Vec::new(),
            value: None,
            text: None,
        }
    }

    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.push((name.to_string(), value.into()));
        self
    }

    pub fn data(self, key: &str, value: impl Into<String>) -> Self {
        self.attr(&format!("data-{}", key), value)
    }

    pub fn required(self) -> Self {
        self.attr("required", "")
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty `<html><body></body></html>` document.
    pub fn new() -> Self {
        let mut nodes = vec![Element::new("html"), Element::new("body")];
        nodes[0].children.push(NodeId(1));
        nodes[1].parent = Some(NodeId(0));
        Self {
            nodes,
            root: NodeId(0),
            body: NodeId(1),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn element(&self, node: NodeId) -> Result<&Element> {
        self.nodes
            .get(node.0)
            .ok_or(PageError::StaleNode { index: node.0 })
    }

    pub fn element_mut(&mut self, node: NodeId) -> Result<&mut Element> {
        self.nodes
            .get_mut(node.0)
            .ok_or(PageError::StaleNode { index: node.0 })
    }

    /// Creates a detached element.
    pub fn create(&mut self, spec: ElementSpec) -> NodeId {
        let mut element = Element::new(&spec.tag);
        for class in &spec.classes {
            element.add_class(class);
        }
        for (name, value) in spec.attributes {
            element.attributes.insert(name, value);
        }
        if let Some(value) = spec.value {
            element.value = value;
        }
        if let Some(text) = spec.text {
            element.text = text;
        }
        self.nodes.push(element);
        NodeId(self.nodes.len() - 1)
    }

    /// Creates an element and appends it to `parent`.
    pub fn append_new(&mut self, parent: NodeId, spec: ElementSpec) -> Result<NodeId> {
        let node = self.create(spec);
        self.append_child(parent, node)?;
        Ok(node)
    }

    /// Appends `child` as the last child of `parent`, moving it if it is
    /// already attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.element(parent)?;
        self.element(child)?;
        if child == self.root || self.is_inclusive_ancestor(child, parent) {
            return Err(PageError::DocumentError {
                message: format!(
                    "cannot append node {} inside its own subtree",
                    child.index()
                ),
            });
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Detaches `node` from its parent. Removing a detached node is a no-op.
    pub fn remove(&mut self, node: NodeId) -> Result<()> {
        if node == self.root {
            return Err(PageError::DocumentError {
                message: "cannot remove the document root".to_string(),
            });
        }
        self.element(node)?;
        self.detach(node);
        Ok(())
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.nodes[n.0].parent;
        }
        false
    }

    /// Whether `node` is reachable from the document root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len() && self.is_inclusive_ancestor(self.root, node)
    }

    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>> {
        Ok(self.element(node)?.parent)
    }

    pub fn children(&self, node: NodeId) -> Result<&[NodeId]> {
        Ok(&self.element(node)?.children)
    }

    /// Descendants of `node` in document order, excluding `node` itself.
    pub fn descendants(&self, node: NodeId) -> Result<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.element(node)?.children.iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.nodes[n.0].children.iter().rev().copied());
        }
        Ok(out)
    }

    fn connected(&self) -> Vec<NodeId> {
        let mut all = vec![self.root];
        all.extend(self.descendants(self.root).unwrap_or_default());
        all
    }

    /// First connected element with the given id.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.connected()
            .into_iter()
            .find(|n| self.nodes[n.0].id() == Some(id))
    }

    pub fn require_by_id(&self, id: &str) -> Result<NodeId> {
        self.get_element_by_id(id)
            .ok_or_else(|| PageError::element_not_found(format!("#{}", id)))
    }

    /// Connected elements carrying `class`, in document order.
    pub fn query_class(&self, class: &str) -> Vec<NodeId> {
        self.connected()
            .into_iter()
            .filter(|n| self.nodes[n.0].has_class(class))
            .collect()
    }

    pub fn query_tag(&self, tag: &str) -> Vec<NodeId> {
        let tag = tag.to_ascii_lowercase();
        self.connected()
            .into_iter()
            .filter(|n| self.nodes[n.0].tag == tag)
            .collect()
    }

    pub fn first_by_class(&self, class: &str) -> Option<NodeId> {
        self.query_class(class).into_iter().next()
    }

    pub fn require_by_class(&self, class: &str) -> Result<NodeId> {
        self.first_by_class(class)
            .ok_or_else(|| PageError::element_not_found(format!(".{}", class)))
    }

    /// Scroll height in rows; one child is one row.
    pub fn scroll_height(&self, node: NodeId) -> Result<usize> {
        Ok(self.element(node)?.children.len())
    }

    pub fn scroll_to_bottom(&mut self, node: NodeId) -> Result<()> {
        let height = self.scroll_height(node)?;
        self.element_mut(node)?.scroll_top = height;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_lookup_by_id() {
        let mut doc = Document::new();
        let body = doc.body();
        let div = doc.append_new(body, ElementSpec::new("div").id("map")).unwrap();

        assert_eq!(doc.get_element_by_id("map"), Some(div));
        assert!(doc.is_connected(div));
        assert_eq!(doc.parent(div).unwrap(), Some(body));
    }

    #[test]
    fn test_detached_elements_are_not_found() {
        let mut doc = Document::new();
        let detached = doc.create(ElementSpec::new("div").id("ghost").class("job-card"));

        assert_eq!(doc.get_element_by_id("ghost"), None);
        assert!(doc.query_class("job-card").is_empty());
        assert!(!doc.is_connected(detached));
        assert!(doc.require_by_id("ghost").is_err());
    }

    #[test]
    fn test_remove_detaches_subtree() {
        let mut doc = Document::new();
        let body = doc.body();
        let row = doc.append_new(body, ElementSpec::new("div")).unwrap();
        let button = doc.append_new(row, ElementSpec::new("button")).unwrap();

        doc.remove(row).unwrap();

        assert!(!doc.is_connected(row));
        assert!(!doc.is_connected(button));
        assert!(doc.children(body).unwrap().is_empty());
        // 移除已脫離的節點不會出錯
        assert!(doc.remove(row).is_ok());
    }

    #[test]
    fn test_query_class_in_document_order() {
        let mut doc = Document::new();
        let body = doc.body();
        let list = doc.append_new(body, ElementSpec::new("div")).unwrap();
        let a = doc.append_new(list, ElementSpec::new("span").class("star")).unwrap();
        let nested = doc.append_new(list, ElementSpec::new("div")).unwrap();
        let b = doc.append_new(nested, ElementSpec::new("span").class("star")).unwrap();
        let c = doc.append_new(list, ElementSpec::new("span").class("star")).unwrap();

        assert_eq!(doc.query_class("star"), vec![a, b, c]);
    }

    #[test]
    fn test_append_moves_existing_child() {
        let mut doc = Document::new();
        let body = doc.body();
        let first = doc.append_new(body, ElementSpec::new("div")).unwrap();
        let second = doc.append_new(body, ElementSpec::new("div")).unwrap();

        doc.append_child(body, first).unwrap();

        assert_eq!(doc.children(body).unwrap(), &[second, first]);
    }

    #[test]
    fn test_append_into_own_subtree_is_rejected() {
        let mut doc = Document::new();
        let body = doc.body();
        let outer = doc.append_new(body, ElementSpec::new("div")).unwrap();
        let inner = doc.append_new(outer, ElementSpec::new("div")).unwrap();

        assert!(matches!(
            doc.append_child(inner, outer),
            Err(PageError::DocumentError { .. })
        ));
        assert!(doc.remove(doc.root()).is_err());
    }

    #[test]
    fn test_stale_node_is_an_error() {
        let doc = Document::new();
        assert!(matches!(
            doc.element(NodeId(99)),
            Err(PageError::StaleNode { index: 99 })
        ));
    }

    #[test]
    fn test_class_toggle_and_dataset() {
        let mut doc = Document::new();
        let card = doc.create(ElementSpec::new("div").data("rate", "20"));
        let el = doc.element_mut(card).unwrap();

        el.toggle_class("active", true);
        el.toggle_class("active", true);
        assert_eq!(el.classes(), &["active".to_string()]);
        el.toggle_class("active", false);
        assert!(!el.has_class("active"));

        assert_eq!(el.dataset("rate"), Some("20"));
        el.set_dataset("distance", "5");
        assert_eq!(el.attribute("data-distance"), Some("5"));
    }

    #[test]
    fn test_scroll_to_bottom() {
        let mut doc = Document::new();
        let body = doc.body();
        let chat = doc.append_new(body, ElementSpec::new("div")).unwrap();
        doc.append_new(chat, ElementSpec::new("div")).unwrap();
        doc.append_new(chat, ElementSpec::new("div")).unwrap();

        doc.scroll_to_bottom(chat).unwrap();

        assert_eq!(doc.element(chat).unwrap().scroll_top(), 2);
    }
}
