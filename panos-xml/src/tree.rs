use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use quick_xml::escape::escape;
use serde::Serialize;

/// Tag used by PAN-OS for every member of a named collection.
pub const ENTRY_TAG: &str = "entry";
/// Attribute carrying the identity of an `<entry>`.
pub const NAME_ATTR: &str = "name";

/// One element of a device configuration tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XmlNode {
    /// Element tag name.
    pub tag: String,
    /// Attributes keyed by name.
    pub attributes: BTreeMap<String, String>,
    /// Child elements in document order.
    pub children: Vec<XmlNode>,
    /// Text content, if any non-whitespace text was present.
    pub text: Option<String>,
}

impl XmlNode {
    /// Create an element with no attributes, children, or text.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Create an `<entry name="...">` element.
    pub fn entry(name: impl Into<String>) -> Self {
        let mut node = Self::new(ENTRY_TAG);
        node.attributes.insert(NAME_ATTR.to_string(), name.into());
        node
    }

    /// Create a leaf element holding `text`.
    pub fn leaf(tag: impl Into<String>, text: impl Into<String>) -> Self {
        let mut node = Self::new(tag);
        node.text = Some(text.into());
        node
    }

    /// The `name` attribute of an `<entry>` element.
    pub fn entry_name(&self) -> Option<&str> {
        if self.tag != ENTRY_TAG {
            return None;
        }
        self.attributes.get(NAME_ATTR).map(String::as_str)
    }

    /// True when the element carries nothing at all.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.text.is_none() && self.attributes.is_empty()
    }

    /// Return the first child with the provided tag.
    pub fn get_child(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// Mutable variant of [`XmlNode::get_child`].
    pub fn get_child_mut(&mut self, tag: &str) -> Option<&mut XmlNode> {
        self.children.iter_mut().find(|child| child.tag == tag)
    }

    /// Return all children with the provided tag.
    pub fn get_children(&self, tag: &str) -> Vec<&XmlNode> {
        self.children
            .iter()
            .filter(|child| child.tag == tag)
            .collect()
    }

    /// Return the named `<entry>` child.
    pub fn get_entry(&self, name: &str) -> Option<&XmlNode> {
        self.children
            .iter()
            .find(|child| child.entry_name() == Some(name))
    }

    /// Mutable variant of [`XmlNode::get_entry`].
    pub fn get_entry_mut(&mut self, name: &str) -> Option<&mut XmlNode> {
        self.children
            .iter_mut()
            .find(|child| child.entry_name() == Some(name))
    }

    /// All `<entry>` children in document order.
    pub fn entries(&self) -> impl Iterator<Item = &XmlNode> {
        self.children.iter().filter(|child| child.tag == ENTRY_TAG)
    }

    /// Return the child with `tag`, appending an empty one if missing.
    pub fn ensure_child(&mut self, tag: &str) -> &mut XmlNode {
        let idx = match self.children.iter().position(|c| c.tag == tag) {
            Some(idx) => idx,
            None => {
                self.children.push(XmlNode::new(tag));
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }

    /// Return the named `<entry>` child, appending one if missing.
    pub fn ensure_entry(&mut self, name: &str) -> &mut XmlNode {
        let idx = match self
            .children
            .iter()
            .position(|c| c.entry_name() == Some(name))
        {
            Some(idx) => idx,
            None => {
                self.children.push(XmlNode::entry(name));
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }

    /// Remove and return the named `<entry>` child.
    pub fn remove_entry(&mut self, name: &str) -> Option<XmlNode> {
        let idx = self
            .children
            .iter()
            .position(|c| c.entry_name() == Some(name))?;
        Some(self.children.remove(idx))
    }

    /// Walk a nested tag path and return terminal node text if found.
    pub fn get_text<'a>(&'a self, path: &[&str]) -> Option<&'a str> {
        self.descend(path)?.text.as_deref()
    }

    /// Walk a nested tag path.
    pub fn descend(&self, path: &[&str]) -> Option<&XmlNode> {
        let mut current = self;
        for segment in path {
            current = current.get_child(segment)?;
        }
        Some(current)
    }

    /// Mutable variant of [`XmlNode::descend`].
    pub fn descend_mut(&mut self, path: &[&str]) -> Option<&mut XmlNode> {
        let mut current = self;
        for segment in path {
            current = current.get_child_mut(segment)?;
        }
        Some(current)
    }

    /// Walk a nested tag path, creating missing elements on the way.
    pub fn ensure_path(&mut self, path: &[&str]) -> &mut XmlNode {
        let mut current = self;
        for segment in path {
            current = current.ensure_child(segment);
        }
        current
    }

    /// Set the text of the element at `path`, creating it if needed.
    pub fn set_text_at(&mut self, path: &[&str], text: impl Into<String>) {
        self.ensure_path(path).text = Some(text.into());
    }

    /// Remove the element at `path`.
    ///
    /// Intermediate elements left empty by the removal are pruned as well, so
    /// that removing `keep-alive/enable` from `<keep-alive><enable/></keep-alive>`
    /// leaves no `<keep-alive/>` behind.
    pub fn remove_path(&mut self, path: &[&str]) -> Option<XmlNode> {
        let (first, rest) = path.split_first()?;
        if rest.is_empty() {
            let idx = self.children.iter().position(|c| c.tag == *first)?;
            return Some(self.children.remove(idx));
        }

        let idx = self.children.iter().position(|c| c.tag == *first)?;
        let removed = self.children[idx].remove_path(rest);
        if removed.is_some() && self.children[idx].is_empty() {
            self.children.remove(idx);
        }
        removed
    }
}

impl Display for XmlNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (key, value) in &self.attributes {
            write!(f, " {}=\"{}\"", key, escape(value.as_str()))?;
        }

        if self.children.is_empty() && self.text.is_none() {
            return write!(f, "/>");
        }

        write!(f, ">")?;
        if let Some(text) = &self.text {
            write!(f, "{}", escape(text.as_str()))?;
        }
        for child in &self.children {
            write!(f, "{}", child)?;
        }
        write!(f, "</{}>", self.tag)
    }
}

#[cfg(test)]
mod tests {
    use super::XmlNode;

    #[test]
    fn get_text_walks_nested_path() {
        let mut root = XmlNode::new("keep-alive");
        root.set_text_at(&["timers", "interval"], "10");

        assert_eq!(root.get_text(&["timers", "interval"]), Some("10"));
        assert_eq!(root.get_text(&["timers", "retry"]), None);
    }

    #[test]
    fn ensure_entry_is_idempotent() {
        let mut gre = XmlNode::new("gre");
        gre.ensure_entry("t1").set_text_at(&["ttl"], "42");
        gre.ensure_entry("t1");
        gre.ensure_entry("t2");

        assert_eq!(gre.entries().count(), 2);
        assert_eq!(
            gre.get_entry("t1").and_then(|e| e.get_text(&["ttl"])),
            Some("42")
        );
    }

    #[test]
    fn remove_path_prunes_emptied_parents() {
        let mut entry = XmlNode::entry("t1");
        entry.set_text_at(&["keep-alive", "enable"], "yes");
        entry.set_text_at(&["ttl"], "64");

        let removed = entry.remove_path(&["keep-alive", "enable"]);
        assert_eq!(removed.and_then(|n| n.text), Some("yes".to_string()));
        assert!(entry.get_child("keep-alive").is_none());
        assert!(entry.get_child("ttl").is_some());
    }

    #[test]
    fn remove_path_keeps_parent_with_other_children() {
        let mut entry = XmlNode::entry("t1");
        entry.set_text_at(&["keep-alive", "enable"], "yes");
        entry.set_text_at(&["keep-alive", "retry"], "3");

        entry.remove_path(&["keep-alive", "enable"]);
        assert_eq!(entry.get_text(&["keep-alive", "retry"]), Some("3"));
    }

    #[test]
    fn display_escapes_text_and_attributes() {
        let mut node = XmlNode::entry("a&b");
        node.children.push(XmlNode::leaf("description", "x < y"));

        assert_eq!(
            node.to_string(),
            r#"<entry name="a&amp;b"><description>x &lt; y</description></entry>"#
        );
    }
}
