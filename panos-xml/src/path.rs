//! Entry-aware addressing of nodes inside a configuration document.
//!
//! PAN-OS configuration paths mix plain tags with named collection members,
//! e.g. `/config/devices/entry[@name='localhost.localdomain']/network`. An
//! [`XmlPath`] is an ordered list of such steps starting at the document root.

use std::fmt::{self, Display, Formatter};

use crate::tree::{XmlNode, ENTRY_TAG};

/// One step of an [`XmlPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The first child element with this tag.
    Tag(String),
    /// The `<entry>` child whose `name` attribute matches.
    Entry(String),
}

impl Step {
    fn matches(&self, node: &XmlNode) -> bool {
        match self {
            Step::Tag(tag) => node.tag == *tag,
            Step::Entry(name) => node.entry_name() == Some(name.as_str()),
        }
    }

    fn create(&self) -> XmlNode {
        match self {
            Step::Tag(tag) => XmlNode::new(tag.as_str()),
            Step::Entry(name) => XmlNode::entry(name.as_str()),
        }
    }
}

/// Absolute path from the document root element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlPath {
    steps: Vec<Step>,
}

impl XmlPath {
    /// A path whose first step is the document root tag.
    pub fn root(tag: &str) -> Self {
        Self {
            steps: vec![Step::Tag(tag.to_string())],
        }
    }

    /// Append a plain tag step.
    pub fn tag(mut self, tag: &str) -> Self {
        self.steps.push(Step::Tag(tag.to_string()));
        self
    }

    /// Append an `entry[@name=...]` step.
    pub fn entry(mut self, name: &str) -> Self {
        self.steps.push(Step::Entry(name.to_string()));
        self
    }

    /// Append several plain tag steps.
    pub fn join(mut self, tags: &[&str]) -> Self {
        self.steps
            .extend(tags.iter().map(|tag| Step::Tag(tag.to_string())));
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Find the addressed node, if present.
    pub fn resolve<'a>(&self, root: &'a XmlNode) -> Option<&'a XmlNode> {
        let (first, rest) = self.steps.split_first()?;
        if !first.matches(root) {
            return None;
        }
        let mut current = root;
        for step in rest {
            current = current.children.iter().find(|c| step.matches(c))?;
        }
        Some(current)
    }

    /// Mutable variant of [`XmlPath::resolve`].
    pub fn resolve_mut<'a>(&self, root: &'a mut XmlNode) -> Option<&'a mut XmlNode> {
        let (first, rest) = self.steps.split_first()?;
        if !first.matches(root) {
            return None;
        }
        let mut current = root;
        for step in rest {
            current = current.children.iter_mut().find(|c| step.matches(c))?;
        }
        Some(current)
    }

    /// Find the addressed node, creating missing steps below the root.
    ///
    /// Returns `None` only when the root step does not match `root`.
    pub fn ensure<'a>(&self, root: &'a mut XmlNode) -> Option<&'a mut XmlNode> {
        let (first, rest) = self.steps.split_first()?;
        if !first.matches(root) {
            return None;
        }
        let mut current = root;
        for step in rest {
            let idx = match current.children.iter().position(|c| step.matches(c)) {
                Some(idx) => idx,
                None => {
                    current.children.push(step.create());
                    current.children.len() - 1
                }
            };
            current = &mut current.children[idx];
        }
        Some(current)
    }
}

impl Display for XmlPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            match step {
                Step::Tag(tag) => write!(f, "/{tag}")?,
                Step::Entry(name) => write!(f, "/{ENTRY_TAG}[@name='{name}']")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::XmlPath;
    use crate::parser::parse;

    fn device_root() -> XmlPath {
        XmlPath::root("config")
            .tag("devices")
            .entry("localhost.localdomain")
    }

    #[test]
    fn displays_as_xpath() {
        let path = device_root().join(&["network", "tunnel", "gre"]);
        assert_eq!(
            path.to_string(),
            "/config/devices/entry[@name='localhost.localdomain']/network/tunnel/gre"
        );
    }

    #[test]
    fn resolves_through_named_entries() {
        let doc = parse(
            br#"<config><devices>
                <entry name="other"><network><x>1</x></network></entry>
                <entry name="localhost.localdomain"><network><x>2</x></network></entry>
            </devices></config>"#,
        )
        .expect("parse");

        let node = device_root().tag("network").resolve(&doc).expect("resolve");
        assert_eq!(node.get_text(&["x"]), Some("2"));
    }

    #[test]
    fn ensure_creates_missing_steps() {
        let mut doc = parse(b"<config/>").expect("parse");
        device_root()
            .join(&["network", "tunnel", "gre"])
            .ensure(&mut doc)
            .expect("root matches")
            .ensure_entry("t1");

        let gre = device_root()
            .join(&["network", "tunnel", "gre"])
            .resolve(&doc)
            .expect("created");
        assert!(gre.get_entry("t1").is_some());
    }

    #[test]
    fn root_mismatch_resolves_to_none() {
        let mut doc = parse(b"<response/>").expect("parse");
        assert!(device_root().resolve(&doc).is_none());
        assert!(device_root().ensure(&mut doc).is_none());
    }
}
