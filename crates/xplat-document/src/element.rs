//! Element tree for configuration documents.
//!
//! A document is a tree of elements. Each element carries its qualified name
//! exactly as written (namespace prefix included), an insertion-ordered
//! attribute map, a text payload and an ordered list of children.

/// Insertion-ordered attribute map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// Create an empty attribute map
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an attribute value
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing the value in place if it already exists
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Check whether an attribute is present
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(key, _)| key == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate attributes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Exact set equality: same keys, same values, nothing extra on
    /// either side. Order is ignored.
    pub fn same_set(&self, other: &Attributes) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (key, value) in iter {
            attributes.set(key, value);
        }
        attributes
    }
}

/// A single element of a configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Qualified name, prefix preserved verbatim (`foo:bar`)
    pub name: String,

    /// Attributes in document order
    pub attributes: Attributes,

    /// Text payload (empty when the element has none)
    pub text: String,

    /// Child elements in document order
    pub children: Vec<Element>,
}

impl Element {
    /// Create an element with no attributes, text or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder: add an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.set(name, value);
        self
    }

    /// Builder: set the text payload
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Builder: append a child
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Get an attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    /// First direct child with the given qualified name
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// First direct child with the given qualified name, mutably
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find(|child| child.name == name)
    }

    /// All direct children with the given qualified name
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn append(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Remove every direct child with the given name, returning how many went
    pub fn remove_all(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|child| child.name != name);
        before - self.children.len()
    }

    /// True when the element has no attributes, no text and no children
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.text.is_empty() && self.children.is_empty()
    }
}

/// A whole configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    /// Create a document with an empty root element
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root: Element::new(root_name),
        }
    }

    pub fn from_root(root: Element) -> Self {
        Self { root }
    }
}
