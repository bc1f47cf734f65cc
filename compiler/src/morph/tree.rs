//! Script document tree.
//!
//! [`Element`] is a plain owned XML-like node. [`ScriptDocument`] holds the
//! root plus exactly one `meta`, `rules` and `maps` section; the sections are
//! fields rather than children so they can never be duplicated.

/// A tree node with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: Option<String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Builder-style text content
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set an attribute, replacing the value in place if the key exists.
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

/// The compiled script: root element plus its three sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDocument {
    root: Element,
    meta_name: String,
    rules: Vec<Element>,
    maps: Vec<Element>,
}

pub const META_SECTION: &str = "meta";
pub const RULES_SECTION: &str = "rules";
pub const MAPS_SECTION: &str = "maps";
pub const META_NAME: &str = "name";

impl ScriptDocument {
    /// Create an empty skeleton under the given root element.
    ///
    /// Children already present on `root` are discarded.
    pub fn new(root: Element, meta_name: impl Into<String>) -> Self {
        Self {
            root: Element {
                children: Vec::new(),
                ..root
            },
            meta_name: meta_name.into(),
            rules: Vec::new(),
            maps: Vec::new(),
        }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn meta_name(&self) -> &str {
        &self.meta_name
    }

    pub fn rules(&self) -> &[Element] {
        &self.rules
    }

    pub fn maps(&self) -> &[Element] {
        &self.maps
    }

    pub fn push_rule(&mut self, rule: Element) {
        self.rules.push(rule);
    }

    pub fn push_map(&mut self, map: Element) {
        self.maps.push(map);
    }

    /// Assemble the full tree in section order: meta, rules, maps.
    pub fn to_element(&self) -> Element {
        let meta = Element::new(META_SECTION)
            .with_child(Element::new(META_NAME).with_text(self.meta_name.clone()));

        let mut rules = Element::new(RULES_SECTION);
        rules.children = self.rules.clone();

        let mut maps = Element::new(MAPS_SECTION);
        maps.children = self.maps.clone();

        self.root
            .clone()
            .with_child(meta)
            .with_child(rules)
            .with_child(maps)
    }
}
