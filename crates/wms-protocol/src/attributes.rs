//! Preservation of unrecognized attributes on a request's root element.
//!
//! Namespace declarations and foreign attributes such as
//! `xsi:schemaLocation` are captured when a request is parsed and written
//! back unchanged when it is built again. SERVICE, REQUEST and VERSION are
//! modeled as typed fields and never enter the bag.

/// Attribute names that are modeled as request fields.
const RESERVED: [&str; 3] = ["SERVICE", "REQUEST", "VERSION"];

/// A single attribute as written in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct XmlAttribute {
    /// Prefix as written (`xmlns` for namespace declarations), not resolved
    pub prefix: Option<String>,
    pub local: String,
    pub value: String,
}

impl XmlAttribute {
    pub fn new(prefix: Option<&str>, local: &str, value: &str) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
            value: value.to_string(),
        }
    }

    /// Split a qualified name such as `xmlns:ows` into prefix and local part.
    pub fn from_qualified(name: &str, value: impl Into<String>) -> Self {
        let (prefix, local) = match name.split_once(':') {
            Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
            None => (None, name.to_string()),
        };
        Self {
            prefix,
            local,
            value: value.into(),
        }
    }

    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.local),
            None => self.local.clone(),
        }
    }

    fn is_reserved(&self) -> bool {
        self.prefix.is_none() && RESERVED.iter().any(|r| r.eq_ignore_ascii_case(&self.local))
    }
}

/// Ordered attributes captured from a root element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeBag(Vec<XmlAttribute>);

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every attribute in document order, minus the reserved ones.
    pub fn capture<'a>(attributes: impl IntoIterator<Item = &'a XmlAttribute>) -> Self {
        Self(
            attributes
                .into_iter()
                .filter(|attr| !attr.is_reserved())
                .cloned()
                .collect(),
        )
    }

    /// The attributes as `(qualified name, value)` pairs, exactly as captured.
    pub fn emit(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|attr| (attr.qualified_name(), attr.value.clone()))
            .collect()
    }

    /// Collapse repeats of the same qualified name.
    ///
    /// The last value wins and takes the position of the first occurrence.
    pub fn dedupe(&self) -> Self {
        let mut out: Vec<XmlAttribute> = Vec::with_capacity(self.0.len());
        for attr in &self.0 {
            match out
                .iter_mut()
                .find(|seen| seen.prefix == attr.prefix && seen.local == attr.local)
            {
                Some(seen) => seen.value = attr.value.clone(),
                None => out.push(attr.clone()),
            }
        }
        Self(out)
    }

    /// Append defaults for qualified names the bag does not already carry.
    pub fn with_defaults(&self, defaults: &[(&str, &str)]) -> Self {
        let mut out = self.clone();
        for (name, value) in defaults {
            if out.get(name).is_none() {
                out.0.push(XmlAttribute::from_qualified(name, *value));
            }
        }
        out
    }

    /// Look up a value by qualified name.
    pub fn get(&self, qualified_name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|attr| attr.qualified_name() == qualified_name)
            .map(|attr| attr.value.as_str())
    }

    pub fn push(&mut self, attribute: XmlAttribute) {
        self.0.push(attribute);
    }

    pub fn iter(&self) -> impl Iterator<Item = &XmlAttribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
