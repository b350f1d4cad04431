//! Insertion-ordered element attributes.
//!
//! [§ 4.9.2 Interface `NamedNodeMap`](https://dom.spec.whatwg.org/#interface-namednodemap)
//!
//! "The attribute list is an ordered list." Keys are stored lowercased
//! (HTML attribute names are ASCII case-insensitive); values keep their
//! original case. Lookups are linear — attribute lists are tiny in
//! practice and order must be preserved for serialization.

/// One `name="value"` pair on an element. The name is always lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// Lowercased attribute name.
    pub name: String,
    /// Attribute value, case preserved.
    pub value: String,
}

/// An element's attributes in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrList {
    attrs: Vec<Attr>,
}

impl AttrList {
    /// Create an empty attribute list.
    #[must_use]
    pub const fn new() -> Self {
        Self { attrs: Vec::new() }
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// True if the element has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Look up an attribute value. `name` is matched case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// True if the attribute is present, regardless of value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert an attribute, lowercasing the name.
    ///
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "If there is already an attribute on the token with the exact same
    /// name, then this is a duplicate-attribute parse error and the new
    /// attribute must be removed from the token." The first occurrence
    /// wins; later duplicates are dropped.
    pub fn insert(&mut self, name: &str, value: String) {
        let name = name.to_ascii_lowercase();
        if self.attrs.iter().any(|a| a.name == name) {
            return;
        }
        self.attrs.push(Attr { name, value });
    }

    /// Replace an attribute value, or append it if absent. Used by the
    /// engine for synthesized elements, never by the parser.
    pub fn set(&mut self, name: &str, value: String) {
        let name = name.to_ascii_lowercase();
        if let Some(attr) = self.attrs.iter_mut().find(|a| a.name == name) {
            attr.value = value;
        } else {
            self.attrs.push(Attr { name, value });
        }
    }

    /// Iterate attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Attr> {
        self.attrs.iter()
    }
}

impl<'a> IntoIterator for &'a AttrList {
    type Item = &'a Attr;
    type IntoIter = std::slice::Iter<'a, Attr>;

    fn into_iter(self) -> Self::IntoIter {
        self.attrs.iter()
    }
}

impl FromIterator<(String, String)> for AttrList {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut list = Self::new();
        for (name, value) in iter {
            list.insert(&name, value);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_preserved() {
        let mut attrs = AttrList::new();
        attrs.insert("href", "x".to_string());
        attrs.insert("CLASS", "a b".to_string());
        attrs.insert("id", "main".to_string());
        let names: Vec<&str> = attrs.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["href", "class", "id"]);
    }

    #[test]
    fn first_duplicate_wins() {
        let mut attrs = AttrList::new();
        attrs.insert("id", "first".to_string());
        attrs.insert("ID", "second".to_string());
        assert_eq!(attrs.get("id"), Some("first"));
        assert_eq!(attrs.len(), 1);
    }

    #[test]
    fn values_keep_case() {
        let mut attrs = AttrList::new();
        attrs.insert("Alt", "Hello World".to_string());
        assert_eq!(attrs.get("alt"), Some("Hello World"));
    }
}
