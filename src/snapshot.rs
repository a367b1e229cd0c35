use crate::include::Include;
use crate::parser;
use std::collections::{BTreeMap, BTreeSet};

/// One logical line of the working template.
///
/// Besides the classified `text`, a line remembers what it looked like in
/// the file so the writer can reproduce untouched entries byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceLine {
    /// Logical line: continuations joined, hidden marker removed
    pub text: String,

    /// Physical text as read, newline-joined when it spanned several lines
    pub raw: Option<String>,

    /// The line was a disabled (`#key=value`) property
    pub hidden: bool,

    /// Raw comment lines associated with this property
    pub leading: Vec<String>,

    /// Comment text associated with this property at read time
    pub comment: Option<String>,

    /// Include directive that spliced this line in
    pub include: Option<Include>,
}

impl SourceLine {
    /// A line with no file representation
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A line read from a file
    pub fn physical(text: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            raw: Some(raw.into()),
            ..Self::default()
        }
    }

    pub fn blank() -> Self {
        Self::new("")
    }

    pub fn is_comment(&self) -> bool {
        !self.hidden && parser::is_comment(&self.text)
    }

    /// Key and decoded value, if this line declares a property
    pub fn property(&self, strict: bool) -> Option<(&str, String)> {
        parser::property(&self.text, strict)
    }

    pub fn key(&self, strict: bool) -> Option<&str> {
        parser::line_key(&self.text, strict)
    }

    /// Text as it appeared in the file, or the logical text
    pub fn original(&self) -> &str {
        self.raw.as_deref().unwrap_or(&self.text)
    }
}

/// One complete state of a property set.
///
/// [`Properties`](crate::Properties) keeps two of these: the working copy
/// and the baseline captured by the last `save()`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub properties: BTreeMap<String, String>,
    pub source: Vec<SourceLine>,
    pub comments: BTreeMap<String, String>,
    pub hidden: BTreeSet<String>,
    pub includes: Vec<Include>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` exists and is not hidden
    pub fn is_visible(&self, key: &str) -> bool {
        self.properties.contains_key(key) && !self.hidden.contains(key)
    }

    /// Drop a key together with its comment and hidden flag
    pub fn remove_key(&mut self, key: &str) -> Option<String> {
        self.comments.remove(key);
        self.hidden.remove(key);
        self.properties.remove(key)
    }

    /// Visible keys in sorted order
    pub fn visible_keys(&self) -> impl Iterator<Item = &String> {
        self.properties
            .keys()
            .filter(|key| !self.hidden.contains(key.as_str()))
    }

    /// Register an include unless the same triple is already present
    pub fn add_include(&mut self, include: Include) -> bool {
        if self.includes.contains(&include) {
            false
        } else {
            self.includes.push(include);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_key_clears_metadata() {
        let mut snapshot = Snapshot::new();
        snapshot.properties.insert("a".into(), "1".into());
        snapshot.comments.insert("a".into(), "note".into());
        snapshot.hidden.insert("a".into());

        assert_eq!(snapshot.remove_key("a").as_deref(), Some("1"));
        assert!(snapshot.comments.is_empty());
        assert!(snapshot.hidden.is_empty());
        assert_eq!(snapshot.remove_key("a"), None);
    }

    #[test]
    fn test_visible_keys() {
        let mut snapshot = Snapshot::new();
        snapshot.properties.insert("b".into(), "2".into());
        snapshot.properties.insert("a".into(), "1".into());
        snapshot.hidden.insert("b".into());

        let keys: Vec<_> = snapshot.visible_keys().cloned().collect();
        assert_eq!(keys, vec!["a".to_string()]);
        assert!(snapshot.is_visible("a"));
        assert!(!snapshot.is_visible("b"));
    }

    #[test]
    fn test_includes_are_unique() {
        let mut snapshot = Snapshot::new();
        let include = Include::new("foo.properties", "", false);
        assert!(snapshot.add_include(include.clone()));
        assert!(!snapshot.add_include(include));
        assert!(snapshot.add_include(Include::new("foo.properties", "", true)));
        assert_eq!(snapshot.includes.len(), 2);
    }

    #[test]
    fn test_source_line_shapes() {
        let line = SourceLine::physical("a=1", "a=\\\n  1");
        assert_eq!(line.original(), "a=\\\n  1");
        assert_eq!(line.key(true), Some("a"));

        let hidden = SourceLine {
            hidden: true,
            ..SourceLine::new("b=2")
        };
        assert!(!hidden.is_comment());
        assert!(SourceLine::new("# note").is_comment());
        assert_eq!(SourceLine::blank().original(), "");
    }
}
