use crate::error::{PropResult, PropertiesError};
use crate::identifier::Identifier;
use crate::properties::Properties;

/// Disabling and re-enabling properties.
///
/// A hidden property stays in the set and is written as `#key=value`, but
/// `get`, `gets` and grouping skip it.
pub trait Hideable {
    /// Hide a visible key; fails if it is absent or already hidden
    fn hide(&mut self, key: &str) -> PropResult<()>;

    /// Hide every visible key matching `pattern`, returning how many
    fn hides(&mut self, pattern: &str) -> PropResult<usize>;

    /// Make a key visible again; does nothing if it was not hidden
    fn unhide(&mut self, key: &str);

    /// Unhide every hidden key matching `pattern`, returning how many
    fn unhides(&mut self, pattern: &str) -> PropResult<usize>;

    fn is_hidden(&self, key: &str) -> bool;

    /// Hidden keys, sorted
    fn hidden_keys(&self) -> Vec<String>;
}

impl Hideable for Properties {
    fn hide(&mut self, key: &str) -> PropResult<()> {
        if !self.working.is_visible(key) {
            return Err(PropertiesError::not_available(key));
        }
        self.working.hidden.insert(key.to_string());
        self.dirty = true;
        Ok(())
    }

    fn hides(&mut self, pattern: &str) -> PropResult<usize> {
        let keys: Vec<String> = self.gets(pattern)?.into_keys().collect();
        for key in &keys {
            self.working.hidden.insert(key.clone());
        }
        self.dirty = true;
        Ok(keys.len())
    }

    fn unhide(&mut self, key: &str) {
        self.working.hidden.remove(key);
        self.dirty = true;
    }

    fn unhides(&mut self, pattern: &str) -> PropResult<usize> {
        let identifier = Identifier::new(pattern)?;
        let before = self.working.hidden.len();
        self.working.hidden.retain(|key| !identifier.matches(key));
        self.dirty = true;
        Ok(before - self.working.hidden.len())
    }

    fn is_hidden(&self, key: &str) -> bool {
        self.working.hidden.contains(key)
    }

    fn hidden_keys(&self) -> Vec<String> {
        self.working.hidden.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Properties {
        let mut props = Properties::new();
        props.set("a.0", "x").unwrap();
        props.set("a.1", "y").unwrap();
        props.set("b", "z").unwrap();
        props
    }

    #[test]
    fn test_hide_unhide_inverse() {
        let mut props = sample();
        props.hide("b").unwrap();
        assert!(props.is_hidden("b"));
        assert!(props.get("b").is_err());

        props.unhide("b");
        assert_eq!(props.get("b").unwrap(), "z");
    }

    #[test]
    fn test_hide_failures() {
        let mut props = sample();
        assert_eq!(
            props.hide("missing"),
            Err(PropertiesError::not_available("missing"))
        );
        props.hide("b").unwrap();
        assert!(props.hide("b").is_err());
        props.unhide("never-hidden");
    }

    #[test]
    fn test_bulk_hiding() {
        let mut props = sample();
        assert_eq!(props.hides("a.*").unwrap(), 2);
        assert_eq!(props.hidden_keys(), vec!["a.0", "a.1"]);
        assert!(props.groups().unwrap().is_empty());

        assert_eq!(props.unhides("a.0").unwrap(), 1);
        assert_eq!(props.hidden_keys(), vec!["a.1"]);
    }
}
