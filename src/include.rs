//! `__include__` directives and the include registry.

use crate::error::{Diagnostic, PropResult, PropertiesError};
use crate::properties::Properties;
use crate::snapshot::SourceLine;
use std::fmt;
use std::path::{Path, PathBuf};

const DIRECTIVE: &str = "__include__";
const HIDDEN: &str = "__include__.hidden";
const PREFIXED: &str = "__include__.as.";
const HIDDEN_PREFIXED: &str = "__include__.hidden.as.";

/// A registered inclusion, unique by its `(path, prefix, hidden)` triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Include {
    /// Path as written in the directive
    pub path: PathBuf,

    /// Prepended with a `.` to every included key; empty for none
    pub prefix: String,

    /// Every included property is disabled
    pub hidden: bool,
}

impl Include {
    pub fn new(path: impl AsRef<Path>, prefix: impl Into<String>, hidden: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            prefix: prefix.into(),
            hidden,
        }
    }

    /// Interpret a property as an include directive.
    ///
    /// Returns `None` when `key` is not one of the four directive spellings.
    pub fn from_directive(key: &str, value: &str) -> Option<Self> {
        let (prefix, hidden) = if key == DIRECTIVE {
            ("", false)
        } else if key == HIDDEN {
            ("", true)
        } else if let Some(prefix) = key.strip_prefix(HIDDEN_PREFIXED) {
            (prefix, true)
        } else if let Some(prefix) = key.strip_prefix(PREFIXED) {
            (prefix, false)
        } else {
            return None;
        };

        if key != DIRECTIVE && key != HIDDEN && prefix.is_empty() {
            return None;
        }

        Some(Self::new(value.trim(), prefix, hidden))
    }

    /// Directive key for this inclusion
    pub fn directive_key(&self) -> String {
        match (self.hidden, self.prefix.is_empty()) {
            (false, true) => DIRECTIVE.to_string(),
            (true, true) => HIDDEN.to_string(),
            (false, false) => format!("{}{}", PREFIXED, self.prefix),
            (true, false) => format!("{}{}", HIDDEN_PREFIXED, self.prefix),
        }
    }

    /// Apply this inclusion's prefix to a key
    pub fn prefixed(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.prefix, key)
        }
    }
}

impl fmt::Display for Include {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.directive_key(), self.path.display())
    }
}

/// Tracks the chain of files being loaded to stop runaway include recursion
#[derive(Debug, Clone)]
pub struct IncludeResolver {
    /// Stack of currently loading files (canonical paths)
    loading_stack: Vec<PathBuf>,

    /// Maximum nesting depth
    max_depth: usize,
}

impl IncludeResolver {
    pub fn new(max_depth: usize) -> Self {
        Self {
            loading_stack: Vec::new(),
            max_depth,
        }
    }

    /// Begin loading a file (checks for cycles and depth)
    pub fn begin_load(&mut self, path: &Path) -> PropResult<()> {
        if self.loading_stack.len() >= self.max_depth {
            return Err(PropertiesError::include(
                path,
                format!("maximum include depth ({}) exceeded", self.max_depth),
            ));
        }

        if self.loading_stack.iter().any(|loading| loading == path) {
            return Err(PropertiesError::include(path, "circular include"));
        }

        self.loading_stack.push(path.to_path_buf());
        Ok(())
    }

    /// End loading a file
    pub fn end_load(&mut self) {
        self.loading_stack.pop();
    }

    pub fn depth(&self) -> usize {
        self.loading_stack.len()
    }
}

/// Include registry operations
pub trait Includable {
    /// Register an inclusion. Returns false if the triple was already registered.
    ///
    /// Fails on an empty path; a missing target only raises a diagnostic.
    fn add_include(&mut self, include: Include) -> PropResult<bool>;

    /// Unregister an inclusion; its keys stay and are written inline
    fn remove_include(&mut self, include: &Include) -> bool;

    /// Unregister an inclusion and remove every key it contributes
    fn purge_include(&mut self, include: &Include) -> PropResult<usize>;

    /// Remove the keys an inclusion contributes but keep it registered
    fn strip_include(&mut self, include: &Include) -> PropResult<usize>;

    /// Registered inclusions in registration order
    fn includes(&self) -> &[Include];

    /// Remove every key defined in the file at `path`
    fn remove_keys_from(&mut self, path: impl AsRef<Path>) -> PropResult<usize>;
}

impl Properties {
    /// Resolve a path against the directory of this set's own file
    pub(crate) fn resolve_path(&self, path: &Path) -> PathBuf {
        match self.path.as_deref().and_then(Path::parent) {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Keys an inclusion brought in, prefixed.
    ///
    /// Taken from the spliced source lines when the include was expanded on
    /// read, otherwise from reading the target.
    fn contributed_keys(&self, include: &Include) -> PropResult<Vec<String>> {
        let strict = self.options.strict;
        let spliced: Vec<String> = self
            .working
            .source
            .iter()
            .filter(|line| spliced_by(line, include))
            .filter_map(|line| line.key(strict).map(str::to_string))
            .collect();
        if !spliced.is_empty() {
            return Ok(spliced);
        }

        let target = self.resolve_path(&include.path);
        let other = Properties::read_with_options(&target, self.options.clone())
            .map_err(|e| PropertiesError::include(&include.path, e.to_string()))?;
        Ok(other
            .origin
            .properties
            .keys()
            .map(|key| include.prefixed(key))
            .collect())
    }

    fn remove_contributed(&mut self, include: &Include) -> PropResult<usize> {
        let keys = self.contributed_keys(include)?;
        let removed = keys
            .iter()
            .filter(|key| self.working.remove_key(key).is_some())
            .count();
        self.dirty = true;
        Ok(removed)
    }
}

impl Includable for Properties {
    fn add_include(&mut self, include: Include) -> PropResult<bool> {
        if include.path.as_os_str().is_empty() {
            return Err(PropertiesError::include(&include.path, "empty include path"));
        }

        let target = self.resolve_path(&include.path);
        if !target.is_file() {
            self.report(Diagnostic::IncludeTargetMissing { path: target });
        }

        self.dirty = true;
        Ok(self.working.add_include(include))
    }

    fn remove_include(&mut self, include: &Include) -> bool {
        let before = self.working.includes.len();
        self.working.includes.retain(|registered| registered != include);
        self.dirty = true;
        self.working.includes.len() != before
    }

    fn purge_include(&mut self, include: &Include) -> PropResult<usize> {
        let removed = self.remove_contributed(include)?;
        self.remove_include(include);
        self.working
            .source
            .retain(|line| !spliced_by(line, include));

        if removed == 0 {
            self.report(Diagnostic::NothingPurged {
                path: include.path.clone(),
            });
        }
        tracing::debug!(include = %include, removed, "purged include");
        Ok(removed)
    }

    fn strip_include(&mut self, include: &Include) -> PropResult<usize> {
        let removed = self.remove_contributed(include)?;
        self.working.add_include(include.clone());
        Ok(removed)
    }

    fn includes(&self) -> &[Include] {
        &self.working.includes
    }

    fn remove_keys_from(&mut self, path: impl AsRef<Path>) -> PropResult<usize> {
        let target = self.resolve_path(path.as_ref());
        let other = Properties::read_with_options(&target, self.options.clone())?;
        let removed = other
            .origin
            .properties
            .keys()
            .filter(|key| self.working.remove_key(key).is_some())
            .count();
        self.dirty = true;
        Ok(removed)
    }
}

/// Whether a source line came from `include`
pub(crate) fn spliced_by(line: &SourceLine, include: &Include) -> bool {
    line.include.as_ref() == Some(include)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain("__include__", Include::new("foo.properties", "", false))]
    #[case::hidden("__include__.hidden", Include::new("foo.properties", "", true))]
    #[case::prefixed("__include__.as.foo", Include::new("foo.properties", "foo", false))]
    #[case::hidden_prefixed(
        "__include__.hidden.as.baz",
        Include::new("foo.properties", "baz", true)
    )]
    fn test_directive_round_trip(#[case] key: &str, #[case] expected: Include) {
        let include = Include::from_directive(key, " foo.properties ");
        assert_eq!(include.as_ref(), Some(&expected));
        assert_eq!(expected.directive_key(), key);
    }

    #[rstest]
    #[case::plain_key("include")]
    #[case::empty_prefix("__include__.as.")]
    #[case::unknown("__include__.other")]
    fn test_not_a_directive(#[case] key: &str) {
        assert_eq!(Include::from_directive(key, "x.properties"), None);
    }

    #[test]
    fn test_display() {
        let include = Include::new("sub/bar.properties", "bar", true);
        assert_eq!(
            include.to_string(),
            "__include__.hidden.as.bar=sub/bar.properties"
        );
        assert_eq!(include.prefixed("key"), "bar.key");
    }

    #[test]
    fn test_resolver_detects_cycles() {
        let mut resolver = IncludeResolver::new(50);
        resolver.begin_load(Path::new("/a")).unwrap();
        resolver.begin_load(Path::new("/b")).unwrap();
        let err = resolver.begin_load(Path::new("/a")).unwrap_err();
        assert!(matches!(err, PropertiesError::Include { .. }));
        resolver.end_load();
        assert_eq!(resolver.depth(), 1);
    }

    #[test]
    fn test_resolver_depth_limit() {
        let mut resolver = IncludeResolver::new(2);
        resolver.begin_load(Path::new("/a")).unwrap();
        resolver.begin_load(Path::new("/b")).unwrap();
        assert!(resolver.begin_load(Path::new("/c")).is_err());
    }
}
