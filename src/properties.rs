use regex::Regex;
use tracing::debug;
use crate::error::{Diagnostic, PropResult, PropertiesError};
use crate::identifier::{self, Identifier};
use crate::interpolation;
use crate::parser;
use crate::reader::{Loaded, ReadOptions, Reader};
use crate::snapshot::{SourceLine, Snapshot};
use crate::types::PropertyValue;
use std::collections::BTreeMap;
use std::mem;
use std::path::{Path, PathBuf};

/// A `.properties` file held in memory.
///
/// Keeps a working copy that every mutator edits and a baseline captured by
/// [`save`](Properties::save). The writer and the merge operations only look
/// at the baseline.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    pub(crate) path: Option<PathBuf>,
    pub(crate) name: String,
    pub(crate) options: ReadOptions,
    pub(crate) working: Snapshot,
    pub(crate) origin: Snapshot,
    pub(crate) dirty: bool,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl Properties {
    /// Create an empty, strict property set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty property set with custom options
    pub fn with_options(options: ReadOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Create an empty property set bound to `path` without reading it
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        Self {
            path: Some(path.to_path_buf()),
            name: file_stem(path),
            ..Self::default()
        }
    }

    /// Read a file with default options
    pub fn read(path: impl AsRef<Path>) -> PropResult<Self> {
        Self::read_with_options(path, ReadOptions::default())
    }

    /// Read a file; the loaded state becomes the baseline
    pub fn read_with_options(path: impl AsRef<Path>, options: ReadOptions) -> PropResult<Self> {
        let path = path.as_ref();
        let loaded = Reader::new(options.clone()).read_file(path)?;
        let mut props = Self::with_options(options);
        props.path = Some(path.to_path_buf());
        props.name = file_stem(path);
        props.install(loaded);
        Ok(props)
    }

    /// Parse text; includes resolve relative to the current directory
    pub fn parse_str(text: &str, options: ReadOptions) -> PropResult<Self> {
        Self::parse_str_in(text, Path::new("."), options)
    }

    /// Parse text; includes resolve relative to `base_dir`
    pub fn parse_str_in(text: &str, base_dir: &Path, options: ReadOptions) -> PropResult<Self> {
        let loaded = Reader::new(options.clone()).read_str(text, base_dir)?;
        let mut props = Self::with_options(options);
        props.install(loaded);
        Ok(props)
    }

    fn install(&mut self, loaded: Loaded) {
        self.working = loaded.snapshot;
        for diagnostic in loaded.diagnostics {
            self.diagnostics.push(diagnostic);
        }
        self.save();
    }

    fn load_own_file(&self) -> PropResult<Properties> {
        let path = self.path.as_ref().ok_or(PropertiesError::NoPathSpecified)?;
        Properties::read_with_options(path, self.options.clone())
    }

    /// Replace the working state with the file's current contents
    pub fn reload(&mut self) -> PropResult<()> {
        let mut fresh = self.load_own_file()?;
        self.diagnostics.append(&mut fresh.diagnostics);
        self.working = fresh.origin;
        self.dirty = true;
        Ok(())
    }

    /// Pull in keys added to the file since reading; existing values are
    /// overwritten only when `overwrite` is set
    pub fn refresh(&mut self, overwrite: bool) -> PropResult<()> {
        let mut fresh = self.load_own_file()?;
        self.diagnostics.append(&mut fresh.diagnostics);
        self.complete(&fresh, "");
        if overwrite {
            self.update(&fresh, "");
        }
        Ok(())
    }

    /// Clear everything except the path and options
    pub fn blank(&mut self) {
        self.working = Snapshot::new();
        self.origin = Snapshot::new();
        self.diagnostics.clear();
        self.dirty = false;
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic.emit());
    }

    /// Copy the working state into the baseline
    pub fn save(&mut self) {
        self.origin = self.working.clone();
        self.dirty = false;
    }

    /// Copy the baseline back into the working state
    pub fn revert(&mut self) {
        self.working = self.origin.clone();
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn adopt_path(&mut self, path: &Path) {
        if self.path.is_none() {
            self.path = Some(path.to_path_buf());
            self.name = file_stem(path);
        }
    }

    /// File stem of the path, or empty
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    pub fn is_strict(&self) -> bool {
        self.options.strict
    }

    /// Working state
    pub fn snapshot(&self) -> &Snapshot {
        &self.working
    }

    /// Baseline as of the last `save()`
    pub fn origin(&self) -> &Snapshot {
        &self.origin
    }

    /// Working template lines
    pub fn source(&self) -> &[SourceLine] {
        &self.working.source
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        mem::take(&mut self.diagnostics)
    }

    pub fn len(&self) -> usize {
        self.working.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working.properties.is_empty()
    }

    /// Whether `key` exists, hidden or not
    pub fn contains(&self, key: &str) -> bool {
        self.working.properties.contains_key(key)
    }

    /// Value of a visible key
    pub fn get(&self, key: &str) -> PropResult<&str> {
        if !self.working.is_visible(key) {
            return Err(PropertiesError::not_available(key));
        }
        self.working
            .properties
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| PropertiesError::not_available(key))
    }

    /// Value with every `$(key)` reference substituted
    pub fn get_parsed(&self, key: &str) -> PropResult<String> {
        interpolation::interpolate(self, self.get(key)?)
    }

    /// Value decoded into a typed variant
    pub fn get_cast(&self, key: &str) -> PropResult<PropertyValue> {
        self.get(key).map(PropertyValue::cast)
    }

    /// Value, optionally interpolated and/or cast
    pub fn get_value(&self, key: &str, parse: bool, cast: bool) -> PropResult<PropertyValue> {
        let value = if parse {
            self.get_parsed(key)?
        } else {
            self.get(key)?.to_string()
        };
        Ok(if cast {
            PropertyValue::cast(&value)
        } else {
            PropertyValue::String(value)
        })
    }

    /// Visible properties whose key matches a wildcard identifier
    pub fn gets(&self, pattern: &str) -> PropResult<BTreeMap<String, String>> {
        let identifier = Identifier::new(pattern)?;
        Ok(self
            .working
            .visible_keys()
            .filter(|key| identifier.matches(key))
            .map(|key| (key.clone(), self.working.properties[key].clone()))
            .collect())
    }

    /// Like [`gets`](Properties::gets), with optional interpolation and casting
    pub fn gets_with(
        &self,
        pattern: &str,
        parse: bool,
        cast: bool,
    ) -> PropResult<BTreeMap<String, PropertyValue>> {
        self.gets(pattern)?
            .into_keys()
            .map(|key| {
                let value = self.get_value(&key, parse, cast)?;
                Ok((key, value))
            })
            .collect()
    }

    /// Visible properties whose key matches a regular expression at its start
    pub fn gets_regex(&self, regex: &Regex) -> BTreeMap<String, String> {
        self.working
            .visible_keys()
            .filter(|key| regex.find(key).is_some_and(|m| m.start() == 0))
            .map(|key| (key.clone(), self.working.properties[key].clone()))
            .collect()
    }

    /// A key must read back as itself from a `key=value` line
    fn validate_key(&self, key: &str) -> PropResult<()> {
        let reason = if key.is_empty() {
            "key is empty"
        } else if key.contains(['=', ':']) {
            "key contains a separator"
        } else if key.contains(['\n', '\r']) {
            "key contains a line break"
        } else if key.starts_with(['#', '!']) {
            "key starts with a comment marker"
        } else if key.trim() != key {
            "key has surrounding whitespace"
        } else if self.options.strict && parser::key_has_whitespace(key) {
            "key contains whitespace"
        } else {
            return Ok(());
        };
        Err(PropertiesError::invalid_key(key, reason))
    }

    /// Set a value. A hidden key becomes visible and loses its comment.
    ///
    /// Values are single-line; a line break fails with `InvalidValue`.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> PropResult<()> {
        self.validate_key(key)?;
        let value = value.into();
        if value.contains(['\n', '\r']) {
            return Err(PropertiesError::invalid_value(key, "value contains a line break"));
        }
        if self.working.hidden.remove(key) {
            self.working.comments.remove(key);
        }
        self.working.properties.insert(key.to_string(), value);
        self.dirty = true;
        Ok(())
    }

    /// Set a typed value, stored in its canonical string form
    pub fn set_value(&mut self, key: &str, value: &PropertyValue) -> PropResult<()> {
        self.set(key, value.to_string())
    }

    /// Assign values to the visible keys matching `pattern`, in key order.
    ///
    /// The i-th key takes the i-th value; once values run out the last one
    /// repeats.
    pub fn sets<S: AsRef<str>>(&mut self, pattern: &str, values: &[S]) -> PropResult<()> {
        self.sets_with(pattern, values, &BTreeMap::new())
    }

    /// Like [`sets`](Properties::sets), but a key present in `overrides`
    /// takes that value without consuming a positional one
    pub fn sets_with<S: AsRef<str>>(
        &mut self,
        pattern: &str,
        values: &[S],
        overrides: &BTreeMap<String, String>,
    ) -> PropResult<()> {
        let keys: Vec<String> = self.gets(pattern)?.into_keys().collect();
        let mut next = 0;
        for key in keys {
            let value = if let Some(value) = overrides.get(&key) {
                value.clone()
            } else {
                let Some(value) = values.get(next).or(values.last()) else {
                    continue;
                };
                next += 1;
                value.as_ref().to_string()
            };
            self.set(&key, value)?;
        }
        self.dirty = true;
        Ok(())
    }

    /// Remove a key with its comment and hidden flag, returning its value
    pub fn remove(&mut self, key: &str) -> PropResult<String> {
        let value = self
            .working
            .remove_key(key)
            .ok_or_else(|| PropertiesError::not_available(key))?;
        self.dirty = true;
        Ok(value)
    }

    /// Remove every key matching `pattern`, hidden ones included
    pub fn removes(&mut self, pattern: &str) -> PropResult<BTreeMap<String, String>> {
        let identifier = Identifier::new(pattern)?;
        let keys: Vec<String> = self
            .working
            .properties
            .keys()
            .filter(|key| identifier.matches(key))
            .cloned()
            .collect();

        let removed = keys
            .into_iter()
            .filter_map(|key| {
                let value = self.working.remove_key(&key)?;
                Some((key, value))
            })
            .collect();
        self.dirty = true;
        Ok(removed)
    }

    /// Sorted keys, hidden ones only when asked for
    pub fn keys(&self, include_hidden: bool) -> Vec<String> {
        if include_hidden {
            self.working.properties.keys().cloned().collect()
        } else {
            self.working.visible_keys().cloned().collect()
        }
    }

    /// Sorted visible keys
    pub fn names(&self) -> Vec<String> {
        self.keys(false)
    }

    /// Values in key order
    pub fn values(&self, include_hidden: bool) -> Vec<String> {
        self.keys(include_hidden)
            .into_iter()
            .filter_map(|key| self.working.properties.get(&key).cloned())
            .collect()
    }

    /// Visible keys holding exactly `value`
    pub fn keys_of(&self, value: &str) -> Vec<String> {
        self.working
            .visible_keys()
            .filter(|key| self.working.properties[key.as_str()] == value)
            .cloned()
            .collect()
    }

    /// Group identifiers among the visible keys
    pub fn groups(&self) -> PropResult<Vec<String>> {
        identifier::groups(self.working.visible_keys())
    }

    /// Visible keys that belong to no group
    pub fn singles(&self) -> PropResult<Vec<String>> {
        identifier::singles(self.working.visible_keys())
    }

    /// A saved copy with every value interpolated
    pub fn resolved(&self) -> PropResult<Properties> {
        let mut resolved = self.clone();
        for (key, value) in &self.working.properties {
            let expanded = interpolation::interpolate(self, value)?;
            resolved.working.properties.insert(key.clone(), expanded);
        }
        resolved.save();
        debug!(keys = resolved.len(), "resolved interpolations");
        Ok(resolved)
    }

    /// Visible values interpolated, and cast when asked for
    pub fn resolved_map(&self, cast: bool) -> PropResult<BTreeMap<String, PropertyValue>> {
        self.working
            .visible_keys()
            .map(|key| Ok((key.clone(), self.get_value(key, true, cast)?)))
            .collect()
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
