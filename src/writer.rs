//! Rebuilding `.properties` text from a property set's baseline.
//!
//! Output order:
//! 1. the template, with untouched lines reproduced exactly and edited
//!    properties regenerated in place;
//! 2. array groups not placed by the template, one block per group;
//! 3. remaining keys, sorted;
//! 4. include directives not yet emitted.
//!
//! Trailing blank lines are dropped.

use tracing::debug;
use crate::error::{PropResult, PropertiesError};
use crate::identifier::{self, Identifier};
use crate::include::Include;
use crate::parser;
use crate::properties::Properties;
use crate::snapshot::{SourceLine, Snapshot};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Line generator over a property set's baseline
pub struct Writer<'a> {
    origin: &'a Snapshot,
    strict: bool,
    lines: Vec<String>,
    emitted: BTreeSet<String>,
    emitted_includes: Vec<&'a Include>,
}

impl<'a> Writer<'a> {
    pub fn new(props: &'a Properties) -> Self {
        Self {
            origin: &props.origin,
            strict: props.options.strict,
            lines: Vec::new(),
            emitted: BTreeSet::new(),
            emitted_includes: Vec::new(),
        }
    }

    /// Generate the output lines
    pub fn lines(mut self) -> PropResult<Vec<String>> {
        self.write_source();
        self.write_groups()?;
        self.write_singles();
        self.write_includes();

        while self.lines.last().is_some_and(|line| line.trim().is_empty()) {
            self.lines.pop();
        }
        Ok(self.lines)
    }

    fn is_registered(&self, include: &Include) -> bool {
        self.origin.includes.contains(include)
    }

    fn separate(&mut self) {
        if self.lines.last().is_some_and(|line| !line.trim().is_empty()) {
            self.lines.push(String::new());
        }
    }

    fn write_source(&mut self) {
        let origin = self.origin;
        for line in &origin.source {
            match &line.include {
                Some(include) if self.is_registered(include) => {
                    self.write_included(line, include);
                }
                Some(_) => self.write_line(line, false),
                None => self.write_line(line, true),
            }
        }
    }

    /// A line spliced by a registered include: the directive stands in for
    /// the file, and only edited keys are written as overrides
    fn write_included(&mut self, line: &'a SourceLine, include: &'a Include) {
        if !self.emitted_includes.contains(&include) {
            self.lines.push(include.to_string());
            self.emitted_includes.push(include);
        }

        let Some((key, value)) = line.property(self.strict) else {
            return;
        };
        if !self.origin.properties.contains_key(key) || self.emitted.contains(key) {
            return;
        }
        if self.property_untouched(line, key, &value) && self.comment_untouched(line, key) {
            self.emitted.insert(key.to_string());
        } else {
            self.emit(key);
        }
    }

    fn write_line(&mut self, line: &SourceLine, replayable: bool) {
        let Some((key, value)) = line.property(self.strict) else {
            // Blank lines, comments and unparseable text pass through.
            self.lines.push(line.original().to_string());
            return;
        };
        if !self.origin.properties.contains_key(key) || self.emitted.contains(key) {
            return;
        }

        let replay = replayable.then_some(line);
        let comment = replay.filter(|line| self.comment_untouched(line, key));
        let property = replay.filter(|line| self.property_untouched(line, key, &value));

        match comment {
            Some(line) => self.lines.extend(line.leading.iter().cloned()),
            None => self.write_comment(key),
        }
        match property.and_then(|line| line.raw.as_ref()) {
            Some(raw) => self.lines.push(raw.clone()),
            None => self.write_property(key),
        }
        self.emitted.insert(key.to_string());
    }

    fn property_untouched(&self, line: &SourceLine, key: &str, value: &str) -> bool {
        self.origin.properties.get(key).is_some_and(|v| v == value)
            && self.origin.hidden.contains(key) == line.hidden
    }

    fn comment_untouched(&self, line: &SourceLine, key: &str) -> bool {
        self.origin.comments.get(key) == line.comment.as_ref()
    }

    fn write_comment(&mut self, key: &str) {
        if let Some(comment) = self.origin.comments.get(key) {
            for text in comment.split('\n') {
                self.lines.push(format!("#   {}", text));
            }
        }
    }

    fn write_property(&mut self, key: &str) {
        if let Some(value) = self.origin.properties.get(key) {
            let hidden = self.origin.hidden.contains(key);
            self.lines.push(parser::format_property(key, value, hidden));
        }
    }

    fn emit(&mut self, key: &str) {
        self.write_comment(key);
        self.write_property(key);
        self.emitted.insert(key.to_string());
    }

    fn write_groups(&mut self) -> PropResult<()> {
        let origin = self.origin;
        for group in identifier::groups(origin.properties.keys())? {
            let matcher = Identifier::new(&group)?;
            let members: Vec<&String> = origin
                .properties
                .keys()
                .filter(|key| matcher.matches(key) && !self.emitted.contains(key.as_str()))
                .collect();
            if members.is_empty() {
                continue;
            }

            self.separate();
            for key in members {
                self.emit(key);
            }
        }
        Ok(())
    }

    fn write_singles(&mut self) {
        let origin = self.origin;
        let remaining: Vec<&String> = origin
            .properties
            .keys()
            .filter(|key| !self.emitted.contains(key.as_str()))
            .collect();
        if remaining.is_empty() {
            return;
        }

        self.separate();
        for key in remaining {
            self.emit(key);
        }
    }

    fn write_includes(&mut self) {
        let origin = self.origin;
        for include in &origin.includes {
            if self.emitted_includes.contains(&include) {
                continue;
            }
            self.separate();
            self.lines.push(include.to_string());
            self.emitted_includes.push(include);
        }
    }
}

impl Properties {
    /// Output lines for the baseline, without touching the filesystem
    pub fn lines(&self) -> PropResult<Vec<String>> {
        Writer::new(self).lines()
    }

    /// The baseline rendered as file contents
    pub fn render(&self) -> PropResult<String> {
        let lines = self.lines()?;
        if lines.is_empty() {
            return Ok(String::new());
        }
        let mut text = lines.join("\n");
        text.push('\n');
        Ok(text)
    }

    /// Write the baseline to `path`, or to the set's own path.
    ///
    /// Refuses while there are unsaved changes unless `force` is set; forcing
    /// still writes the baseline, not the working copy. A set without a path
    /// adopts the one given here.
    pub fn store(&mut self, path: Option<&Path>, force: bool) -> PropResult<()> {
        if self.dirty && !force {
            return Err(PropertiesError::UnsavedChanges);
        }
        let target = match path {
            Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
            _ => self.path.clone().ok_or(PropertiesError::NoPathSpecified)?,
        };

        let text = self.render()?;
        fs::write(&target, text).map_err(|e| PropertiesError::write(&target, e.to_string()))?;
        debug!(path = %target.display(), keys = self.origin.properties.len(), "stored properties");

        self.adopt_path(&target);
        Ok(())
    }
}
