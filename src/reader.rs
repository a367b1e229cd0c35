//! The read pipeline: load, join continuations, expand includes, unmask
//! hidden properties, associate comments, split into a snapshot.

use tracing::{debug, trace};
use crate::error::{Diagnostic, PropResult, PropertiesError};
use crate::include::{Include, IncludeResolver};
use crate::parser::{self, LineKind, LineParser};
use crate::snapshot::{SourceLine, Snapshot};
use std::collections::HashMap;
use std::fs;
use std::mem;
use std::path::Path;

/// Read options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Reject keys containing whitespace
    pub strict: bool,

    /// Expand `__include__` directives; when off they are ordinary properties
    pub includes: bool,

    /// Maximum include nesting depth
    pub max_include_depth: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            strict: true,
            includes: true,
            max_include_depth: 50,
        }
    }
}

impl ReadOptions {
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Self::default()
        }
    }
}

/// Outcome of a read
#[derive(Debug, Clone)]
pub struct Loaded {
    pub snapshot: Snapshot,
    pub diagnostics: Vec<Diagnostic>,
}

/// Turns `.properties` text into a [`Snapshot`]
pub struct Reader {
    options: ReadOptions,
    resolver: IncludeResolver,
    diagnostics: Vec<Diagnostic>,
}

impl Reader {
    pub fn new(options: ReadOptions) -> Self {
        let resolver = IncludeResolver::new(options.max_include_depth);
        Self {
            options,
            resolver,
            diagnostics: Vec::new(),
        }
    }

    /// Read a file; includes resolve relative to its directory
    pub fn read_file(mut self, path: &Path) -> PropResult<Loaded> {
        let content =
            fs::read_to_string(path).map_err(|e| PropertiesError::read(path, e.to_string()))?;
        let canonical = path
            .canonicalize()
            .map_err(|e| PropertiesError::read(path, e.to_string()))?;
        let base_dir = canonical.parent().unwrap_or(Path::new(".")).to_path_buf();

        self.resolver.begin_load(&canonical)?;
        let loaded = self.process(&content, &base_dir);
        self.resolver.end_load();

        if let Ok(loaded) = &loaded {
            debug!(
                path = %path.display(),
                keys = loaded.snapshot.properties.len(),
                includes = loaded.snapshot.includes.len(),
                "read properties"
            );
        }
        loaded
    }

    /// Read text; includes resolve relative to `base_dir`
    pub fn read_str(mut self, text: &str, base_dir: &Path) -> PropResult<Loaded> {
        self.process(text, base_dir)
    }

    fn process(&mut self, text: &str, base_dir: &Path) -> PropResult<Loaded> {
        let mut lines = self.join_continuations(text);

        let mut includes = Vec::new();
        if self.options.includes {
            self.expand_includes(&mut lines, base_dir, &mut includes)?;
        }

        self.unmask_hidden(&mut lines);
        let lines = self.associate_comments(lines);
        let snapshot = self.split(lines, includes);

        Ok(Loaded {
            snapshot,
            diagnostics: mem::take(&mut self.diagnostics),
        })
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic.emit());
    }

    /// Join physical lines ending in a backslash into one logical line.
    ///
    /// Only key-bearing lines continue; a comment ending in a backslash is
    /// reported and left alone.
    fn join_continuations(&mut self, text: &str) -> Vec<SourceLine> {
        let mut out = Vec::new();
        let mut physical = text.lines();

        while let Some(first) = physical.next() {
            if parser::is_comment(first) {
                if parser::continues(first) {
                    self.report(Diagnostic::CommentContinuation {
                        line: first.to_string(),
                    });
                }
                out.push(SourceLine::physical(first, first));
                continue;
            }

            if !parser::continues(first) || !parser::line_has_key(first, false) {
                out.push(SourceLine::physical(first, first));
                continue;
            }

            let mut logical = first.to_string();
            let mut raw = first.to_string();
            while parser::continues(&logical) {
                logical.pop();
                let Some(next) = physical.next() else {
                    break;
                };
                logical.push_str(next.trim_start());
                raw.push('\n');
                raw.push_str(next);
            }
            out.push(SourceLine::physical(logical, raw));
        }

        out
    }

    /// Splice included files in place of their directives.
    ///
    /// The cursor is checked against the live length after every splice and
    /// skips over the spliced lines, which are already expanded.
    fn expand_includes(
        &mut self,
        lines: &mut Vec<SourceLine>,
        base_dir: &Path,
        registry: &mut Vec<Include>,
    ) -> PropResult<()> {
        let mut cursor = 0;
        while cursor < lines.len() {
            let Some(include) = self.directive(&lines[cursor])? else {
                cursor += 1;
                continue;
            };

            let spliced = self.load_include(&include, base_dir)?;
            let count = spliced.len();
            trace!(include = %include, lines = count, "spliced include");

            lines.splice(cursor..=cursor, spliced);
            if !registry.contains(&include) {
                registry.push(include);
            }
            cursor += count;
        }
        Ok(())
    }

    fn directive(&self, line: &SourceLine) -> PropResult<Option<Include>> {
        let Some((key, value)) = line.property(self.options.strict) else {
            return Ok(None);
        };
        match Include::from_directive(key, &value) {
            Some(include) if include.path.as_os_str().is_empty() => {
                Err(PropertiesError::include("", format!("'{}' has an empty path", key)))
            }
            found => Ok(found),
        }
    }

    fn load_include(&mut self, include: &Include, base_dir: &Path) -> PropResult<Vec<SourceLine>> {
        let target = base_dir.join(&include.path);
        if !target.is_file() {
            return Err(PropertiesError::include(&include.path, "no such file"));
        }
        let canonical = target
            .canonicalize()
            .map_err(|e| PropertiesError::include(&include.path, e.to_string()))?;

        self.resolver.begin_load(&canonical)?;
        let lines = self.load_included_file(&canonical, include);
        self.resolver.end_load();
        lines
    }

    fn load_included_file(&mut self, path: &Path, include: &Include) -> PropResult<Vec<SourceLine>> {
        let content = fs::read_to_string(path)
            .map_err(|e| PropertiesError::include(&include.path, e.to_string()))?;
        if content.trim().is_empty() {
            return Err(PropertiesError::include(&include.path, "file is empty"));
        }

        let mut lines = self.join_continuations(&content);
        let base_dir = path.parent().unwrap_or(Path::new("."));
        self.expand_includes(&mut lines, base_dir, &mut Vec::new())?;

        Ok(lines
            .into_iter()
            .map(|line| self.rewrite_included(line, include))
            .collect())
    }

    /// Apply an include's prefix and hidden flag to one of its lines
    fn rewrite_included(&self, mut line: SourceLine, include: &Include) -> SourceLine {
        let strict = self.options.strict;

        let rewritten = if let Some((key, value)) = line.property(strict) {
            (include.hidden || !include.prefix.is_empty())
                .then(|| parser::format_property(&include.prefixed(key), &value, include.hidden))
        } else if !include.prefix.is_empty() && parser::is_hidden_property(&line.text, strict) {
            parser::unmask(&line.text)
                .and_then(|body| parser::property(body, strict))
                .map(|(key, value)| parser::format_property(&include.prefixed(key), &value, true))
        } else {
            None
        };

        if let Some(text) = rewritten {
            line.text = text;
            line.raw = None;
        }
        line.include = Some(include.clone());
        line
    }

    fn unmask_hidden(&self, lines: &mut [SourceLine]) {
        let strict = self.options.strict;
        for line in lines.iter_mut() {
            if line.hidden || !parser::is_hidden_property(&line.text, strict) {
                continue;
            }
            if let Some(body) = parser::unmask(&line.text).map(str::to_string) {
                line.text = body;
                line.hidden = true;
            }
        }
    }

    /// Detach the comment block directly above each property.
    ///
    /// A block is the run of comment lines immediately above, stopping at
    /// anything else and at lines that came from a different include.
    fn associate_comments(&self, lines: Vec<SourceLine>) -> Vec<SourceLine> {
        let strict = self.options.strict;
        let mut out: Vec<SourceLine> = Vec::with_capacity(lines.len());

        for mut line in lines {
            if line.key(strict).is_some() {
                let start = out
                    .iter()
                    .rposition(|above| !above.is_comment() || above.include != line.include)
                    .map_or(0, |i| i + 1);

                if start < out.len() {
                    let block: Vec<SourceLine> = out.drain(start..).collect();
                    let text = block
                        .iter()
                        .filter_map(|above| parser::comment_text(&above.text))
                        .collect::<Vec<_>>()
                        .join("\n");
                    line.leading = block
                        .into_iter()
                        .map(|above| above.raw.unwrap_or(above.text))
                        .collect();
                    line.comment = Some(text);
                }
            }
            out.push(line);
        }

        out
    }

    /// Build the key/value map; the last declaration of a key wins
    fn split(&mut self, lines: Vec<SourceLine>, includes: Vec<Include>) -> Snapshot {
        let strict = self.options.strict;
        let mut snapshot = Snapshot::new();
        let mut declared: HashMap<String, Option<Include>> = HashMap::new();

        for line in &lines {
            if let LineKind::Property { key, .. } = LineParser::classify(&line.text) {
                if parser::key_has_whitespace(key) {
                    self.report(Diagnostic::WhitespaceInKey {
                        key: key.to_string(),
                        accepted: !strict,
                    });
                }
            }

            let Some((key, value)) = line.property(strict) else {
                continue;
            };

            // An override of an included key is not a duplicate.
            if let Some(previous) = declared.insert(key.to_string(), line.include.clone()) {
                if previous == line.include {
                    self.report(Diagnostic::DuplicateKey {
                        key: key.to_string(),
                    });
                }
            }

            if line.hidden {
                snapshot.hidden.insert(key.to_string());
            } else {
                snapshot.hidden.remove(key);
            }
            if let Some(comment) = &line.comment {
                snapshot.comments.insert(key.to_string(), comment.clone());
            }
            snapshot.properties.insert(key.to_string(), value);
        }

        snapshot.source = lines;
        snapshot.includes = includes;
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Loaded {
        Reader::new(ReadOptions::default())
            .read_str(text, Path::new("."))
            .unwrap()
    }

    #[test]
    fn test_continuation_joins_lines() {
        let loaded = read("multi = first \\\n    second \\\n  third\nnext=1\n");
        let props = &loaded.snapshot.properties;
        assert_eq!(props["multi"], "first second third");
        assert_eq!(props["next"], "1");
        assert_eq!(
            loaded.snapshot.source[0].raw.as_deref(),
            Some("multi = first \\\n    second \\\n  third")
        );
    }

    #[test]
    fn test_comment_continuation_is_reported() {
        let loaded = read("# not continued \\\nkey=value\n");
        assert_eq!(loaded.snapshot.properties["key"], "value");
        assert_eq!(
            loaded.diagnostics,
            vec![Diagnostic::CommentContinuation {
                line: "# not continued \\".into()
            }]
        );
    }

    #[test]
    fn test_hidden_properties_are_unmasked() {
        let loaded = read("#disabled=yes\n# prose = comment\nenabled=no\n");
        let snapshot = &loaded.snapshot;
        assert_eq!(snapshot.properties["disabled"], "yes");
        assert!(snapshot.hidden.contains("disabled"));
        assert!(!snapshot.properties.contains_key("prose"));
        assert_eq!(snapshot.comments["enabled"], "prose = comment");
    }

    #[test]
    fn test_comment_block_is_detached() {
        let loaded = read("# loose\n\n# first\n! second\nkey=value\n");
        let snapshot = &loaded.snapshot;
        assert_eq!(snapshot.comments["key"], "first\nsecond");
        assert_eq!(snapshot.source.len(), 3);
        assert_eq!(snapshot.source[0].text, "# loose");
        assert_eq!(snapshot.source[2].leading, vec!["# first", "! second"]);
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let loaded = read("a=1\na=2\n");
        assert_eq!(loaded.snapshot.properties["a"], "2");
        assert_eq!(
            loaded.diagnostics,
            vec![Diagnostic::DuplicateKey { key: "a".into() }]
        );
    }

    #[test]
    fn test_strict_rejects_whitespace_keys() {
        let loaded = read("some thing = x\n");
        assert!(loaded.snapshot.properties.is_empty());
        assert_eq!(
            loaded.diagnostics,
            vec![Diagnostic::WhitespaceInKey {
                key: "some thing".into(),
                accepted: false
            }]
        );

        let lenient = Reader::new(ReadOptions::lenient())
            .read_str("some thing = x\n", Path::new("."))
            .unwrap();
        assert_eq!(lenient.snapshot.properties["some thing"], "x");
    }

    #[test]
    fn test_includes_disabled() {
        let options = ReadOptions {
            includes: false,
            ..ReadOptions::default()
        };
        let loaded = Reader::new(options)
            .read_str("__include__=missing.properties\n", Path::new("."))
            .unwrap();
        assert_eq!(
            loaded.snapshot.properties["__include__"],
            "missing.properties"
        );
    }

    #[test]
    fn test_missing_include_fails() {
        let err = Reader::new(ReadOptions::default())
            .read_str("__include__=does-not-exist.properties\n", Path::new("."))
            .unwrap_err();
        assert!(matches!(err, PropertiesError::Include { .. }));
    }

    #[test]
    fn test_crlf_input() {
        let loaded = read("a=1\r\nb = two words \r\n");
        assert_eq!(loaded.snapshot.properties["a"], "1");
        assert_eq!(loaded.snapshot.properties["b"], "two words ");
    }
}
