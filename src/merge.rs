//! Combining two property sets.
//!
//! Every operation reads the *baseline* of the incoming set, so unsaved
//! edits on the source side are ignored. Keys can be moved under a prefix
//! (`prefix.key`); an empty prefix leaves them as they are.

use tracing::debug;
use crate::error::PropResult;
use crate::parser;
use crate::properties::Properties;
use crate::snapshot::SourceLine;
use std::path::Path;

fn prefixed(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

impl Properties {
    /// Add keys missing from `self`, never touching existing ones.
    ///
    /// Comments and hidden flags are copied for the added keys only.
    pub fn complete(&mut self, src: &Properties, prefix: &str) -> usize {
        let mut added = 0;
        for (key, value) in &src.origin.properties {
            let target = prefixed(prefix, key);
            if self.working.properties.contains_key(&target) {
                continue;
            }

            if let Some(comment) = src.origin.comments.get(key) {
                self.working.comments.insert(target.clone(), comment.clone());
            }
            if src.origin.hidden.contains(key) {
                self.working.hidden.insert(target.clone());
            }
            self.working.properties.insert(target, value.clone());
            added += 1;
        }
        self.dirty = true;
        debug!(added, prefix, "completed properties");
        added
    }

    /// Overwrite keys `self` already has; nothing is added.
    ///
    /// The comment and hidden flag of each updated key are replaced by the
    /// source's.
    pub fn update(&mut self, src: &Properties, prefix: &str) -> usize {
        let mut updated = 0;
        for (key, value) in &src.origin.properties {
            let target = prefixed(prefix, key);
            let Some(existing) = self.working.properties.get_mut(&target) else {
                continue;
            };
            existing.clone_from(value);

            match src.origin.comments.get(key) {
                Some(comment) => {
                    self.working.comments.insert(target.clone(), comment.clone());
                }
                None => {
                    self.working.comments.remove(&target);
                }
            }
            if src.origin.hidden.contains(key) {
                self.working.hidden.insert(target);
            } else {
                self.working.hidden.remove(&target);
            }
            updated += 1;
        }
        self.dirty = true;
        debug!(updated, prefix, "updated properties");
        updated
    }

    /// `complete`, then `update`, then append the source's template
    pub fn merge(&mut self, src: &Properties) {
        self.complete(src, "");
        self.update(src, "");
        self.append_source(src, "");
    }

    /// Read `path` and complete `self` from it, appending its template.
    ///
    /// Keys go under `prefix`, or under the file's stem when `None`.
    pub fn join(&mut self, path: impl AsRef<Path>, prefix: Option<&str>) -> PropResult<()> {
        let mut other = Properties::read_with_options(path, self.options.clone())?;
        self.diagnostics.append(&mut other.diagnostics);

        let prefix = prefix.unwrap_or(other.name()).to_string();
        self.complete(&other, &prefix);
        self.append_source(&other, &prefix);
        Ok(())
    }

    /// Append the baseline template of `src`, separated by a blank line
    pub fn append_source(&mut self, src: &Properties, prefix: &str) {
        let strict = src.options.strict;
        if !self.working.source.is_empty() {
            self.working.source.push(SourceLine::blank());
        }

        for line in &src.origin.source {
            let mut line = line.clone();
            if !prefix.is_empty() {
                let rewritten = line.property(strict).map(|(key, value)| {
                    parser::format_property(&prefixed(prefix, key), &value, false)
                });
                if let Some(text) = rewritten {
                    line.text = text;
                    line.raw = None;
                }
            }
            self.working.source.push(line);
        }
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comments::Commentable;
    use crate::hidden::Hideable;
    use crate::reader::ReadOptions;

    fn parse(text: &str) -> Properties {
        Properties::parse_str(text, ReadOptions::default()).unwrap()
    }

    #[test]
    fn test_complete_never_overwrites() {
        let mut base = parse("# mine\nshared=base\n");
        let src = parse("# theirs\nshared=src\n#extra=1\n");

        assert_eq!(base.complete(&src, ""), 1);
        assert_eq!(base.get("shared").unwrap(), "base");
        assert_eq!(base.get_comment("shared"), Some("mine"));
        assert!(base.is_hidden("extra"));
        assert!(base.is_dirty());
    }

    #[test]
    fn test_complete_with_prefix() {
        let mut base = Properties::new();
        let src = parse("# db host\nhost=localhost\n");
        base.complete(&src, "db");
        assert_eq!(base.get("db.host").unwrap(), "localhost");
        assert_eq!(base.get_comment("db.host"), Some("db host"));
        assert!(base.source().is_empty());
    }

    #[test]
    fn test_update_never_adds() {
        let mut base = parse("shared=base\n");
        let src = parse("# theirs\n#shared=src\nonly.src=1\n");

        assert_eq!(base.update(&src, ""), 1);
        assert_eq!(base.keys(true), vec!["shared"]);
        assert!(base.is_hidden("shared"));
        assert_eq!(base.get_comment("shared"), Some("theirs"));
    }

    #[test]
    fn test_update_uses_baseline() {
        let mut base = parse("a=1\n");
        let mut src = parse("a=2\n");
        src.set("a", "3").unwrap();
        base.update(&src, "");
        assert_eq!(base.get("a").unwrap(), "2");
    }

    #[test]
    fn test_merge_appends_source() {
        let mut base = parse("a=1\n");
        let src = parse("# note\nb=2\na=9\n");
        base.merge(&src);

        assert_eq!(base.get("a").unwrap(), "9");
        assert_eq!(base.get("b").unwrap(), "2");
        let texts: Vec<&str> = base.source().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["a=1", "", "b=2", "a=9"]);
    }

    #[test]
    fn test_append_source_prefixes_keys() {
        let mut base = Properties::new();
        let src = parse("! heading\n\nkey = value\n");
        base.append_source(&src, "ns");
        let texts: Vec<&str> = base.source().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["! heading", "", "ns.key=value"]);
    }
}
