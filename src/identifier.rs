//! Wildcard identifiers and array-group detection.
//!
//! An identifier is a dot-separated key in which `*` stands for one or more
//! of `[A-Za-z0-9_.-]`. Segments that read as numerals (decimal, `0x`, `0o`,
//! `0b`) are array indices: `customer.0.name` and `customer.1.name` share the
//! group `customer.*.name`.

use regex::Regex;
use crate::error::{PropResult, PropertiesError};
use std::collections::BTreeSet;
use std::sync::LazyLock;

const WILDCARD: &str = "[A-Za-z0-9_.-]+";

static INDEX_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[0-9]+|0[xX][0-9a-fA-F]+|0[oO][0-7]+|0[bB][01]+)$").unwrap()
});

/// A compiled wildcard identifier
#[derive(Debug, Clone)]
pub struct Identifier {
    regex: Regex,
}

impl Identifier {
    pub fn new(pattern: &str) -> PropResult<Self> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(WILDCARD);
        let regex = Regex::new(&format!("^{}$", body))
            .map_err(|e| PropertiesError::pattern(pattern, e.to_string()))?;
        Ok(Self { regex })
    }

    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

/// Whether a key segment is an array index
pub fn is_index_segment(segment: &str) -> bool {
    INDEX_SEGMENT.is_match(segment)
}

/// The key with every array-index segment replaced by `*`
pub fn template(key: &str) -> String {
    key.split('.')
        .map(|segment| if is_index_segment(segment) { "*" } else { segment })
        .collect::<Vec<_>>()
        .join(".")
}

/// Templates matching two or more of `keys`, sorted
pub fn groups<'a>(keys: impl IntoIterator<Item = &'a String>) -> PropResult<Vec<String>> {
    let keys: Vec<&String> = keys.into_iter().collect();
    let candidates: BTreeSet<String> = keys
        .iter()
        .map(|key| template(key))
        .filter(|candidate| candidate.contains('*'))
        .collect();

    let mut found = Vec::new();
    for candidate in candidates {
        let identifier = Identifier::new(&candidate)?;
        let members = keys.iter().filter(|key| identifier.matches(key)).take(2).count();
        if members >= 2 {
            found.push(candidate);
        }
    }
    Ok(found)
}

/// Keys whose template is not a group, sorted
pub fn singles<'a>(keys: impl IntoIterator<Item = &'a String>) -> PropResult<Vec<String>> {
    let keys: Vec<&String> = keys.into_iter().collect();
    let groups: BTreeSet<String> = groups(keys.iter().copied())?.into_iter().collect();
    let mut singles: Vec<String> = keys
        .into_iter()
        .filter(|key| !groups.contains(&template(key)))
        .cloned()
        .collect();
    singles.sort();
    Ok(singles)
}
