//! Line classification for `.properties` sources.
//!
//! Every function here works on a single logical line and keeps no state.
//! The grammar lives in `properties.pest`; strictness (whether a key may
//! contain whitespace) is applied on top of the parse tree.

use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "properties.pest"]
pub struct LineParser;

/// Structural shape of a line, before strictness is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Empty or whitespace only
    Blank,

    /// `#` or `!` line; `body` is everything after the marker
    Comment { marker: char, body: &'a str },

    /// `key=value` or `key:value`; `raw_value` is untouched text after the separator
    Property { key: &'a str, raw_value: &'a str },

    /// Anything else (no separator, empty key)
    Other,
}

impl LineParser {
    /// Classify one logical line
    pub fn classify(line: &str) -> LineKind<'_> {
        if line.trim().is_empty() {
            return LineKind::Blank;
        }

        let Some(pair) = LineParser::parse(Rule::line, line)
            .ok()
            .and_then(|mut pairs| pairs.next())
        else {
            return LineKind::Other;
        };

        let Some(inner) = pair.into_inner().find(|p| p.as_rule() != Rule::EOI) else {
            return LineKind::Other;
        };

        match inner.as_rule() {
            Rule::comment => {
                let mut parts = inner.into_inner();
                let marker = parts
                    .next()
                    .and_then(|m| m.as_str().chars().next())
                    .unwrap_or('#');
                let body = parts.next().map(|b| b.as_str()).unwrap_or("");
                LineKind::Comment { marker, body }
            }
            Rule::property => {
                let mut key = "";
                let mut raw_value = "";
                for part in inner.into_inner() {
                    match part.as_rule() {
                        Rule::key => key = part.as_str(),
                        Rule::value => raw_value = part.as_str(),
                        _ => {}
                    }
                }
                LineKind::Property { key, raw_value }
            }
            _ => LineKind::Other,
        }
    }
}

/// Whether the key text contains whitespace
pub fn key_has_whitespace(key: &str) -> bool {
    key.chars().any(char::is_whitespace)
}

/// Key and decoded value of a property line, honouring strictness
pub fn property(line: &str, strict: bool) -> Option<(&str, String)> {
    match LineParser::classify(line) {
        LineKind::Property { key, raw_value } => {
            if strict && key_has_whitespace(key) {
                None
            } else {
                Some((key, decode_value(raw_value)))
            }
        }
        _ => None,
    }
}

/// Whether the line carries a key
pub fn line_has_key(line: &str, strict: bool) -> bool {
    property(line, strict).is_some()
}

/// The key of a property line
pub fn line_key(line: &str, strict: bool) -> Option<&str> {
    property(line, strict).map(|(key, _)| key)
}

/// The value of a property line
pub fn line_value(line: &str, strict: bool) -> Option<String> {
    property(line, strict).map(|(_, value)| value)
}

/// Whether the line starts (after indentation) with `#` or `!`
pub fn is_comment(line: &str) -> bool {
    matches!(LineParser::classify(line), LineKind::Comment { .. })
}

/// Comment text with the marker removed and surrounding whitespace trimmed
pub fn comment_text(line: &str) -> Option<&str> {
    match LineParser::classify(line) {
        LineKind::Comment { body, .. } => Some(body.trim()),
        _ => None,
    }
}

/// A disabled property: a comment whose marker is directly followed by a valid property.
///
/// `#foo=bar` is hidden, `# foo=bar` is prose.
pub fn is_hidden_property(line: &str, strict: bool) -> bool {
    unmask(line).is_some_and(|body| line_has_key(body, strict))
}

/// The text after the comment marker, if the marker is directly followed by
/// something other than whitespace
pub fn unmask(line: &str) -> Option<&str> {
    match LineParser::classify(line) {
        LineKind::Comment { body, .. } if body.starts_with(|c: char| !c.is_whitespace()) => {
            Some(body)
        }
        _ => None,
    }
}

/// Strip leading whitespace, then one escaping backslash
pub fn decode_value(raw: &str) -> String {
    let value = raw.trim_start();
    value.strip_prefix('\\').unwrap_or(value).to_string()
}

/// Escape a value so that [`decode_value`] returns it unchanged
pub fn encode_value(value: &str) -> String {
    if value.starts_with(|c: char| c.is_whitespace() || c == '\\') {
        format!("\\{}", value)
    } else {
        value.to_string()
    }
}

/// Render a `key=value` line, disabled with `#` when hidden
pub fn format_property(key: &str, value: &str, hidden: bool) -> String {
    let marker = if hidden { "#" } else { "" };
    format!("{}{}={}", marker, key, encode_value(value))
}

/// Whether a line ends in a continuation backslash
pub fn continues(line: &str) -> bool {
    line.ends_with('\\')
}
