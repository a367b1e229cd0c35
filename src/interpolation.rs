use crate::error::{PropResult, PropertiesError};
use crate::properties::Properties;

const OPEN: &str = "$(";
const CLOSE: char = ')';

/// Substitute every `$(key)` in `input` with the value of `key`.
///
/// The first `$(`..`)` pair of the current text is replaced by the working
/// value of its key, then the text is scanned again from the start, until no
/// pair remains. An unterminated `$(` is kept as written.
pub fn interpolate(props: &Properties, input: &str) -> PropResult<String> {
    let mut text = input.to_string();
    let mut chain: Vec<String> = Vec::new();
    // End of the text produced by substitutions since the chain was reset
    let mut frontier = 0;

    while let Some((start, close)) = first_reference(&text) {
        // A pair found past the substituted text is independent of the chain.
        if start >= frontier {
            chain.clear();
            frontier = 0;
        }

        let name = text[start + OPEN.len()..close].to_string();
        if chain.contains(&name) {
            chain.push(name);
            return Err(PropertiesError::interpolation_cycle(chain));
        }

        let value = props.get(&name)?.to_string();
        chain.push(name);
        let removed = close + 1 - start;
        frontier = (start + value.len()).max((frontier + value.len()).saturating_sub(removed));
        text.replace_range(start..=close, &value);
    }

    Ok(text)
}

/// Byte offsets of the first `$(` and the `)` closing it
fn first_reference(text: &str) -> Option<(usize, usize)> {
    let start = text.find(OPEN)?;
    let close = text[start + OPEN.len()..].find(CLOSE)? + start + OPEN.len();
    Some((start, close))
}

/// Keys referenced by `$(key)` in a value, in order of appearance
pub fn references(input: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut rest = input;
    while let Some(start) = rest.find(OPEN) {
        let after = &rest[start + OPEN.len()..];
        let Some(end) = after.find(CLOSE) else {
            break;
        };
        found.push(&after[..end]);
        rest = &after[end + 1..];
    }
    found
}
