use crate::error::{PropResult, PropertiesError};
use crate::properties::Properties;

/// Comments attached to properties.
///
/// A comment may span several lines joined with `\n`; the writer emits one
/// `#` line per comment line directly above the property.
pub trait Commentable {
    /// Attach a comment; fails if the key is absent or hidden
    fn comment(&mut self, key: &str, text: &str) -> PropResult<()>;

    /// Comment every visible key matching `pattern` in key order.
    ///
    /// The i-th key takes the i-th text; the last text repeats.
    fn comments<S: AsRef<str>>(&mut self, pattern: &str, texts: &[S]) -> PropResult<usize>;

    /// Drop a comment; never fails
    fn uncomment(&mut self, key: &str);

    fn get_comment(&self, key: &str) -> Option<&str>;

    /// Comment split into lines, empty when there is none
    fn comment_lines(&self, key: &str) -> Vec<&str>;
}

impl Commentable for Properties {
    fn comment(&mut self, key: &str, text: &str) -> PropResult<()> {
        if !self.working.is_visible(key) {
            return Err(PropertiesError::not_available(key));
        }
        self.working
            .comments
            .insert(key.to_string(), text.to_string());
        self.dirty = true;
        Ok(())
    }

    fn comments<S: AsRef<str>>(&mut self, pattern: &str, texts: &[S]) -> PropResult<usize> {
        let keys: Vec<String> = self.gets(pattern)?.into_keys().collect();
        let mut commented = 0;
        for (i, key) in keys.iter().enumerate() {
            let Some(text) = texts.get(i).or(texts.last()) else {
                break;
            };
            self.comment(key, text.as_ref())?;
            commented += 1;
        }
        Ok(commented)
    }

    fn uncomment(&mut self, key: &str) {
        self.working.comments.remove(key);
        self.dirty = true;
    }

    fn get_comment(&self, key: &str) -> Option<&str> {
        self.working.comments.get(key).map(String::as_str)
    }

    fn comment_lines(&self, key: &str) -> Vec<&str> {
        self.get_comment(key)
            .map(|comment| comment.split('\n').collect())
            .unwrap_or_default()
    }
}
