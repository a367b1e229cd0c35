use serde_json::{Map, Value};
use tracing::debug;
use crate::error::{PropResult, PropertiesError};
use crate::properties::Properties;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes the visible properties of a set as a flat JSON object.
///
/// Comments, hidden entries and includes have no JSON form and are dropped.
pub struct JsonExporter<'a> {
    props: &'a Properties,
    pretty: bool,
}

impl<'a> JsonExporter<'a> {
    pub fn new(props: &'a Properties) -> Self {
        Self {
            props,
            pretty: true,
        }
    }

    /// Emit compact JSON on one line
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    /// Visible baseline properties as a JSON object
    pub fn to_value(&self) -> Value {
        let origin = self.props.origin();
        let object: Map<String, Value> = origin
            .visible_keys()
            .map(|key| (key.clone(), Value::String(origin.properties[key].clone())))
            .collect();
        Value::Object(object)
    }

    pub fn to_json_string(&self) -> PropResult<String> {
        let value = self.to_value();
        let encoded = if self.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        encoded.map_err(|e| PropertiesError::export(e.to_string()))
    }

    /// Write to `path`, or next to the set's file with a `.json` extension.
    ///
    /// Same guards as [`Properties::store`].
    pub fn export(&self, path: Option<&Path>, force: bool) -> PropResult<PathBuf> {
        if self.props.is_dirty() && !force {
            return Err(PropertiesError::UnsavedChanges);
        }
        let target = match path {
            Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
            _ => self
                .props
                .path()
                .map(|path| path.with_extension("json"))
                .ok_or(PropertiesError::NoPathSpecified)?,
        };

        let mut text = self.to_json_string()?;
        text.push('\n');
        fs::write(&target, text).map_err(|e| PropertiesError::write(&target, e.to_string()))?;
        debug!(path = %target.display(), "exported properties as JSON");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ReadOptions;

    #[test]
    fn test_visible_properties_only() {
        let props =
            Properties::parse_str("# c\na=1\n#b=2\nc.d=x y\n", ReadOptions::default()).unwrap();
        let json = JsonExporter::new(&props).compact().to_json_string().unwrap();
        assert_eq!(json, r#"{"a":"1","c.d":"x y"}"#);
    }

    #[test]
    fn test_export_guards() {
        let mut props = Properties::new();
        props.set("a", "1").unwrap();
        assert_eq!(
            JsonExporter::new(&props).export(None, false),
            Err(PropertiesError::UnsavedChanges)
        );
        props.save();
        assert_eq!(
            JsonExporter::new(&props).export(None, false),
            Err(PropertiesError::NoPathSpecified)
        );
    }
}
