//! # propfile
//!
//! Read, edit and rewrite `.properties` files without losing their layout.
//!
//! ## Features
//!
//! - **Format preservation**: untouched lines, comments and continuations are written back byte for byte
//! - **Hidden properties**: `#key=value` lines are disabled entries that can be re-enabled
//! - **Comments**: comment blocks are attached to the property below them
//! - **Includes**: `__include__`, `__include__.hidden`, `__include__.as.<prefix>` and
//!   `__include__.hidden.as.<prefix>` splice other files in at read time
//! - **Wildcards and groups**: `customer.*.name` matches keys; numeric segments form array groups
//! - **Merging**: [`Properties::complete`], [`Properties::update`], [`Properties::merge`], [`Properties::join`]
//! - **Interpolation**: `$(key)` references, with cycle detection
//! - **Typed values**: opt-in casting to [`PropertyValue`]
//! - **Baseline tracking**: edits stay pending until [`Properties::save`]; [`Properties::revert`] drops them
//!
//! ## Example
//!
//! ```rust
//! use propfile::{Commentable, Hideable, Properties, ReadOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut props = Properties::parse_str(
//!     "# Server settings\nhost = localhost\nport = 8080\n#debug=true\nurl = http://$(host):$(port)/\n",
//!     ReadOptions::default(),
//! )?;
//!
//! assert_eq!(props.get("host")?, "localhost");
//! assert_eq!(props.get_parsed("url")?, "http://localhost:8080/");
//! assert_eq!(props.get_comment("host"), Some("Server settings"));
//! assert!(props.is_hidden("debug"));
//!
//! props.set("port", "9090")?;
//! props.unhide("debug");
//! props.save();
//!
//! assert_eq!(
//!     props.render()?,
//!     "# Server settings\nhost = localhost\nport=9090\ndebug=true\nurl = http://$(host):$(port)/\n"
//! );
//! # Ok(())
//! # }
//! ```

mod comments;
mod error;
mod export;
mod hidden;
pub mod identifier;
mod include;
mod interpolation;
mod merge;
pub mod parser;
mod properties;
mod reader;
mod snapshot;
mod types;
mod writer;

// Public API exports
pub use comments::Commentable;
pub use error::{Diagnostic, PropResult, PropertiesError};
pub use export::JsonExporter;
pub use hidden::Hideable;
pub use identifier::Identifier;
pub use include::{Includable, Include, IncludeResolver};
pub use interpolation::{interpolate, references};
pub use properties::Properties;
pub use reader::{Loaded, ReadOptions, Reader};
pub use snapshot::{Snapshot, SourceLine};
pub use types::PropertyValue;
pub use writer::Writer;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_parsing() {
        let props = Properties::parse_str("test = 123", ReadOptions::default()).unwrap();
        assert_eq!(props.get("test").unwrap(), "123");
        assert_eq!(props.get_cast("test").unwrap(), PropertyValue::Int(123));
    }

    #[test]
    fn test_unhide_is_inverse_of_hide() {
        let mut props = Properties::parse_str("a=1\n", ReadOptions::default()).unwrap();
        props.hide("a").unwrap();
        props.unhide("a");
        assert_eq!(props.get("a").unwrap(), "1");
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
