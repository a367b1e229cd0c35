use thiserror::Error;
use std::fmt;
use std::path::{Path, PathBuf};

/// Result type alias for property operations
pub type PropResult<T> = Result<T, PropertiesError>;

/// Errors that can occur while reading, editing or storing properties
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PropertiesError {
    /// Source file missing or unreadable
    #[error("failed to read '{}': {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    /// An `__include__` directive could not be honoured
    #[error("cannot include '{}': {reason}", .path.display())]
    Include { path: PathBuf, reason: String },

    /// Key absent or hidden
    #[error("property '{key}' is not available")]
    NotAvailable { key: String },

    /// Key rejected by `set`
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    /// Value rejected by `set`
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    /// `store` called while the working copy differs from the baseline
    #[error("refusing to store properties with unsaved changes")]
    UnsavedChanges,

    /// No output path given and none remembered
    #[error("no path specified")]
    NoPathSpecified,

    /// Output file could not be written
    #[error("failed to write '{}': {reason}", .path.display())]
    Write { path: PathBuf, reason: String },

    /// A `$(key)` reference leads back to itself
    #[error("interpolation cycle detected: {}", .chain.join(" -> "))]
    InterpolationCycle { chain: Vec<String> },

    /// A wildcard identifier could not be compiled
    #[error("invalid identifier '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    /// JSON encoding failed
    #[error("JSON export failed: {reason}")]
    Export { reason: String },
}

impl PropertiesError {
    /// Create a read error
    pub fn read(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        PropertiesError::Read {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create an include error
    pub fn include(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        PropertiesError::Include {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create a not-available error
    pub fn not_available(key: impl Into<String>) -> Self {
        PropertiesError::NotAvailable { key: key.into() }
    }

    /// Create an invalid key error
    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        PropertiesError::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        PropertiesError::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a write error
    pub fn write(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        PropertiesError::Write {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Create an interpolation cycle error
    pub fn interpolation_cycle(chain: Vec<String>) -> Self {
        PropertiesError::InterpolationCycle { chain }
    }

    pub fn pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        PropertiesError::Pattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    pub fn export(reason: impl Into<String>) -> Self {
        PropertiesError::Export {
            reason: reason.into(),
        }
    }

    /// True for failures local to a single mutation call
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            PropertiesError::Read { .. } | PropertiesError::Include { .. }
        )
    }
}

/// Non-fatal findings collected while reading or editing.
///
/// Every diagnostic is logged at `warn` level when it is raised and kept on
/// the owning [`Properties`](crate::Properties) until taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The same key was declared more than once in one file
    DuplicateKey { key: String },

    /// A key contained whitespace; `accepted` is false when strict mode dropped the line
    WhitespaceInKey { key: String, accepted: bool },

    /// A comment line ended in a backslash, which never continues a comment
    CommentContinuation { line: String },

    /// An include was registered for a file that does not exist
    IncludeTargetMissing { path: PathBuf },

    /// Purging an include removed no keys
    NothingPurged { path: PathBuf },
}

impl Diagnostic {
    pub(crate) fn emit(self) -> Self {
        tracing::warn!("{}", self);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DuplicateKey { key } => {
                write!(f, "duplicate key '{}', last declaration wins", key)
            }
            Diagnostic::WhitespaceInKey { key, accepted } => {
                if *accepted {
                    write!(f, "key '{}' contains whitespace", key)
                } else {
                    write!(f, "key '{}' contains whitespace, line ignored", key)
                }
            }
            Diagnostic::CommentContinuation { line } => {
                write!(f, "comment ends with a backslash: {}", line)
            }
            Diagnostic::IncludeTargetMissing { path } => {
                write!(f, "included file '{}' does not exist", path.display())
            }
            Diagnostic::NothingPurged { path } => {
                write!(f, "purging '{}' removed nothing", path.display())
            }
        }
    }
}
