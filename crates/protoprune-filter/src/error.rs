//! Error types for the protoprune-filter crate.

use std::backtrace::Backtrace;
use std::fmt;

/// Error type for reachability filtering.
///
/// Uses the canonical struct pattern with backtrace capture and `is_xxx()`
/// helper methods. The only error the filter algorithm itself raises is a
/// schema reference error; the remaining kinds come from the stream-oriented
/// `run` entry points and request parsing.
#[derive(Debug)]
pub struct FilterError {
    kind: FilterErrorKind,
    backtrace: Backtrace,
}

/// Internal error variants. Not exposed publicly; use `is_xxx()` methods.
#[derive(Debug)]
pub(crate) enum FilterErrorKind {
    /// A requested or referenced definition does not exist in a namespace
    /// that does exist.
    SchemaReference { namespace: String, type_name: String },
    /// A textual filter request could not be parsed.
    InvalidRequest { request: String, reason: &'static str },
    /// Failed to deserialize input JSON.
    Deserialization(serde_json::Error),
    /// Failed to serialize output to JSON.
    Serialization(serde_json::Error),
    /// I/O error when reading input or writing output.
    Io(std::io::Error),
}

impl FilterError {
    /// Creates an error from an error kind, capturing a backtrace.
    pub(crate) fn new(kind: FilterErrorKind) -> Self {
        Self {
            kind,
            backtrace: Backtrace::capture(),
        }
    }

    /// Creates a schema reference error for `namespace.type_name`.
    pub(crate) fn schema_reference(
        namespace: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Self {
        Self::new(FilterErrorKind::SchemaReference {
            namespace: namespace.into(),
            type_name: type_name.into(),
        })
    }

    /// Returns true if a named definition was missing from its namespace.
    pub fn is_schema_reference(&self) -> bool {
        matches!(self.kind, FilterErrorKind::SchemaReference { .. })
    }

    /// Returns the `(namespace, type_name)` of a missing definition.
    ///
    /// Returns `None` for every other error kind.
    pub fn schema_reference_target(&self) -> Option<(&str, &str)> {
        match &self.kind {
            FilterErrorKind::SchemaReference {
                namespace,
                type_name,
            } => Some((namespace.as_str(), type_name.as_str())),
            _ => None,
        }
    }

    /// Returns true if a textual filter request was malformed.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self.kind, FilterErrorKind::InvalidRequest { .. })
    }

    /// Returns true if this error is due to deserialization failure.
    pub fn is_deserialization(&self) -> bool {
        matches!(self.kind, FilterErrorKind::Deserialization(_))
    }

    /// Returns true if this error is due to serialization failure.
    pub fn is_serialization(&self) -> bool {
        matches!(self.kind, FilterErrorKind::Serialization(_))
    }

    /// Returns true if this error is due to I/O failure.
    pub fn is_io(&self) -> bool {
        matches!(self.kind, FilterErrorKind::Io(_))
    }

    /// Returns the backtrace captured when this error was created.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Display for FilterErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterErrorKind::SchemaReference {
                namespace,
                type_name,
            } => {
                write!(
                    f,
                    "type `{type_name}` not found in namespace `{namespace}`"
                )
            }
            FilterErrorKind::InvalidRequest { request, reason } => {
                write!(f, "invalid filter request `{request}`: {reason}")
            }
            FilterErrorKind::Deserialization(err) => {
                write!(f, "failed to deserialize input: {err}")
            }
            FilterErrorKind::Serialization(err) => {
                write!(f, "failed to serialize output: {err}")
            }
            FilterErrorKind::Io(err) => {
                write!(f, "I/O error: {err}")
            }
        }
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Summary of what happened.
        writeln!(f, "{}", self.kind)?;

        // Backtrace (will be empty unless RUST_BACKTRACE is set).
        write!(f, "{}", self.backtrace)
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            FilterErrorKind::Deserialization(err)
            | FilterErrorKind::Serialization(err) => Some(err),
            FilterErrorKind::Io(err) => Some(err),
            FilterErrorKind::SchemaReference { .. }
            | FilterErrorKind::InvalidRequest { .. } => None,
        }
    }
}

impl From<std::io::Error> for FilterError {
    fn from(err: std::io::Error) -> Self {
        Self::new(FilterErrorKind::Io(err))
    }
}
