//! Filter requests: which definitions of which namespace must survive.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterErrorKind};

const REQUEST_SYNTAX: &str = "expected `namespace:Type[,Type...]`";

/// An entry set: a namespace name plus the definitions in it that must be
/// kept, together with everything they reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRequest {
    /// Name of the top-level namespace the entry types live in.
    pub namespace: String,
    /// Names of the entry definitions, in request order.
    pub type_names: IndexSet<String>,
}

impl FilterRequest {
    /// Builds a request for `type_names` inside `namespace`.
    pub fn new<I, S>(namespace: impl Into<String>, type_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespace: namespace.into(),
            type_names: type_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses the command-line form `namespace:TypeA,TypeB`.
    ///
    /// The namespace is everything before the last `:`. Type names are
    /// comma-separated, trimmed, and must not be empty.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] classified as
    /// [`FilterError::is_invalid_request`] if the text has no `:`, the
    /// namespace is empty, or any listed type name is empty.
    pub fn parse(text: &str) -> Result<Self, FilterError> {
        let invalid = || {
            FilterError::new(FilterErrorKind::InvalidRequest {
                request: text.to_string(),
                reason: REQUEST_SYNTAX,
            })
        };

        let (namespace, types) = text.rsplit_once(':').ok_or_else(invalid)?;
        let namespace = namespace.trim();
        if namespace.is_empty() {
            return Err(invalid());
        }

        let mut type_names = IndexSet::new();
        for name in types.split(',').map(str::trim) {
            if name.is_empty() {
                return Err(invalid());
            }
            type_names.insert(name.to_string());
        }

        Ok(Self {
            namespace: namespace.to_string(),
            type_names,
        })
    }
}

impl FromStr for FilterRequest {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FilterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.namespace)?;
        for (i, name) in self.type_names.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}
