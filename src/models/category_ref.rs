//! Raw category reference as stored on a transaction.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Name used when a transaction arrives without a category.
const UNCATEGORIZED: &str = "Outros";

/// A category as the service stores it: either a 1-based index into one of
/// the default category tables, or a free-text name.
///
/// Two references are the same grouping key only if they are equal here;
/// `Index(1)` and `Name("Alimentação")` are distinct even when they resolve
/// to the same display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    /// Position in a default table (1-based).
    Index(u32),
    /// Free-text category name.
    Name(String),
}

impl CategoryRef {
    /// Returns the numeric index this reference denotes, if any.
    ///
    /// A `Name` made only of ASCII digits (e.g. `"3"`) counts as an index.
    #[must_use]
    pub fn index(&self) -> Option<u32> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Name(name) => {
                let trimmed = name.trim();
                if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
                    trimmed.parse().ok()
                } else {
                    None
                }
            }
        }
    }

    /// Returns the free-text name, or `None` for numeric references.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Index(_) => None,
            Self::Name(_) if self.index().is_some() => None,
            Self::Name(name) => Some(name),
        }
    }
}

impl Default for CategoryRef {
    #[inline]
    fn default() -> Self {
        Self::Name(UNCATEGORIZED.to_owned())
    }
}

impl fmt::Display for CategoryRef {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "{index}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

impl From<u32> for CategoryRef {
    #[inline]
    fn from(value: u32) -> Self {
        Self::Index(value)
    }
}

impl From<&str> for CategoryRef {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Name(value.to_owned())
    }
}

impl From<String> for CategoryRef {
    #[inline]
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}
