//! Write operations a storage collaborator executes.

use std::fmt;

/// Entity write operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableOperation {
    /// Insert a new entity; fails if the key already exists.
    Insert,
    /// Replace an existing entity, honouring its ETag.
    Replace,
    /// Insert or unconditionally replace.
    InsertOrReplace,
    /// Delete an existing entity, honouring its ETag.
    Delete,
}

impl TableOperation {
    /// Returns the operation name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "Insert",
            Self::Replace => "Replace",
            Self::InsertOrReplace => "InsertOrReplace",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for TableOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
