//! Translation result and client-side post-processing.

use std::fmt;

use crate::error::{Result, TableError};
use crate::executor::TableQuery;

/// Client-side operations the filter grammar cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostProcessing {
    /// Return the first item; fail if there is none.
    TakeFirst,
    /// Return the first item or none.
    TakeFirstOrDefault,
    /// Fail unless there is exactly one item.
    RequireSingle,
    /// Fail if there is more than one item; none if there is none.
    RequireSingleOrDefault,
}

impl PostProcessing {
    /// Apply the directive to a returned sequence.
    ///
    /// # Errors
    ///
    /// Returns `TableError::InvalidOperation` when the sequence violates the
    /// directive's cardinality.
    pub fn apply<T>(self, items: Vec<T>) -> Result<Option<T>> {
        let count = items.len();
        let mut items = items.into_iter();
        match self {
            Self::TakeFirst => items
                .next()
                .map(Some)
                .ok_or_else(|| TableError::invalid_operation("sequence contains no elements")),
            Self::TakeFirstOrDefault => Ok(items.next()),
            Self::RequireSingle => match count {
                0 => Err(TableError::invalid_operation("sequence contains no elements")),
                1 => Ok(items.next()),
                _ => Err(TableError::invalid_operation(
                    "sequence contains more than one element",
                )),
            },
            Self::RequireSingleOrDefault => match count {
                0 | 1 => Ok(items.next()),
                _ => Err(TableError::invalid_operation(
                    "sequence contains more than one element",
                )),
            },
        }
    }
}

impl fmt::Display for PostProcessing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TakeFirst => write!(f, "TakeFirst"),
            Self::TakeFirstOrDefault => write!(f, "TakeFirstOrDefault"),
            Self::RequireSingle => write!(f, "RequireSingle"),
            Self::RequireSingleOrDefault => write!(f, "RequireSingleOrDefault"),
        }
    }
}

/// Output of translating one chain. Owned by a single translation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationResult {
    /// Filter text; `None` until a predicate is translated.
    pub filter_string: Option<String>,
    /// Row limit.
    pub take_count: Option<u32>,
    /// Directive to apply to the returned rows.
    pub post_processing: Option<PostProcessing>,
}

impl TranslationResult {
    /// Create an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The request the storage collaborator executes.
    #[must_use]
    pub fn table_query(&self) -> TableQuery {
        TableQuery {
            filter_string: self.filter_string.clone(),
            take_count: self.take_count,
        }
    }
}
