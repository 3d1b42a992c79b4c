//! Logical field name to storage column name resolution.

use std::collections::HashMap;

/// Maps logical field names to reserved or declared column names.
///
/// The table is fixed at construction; lookups are exact-match and unmapped
/// names pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    changes: HashMap<String, String>,
}

impl NameResolver {
    /// Create a resolver from a field name to column name table.
    #[must_use]
    pub fn new(changes: HashMap<String, String>) -> Self {
        Self { changes }
    }

    /// Resolve a field name to its column name.
    #[must_use]
    pub fn resolve<'a>(&'a self, field: &'a str) -> &'a str {
        self.changes.get(field).map_or(field, String::as_str)
    }

    /// Number of renamed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Whether no field is renamed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NameResolver {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_resolve_renamed_field() {
        let names: NameResolver = [("Continent", "PartitionKey"), ("Name", "RowKey")]
            .into_iter()
            .collect();
        assert_eq!(names.resolve("Continent"), "PartitionKey");
        assert_eq!(names.resolve("Name"), "RowKey");
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_should_pass_through_unmapped_field() {
        let names = NameResolver::default();
        assert_eq!(names.resolve("IsExists"), "IsExists");
        assert!(names.is_empty());
    }

    #[test]
    fn test_should_match_exactly() {
        let names: NameResolver = [("Name", "RowKey")].into_iter().collect();
        assert_eq!(names.resolve("name"), "name");
    }
}
