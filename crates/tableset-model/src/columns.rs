//! Reserved column names and the property bag type.

use std::collections::HashMap;

use crate::EntityValue;

/// A single table row: column name to typed scalar.
pub type PropertyBag = HashMap<String, EntityValue>;

/// Reserved partition key column.
pub const PARTITION_KEY: &str = "PartitionKey";
/// Reserved row key column.
pub const ROW_KEY: &str = "RowKey";
/// Reserved server timestamp column.
pub const TIMESTAMP: &str = "Timestamp";
/// Reserved concurrency token column.
pub const ETAG: &str = "ETag";

/// Returns `true` if `name` is one of the four reserved columns.
#[must_use]
pub fn is_reserved(name: &str) -> bool {
    matches!(name, PARTITION_KEY | ROW_KEY | TIMESTAMP | ETAG)
}
