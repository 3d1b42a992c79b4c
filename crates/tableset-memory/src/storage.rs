//! Ordered in-memory storage for one table.
//!
//! ```text
//! DashMap<PartitionKey, BTreeMap<RowKey, PropertyBag>>
//! ```
//!
//! Scans visit partitions in key order and rows in row key order, so every
//! segment and continuation token is deterministic.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use chrono::Utc;
use dashmap::DashMap;
use tableset_core::{ContinuationToken, QuerySegment};
use tableset_model::{ETAG, EntityValue, PARTITION_KEY, PropertyBag, ROW_KEY, TIMESTAMP};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::filter::Filter;

/// ETag value that matches any stored version.
pub const ANY_ETAG: &str = "*";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The table does not exist.
    #[error("table not found: {table}")]
    TableNotFound {
        /// Table name.
        table: String,
    },
    /// An entity with the same keys is already stored.
    #[error("entity already exists: {partition_key}/{row_key}")]
    Conflict {
        /// Partition key.
        partition_key: String,
        /// Row key.
        row_key: String,
    },
    /// No entity with these keys is stored.
    #[error("entity not found: {partition_key}/{row_key}")]
    NotFound {
        /// Partition key.
        partition_key: String,
        /// Row key.
        row_key: String,
    },
    /// The supplied ETag does not match the stored one.
    #[error("precondition failed for {partition_key}/{row_key}: ETag {supplied} does not match")]
    PreconditionFailed {
        /// Partition key.
        partition_key: String,
        /// Row key.
        row_key: String,
        /// ETag the caller supplied.
        supplied: String,
    },
    /// A key column is absent or not a string.
    #[error("missing required key column: {column}")]
    MissingKey {
        /// Column name.
        column: &'static str,
    },
}

// ---------------------------------------------------------------------------
// TableStorage
// ---------------------------------------------------------------------------

/// Rows of a single table.
#[derive(Debug, Default)]
pub struct TableStorage {
    data: DashMap<String, BTreeMap<String, PropertyBag>>,
    entity_count: AtomicU64,
}

impl TableStorage {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entities.
    #[must_use]
    pub fn entity_count(&self) -> u64 {
        self.entity_count.load(AtomicOrdering::Relaxed)
    }

    /// Insert a new entity.
    ///
    /// # Errors
    ///
    /// `Conflict` if the keys are taken, `MissingKey` if a key is absent.
    pub fn insert(&self, entity: PropertyBag) -> Result<PropertyBag, StorageError> {
        let (partition_key, row_key) = extract_keys(&entity)?;
        let mut partition = self.data.entry(partition_key.clone()).or_default();
        match partition.entry(row_key) {
            Entry::Occupied(slot) => Err(StorageError::Conflict {
                partition_key,
                row_key: slot.key().clone(),
            }),
            Entry::Vacant(slot) => {
                let stored = stamp(entity);
                slot.insert(stored.clone());
                self.entity_count.fetch_add(1, AtomicOrdering::Relaxed);
                debug!(%partition_key, "inserted entity");
                Ok(stored)
            }
        }
    }

    /// Replace a stored entity, honouring a supplied ETag.
    ///
    /// # Errors
    ///
    /// `NotFound`, `PreconditionFailed` or `MissingKey`.
    pub fn replace(&self, entity: PropertyBag) -> Result<PropertyBag, StorageError> {
        let (partition_key, row_key) = extract_keys(&entity)?;
        let not_found = || StorageError::NotFound {
            partition_key: partition_key.clone(),
            row_key: row_key.clone(),
        };
        let mut partition = self.data.get_mut(&partition_key).ok_or_else(not_found)?;
        let current = partition.get_mut(&row_key).ok_or_else(not_found)?;
        check_etag(&entity, current, &partition_key, &row_key)?;
        let stored = stamp(entity);
        *current = stored.clone();
        debug!(%partition_key, %row_key, "replaced entity");
        Ok(stored)
    }

    /// Insert an entity or overwrite whatever is stored under its keys.
    ///
    /// # Errors
    ///
    /// `MissingKey` if a key is absent.
    pub fn upsert(&self, entity: PropertyBag) -> Result<PropertyBag, StorageError> {
        let (partition_key, row_key) = extract_keys(&entity)?;
        let stored = stamp(entity);
        let previous = self
            .data
            .entry(partition_key)
            .or_default()
            .insert(row_key, stored.clone());
        if previous.is_none() {
            self.entity_count.fetch_add(1, AtomicOrdering::Relaxed);
        }
        Ok(stored)
    }

    /// Delete a stored entity, honouring a supplied ETag.
    ///
    /// # Errors
    ///
    /// `NotFound`, `PreconditionFailed` or `MissingKey`.
    pub fn delete(&self, entity: &PropertyBag) -> Result<PropertyBag, StorageError> {
        let (partition_key, row_key) = extract_keys(entity)?;
        let not_found = || StorageError::NotFound {
            partition_key: partition_key.clone(),
            row_key: row_key.clone(),
        };
        let mut partition = self.data.get_mut(&partition_key).ok_or_else(not_found)?;
        let current = partition.get(&row_key).ok_or_else(not_found)?;
        check_etag(entity, current, &partition_key, &row_key)?;
        let removed = partition.remove(&row_key).ok_or_else(not_found)?;
        self.entity_count.fetch_sub(1, AtomicOrdering::Relaxed);
        debug!(%partition_key, %row_key, "deleted entity");
        Ok(removed)
    }

    /// Look up one entity.
    #[must_use]
    pub fn get(&self, partition_key: &str, row_key: &str) -> Option<PropertyBag> {
        self.data
            .get(partition_key)
            .and_then(|partition| partition.get(row_key).cloned())
    }

    /// Return up to `limit` matching rows starting at `start`.
    ///
    /// The continuation token points at the first row not yet examined.
    #[must_use]
    pub fn scan(
        &self,
        filter: Option<&Filter>,
        limit: usize,
        start: Option<&ContinuationToken>,
    ) -> QuerySegment {
        let mut partition_keys: Vec<String> = self.data.iter().map(|e| e.key().clone()).collect();
        partition_keys.sort();

        let mut entities = Vec::new();
        for partition_key in partition_keys {
            if start.is_some_and(|s| partition_key < s.next_partition_key) {
                continue;
            }
            let Some(partition) = self.data.get(&partition_key) else {
                continue;
            };
            let lower = match start {
                Some(s) if s.next_partition_key == partition_key => {
                    Bound::Included(s.next_row_key.clone())
                }
                _ => Bound::Unbounded,
            };
            for (row_key, row) in partition.range((lower, Bound::Unbounded)) {
                if entities.len() == limit {
                    return QuerySegment {
                        entities,
                        continuation: Some(ContinuationToken {
                            next_partition_key: partition_key.clone(),
                            next_row_key: row_key.clone(),
                        }),
                    };
                }
                if filter.is_none_or(|f| f.matches(row)) {
                    entities.push(row.clone());
                }
            }
        }
        QuerySegment {
            entities,
            continuation: None,
        }
    }
}

fn extract_keys(entity: &PropertyBag) -> Result<(String, String), StorageError> {
    let key = |column: &'static str| {
        entity
            .get(column)
            .and_then(EntityValue::as_str)
            .map(str::to_owned)
            .ok_or(StorageError::MissingKey { column })
    };
    Ok((key(PARTITION_KEY)?, key(ROW_KEY)?))
}

fn check_etag(
    supplied: &PropertyBag,
    current: &PropertyBag,
    partition_key: &str,
    row_key: &str,
) -> Result<(), StorageError> {
    let Some(etag) = supplied.get(ETAG).and_then(EntityValue::as_str) else {
        return Ok(());
    };
    if etag == ANY_ETAG || current.get(ETAG).and_then(EntityValue::as_str) == Some(etag) {
        return Ok(());
    }
    Err(StorageError::PreconditionFailed {
        partition_key: partition_key.to_owned(),
        row_key: row_key.to_owned(),
        supplied: etag.to_owned(),
    })
}

fn stamp(mut entity: PropertyBag) -> PropertyBag {
    let now = Utc::now();
    entity.insert(TIMESTAMP.to_owned(), EntityValue::DateTime(now));
    entity.insert(
        ETAG.to_owned(),
        EntityValue::String(format!("W/\"{}\"", Uuid::new_v4().simple())),
    );
    entity
}
