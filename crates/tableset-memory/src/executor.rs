//! [`TableRequestExecutor`] over in-memory tables.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tableset_core::{ContinuationToken, QuerySegment, TableQuery, TableRequestExecutor};
use tableset_model::{PropertyBag, TableOperation};
use tracing::{debug, info};

use crate::filter::parse_filter;
use crate::storage::{StorageError, TableStorage};

/// In-memory storage collaborator holding any number of named tables.
#[derive(Debug, Default)]
pub struct MemoryExecutor {
    tables: DashMap<String, Arc<TableStorage>>,
}

impl MemoryExecutor {
    /// Create an executor with no tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `name` if it does not exist. Returns `true` if it was created.
    pub fn create_table(&self, name: &str) -> bool {
        let mut created = false;
        self.tables.entry(name.to_owned()).or_insert_with(|| {
            created = true;
            Arc::new(TableStorage::new())
        });
        if created {
            info!(table = name, "created table");
        }
        created
    }

    /// Drop `name` and everything in it. Returns `true` if it existed.
    pub fn delete_table(&self, name: &str) -> bool {
        let removed = self.tables.remove(name).is_some();
        if removed {
            info!(table = name, "deleted table");
        }
        removed
    }

    /// The storage behind `name`.
    ///
    /// # Errors
    ///
    /// `TableNotFound` if the table does not exist.
    pub fn table(&self, name: &str) -> Result<Arc<TableStorage>, StorageError> {
        self.tables
            .get(name)
            .map(|t| Arc::clone(t.value()))
            .ok_or_else(|| StorageError::TableNotFound {
                table: name.to_owned(),
            })
    }
}

#[async_trait]
impl TableRequestExecutor for MemoryExecutor {
    async fn execute_segment(
        &self,
        table: &str,
        query: &TableQuery,
        page_size: u32,
        continuation: Option<&ContinuationToken>,
    ) -> anyhow::Result<QuerySegment> {
        let storage = self.table(table)?;
        let filter = query.filter_string.as_deref().map(parse_filter).transpose()?;
        let segment = storage.scan(filter.as_ref(), page_size as usize, continuation);
        debug!(
            table,
            filter = ?query.filter_string,
            rows = segment.entities.len(),
            more = segment.continuation.is_some(),
            "executed query segment"
        );
        Ok(segment)
    }

    async fn execute(
        &self,
        table: &str,
        operation: TableOperation,
        entity: PropertyBag,
    ) -> anyhow::Result<PropertyBag> {
        let storage = self.table(table)?;
        let stored = match operation {
            TableOperation::Insert => storage.insert(entity)?,
            TableOperation::Replace => storage.replace(entity)?,
            TableOperation::InsertOrReplace => storage.upsert(entity)?,
            TableOperation::Delete => storage.delete(&entity)?,
        };
        Ok(stored)
    }
}
