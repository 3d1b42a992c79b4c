//! The storage collaborator seen from the translator's side.
//!
//! Anything that can run a filtered, optionally limited scan in segments and
//! apply single-entity writes can back a `TableSet`. Errors are opaque
//! `anyhow` errors; `TableSet` surfaces them as `TableError::Storage`.

use std::fmt;

use async_trait::async_trait;
use tableset_model::{PropertyBag, TableOperation};
use tracing::trace;

/// What the collaborator is asked to run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableQuery {
    /// Filter text in the table grammar; `None` matches every row.
    pub filter_string: Option<String>,
    /// Maximum number of rows to return overall.
    pub take_count: Option<u32>,
}

/// Position to resume a scan from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContinuationToken {
    /// Partition key of the next row.
    pub next_partition_key: String,
    /// Row key of the next row.
    pub next_row_key: String,
}

/// One page of a scan.
#[derive(Debug, Clone, Default)]
pub struct QuerySegment {
    /// Rows in partition key, row key order.
    pub entities: Vec<PropertyBag>,
    /// Where the next segment starts; `None` when the scan is complete.
    pub continuation: Option<ContinuationToken>,
}

/// Executes table requests against some storage.
#[async_trait]
pub trait TableRequestExecutor: Send + Sync + fmt::Debug {
    /// Run one segment of `query`, returning at most `page_size` rows.
    async fn execute_segment(
        &self,
        table: &str,
        query: &TableQuery,
        page_size: u32,
        continuation: Option<&ContinuationToken>,
    ) -> anyhow::Result<QuerySegment>;

    /// Apply a single-entity write and return the stored row.
    async fn execute(
        &self,
        table: &str,
        operation: TableOperation,
        entity: PropertyBag,
    ) -> anyhow::Result<PropertyBag>;

    /// Run `query` to completion, following continuation tokens until the
    /// scan ends or `take_count` rows were collected.
    async fn execute_query(
        &self,
        table: &str,
        query: &TableQuery,
        page_size: u32,
    ) -> anyhow::Result<Vec<PropertyBag>> {
        let mut rows = Vec::new();
        let mut continuation: Option<ContinuationToken> = None;
        let mut segments = 0_usize;

        loop {
            let remaining = match query.take_count {
                Some(take) => {
                    let collected = u32::try_from(rows.len()).unwrap_or(u32::MAX);
                    take.saturating_sub(collected)
                }
                None => page_size,
            };
            if remaining == 0 {
                break;
            }
            let segment = self
                .execute_segment(table, query, remaining.min(page_size), continuation.as_ref())
                .await?;
            segments += 1;
            rows.extend(segment.entities);
            match segment.continuation {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        if let Some(take) = query.take_count {
            rows.truncate(take as usize);
        }
        trace!(table, segments, rows = rows.len(), "query completed");
        Ok(rows)
    }
}
