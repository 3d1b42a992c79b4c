//! End-to-end tests for tableset.
//!
//! Every test builds its own [`MemoryExecutor`], so tests run in parallel
//! without sharing rows. Set `RUST_LOG=tableset_core=debug` to see the
//! translated filters.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tableset_core::{
    ContinuationToken, QuerySegment, SchemaBuilder, TableEntity, TableQuery,
    TableRequestExecutor, TableSet, TableSetConfig,
};
use tableset_memory::MemoryExecutor;
use tableset_model::{DataKind, PropertyBag, TableOperation};
use tracing::debug;
use uuid::Uuid;

static INIT: Once = Once::new();

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

// ---------------------------------------------------------------------------
// Sample entities
// ---------------------------------------------------------------------------

/// Table holding [`Country`] rows.
pub const COUNTRIES: &str = "countries";
/// Table holding [`LogEntry`] rows.
pub const LOG_ENTRIES: &str = "logentries";

/// A country, keyed by continent and name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Country {
    /// Partition key.
    pub continent: String,
    /// Row key.
    pub name: String,
    /// Area in square kilometres.
    pub area: f64,
    /// Opaque binary payload.
    pub top_secret_key: Vec<u8>,
    /// Founding date.
    pub formed: DateTime<Utc>,
    /// Identifier.
    pub id: Uuid,
    /// Whether the country still exists.
    pub is_exists: bool,
    /// Head count.
    pub population: i64,
    /// Number of presidents so far.
    pub presidents_count: i32,
}

impl TableEntity for Country {
    fn describe(schema: &mut SchemaBuilder) {
        schema
            .partition_key("Continent")
            .row_key("Name")
            .property("Area", DataKind::Double)
            .property("TopSecretKey", DataKind::Binary)
            .property("Formed", DataKind::DateTime)
            .property("Id", DataKind::Guid)
            .property("IsExists", DataKind::Boolean)
            .property("Population", DataKind::Int64)
            .property("PresidentsCount", DataKind::Int32);
    }
}

/// A log line with a renamed column, server-maintained columns and members
/// that never reach storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogEntry {
    /// Partition key.
    pub id: String,
    /// Row key.
    pub source: String,
    /// Stored as `OldMessage`.
    pub message: String,
    /// Last modification time, set by storage.
    pub timestamp: Option<DateTime<Utc>>,
    /// Concurrency token, set by storage.
    #[serde(rename = "ETag")]
    pub etag: Option<String>,
    /// Never stored.
    pub private_data: Vec<u8>,
    /// Never stored.
    pub country: Option<Country>,
}

impl TableEntity for LogEntry {
    fn describe(schema: &mut SchemaBuilder) {
        schema
            .partition_key("Id")
            .row_key("Source")
            .property_as("Message", DataKind::String, "OldMessage")
            .timestamp("Timestamp")
            .etag("ETag")
            .ignore("PrivateData")
            .ignore("Country");
    }
}

/// Four European countries.
#[must_use]
pub fn sample_countries() -> Vec<Country> {
    let country = |name: &str,
                   area: f64,
                   formed: DateTime<Utc>,
                   exists: bool,
                   population: i64,
                   presidents: i32| Country {
        continent: "Europe".to_owned(),
        name: name.to_owned(),
        area,
        top_secret_key: vec![0xaa, 0xbb, 0xcc],
        formed,
        id: Uuid::new_v4(),
        is_exists: exists,
        population,
        presidents_count: presidents,
    };
    let date = |y: i32, m: u32, d: u32| {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
            .single()
            .unwrap_or_default()
    };
    vec![
        country("Germany", 357_021.0, date(1871, 1, 18), true, 81_799_600, 11),
        country("Spain", 505_992.0, date(1812, 1, 1), false, 47_190_493, 8),
        country("France", 674_843.0, date(1792, 1, 1), true, 65_350_000, 24),
        country("Finland", 338_424.0, date(1809, 3, 29), true, 5_421_827, 12),
    ]
}

// ---------------------------------------------------------------------------
// Counting executor
// ---------------------------------------------------------------------------

/// Wraps an executor and records every request it forwards.
#[derive(Debug)]
pub struct CountingExecutor {
    inner: Arc<dyn TableRequestExecutor>,
    segments: AtomicUsize,
    operations: Mutex<Vec<TableOperation>>,
}

impl CountingExecutor {
    /// Wrap `inner`.
    #[must_use]
    pub fn new(inner: Arc<dyn TableRequestExecutor>) -> Self {
        Self {
            inner,
            segments: AtomicUsize::new(0),
            operations: Mutex::new(Vec::new()),
        }
    }

    /// Number of query segments requested.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.load(Ordering::SeqCst)
    }

    /// Number of writes forwarded.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.operations.lock().len()
    }

    /// Writes forwarded so far, in order.
    #[must_use]
    pub fn operations(&self) -> Vec<TableOperation> {
        self.operations.lock().clone()
    }
}

#[async_trait]
impl TableRequestExecutor for CountingExecutor {
    async fn execute_segment(
        &self,
        table: &str,
        query: &TableQuery,
        page_size: u32,
        continuation: Option<&ContinuationToken>,
    ) -> anyhow::Result<QuerySegment> {
        self.segments.fetch_add(1, Ordering::SeqCst);
        self.inner
            .execute_segment(table, query, page_size, continuation)
            .await
    }

    async fn execute(
        &self,
        table: &str,
        operation: TableOperation,
        entity: PropertyBag,
    ) -> anyhow::Result<PropertyBag> {
        self.operations.lock().push(operation);
        self.inner.execute(table, operation, entity).await
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// An empty table of `T` named `table`, behind a counting executor.
pub fn empty_table<T: TableEntity>(
    table: &str,
    config: TableSetConfig,
) -> (Arc<CountingExecutor>, TableSet<T>) {
    init_tracing();
    let memory = MemoryExecutor::new();
    memory.create_table(table);
    let counting = Arc::new(CountingExecutor::new(Arc::new(memory)));
    let executor: Arc<dyn TableRequestExecutor> = counting.clone();
    let table_set = TableSet::with_config(table, executor, config)
        .unwrap_or_else(|e| panic!("failed to bind {table}: {e}"));
    (counting, table_set)
}

/// The [`sample_countries`] table.
pub async fn seeded_countries(config: TableSetConfig) -> (Arc<CountingExecutor>, TableSet<Country>) {
    let (executor, countries) = empty_table::<Country>(COUNTRIES, config);
    countries
        .add_many(sample_countries())
        .await
        .unwrap_or_else(|e| panic!("failed to seed countries: {e}"));
    debug!(table = COUNTRIES, "seeded sample countries");
    (executor, countries)
}

mod test_queries;
mod test_schema;
mod test_writes;
