//! In-memory table storage for tableset.
//!
//! [`MemoryExecutor`] implements [`tableset_core::TableRequestExecutor`] the
//! way a remote table service would: it parses the filter grammar, scans rows
//! in partition key / row key order, pages results with continuation tokens
//! and stamps `Timestamp` and `ETag` on every write.
#![allow(clippy::module_name_repetitions)]

pub mod executor;
pub mod filter;
pub mod storage;

pub use executor::MemoryExecutor;
pub use filter::{Filter, FilterError, parse_filter};
pub use storage::{ANY_ETAG, StorageError, TableStorage};
