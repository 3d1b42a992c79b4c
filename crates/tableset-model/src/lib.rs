//! Model types for tableset.
//!
//! This crate holds the wire-level vocabulary shared by the query translator
//! and any storage collaborator: the typed scalar [`EntityValue`], the flat
//! [`PropertyBag`] a table row travels as, the reserved column names and the
//! write operations a collaborator must support.
#![allow(clippy::module_name_repetitions)]

pub mod columns;
pub mod entity_value;
pub mod operations;

pub use columns::{ETAG, PARTITION_KEY, PropertyBag, ROW_KEY, TIMESTAMP, is_reserved};
pub use entity_value::{DataKind, EntityValue, format_datetime};
pub use operations::TableOperation;
