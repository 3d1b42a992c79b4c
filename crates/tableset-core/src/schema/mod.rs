//! Declarative mapping between record types and property bags.
//!
//! A record type describes its fields once through [`TableEntity::describe`].
//! The resulting [`ColumnMapping`] is built on first use and cached for the
//! lifetime of the process; [`to_bag`] and [`to_record`] convert through it.
//!
//! Field names are the record's *serialized* member names, so a type using
//! `#[serde(rename_all = "PascalCase")]` declares `"Continent"`, not
//! `"continent"`.

mod cache;
mod codec;
mod mapping;

pub use cache::{TableEntity, schema_for};
pub use codec::{overlay, to_bag, to_record};
pub use mapping::{ColumnMapping, FieldMapping, FieldOptions, ReservedRole, SchemaBuilder};
