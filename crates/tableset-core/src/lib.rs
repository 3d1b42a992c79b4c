//! Query translation and entity mapping for key/value table storage.
//!
//! The crate turns chained, typed query expressions into the table service's
//! boolean filter grammar plus the client-side directives the grammar cannot
//! express, and maps typed records to and from flat property bags.
//!
//! ```text
//! Queryable chain -> QueryTranslator -> TranslationResult
//!                                         |  filter / take
//!                                         v
//!                               TableRequestExecutor (external)
//!                                         |  property bags
//!                                         v
//!                    schema::to_record -> PostProcessing -> records
//! ```
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod executor;
pub mod expression;
pub mod query;
pub mod schema;
pub mod table_set;

pub use config::TableSetConfig;
pub use error::{Result, TableError};
pub use executor::{ContinuationToken, QuerySegment, TableQuery, TableRequestExecutor};
pub use expression::{Expr, ExpressionEvaluator, FilterTranslator, NameResolver};
pub use query::{PostProcessing, QueryMethod, QueryTranslator, Queryable, TranslationResult};
pub use schema::{ColumnMapping, FieldOptions, ReservedRole, SchemaBuilder, TableEntity};
pub use table_set::TableSet;
