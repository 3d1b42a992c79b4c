use std::any::{TypeId, type_name};
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::mapping::{ColumnMapping, SchemaBuilder};
use crate::error::Result;

/// A record type stored in a table.
pub trait TableEntity: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    /// Declare the type's fields, roles and overrides.
    fn describe(schema: &mut SchemaBuilder);
}

static SCHEMAS: LazyLock<DashMap<TypeId, Arc<ColumnMapping>>> = LazyLock::new(DashMap::new);

/// The cached mapping of `T`, built on first use.
///
/// Concurrent first calls may each build a mapping; the first one published
/// wins and every caller gets that instance. A mapping that fails validation
/// is never cached.
pub fn schema_for<T: TableEntity>() -> Result<Arc<ColumnMapping>> {
    let key = TypeId::of::<T>();
    if let Some(mapping) = SCHEMAS.get(&key) {
        return Ok(Arc::clone(mapping.value()));
    }

    let mut builder = SchemaBuilder::new(&shorten_type_name(type_name::<T>()));
    T::describe(&mut builder);
    let mapping = Arc::new(builder.build()?);
    debug!(
        entity = mapping.type_name(),
        fields = mapping.fields().len(),
        "built column mapping"
    );

    let published = SCHEMAS.entry(key).or_insert(mapping);
    Ok(Arc::clone(published.value()))
}

/// Drop module paths from every segment: `a::Wrapper<b::C>` -> `Wrapper<C>`.
fn shorten_type_name(full: &str) -> String {
    fn last_segment(path: &str) -> &str {
        path.rsplit("::").next().unwrap_or(path)
    }

    let mut short = String::with_capacity(full.len());
    let mut path = String::new();
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            path.push(c);
        } else {
            short.push_str(last_segment(&path));
            path.clear();
            short.push(c);
        }
    }
    short.push_str(last_segment(&path));
    short
}
