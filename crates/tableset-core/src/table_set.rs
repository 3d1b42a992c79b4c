//! Typed access to one table.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tableset_model::TableOperation;
use tracing::debug;

use crate::config::TableSetConfig;
use crate::error::{Result, TableError};
use crate::executor::TableRequestExecutor;
use crate::expression::Expr;
use crate::query::{PostProcessing, QueryTranslator, Queryable, TranslationResult};
use crate::schema::{ColumnMapping, TableEntity, overlay, schema_for, to_bag, to_record};

/// A table of `T` records backed by a [`TableRequestExecutor`].
///
/// Queries are translated synchronously before anything is awaited; the
/// post-processing directive is applied once all rows are back.
pub struct TableSet<T> {
    name: String,
    executor: Arc<dyn TableRequestExecutor>,
    config: TableSetConfig,
    schema: Arc<ColumnMapping>,
    translator: QueryTranslator,
    _marker: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for TableSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSet")
            .field("name", &self.name)
            .field("entity", &self.schema.type_name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T: TableEntity> TableSet<T> {
    /// Bind `T` to the table `name` with default configuration.
    ///
    /// # Errors
    ///
    /// `MappingIntegrity` when `T`'s declared mapping is invalid.
    pub fn new(name: &str, executor: Arc<dyn TableRequestExecutor>) -> Result<Self> {
        Self::with_config(name, executor, TableSetConfig::default())
    }

    /// Bind `T` to the table `name`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for a zero `page_size`; `MappingIntegrity` when `T`'s
    /// declared mapping is invalid.
    pub fn with_config(
        name: &str,
        executor: Arc<dyn TableRequestExecutor>,
        config: TableSetConfig,
    ) -> Result<Self> {
        if config.page_size == 0 {
            return Err(TableError::out_of_range(
                "page_size",
                "a segment must hold at least one entity",
            ));
        }
        let schema = schema_for::<T>()?;
        let translator = QueryTranslator::with_config(name, schema.name_resolver(), &config);
        Ok(Self {
            name: name.to_owned(),
            executor,
            config,
            schema,
            translator,
            _marker: PhantomData,
        })
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column mapping of `T`.
    #[must_use]
    pub fn schema(&self) -> &ColumnMapping {
        &self.schema
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &TableSetConfig {
        &self.config
    }

    /// A chain rooted at this table.
    #[must_use]
    pub fn query(&self) -> Queryable<T> {
        Queryable::new(&self.name)
    }

    /// Translate a chain without running it.
    pub fn translate(&self, query: &Queryable<T>) -> Result<TranslationResult> {
        self.translator.translate(query.expr())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Run any chain. A cardinality method at the end leaves at most one record.
    pub async fn execute(&self, query: &Queryable<T>) -> Result<Vec<T>> {
        let translation = self.translate(query)?;
        let records = self.fetch(&translation).await?;
        match translation.post_processing {
            Some(directive) => Ok(directive.apply(records)?.into_iter().collect()),
            None => Ok(records),
        }
    }

    /// All records in the table.
    pub async fn to_list(&self) -> Result<Vec<T>> {
        self.execute(&self.query()).await
    }

    /// All records matching `predicate`.
    pub async fn to_list_where(&self, predicate: Expr) -> Result<Vec<T>> {
        self.execute(&self.query().filter(predicate)).await
    }

    /// At most `count` records.
    pub async fn take(&self, count: u32) -> Result<Vec<T>> {
        self.execute(&self.query().take(i64::from(count))).await
    }

    /// The first record, optionally of those matching `predicate`.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when nothing matches.
    pub async fn first(&self, predicate: Option<Expr>) -> Result<T> {
        self.required(&self.query().first(predicate)).await
    }

    /// The first record or `None`.
    pub async fn first_or_default(&self, predicate: Option<Expr>) -> Result<Option<T>> {
        self.execute_one(&self.query().first_or_default(predicate)).await
    }

    /// The only record, optionally of those matching `predicate`.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` unless exactly one record matches.
    pub async fn single(&self, predicate: Option<Expr>) -> Result<T> {
        self.required(&self.query().single(predicate)).await
    }

    /// The only record or `None`.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when more than one record matches.
    pub async fn single_or_default(&self, predicate: Option<Expr>) -> Result<Option<T>> {
        self.execute_one(&self.query().single_or_default(predicate)).await
    }

    /// Run a chain ending in a cardinality method and return its record.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` when the chain has no cardinality method or the
    /// returned rows violate it.
    pub async fn execute_one(&self, query: &Queryable<T>) -> Result<Option<T>> {
        let translation = self.translate(query)?;
        let directive = translation.post_processing.ok_or_else(|| {
            TableError::invalid_operation("chain does not end in a cardinality method")
        })?;
        let records = self.fetch(&translation).await?;
        directive.apply(records)
    }

    async fn required(&self, query: &Queryable<T>) -> Result<T> {
        self.execute_one(query)
            .await?
            .ok_or_else(|| TableError::invalid_operation("sequence contains no elements"))
    }

    async fn fetch(&self, translation: &TranslationResult) -> Result<Vec<T>> {
        let mut request = translation.table_query();
        // First needs one row and Single needs two to detect a violation.
        let needed = match translation.post_processing {
            Some(PostProcessing::TakeFirst | PostProcessing::TakeFirstOrDefault) => Some(1),
            Some(PostProcessing::RequireSingle | PostProcessing::RequireSingleOrDefault) => Some(2),
            None => None,
        };
        request.take_count = match (request.take_count, needed) {
            (Some(take), Some(needed)) => Some(take.min(needed)),
            (take, needed) => take.or(needed),
        };

        let rows = self
            .executor
            .execute_query(&self.name, &request, self.config.page_size)
            .await?;
        debug!(table = %self.name, rows = rows.len(), "query returned");
        rows.iter().map(to_record::<T>).collect()
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a record; fails if its key exists.
    ///
    /// # Errors
    ///
    /// `NullArgument` for `None`, before the collaborator is called.
    pub async fn add(&self, entity: impl Into<Option<T>>) -> Result<T> {
        let entity = entity.into().ok_or_else(|| TableError::null_argument("entity"))?;
        self.write(TableOperation::Insert, entity).await
    }

    /// Replace a stored record.
    ///
    /// # Errors
    ///
    /// `NullArgument` for `None`, before the collaborator is called.
    pub async fn update(&self, entity: impl Into<Option<T>>) -> Result<T> {
        let entity = entity.into().ok_or_else(|| TableError::null_argument("entity"))?;
        self.write(TableOperation::Replace, entity).await
    }

    /// Delete a stored record.
    ///
    /// # Errors
    ///
    /// `NullArgument` for `None`, before the collaborator is called.
    pub async fn remove(&self, entity: impl Into<Option<T>>) -> Result<()> {
        let entity = entity.into().ok_or_else(|| TableError::null_argument("entity"))?;
        self.write(TableOperation::Delete, entity).await.map(|_| ())
    }

    /// Insert several records in order.
    ///
    /// # Errors
    ///
    /// `NullArgument` for `None`; the first failing write stops the rest.
    pub async fn add_many(&self, entities: impl Into<Option<Vec<T>>>) -> Result<Vec<T>> {
        self.write_many(TableOperation::Insert, entities.into()).await
    }

    /// Replace several records in order.
    ///
    /// # Errors
    ///
    /// `NullArgument` for `None`; the first failing write stops the rest.
    pub async fn update_many(&self, entities: impl Into<Option<Vec<T>>>) -> Result<Vec<T>> {
        self.write_many(TableOperation::Replace, entities.into()).await
    }

    /// Delete several records in order.
    ///
    /// # Errors
    ///
    /// `NullArgument` for `None`; the first failing write stops the rest.
    pub async fn remove_many(&self, entities: impl Into<Option<Vec<T>>>) -> Result<()> {
        self.write_many(TableOperation::Delete, entities.into())
            .await
            .map(|_| ())
    }

    async fn write_many(
        &self,
        operation: TableOperation,
        entities: Option<Vec<T>>,
    ) -> Result<Vec<T>> {
        let entities = entities.ok_or_else(|| TableError::null_argument("entities"))?;
        let mut written = Vec::with_capacity(entities.len());
        for entity in entities {
            written.push(self.write(operation, entity).await?);
        }
        Ok(written)
    }

    async fn write(&self, operation: TableOperation, entity: T) -> Result<T> {
        let bag = to_bag(&entity)?;
        debug!(table = %self.name, %operation, columns = bag.len(), "executing write");
        let stored = self.executor.execute(&self.name, operation, bag).await?;
        match operation {
            TableOperation::Delete => Ok(entity),
            _ => overlay(&entity, &stored),
        }
    }
}
