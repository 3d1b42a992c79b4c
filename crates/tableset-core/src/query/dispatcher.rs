//! Walks a method chain and dispatches each call to its translator.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::chain::{QueryExpr, QueryMethod};
use super::methods::{
    FirstOrDefaultTranslator, FirstTranslator, MethodTranslator, SingleOrDefaultTranslator,
    SingleTranslator, TakeTranslator, WhereTranslator,
};
use super::translation::TranslationResult;
use crate::config::TableSetConfig;
use crate::error::{Result, TableError};
use crate::expression::NameResolver;

/// Translates whole chains rooted at one table.
#[derive(Debug)]
pub struct QueryTranslator {
    table: String,
    names: Arc<NameResolver>,
    translators: HashMap<QueryMethod, Box<dyn MethodTranslator>>,
    log_filters: bool,
}

impl QueryTranslator {
    /// Create a translator for `table` with default configuration.
    #[must_use]
    pub fn new(table: &str, names: NameResolver) -> Self {
        Self::with_config(table, names, &TableSetConfig::default())
    }

    /// Create a translator for `table` honouring `config`.
    #[must_use]
    pub fn with_config(table: &str, names: NameResolver, config: &TableSetConfig) -> Self {
        let names = Arc::new(names);
        let translators: Vec<Box<dyn MethodTranslator>> = vec![
            Box::new(WhereTranslator::new(Arc::clone(&names))),
            Box::new(FirstTranslator::new(Arc::clone(&names))),
            Box::new(FirstOrDefaultTranslator::new(Arc::clone(&names))),
            Box::new(SingleTranslator::new(Arc::clone(&names))),
            Box::new(SingleOrDefaultTranslator::new(Arc::clone(&names))),
            Box::new(TakeTranslator::with_max_take(config.max_take)),
        ];
        Self {
            table: table.to_owned(),
            names,
            translators: translators
                .into_iter()
                .map(|translator| (translator.method(), translator))
                .collect(),
            log_filters: config.log_filters,
        }
    }

    /// The designated root table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The member-to-column table.
    #[must_use]
    pub fn names(&self) -> &NameResolver {
        &self.names
    }

    /// Translate a chain, outermost call first.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when the chain is not rooted at this table, when a
    /// cardinality method is not the last call, or when `Take` is applied to
    /// an already filtered sequence. Translator errors are passed through.
    pub fn translate(&self, chain: &QueryExpr) -> Result<TranslationResult> {
        let mut result = TranslationResult::new();
        let mut node = chain;
        let mut outermost = true;

        loop {
            match node {
                QueryExpr::Root(root) => {
                    if root.table != self.table {
                        return Err(TableError::out_of_range(
                            "source",
                            format!(
                                "chain is rooted at `{}`, expected `{}`",
                                root.table, self.table
                            ),
                        ));
                    }
                    break;
                }
                QueryExpr::Call(call) => {
                    if call.method.is_terminal() && !outermost {
                        return Err(TableError::out_of_range(
                            "method",
                            format!("{} must be the last call of a chain", call.method),
                        ));
                    }
                    if call.method == QueryMethod::Take && result.filter_string.is_some() {
                        return Err(TableError::out_of_range(
                            "source",
                            "a predicate (Where or a terminal method's own) cannot follow Take",
                        ));
                    }
                    let translator = self.translators.get(&call.method).ok_or_else(|| {
                        TableError::unsupported(format!("query method {}", call.method))
                    })?;
                    node = translator.translate(call, &mut result)?;
                    outermost = false;
                }
            }
        }

        if self.log_filters {
            debug!(
                table = %self.table,
                filter = ?result.filter_string,
                take = ?result.take_count,
                post_processing = ?result.post_processing,
                "translated query chain"
            );
        }
        Ok(result)
    }
}
