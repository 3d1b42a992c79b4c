use std::sync::Arc;

use super::{MethodTranslator, expect_method, single_argument};
use crate::error::{Result, TableError};
use crate::expression::{FilterTranslator, NameResolver};
use crate::query::chain::{MethodCall, QueryExpr, QueryMethod};
use crate::query::translation::TranslationResult;

/// `source.Where(predicate)`.
#[derive(Debug, Clone)]
pub struct WhereTranslator {
    names: Arc<NameResolver>,
}

impl WhereTranslator {
    /// Create a translator resolving members through `names`.
    #[must_use]
    pub fn new(names: Arc<NameResolver>) -> Self {
        Self { names }
    }
}

impl MethodTranslator for WhereTranslator {
    fn method(&self) -> QueryMethod {
        QueryMethod::Where
    }

    fn translate<'q>(
        &self,
        call: &'q MethodCall,
        result: &mut TranslationResult,
    ) -> Result<&'q QueryExpr> {
        expect_method(call, QueryMethod::Where)?;
        let predicate = single_argument(call)?;
        if result.filter_string.is_some() {
            return Err(TableError::out_of_range(
                "source",
                "a chain accepts a single predicate; combine conditions with `and`",
            ));
        }
        let filter = FilterTranslator::new(&self.names).translate(predicate)?;
        result.filter_string = Some(filter);
        Ok(call.source.as_ref())
    }
}
