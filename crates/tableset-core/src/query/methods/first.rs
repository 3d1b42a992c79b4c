use std::sync::Arc;

use super::{MethodTranslator, translate_terminal};
use crate::error::Result;
use crate::expression::NameResolver;
use crate::query::chain::{MethodCall, QueryExpr, QueryMethod};
use crate::query::translation::{PostProcessing, TranslationResult};

/// `First(pred)`, `Where(pred).First()` and `First()`.
#[derive(Debug, Clone)]
pub struct FirstTranslator {
    names: Arc<NameResolver>,
}

impl FirstTranslator {
    /// Create a translator resolving members through `names`.
    #[must_use]
    pub fn new(names: Arc<NameResolver>) -> Self {
        Self { names }
    }
}

impl MethodTranslator for FirstTranslator {
    fn method(&self) -> QueryMethod {
        QueryMethod::First
    }

    fn translate<'q>(
        &self,
        call: &'q MethodCall,
        result: &mut TranslationResult,
    ) -> Result<&'q QueryExpr> {
        translate_terminal(
            &self.names,
            QueryMethod::First,
            PostProcessing::TakeFirst,
            call,
            result,
        )
    }
}
