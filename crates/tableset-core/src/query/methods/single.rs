use std::sync::Arc;

use super::{MethodTranslator, translate_terminal};
use crate::error::Result;
use crate::expression::NameResolver;
use crate::query::chain::{MethodCall, QueryExpr, QueryMethod};
use crate::query::translation::{PostProcessing, TranslationResult};

/// `Single(pred)`, `Where(pred).Single()` and `Single()`.
#[derive(Debug, Clone)]
pub struct SingleTranslator {
    names: Arc<NameResolver>,
}

impl SingleTranslator {
    /// Create a translator resolving members through `names`.
    #[must_use]
    pub fn new(names: Arc<NameResolver>) -> Self {
        Self { names }
    }
}

impl MethodTranslator for SingleTranslator {
    fn method(&self) -> QueryMethod {
        QueryMethod::Single
    }

    fn translate<'q>(
        &self,
        call: &'q MethodCall,
        result: &mut TranslationResult,
    ) -> Result<&'q QueryExpr> {
        translate_terminal(
            &self.names,
            QueryMethod::Single,
            PostProcessing::RequireSingle,
            call,
            result,
        )
    }
}
