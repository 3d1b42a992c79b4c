use std::sync::Arc;

use super::{MethodTranslator, translate_terminal};
use crate::error::Result;
use crate::expression::NameResolver;
use crate::query::chain::{MethodCall, QueryExpr, QueryMethod};
use crate::query::translation::{PostProcessing, TranslationResult};

/// `FirstOrDefault(pred)`, `Where(pred).FirstOrDefault()` and `FirstOrDefault()`.
#[derive(Debug, Clone)]
pub struct FirstOrDefaultTranslator {
    names: Arc<NameResolver>,
}

impl FirstOrDefaultTranslator {
    /// Create a translator resolving members through `names`.
    #[must_use]
    pub fn new(names: Arc<NameResolver>) -> Self {
        Self { names }
    }
}

impl MethodTranslator for FirstOrDefaultTranslator {
    fn method(&self) -> QueryMethod {
        QueryMethod::FirstOrDefault
    }

    fn translate<'q>(
        &self,
        call: &'q MethodCall,
        result: &mut TranslationResult,
    ) -> Result<&'q QueryExpr> {
        translate_terminal(
            &self.names,
            QueryMethod::FirstOrDefault,
            PostProcessing::TakeFirstOrDefault,
            call,
            result,
        )
    }
}
