use std::sync::Arc;

use super::{MethodTranslator, translate_terminal};
use crate::error::Result;
use crate::expression::NameResolver;
use crate::query::chain::{MethodCall, QueryExpr, QueryMethod};
use crate::query::translation::{PostProcessing, TranslationResult};

/// `SingleOrDefault(pred)`, `Where(pred).SingleOrDefault()` and `SingleOrDefault()`.
#[derive(Debug, Clone)]
pub struct SingleOrDefaultTranslator {
    names: Arc<NameResolver>,
}

impl SingleOrDefaultTranslator {
    /// Create a translator resolving members through `names`.
    #[must_use]
    pub fn new(names: Arc<NameResolver>) -> Self {
        Self { names }
    }
}

impl MethodTranslator for SingleOrDefaultTranslator {
    fn method(&self) -> QueryMethod {
        QueryMethod::SingleOrDefault
    }

    fn translate<'q>(
        &self,
        call: &'q MethodCall,
        result: &mut TranslationResult,
    ) -> Result<&'q QueryExpr> {
        translate_terminal(
            &self.names,
            QueryMethod::SingleOrDefault,
            PostProcessing::RequireSingleOrDefault,
            call,
            result,
        )
    }
}
