use tableset_model::EntityValue;

use super::{MethodTranslator, expect_method, single_argument};
use crate::error::{Result, TableError};
use crate::expression::{Expr, ExpressionEvaluator};
use crate::query::chain::{MethodCall, QueryExpr, QueryMethod};
use crate::query::translation::TranslationResult;

/// `source.Take(n)`.
///
/// `n` is any closed integer expression; it is evaluated at translation time.
#[derive(Debug, Clone, Default)]
pub struct TakeTranslator {
    max_take: Option<u32>,
}

impl TakeTranslator {
    /// Create a translator with no upper bound.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a translator rejecting counts above `max_take`.
    #[must_use]
    pub fn with_max_take(max_take: Option<u32>) -> Self {
        Self { max_take }
    }

    fn count(&self, argument: &Expr) -> Result<u32> {
        let value = match ExpressionEvaluator::new().evaluate(argument)? {
            Expr::Constant(EntityValue::Int32(n)) => i64::from(n),
            Expr::Constant(EntityValue::Int64(n)) => n,
            other => {
                return Err(TableError::out_of_range(
                    "count",
                    format!("Take expects an integer, got {} `{other}`", other.kind_name()),
                ));
            }
        };
        let count = u32::try_from(value).map_err(|_| {
            TableError::out_of_range("count", format!("{value} is not a valid row count"))
        })?;
        match self.max_take {
            Some(max) if count > max => Err(TableError::out_of_range(
                "count",
                format!("{count} exceeds the configured maximum of {max}"),
            )),
            _ => Ok(count),
        }
    }
}

impl MethodTranslator for TakeTranslator {
    fn method(&self) -> QueryMethod {
        QueryMethod::Take
    }

    fn translate<'q>(
        &self,
        call: &'q MethodCall,
        result: &mut TranslationResult,
    ) -> Result<&'q QueryExpr> {
        expect_method(call, QueryMethod::Take)?;
        let count = self.count(single_argument(call)?)?;
        if result.take_count.is_some() {
            return Err(TableError::out_of_range(
                "source",
                "a chain accepts a single Take",
            ));
        }
        result.take_count = Some(count);
        Ok(call.source.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::capture;
    use crate::query::chain::Queryable;
    use crate::query::methods::test_support::outer_call;

    fn translate(translator: &TakeTranslator, count: impl Into<Expr>) -> Result<TranslationResult> {
        let query = Queryable::<()>::new("countries").take(count);
        let mut result = TranslationResult::new();
        translator.translate(outer_call(query.expr()), &mut result)?;
        Ok(result)
    }

    #[test]
    fn test_should_set_take_count() {
        let result = translate(&TakeTranslator::new(), 2).unwrap();
        assert_eq!(result.take_count, Some(2));
        assert!(result.filter_string.is_none());
    }

    #[test]
    fn test_should_evaluate_closed_count() {
        let limit = 10_i64;
        let result = translate(&TakeTranslator::new(), capture("limit", move || limit)).unwrap();
        assert_eq!(result.take_count, Some(10));
    }

    #[test]
    fn test_should_reject_negative_count() {
        let err = translate(&TakeTranslator::new(), -1).unwrap_err();
        assert!(matches!(err, TableError::OutOfRange { .. }));
    }

    #[test]
    fn test_should_reject_non_integer_count() {
        let err = translate(&TakeTranslator::new(), "two").unwrap_err();
        assert!(matches!(err, TableError::OutOfRange { .. }));
    }

    #[test]
    fn test_should_enforce_max_take() {
        let translator = TakeTranslator::with_max_take(Some(100));
        assert_eq!(translate(&translator, 100).unwrap().take_count, Some(100));
        assert!(translate(&translator, 101).is_err());
    }
}
