//! One translator per supported query method.
//!
//! Each translator checks the call's method identity before it reads any
//! argument, writes what it learns into the shared [`TranslationResult`] and
//! returns the source node the dispatcher should visit next.

mod first;
mod first_or_default;
mod single;
mod single_or_default;
mod take;
mod where_clause;

use std::fmt;

pub use first::FirstTranslator;
pub use first_or_default::FirstOrDefaultTranslator;
pub use single::SingleTranslator;
pub use single_or_default::SingleOrDefaultTranslator;
pub use take::TakeTranslator;
pub use where_clause::WhereTranslator;

use super::chain::{MethodCall, QueryExpr, QueryMethod};
use super::translation::{PostProcessing, TranslationResult};
use crate::error::{Result, TableError};
use crate::expression::{Expr, FilterTranslator, NameResolver};

/// Translates a single method call of a chain.
pub trait MethodTranslator: Send + Sync + fmt::Debug {
    /// The method this translator accepts.
    fn method(&self) -> QueryMethod;

    /// Translate `call` into `result`, returning the node to continue with.
    ///
    /// # Errors
    ///
    /// `OutOfRange` when `call` is not [`Self::method`] or has the wrong
    /// shape; errors of the filter translator are passed through.
    fn translate<'q>(
        &self,
        call: &'q MethodCall,
        result: &mut TranslationResult,
    ) -> Result<&'q QueryExpr>;
}

fn expect_method(call: &MethodCall, expected: QueryMethod) -> Result<()> {
    if call.method == expected {
        Ok(())
    } else {
        Err(TableError::out_of_range(
            "method",
            format!("expected {expected}, got {}", call.method),
        ))
    }
}

fn single_argument(call: &MethodCall) -> Result<&Expr> {
    match call.arguments.as_slice() {
        [argument] => Ok(argument),
        arguments => Err(TableError::out_of_range(
            "arguments",
            format!(
                "{} takes exactly one argument, got {}",
                call.method,
                arguments.len()
            ),
        )),
    }
}

/// Shared body of the four cardinality translators.
///
/// Accepted shapes are `source.M(pred)`, `source.Where(pred).M()` and
/// `source.M()`. The directive is recorded only once the call translated.
fn translate_terminal<'q>(
    names: &NameResolver,
    expected: QueryMethod,
    directive: PostProcessing,
    call: &'q MethodCall,
    result: &mut TranslationResult,
) -> Result<&'q QueryExpr> {
    expect_method(call, expected)?;

    let filters = FilterTranslator::new(names);
    let where_source = call
        .source_call()
        .filter(|inner| inner.method == QueryMethod::Where);

    let next = match (call.arguments.as_slice(), where_source) {
        ([], Some(inner)) => {
            let filter = filters.translate(single_argument(inner)?)?;
            result.filter_string = Some(filter);
            inner.source.as_ref()
        }
        ([], None) => call.source.as_ref(),
        ([_], Some(_)) => {
            return Err(TableError::out_of_range(
                "source",
                format!("{expected} with a predicate cannot be called on Where"),
            ));
        }
        ([predicate], None) => {
            result.filter_string = Some(filters.translate(predicate)?);
            call.source.as_ref()
        }
        (arguments, _) => {
            return Err(TableError::out_of_range(
                "arguments",
                format!(
                    "{expected} takes at most one predicate, got {}",
                    arguments.len()
                ),
            ));
        }
    };

    result.post_processing = Some(directive);
    Ok(next)
}
