//! Predicate expressions and their lowering to the table filter grammar.
//!
//! The pipeline is:
//!
//! 1. **Construction**: callers build an [`Expr`] tree with the helpers in [`ast`].
//! 2. **Partial evaluation**: [`ExpressionEvaluator`] folds every sub-tree that
//!    does not touch the lambda parameter into a literal.
//! 3. **Lowering**: [`FilterTranslator`] renders the remaining tree as filter
//!    text, renaming members through [`NameResolver`].

pub mod ast;
pub mod evaluator;
pub mod filter;
pub mod names;

pub use ast::{
    Capture, CompareOp, Expr, Lambda, LogicalOp, ValueMethod, capture, constant, display, field,
    lambda, param, predicate,
};
pub use evaluator::ExpressionEvaluator;
pub use filter::FilterTranslator;
pub use names::NameResolver;
