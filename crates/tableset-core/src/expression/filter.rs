//! Lowering of boolean predicate trees to the table filter grammar.
//!
//! The output grammar is deliberately small: resolved column identifiers,
//! `eq ne lt le gt ge`, `and`/`or`, prefix `not`, and typed literals rendered
//! by [`EntityValue::filter_literal`]. Anything else is rejected with
//! [`TableError::Unsupported`] naming the offending node; clauses are never
//! dropped.

use tableset_model::EntityValue;

use super::ast::{CompareOp, Expr, LogicalOp};
use super::evaluator::ExpressionEvaluator;
use super::names::NameResolver;
use crate::error::{Result, TableError};

/// Translates boolean expressions into filter text.
#[derive(Debug, Clone, Copy)]
pub struct FilterTranslator<'a> {
    names: &'a NameResolver,
    evaluator: ExpressionEvaluator,
}

impl<'a> FilterTranslator<'a> {
    /// Create a translator renaming members through `names`.
    #[must_use]
    pub fn new(names: &'a NameResolver) -> Self {
        Self {
            names,
            evaluator: ExpressionEvaluator::new(),
        }
    }

    /// Translate a predicate.
    ///
    /// A [`Expr::Lambda`] binds its parameter name: member accesses on any
    /// other parameter are rejected. A bare body accepts any parameter.
    pub fn translate(&self, predicate: &Expr) -> Result<String> {
        match predicate {
            Expr::Lambda(lambda) => self.lower(&lambda.body, Some(&lambda.parameter)),
            body => self.translate_boolean(body),
        }
    }

    /// Translate a boolean expression body.
    pub fn translate_boolean(&self, node: &Expr) -> Result<String> {
        self.lower(node, None)
    }

    fn lower(&self, node: &Expr, parameter: Option<&str>) -> Result<String> {
        let node = self.evaluator.evaluate(node)?;
        match &node {
            Expr::Constant(EntityValue::Boolean(b)) => Ok(b.to_string()),
            Expr::Constant(value) => Err(TableError::unsupported(format!(
                "{} constant {value} used as a predicate",
                value.kind()
            ))),
            Expr::Member { .. } => self.column(&node, parameter).map(str::to_owned),
            Expr::Not(inner) => {
                let text = self.lower(inner, parameter)?;
                if matches!(inner.as_ref(), Expr::Member { .. }) {
                    Ok(format!("not {text}"))
                } else {
                    Ok(format!("not ({text})"))
                }
            }
            Expr::Logical { op, left, right } => {
                let l = self.logical_operand(left, *op, parameter)?;
                let r = self.logical_operand(right, *op, parameter)?;
                Ok(format!("{l} {} {r}", op.token()))
            }
            Expr::Compare { left, op, right } => self.comparison(left, *op, right, parameter),
            other => Err(TableError::unsupported(format!(
                "{} `{other}` in a predicate",
                other.kind_name()
            ))),
        }
    }

    /// Lower one side of `and`/`or`, parenthesizing a nested combination of
    /// the other operator so precedence survives the round trip.
    fn logical_operand(
        &self,
        node: &Expr,
        parent: LogicalOp,
        parameter: Option<&str>,
    ) -> Result<String> {
        let text = self.lower(node, parameter)?;
        match node {
            Expr::Logical { op, .. } if *op != parent && node.references_parameter() => {
                Ok(format!("({text})"))
            }
            _ => Ok(text),
        }
    }

    fn comparison(
        &self,
        left: &Expr,
        op: CompareOp,
        right: &Expr,
        parameter: Option<&str>,
    ) -> Result<String> {
        let l = self.evaluator.evaluate(left)?;
        let r = self.evaluator.evaluate(right)?;
        match (&l, &r) {
            (Expr::Member { .. }, Expr::Constant(value)) => Ok(format!(
                "{} {} {}",
                self.column(&l, parameter)?,
                op.token(),
                literal(value)?
            )),
            (Expr::Constant(value), Expr::Member { .. }) => Ok(format!(
                "{} {} {}",
                self.column(&r, parameter)?,
                op.flip().token(),
                literal(value)?
            )),
            (Expr::Member { .. }, Expr::Member { .. }) => Err(TableError::unsupported(format!(
                "comparison between two members `{l} {op} {r}`"
            ))),
            _ => Err(TableError::unsupported(format!(
                "comparison `{l} {op} {r}` between a {} and a {}",
                l.kind_name(),
                r.kind_name()
            ))),
        }
    }

    fn column<'n>(&'n self, node: &'n Expr, parameter: Option<&str>) -> Result<&'n str> {
        let Expr::Member { target, field } = node else {
            return Err(TableError::unsupported(format!(
                "{} `{node}` where a member access was expected",
                node.kind_name()
            )));
        };
        match target.as_ref() {
            Expr::Parameter(name) if parameter.is_none_or(|bound| bound == name) => {
                Ok(self.names.resolve(field))
            }
            Expr::Parameter(name) => Err(TableError::unsupported(format!(
                "member `{field}` accessed on `{name}`, which is not the query parameter"
            ))),
            other => Err(TableError::unsupported(format!(
                "nested member access `{node}` on a {}",
                other.kind_name()
            ))),
        }
    }
}

/// The grammar has no spelling for NaN or infinities.
fn literal(value: &EntityValue) -> Result<String> {
    match value {
        EntityValue::Double(d) if !d.is_finite() => Err(TableError::unsupported(format!(
            "non-finite double literal {d}"
        ))),
        other => Ok(other.filter_literal()),
    }
}
