//! Partial evaluation of expression trees.
//!
//! Any sub-tree that does not reference a lambda parameter is closed: it is
//! executed on the spot and replaced by a literal. Sub-trees that reference a
//! parameter are handed back unchanged so the filter translator can recurse
//! into them.

use std::cmp::Ordering;

use tableset_model::EntityValue;
use tracing::trace;

use super::ast::{CompareOp, Expr, LogicalOp, ValueMethod};
use crate::error::{Result, TableError};

/// Stateless partial evaluator.
///
/// Every call re-invokes captured thunks, so repeated evaluation of the same
/// tree reflects the captured values at each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionEvaluator;

impl ExpressionEvaluator {
    /// Create a new evaluator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Reduce a closed sub-tree to a [`Expr::Constant`]; return an open one unchanged.
    pub fn evaluate(&self, expr: &Expr) -> Result<Expr> {
        if expr.references_parameter() {
            return Ok(expr.clone());
        }
        let value = self.invoke(expr)?;
        trace!(expr = %expr, value = %value, "reduced closed expression");
        Ok(Expr::Constant(value))
    }

    /// Execute a closed expression and return its value.
    pub fn invoke(&self, expr: &Expr) -> Result<EntityValue> {
        match expr {
            Expr::Constant(value) => Ok(value.clone()),
            Expr::Captured(capture) => Ok(capture.invoke()),
            Expr::Call { target, method } => {
                let receiver = self.invoke(target)?;
                apply_method(&receiver, method)
            }
            Expr::Compare { left, op, right } => {
                let l = self.invoke(left)?;
                let r = self.invoke(right)?;
                compare_values(&l, *op, &r).map(EntityValue::Boolean)
            }
            Expr::Logical { op, left, right } => {
                let l = self.invoke_bool(left)?;
                let value = match op {
                    LogicalOp::And => l && self.invoke_bool(right)?,
                    LogicalOp::Or => l || self.invoke_bool(right)?,
                };
                Ok(EntityValue::Boolean(value))
            }
            Expr::Not(inner) => Ok(EntityValue::Boolean(!self.invoke_bool(inner)?)),
            Expr::Member { field, .. } => Err(TableError::unsupported(format!(
                "member access `{field}` on a value that is not the query parameter"
            ))),
            Expr::Parameter(_) | Expr::Lambda(_) => Err(TableError::unsupported(format!(
                "{} `{expr}` cannot be evaluated to a literal",
                expr.kind_name()
            ))),
        }
    }

    fn invoke_bool(&self, expr: &Expr) -> Result<bool> {
        match self.invoke(expr)? {
            EntityValue::Boolean(b) => Ok(b),
            other => Err(TableError::unsupported(format!(
                "{} operand `{expr}` of a logical expression is not boolean",
                other.kind()
            ))),
        }
    }
}

fn compare_values(left: &EntityValue, op: CompareOp, right: &EntityValue) -> Result<bool> {
    let Some(ordering) = left.compare(right) else {
        return Err(TableError::unsupported(format!(
            "comparison between {} and {}",
            left.kind(),
            right.kind()
        )));
    };
    Ok(match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    })
}

fn apply_method(receiver: &EntityValue, method: &ValueMethod) -> Result<EntityValue> {
    if let ValueMethod::ToString = method {
        return Ok(EntityValue::String(receiver.to_text()));
    }
    let Some(s) = receiver.as_str() else {
        return Err(TableError::unsupported(format!(
            "method {method} on a {} value",
            receiver.kind()
        )));
    };
    let result = match method {
        ValueMethod::Substring { start, length } => substring(s, *start, *length)?,
        ValueMethod::ToUpper => s.to_uppercase(),
        ValueMethod::ToLower => s.to_lowercase(),
        ValueMethod::Trim => s.trim().to_owned(),
        ValueMethod::ToString => s.to_owned(),
    };
    Ok(EntityValue::String(result))
}

fn substring(s: &str, start: usize, length: Option<usize>) -> Result<String> {
    let char_count = s.chars().count();
    if start > char_count {
        return Err(TableError::out_of_range(
            "start",
            format!("start index {start} exceeds string length {char_count}"),
        ));
    }
    let available = char_count - start;
    let take = match length {
        Some(len) if len > available => {
            return Err(TableError::out_of_range(
                "length",
                format!("length {len} from index {start} exceeds string length {char_count}"),
            ));
        }
        Some(len) => len,
        None => available,
    };
    Ok(s.chars().skip(start).take(take).collect())
}
