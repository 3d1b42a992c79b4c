use std::cmp::Ordering;

use tableset_core::expression::{CompareOp, LogicalOp};
use tableset_model::PropertyBag;

use super::ast::Filter;

impl Filter {
    /// Whether `row` satisfies the filter.
    ///
    /// A comparison against a missing column, or against a column of an
    /// incomparable kind, is false.
    #[must_use]
    pub fn matches(&self, row: &PropertyBag) -> bool {
        match self {
            Self::Compare { column, op, value } => row
                .get(column)
                .and_then(|actual| actual.compare(value))
                .is_some_and(|ordering| holds(*op, ordering)),
            Self::Property(column) => row
                .get(column)
                .and_then(tableset_model::EntityValue::as_bool)
                .unwrap_or(false),
            Self::Literal(b) => *b,
            Self::Logical { op, left, right } => match op {
                LogicalOp::And => left.matches(row) && right.matches(row),
                LogicalOp::Or => left.matches(row) || right.matches(row),
            },
            Self::Not(inner) => !inner.matches(row),
        }
    }
}

fn holds(op: CompareOp, ordering: Ordering) -> bool {
    match op {
        CompareOp::Eq => ordering == Ordering::Equal,
        CompareOp::Ne => ordering != Ordering::Equal,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::Le => ordering != Ordering::Greater,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::Ge => ordering != Ordering::Less,
    }
}
