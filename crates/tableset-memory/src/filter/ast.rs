use std::fmt;

use tableset_core::expression::{CompareOp, LogicalOp};
use tableset_model::EntityValue;

/// Parsed filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `Column op literal`.
    Compare {
        /// Column name.
        column: String,
        /// Comparison operator.
        op: CompareOp,
        /// Literal operand.
        value: EntityValue,
    },
    /// A bare column, true when it holds boolean `true`.
    Property(String),
    /// `true` or `false`.
    Literal(bool),
    /// `left and right`, `left or right`.
    Logical {
        /// Logical operator.
        op: LogicalOp,
        /// Left-hand filter.
        left: Box<Filter>,
        /// Right-hand filter.
        right: Box<Filter>,
    },
    /// `not inner`.
    Not(Box<Filter>),
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { column, op, value } => {
                write!(f, "{column} {} {}", op.token(), value.filter_literal())
            }
            Self::Property(column) => write!(f, "{column}"),
            Self::Literal(b) => write!(f, "{b}"),
            Self::Logical { op, left, right } => write!(f, "({left} {} {right})", op.token()),
            Self::Not(inner) => write!(f, "not ({inner})"),
        }
    }
}
