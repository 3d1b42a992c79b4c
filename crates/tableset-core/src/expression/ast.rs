//! Expression tree for typed query predicates.
//!
//! A predicate is a [`Lambda`] whose body is built from member accesses on the
//! lambda's parameter, literal constants, captured values and the comparison
//! and logical combinators. Captured values are thunks invoked at evaluation
//! time, so a predicate built once observes the current value of whatever it
//! closed over each time it is translated.

use std::fmt;
use std::ops::Not;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tableset_model::EntityValue;
use uuid::Uuid;

/// Default name of the bound parameter used by [`field`] and [`predicate`].
pub const DEFAULT_PARAMETER: &str = "p";

/// Expression node.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Reference to a lambda's bound parameter.
    Parameter(String),
    /// Member access: `target.field`.
    Member {
        /// Accessed object.
        target: Box<Expr>,
        /// Logical field name.
        field: String,
    },
    /// A literal value.
    Constant(EntityValue),
    /// A value captured from the enclosing scope, produced on demand.
    Captured(Capture),
    /// A method call on a value: `target.method(...)`.
    Call {
        /// Receiver.
        target: Box<Expr>,
        /// Method and its arguments.
        method: ValueMethod,
    },
    /// Comparison: `left op right`.
    Compare {
        /// Left-hand operand.
        left: Box<Expr>,
        /// Comparison operator.
        op: CompareOp,
        /// Right-hand operand.
        right: Box<Expr>,
    },
    /// Logical combination: `left && right` or `left || right`.
    Logical {
        /// Logical operator.
        op: LogicalOp,
        /// Left-hand expression.
        left: Box<Expr>,
        /// Right-hand expression.
        right: Box<Expr>,
    },
    /// Logical negation: `!expr`.
    Not(Box<Expr>),
    /// A lambda: `|parameter| body`.
    Lambda(Lambda),
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
}

impl CompareOp {
    /// Filter grammar token for this operator.
    #[must_use]
    pub fn token(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
        }
    }

    /// Parse a filter grammar token (case-insensitive).
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            "lt" => Some(Self::Lt),
            "le" => Some(Self::Le),
            "gt" => Some(Self::Gt),
            "ge" => Some(Self::Ge),
            _ => None,
        }
    }

    /// The operator with its operands swapped: `a < b` is `b > a`.
    #[must_use]
    pub fn flip(self) -> Self {
        match self {
            Self::Eq => Self::Eq,
            Self::Ne => Self::Ne,
            Self::Lt => Self::Gt,
            Self::Le => Self::Ge,
            Self::Gt => Self::Lt,
            Self::Ge => Self::Le,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "=="),
            Self::Ne => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::Le => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Ge => write!(f, ">="),
        }
    }
}

/// Logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// Logical AND.
    And,
    /// Logical OR.
    Or,
}

impl LogicalOp {
    /// Filter grammar token for this operator.
    #[must_use]
    pub fn token(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "&&"),
            Self::Or => write!(f, "||"),
        }
    }
}

/// Methods callable on closed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueMethod {
    /// `Substring(start)` or `Substring(start, length)`, in characters.
    Substring {
        /// Start index.
        start: usize,
        /// Optional length.
        length: Option<usize>,
    },
    /// Plain text rendering.
    ToString,
    /// Uppercase a string.
    ToUpper,
    /// Lowercase a string.
    ToLower,
    /// Trim surrounding whitespace.
    Trim,
}

impl fmt::Display for ValueMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Substring {
                start,
                length: None,
            } => write!(f, "Substring({start})"),
            Self::Substring {
                start,
                length: Some(len),
            } => write!(f, "Substring({start}, {len})"),
            Self::ToString => write!(f, "ToString()"),
            Self::ToUpper => write!(f, "ToUpper()"),
            Self::ToLower => write!(f, "ToLower()"),
            Self::Trim => write!(f, "Trim()"),
        }
    }
}

/// A value captured from the enclosing scope.
///
/// The thunk runs every time the capture is evaluated; nothing is cached.
#[derive(Clone)]
pub struct Capture {
    name: Arc<str>,
    thunk: Arc<dyn Fn() -> EntityValue + Send + Sync>,
}

impl Capture {
    /// Create a capture from a name (for diagnostics) and a value producer.
    pub fn new<F, V>(name: &str, producer: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Into<EntityValue>,
    {
        Self {
            name: Arc::from(name),
            thunk: Arc::new(move || producer().into()),
        }
    }

    /// Name of the captured variable.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Produce the current value.
    #[must_use]
    pub fn invoke(&self) -> EntityValue {
        (self.thunk)()
    }
}

impl fmt::Debug for Capture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capture").field("name", &self.name).finish()
    }
}

/// A single-parameter lambda.
#[derive(Debug, Clone)]
pub struct Lambda {
    /// Bound parameter name.
    pub parameter: String,
    /// Body expression.
    pub body: Box<Expr>,
}

// ---------------------------------------------------------------------------
// Construction helpers
// ---------------------------------------------------------------------------

/// Reference to a parameter.
#[must_use]
pub fn param(name: &str) -> Expr {
    Expr::Parameter(name.to_owned())
}

/// Member access on the default parameter: `p.<name>`.
#[must_use]
pub fn field(name: &str) -> Expr {
    param(DEFAULT_PARAMETER).member(name)
}

/// A literal constant.
#[must_use]
pub fn constant(value: impl Into<EntityValue>) -> Expr {
    Expr::Constant(value.into())
}

/// A captured value, re-read on every evaluation.
pub fn capture<F, V>(name: &str, producer: F) -> Expr
where
    F: Fn() -> V + Send + Sync + 'static,
    V: Into<EntityValue>,
{
    Expr::Captured(Capture::new(name, producer))
}

/// A captured value rendered through its `Display` implementation, the way
/// an enum's text rendering is used in a predicate.
pub fn display<F, T>(name: &str, producer: F) -> Expr
where
    F: Fn() -> T + Send + Sync + 'static,
    T: fmt::Display,
{
    Expr::Captured(Capture::new(name, move || producer().to_string()))
}

/// A lambda binding `parameter` over `body`.
#[must_use]
pub fn lambda(parameter: &str, body: Expr) -> Expr {
    Expr::Lambda(Lambda {
        parameter: parameter.to_owned(),
        body: Box::new(body),
    })
}

/// A lambda over the default parameter.
#[must_use]
pub fn predicate(body: Expr) -> Expr {
    lambda(DEFAULT_PARAMETER, body)
}

impl Expr {
    /// Member access: `self.<name>`.
    #[must_use]
    pub fn member(self, name: &str) -> Self {
        Self::Member {
            target: Box::new(self),
            field: name.to_owned(),
        }
    }

    fn compare(self, op: CompareOp, right: impl Into<Self>) -> Self {
        Self::Compare {
            left: Box::new(self),
            op,
            right: Box::new(right.into()),
        }
    }

    /// `self == right`.
    #[must_use]
    pub fn equals(self, right: impl Into<Self>) -> Self {
        self.compare(CompareOp::Eq, right)
    }

    /// `self != right`.
    #[must_use]
    pub fn not_equals(self, right: impl Into<Self>) -> Self {
        self.compare(CompareOp::Ne, right)
    }

    /// `self < right`.
    #[must_use]
    pub fn less_than(self, right: impl Into<Self>) -> Self {
        self.compare(CompareOp::Lt, right)
    }

    /// `self <= right`.
    #[must_use]
    pub fn less_or_equal(self, right: impl Into<Self>) -> Self {
        self.compare(CompareOp::Le, right)
    }

    /// `self > right`.
    #[must_use]
    pub fn greater_than(self, right: impl Into<Self>) -> Self {
        self.compare(CompareOp::Gt, right)
    }

    /// `self >= right`.
    #[must_use]
    pub fn greater_or_equal(self, right: impl Into<Self>) -> Self {
        self.compare(CompareOp::Ge, right)
    }

    /// `self && right`.
    #[must_use]
    pub fn and(self, right: Self) -> Self {
        Self::Logical {
            op: LogicalOp::And,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    /// `self || right`.
    #[must_use]
    pub fn or(self, right: Self) -> Self {
        Self::Logical {
            op: LogicalOp::Or,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    fn call(self, method: ValueMethod) -> Self {
        Self::Call {
            target: Box::new(self),
            method,
        }
    }

    /// `self.Substring(start)`.
    #[must_use]
    pub fn substring(self, start: usize) -> Self {
        self.call(ValueMethod::Substring {
            start,
            length: None,
        })
    }

    /// `self.Substring(start, length)`.
    #[must_use]
    pub fn substring_len(self, start: usize, length: usize) -> Self {
        self.call(ValueMethod::Substring {
            start,
            length: Some(length),
        })
    }

    /// `self.ToString()`.
    #[must_use]
    pub fn to_text(self) -> Self {
        self.call(ValueMethod::ToString)
    }

    /// `self.ToUpper()`.
    #[must_use]
    pub fn to_upper(self) -> Self {
        self.call(ValueMethod::ToUpper)
    }

    /// `self.ToLower()`.
    #[must_use]
    pub fn to_lower(self) -> Self {
        self.call(ValueMethod::ToLower)
    }

    /// `self.Trim()`.
    #[must_use]
    pub fn trim(self) -> Self {
        self.call(ValueMethod::Trim)
    }

    /// Returns `true` if the tree references any parameter.
    #[must_use]
    pub fn references_parameter(&self) -> bool {
        match self {
            Self::Parameter(_) | Self::Lambda(_) => true,
            Self::Constant(_) | Self::Captured(_) => false,
            Self::Member { target, .. } | Self::Call { target, .. } => {
                target.references_parameter()
            }
            Self::Compare { left, right, .. } | Self::Logical { left, right, .. } => {
                left.references_parameter() || right.references_parameter()
            }
            Self::Not(inner) => inner.references_parameter(),
        }
    }

    /// Short description of the node kind, used in error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Parameter(_) => "parameter",
            Self::Member { .. } => "member access",
            Self::Constant(_) => "constant",
            Self::Captured(_) => "captured value",
            Self::Call { .. } => "method call",
            Self::Compare { .. } => "comparison",
            Self::Logical { .. } => "logical expression",
            Self::Not(_) => "negation",
            Self::Lambda(_) => "lambda",
        }
    }
}

impl Not for Expr {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameter(name) => write!(f, "{name}"),
            Self::Member { target, field } => write!(f, "{target}.{field}"),
            Self::Constant(value) => write!(f, "{value}"),
            Self::Captured(capture) => write!(f, "{}", capture.name()),
            Self::Call { target, method } => write!(f, "{target}.{method}"),
            Self::Compare { left, op, right } => write!(f, "({left} {op} {right})"),
            Self::Logical { op, left, right } => write!(f, "({left} {op} {right})"),
            Self::Not(inner) => write!(f, "!{inner}"),
            Self::Lambda(lambda) => write!(f, "{} => {}", lambda.parameter, lambda.body),
        }
    }
}

impl From<EntityValue> for Expr {
    fn from(value: EntityValue) -> Self {
        Self::Constant(value)
    }
}

impl From<Capture> for Expr {
    fn from(value: Capture) -> Self {
        Self::Captured(value)
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        constant(value)
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        constant(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        constant(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        constant(value)
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        constant(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        constant(value)
    }
}

impl From<Vec<u8>> for Expr {
    fn from(value: Vec<u8>) -> Self {
        constant(value)
    }
}

impl From<DateTime<Utc>> for Expr {
    fn from(value: DateTime<Utc>) -> Self {
        constant(value)
    }
}

impl From<Uuid> for Expr {
    fn from(value: Uuid) -> Self {
        constant(value)
    }
}
