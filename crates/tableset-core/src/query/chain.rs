//! Method-call chains over a table root.
//!
//! A chain is the Rust shape of `table.Where(p => ...).Take(2).First()`:
//! nested [`MethodCall`] nodes whose innermost source is a [`QueryRoot`].

use std::fmt;
use std::marker::PhantomData;

use crate::expression::Expr;

/// All supported query methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryMethod {
    /// Filter by a predicate.
    Where,
    /// First element; fails on an empty sequence.
    First,
    /// First element or none.
    FirstOrDefault,
    /// The only element; fails unless exactly one.
    Single,
    /// The only element or none; fails on more than one.
    SingleOrDefault,
    /// Limit the number of rows.
    Take,
}

impl QueryMethod {
    /// Returns the method name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Where => "Where",
            Self::First => "First",
            Self::FirstOrDefault => "FirstOrDefault",
            Self::Single => "Single",
            Self::SingleOrDefault => "SingleOrDefault",
            Self::Take => "Take",
        }
    }

    /// Whether the method constrains result cardinality and ends a chain.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::First | Self::FirstOrDefault | Self::Single | Self::SingleOrDefault
        )
    }
}

impl fmt::Display for QueryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The designated source of a chain: a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRoot {
    /// Table name.
    pub table: String,
}

/// A single method call in a chain.
#[derive(Debug, Clone)]
pub struct MethodCall {
    /// Called method.
    pub method: QueryMethod,
    /// The sequence the method is called on.
    pub source: Box<QueryExpr>,
    /// Arguments after the source (predicate lambda, take count).
    pub arguments: Vec<Expr>,
}

impl MethodCall {
    /// The source as a method call, if it is one.
    #[must_use]
    pub fn source_call(&self) -> Option<&MethodCall> {
        match self.source.as_ref() {
            QueryExpr::Call(call) => Some(call),
            QueryExpr::Root(_) => None,
        }
    }
}

/// A query chain node.
#[derive(Debug, Clone)]
pub enum QueryExpr {
    /// The table itself.
    Root(QueryRoot),
    /// A method call on another node.
    Call(MethodCall),
}

impl QueryExpr {
    /// A root node for `table`.
    #[must_use]
    pub fn root(table: &str) -> Self {
        Self::Root(QueryRoot {
            table: table.to_owned(),
        })
    }

    /// Wrap `self` in a call to `method`.
    #[must_use]
    pub fn call(self, method: QueryMethod, arguments: Vec<Expr>) -> Self {
        Self::Call(MethodCall {
            method,
            source: Box::new(self),
            arguments,
        })
    }
}

impl fmt::Display for QueryExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root(root) => write!(f, "{}", root.table),
            Self::Call(call) => {
                write!(f, "{}.{}(", call.source, call.method)?;
                for (i, arg) in call.arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Typed builder over a [`QueryExpr`] chain for records of type `T`.
#[derive(Debug)]
pub struct Queryable<T> {
    expr: QueryExpr,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Queryable<T> {
    fn clone(&self) -> Self {
        Self {
            expr: self.expr.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Queryable<T> {
    /// Start a chain at `table`.
    #[must_use]
    pub fn new(table: &str) -> Self {
        Self::from_expr(QueryExpr::root(table))
    }

    /// Wrap an existing chain.
    #[must_use]
    pub fn from_expr(expr: QueryExpr) -> Self {
        Self {
            expr,
            _marker: PhantomData,
        }
    }

    /// The underlying chain.
    #[must_use]
    pub fn expr(&self) -> &QueryExpr {
        &self.expr
    }

    /// Consume the builder, returning the chain.
    #[must_use]
    pub fn into_expr(self) -> QueryExpr {
        self.expr
    }

    fn then(self, method: QueryMethod, arguments: Vec<Expr>) -> Self {
        Self::from_expr(self.expr.call(method, arguments))
    }

    /// `.Where(predicate)`.
    #[must_use]
    pub fn filter(self, predicate: Expr) -> Self {
        self.then(QueryMethod::Where, vec![predicate])
    }

    /// `.Take(count)`; `count` may be any closed integer expression.
    #[must_use]
    pub fn take(self, count: impl Into<Expr>) -> Self {
        self.then(QueryMethod::Take, vec![count.into()])
    }

    /// `.First()` or `.First(predicate)`.
    #[must_use]
    pub fn first(self, predicate: Option<Expr>) -> Self {
        self.then(QueryMethod::First, predicate.into_iter().collect())
    }

    /// `.FirstOrDefault()` or `.FirstOrDefault(predicate)`.
    #[must_use]
    pub fn first_or_default(self, predicate: Option<Expr>) -> Self {
        self.then(QueryMethod::FirstOrDefault, predicate.into_iter().collect())
    }

    /// `.Single()` or `.Single(predicate)`.
    #[must_use]
    pub fn single(self, predicate: Option<Expr>) -> Self {
        self.then(QueryMethod::Single, predicate.into_iter().collect())
    }

    /// `.SingleOrDefault()` or `.SingleOrDefault(predicate)`.
    #[must_use]
    pub fn single_or_default(self, predicate: Option<Expr>) -> Self {
        self.then(QueryMethod::SingleOrDefault, predicate.into_iter().collect())
    }
}
