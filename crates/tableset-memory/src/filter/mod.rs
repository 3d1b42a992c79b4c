//! The table filter grammar: parsing and evaluation over property bags.

mod ast;
mod evaluator;
mod parser;

pub use ast::Filter;
pub use parser::{FilterError, parse_filter};
