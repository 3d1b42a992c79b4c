//! Method-chain translation.

mod chain;
mod dispatcher;
pub mod methods;
mod translation;

pub use chain::{MethodCall, QueryExpr, QueryMethod, QueryRoot, Queryable};
pub use dispatcher::QueryTranslator;
pub use translation::{PostProcessing, TranslationResult};
