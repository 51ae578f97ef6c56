//! Query expressions over tracked records.
//!
//! A query is a predicate over one record, bound to a category through its
//! parameter name, plus optional clauses that post-process the matches.
//!
//! # Syntax
//!
//! ```text
//! food => food.food ~ "vitamin" & quantity >= 1 every 1d as vitamins
//! ^^^^    ^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^^ ^^^^^^^^ ^^^^^^^^^^^
//! param   predicate                             step     label
//! ```
//!
//! ## Predicates
//! - `field` - attribute is present and truthy
//! - `field == value`, `!=`, `<`, `<=`, `>`, `>=` - comparisons
//! - `field ~ "text"` - case-insensitive substring (or array element) match
//! - `param.field` / `param.a.b` - explicit or nested attribute access
//! - `&`, `|`, `!`, `()` - boolean operators and grouping
//! - `true` / `false` - constants; an empty predicate matches everything
//!
//! ## Clauses
//! - `every 1d12h` - keep the latest match and report when it is next due
//! - `recent 5` - keep the five most recent matches
//! - `as name` - report results under another name
//! - `show a, b` - attach the listed attributes to each result
//!
//! # Example
//!
//! ```
//! use tally_store::query::{QueryParser, Predicate};
//!
//! let query = QueryParser::parse("weight =>").unwrap();
//! assert_eq!(query.category, "weight");
//! assert_eq!(query.predicate, Predicate::All);
//! ```

mod ast;
mod error;
mod evaluator;
mod lexer;
mod parser;

pub use ast::{Action, CmpOp, Predicate, Query, Step};
pub use error::{EvalError, EvalResult, QueryError, QueryResult};
pub use evaluator::{QueryEvaluator, QueryOutput};
pub use parser::{parse_duration, QueryParser};

#[cfg(test)]
mod tests;
