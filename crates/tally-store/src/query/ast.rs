//! Abstract Syntax Tree (AST) for query expressions.

use chrono::Duration;
use serde_json::Value;

/// A parsed query: a predicate bound to one category plus optional clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// The category, taken from the expression's parameter name.
    pub category: String,

    /// Predicate every emitted record must satisfy.
    pub predicate: Predicate,

    /// Label used as the `name` of each result. Defaults to the category.
    pub label: Option<String>,

    /// List-level post-processing step.
    pub step: Option<Step>,

    /// Per-record action.
    pub action: Option<Action>,

    /// The expression text the query was parsed from.
    pub source: String,
}

impl Query {
    /// Returns the name results are reported under.
    pub fn name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.category)
    }
}

/// Post-processing applied to the full list of matching records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Keep only the most recent match and compute when it is next due.
    Every(Duration),

    /// Keep the N most recent matches, newest first.
    Recent(usize),
}

/// Action applied to every emitted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Attach the listed attributes to the result.
    Show(Vec<String>),
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `~` (case-insensitive contains)
    Contains,
}

/// A predicate over a single record.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every record.
    All,

    /// Matches no record.
    Nothing,

    /// Matches when the attribute is present and truthy.
    Truthy(String),

    /// Compares an attribute with a literal.
    Compare {
        /// Attribute name.
        field: String,
        /// Operator.
        op: CmpOp,
        /// Right-hand literal.
        value: Value,
    },

    /// Logical AND of two predicates.
    And(Box<Predicate>, Box<Predicate>),

    /// Logical OR of two predicates.
    Or(Box<Predicate>, Box<Predicate>),

    /// Logical NOT of a predicate.
    Not(Box<Predicate>),
}

impl Predicate {
    /// Creates an AND predicate from two predicates.
    pub fn and(left: Predicate, right: Predicate) -> Self {
        Predicate::And(Box::new(left), Box::new(right))
    }

    /// Creates an OR predicate from two predicates.
    pub fn or(left: Predicate, right: Predicate) -> Self {
        Predicate::Or(Box::new(left), Box::new(right))
    }

    /// Creates a NOT predicate.
    pub fn negate(inner: Predicate) -> Self {
        Predicate::Not(Box::new(inner))
    }

    /// Creates a comparison predicate.
    pub fn compare(field: impl Into<String>, op: CmpOp, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }
}
