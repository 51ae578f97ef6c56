//! Error types for query parsing and evaluation.

use thiserror::Error;

use crate::store::StoreError;

/// A specialized Result type for query parsing.
pub type QueryResult<T> = Result<T, QueryError>;

/// A specialized Result type for query evaluation.
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur while parsing a query expression.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The expression is empty.
    #[error("query expression is empty")]
    EmptyExpression,

    /// The expression does not start with a category parameter.
    #[error("query must start with a category name, e.g. `food => ...`")]
    MissingParameter,

    /// The parameter is not followed by `=>`.
    #[error("expected `=>` after '{param}'")]
    MissingArrow {
        /// The parameter that was read.
        param: String,
    },

    /// An unexpected token was encountered.
    #[error("unexpected token: {token}")]
    UnexpectedToken {
        /// The unexpected token.
        token: String,
    },

    /// The expression ended too early.
    #[error("unexpected end of expression")]
    UnexpectedEndOfInput,

    /// An opening parenthesis was never closed.
    #[error("unclosed parenthesis")]
    UnclosedParenthesis,

    /// A dotted name refers to something other than the parameter.
    #[error("'{name}' is not bound; the parameter is '{param}'")]
    UnboundName {
        /// The unbound prefix.
        name: String,
        /// The expression's parameter.
        param: String,
    },

    /// A duration could not be parsed.
    #[error("invalid duration: {value} (expected e.g. 30m, 12h, 1d, 2w, 1d12h)")]
    InvalidDuration {
        /// The offending text.
        value: String,
    },

    /// A count could not be parsed.
    #[error("invalid count: {value} (expected a positive integer)")]
    InvalidCount {
        /// The offending text.
        value: String,
    },

    /// A clause was given more than once.
    #[error("clause '{clause}' given more than once")]
    DuplicateClause {
        /// The repeated clause keyword.
        clause: String,
    },

    /// Two clauses that cannot be combined.
    #[error("'every' and 'recent' cannot be combined")]
    ConflictingClauses,

    /// A string literal was not closed.
    #[error("unterminated string starting at position {position}")]
    UnterminatedString {
        /// Byte offset of the opening quote.
        position: usize,
    },

    /// A character that cannot start any token.
    #[error("unexpected character '{character}' at position {position}")]
    UnexpectedCharacter {
        /// The character.
        character: char,
        /// Byte offset in the input.
        position: usize,
    },
}

impl QueryError {
    /// Creates an unexpected token error.
    pub fn unexpected_token(token: impl Into<String>) -> Self {
        QueryError::UnexpectedToken {
            token: token.into(),
        }
    }

    /// Creates an invalid duration error.
    pub fn invalid_duration(value: impl Into<String>) -> Self {
        QueryError::InvalidDuration {
            value: value.into(),
        }
    }

    /// Creates an invalid count error.
    pub fn invalid_count(value: impl Into<String>) -> Self {
        QueryError::InvalidCount {
            value: value.into(),
        }
    }

    /// Creates a duplicate clause error.
    pub fn duplicate_clause(clause: impl Into<String>) -> Self {
        QueryError::DuplicateClause {
            clause: clause.into(),
        }
    }
}

/// Errors that can occur while running a query.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The records could not be loaded.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Writing a result failed.
    #[error("failed to write result: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing a result failed.
    #[error("failed to serialize result: {0}")]
    Json(#[from] serde_json::Error),
}
