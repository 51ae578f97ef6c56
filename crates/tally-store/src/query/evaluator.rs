//! Query evaluation against cached records.
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use serde_json::json;
//! use tally_store::query::{QueryEvaluator, QueryParser};
//! use tally_store::Record;
//!
//! let query = QueryParser::parse("food => food ~ 'apple' every 1d").unwrap();
//! let records = vec![
//!     Record::from_value("food", json!({"food": "Apple pie", "when": 1_700_000_000}), None).unwrap(),
//! ];
//!
//! let results = QueryEvaluator::new(&query, Utc::now()).evaluate(&records);
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].next_epoch, Some(1_700_086_400));
//! assert!(results[0].expired);
//! ```

use std::cmp::Ordering;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::ast::{Action, CmpOp, Predicate, Query, Step};
use super::error::EvalResult;
use crate::cache::RecordCache;
use crate::store::RecordSource;
use crate::Record;

/// One result line emitted by a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOutput {
    /// The query label, or its category.
    pub name: String,

    /// When the record happened, in Unix seconds.
    pub epoch: i64,

    /// When the record is next due, in Unix seconds.
    #[serde(default)]
    pub next_epoch: Option<i64>,

    /// True if `next_epoch` has passed.
    #[serde(default)]
    pub expired: bool,

    /// Record attributes attached to the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

/// Evaluates a parsed query against records.
#[derive(Debug)]
pub struct QueryEvaluator<'a> {
    query: &'a Query,
    now: DateTime<Utc>,
}

impl<'a> QueryEvaluator<'a> {
    /// Creates a new evaluator. `now` decides which records are in the future
    /// and whether results have expired.
    pub fn new(query: &'a Query, now: DateTime<Utc>) -> Self {
        Self { query, now }
    }

    /// Returns true if the record satisfies the query's predicate.
    pub fn matches(&self, record: &Record) -> bool {
        evaluate_predicate(&self.query.predicate, record)
    }

    /// Applies the predicate, the post-processing step and the action.
    ///
    /// Records dated after `now` are ignored.
    pub fn evaluate(&self, records: &[Record]) -> Vec<QueryOutput> {
        let mut matched: Vec<&Record> = records
            .iter()
            .filter(|r| r.timestamp <= self.now && self.matches(r))
            .collect();
        matched.sort_by_key(|r| r.timestamp);

        match &self.query.step {
            None => matched.into_iter().map(|r| self.output(r, None)).collect(),
            Some(Step::Recent(count)) => matched
                .into_iter()
                .rev()
                .take(*count)
                .map(|r| self.output(r, None))
                .collect(),
            Some(Step::Every(interval)) => matched
                .last()
                .map(|r| {
                    let next = (r.epoch() + interval.num_seconds()).max(0);
                    self.output(r, Some(next))
                })
                .into_iter()
                .collect(),
        }
    }

    fn output(&self, record: &Record, next_epoch: Option<i64>) -> QueryOutput {
        let data = match &self.query.action {
            Some(Action::Show(fields)) => Some(
                fields
                    .iter()
                    .map(|f| (f.clone(), lookup(record, f).cloned().unwrap_or(Value::Null)))
                    .collect(),
            ),
            None if next_epoch.is_some() => None,
            None => Some(record.fields.clone()),
        };

        QueryOutput {
            name: self.query.name().to_string(),
            epoch: record.epoch(),
            next_epoch,
            expired: next_epoch.is_some_and(|next| self.now.timestamp() >= next),
            data,
        }
    }
}

impl Query {
    /// Evaluates the query against a slice of records.
    pub fn evaluate(&self, records: &[Record], now: DateTime<Utc>) -> Vec<QueryOutput> {
        QueryEvaluator::new(self, now).evaluate(records)
    }

    /// Runs the query against the cache and writes one JSON object per line.
    ///
    /// Returns the number of lines written. A query with no matching records
    /// writes nothing.
    ///
    /// # Errors
    ///
    /// Fails if the category cannot be loaded or the output cannot be written.
    pub fn run<S: RecordSource, W: Write>(
        &self,
        cache: &mut RecordCache<S>,
        now: DateTime<Utc>,
        out: &mut W,
    ) -> EvalResult<usize> {
        let records = cache.get(&self.category)?;
        let outputs = self.evaluate(records, now);

        for output in &outputs {
            serde_json::to_writer(&mut *out, output)?;
            writeln!(out)?;
        }

        debug!(
            query = %self.source,
            records = records.len(),
            results = outputs.len(),
            "ran query"
        );
        Ok(outputs.len())
    }
}

/// Looks up an attribute, following dotted paths into nested objects.
fn lookup<'r>(record: &'r Record, field: &str) -> Option<&'r Value> {
    if let Some(value) = record.get(field) {
        return Some(value);
    }

    let mut segments = field.split('.');
    let first = record.get(segments.next()?)?;
    segments.try_fold(first, |value, segment| value.get(segment))
}

fn evaluate_predicate(predicate: &Predicate, record: &Record) -> bool {
    match predicate {
        Predicate::All => true,
        Predicate::Nothing => false,
        Predicate::Truthy(field) => lookup(record, field).is_some_and(is_truthy),
        Predicate::Compare { field, op, value } => compare(lookup(record, field), *op, value),
        Predicate::And(left, right) => {
            evaluate_predicate(left, record) && evaluate_predicate(right, record)
        }
        Predicate::Or(left, right) => {
            evaluate_predicate(left, record) || evaluate_predicate(right, record)
        }
        Predicate::Not(inner) => !evaluate_predicate(inner, record),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Equality that treats `1` and `1.0` as the same number.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Orders two values of the same kind; mixed kinds are unordered.
fn values_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn contains(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::String(haystack), Value::String(needle)) => haystack
            .to_lowercase()
            .contains(&needle.to_lowercase()),
        (Value::Array(items), Value::String(needle)) => items.iter().any(|item| match item {
            Value::String(s) => s.to_lowercase() == needle.to_lowercase(),
            _ => false,
        }),
        (Value::Array(items), _) => items.iter().any(|item| values_equal(item, expected)),
        _ => false,
    }
}

/// True if two values are the same JSON kind.
fn same_kind(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

/// Compares a field against a literal.
///
/// A missing field reads as `null`. Values of different kinds never match,
/// under `!=` as well as `==`, except that `!= null` matches any present
/// non-null value.
fn compare(actual: Option<&Value>, op: CmpOp, expected: &Value) -> bool {
    let actual = actual.unwrap_or(&Value::Null);

    match op {
        CmpOp::Eq => values_equal(actual, expected),
        CmpOp::Ne => {
            (expected.is_null() || same_kind(actual, expected))
                && !values_equal(actual, expected)
        }
        CmpOp::Lt => values_cmp(actual, expected) == Some(Ordering::Less),
        CmpOp::Le => matches!(
            values_cmp(actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        CmpOp::Gt => values_cmp(actual, expected) == Some(Ordering::Greater),
        CmpOp::Ge => matches!(
            values_cmp(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        CmpOp::Contains => contains(actual, expected),
    }
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
