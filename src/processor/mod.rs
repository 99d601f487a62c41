use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use thiserror::Error;

use self::column::ColumnType;

pub mod column;
pub mod dataset;
pub mod describe;
pub mod group;
pub mod normalize;

/// Error type used across the crate
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("no total for key {key:?}")]
    MissingTotal { key: Vec<String> },

    #[error("total for key {key:?} is zero")]
    ZeroTotal { key: Vec<String> },

    #[error("null value in column '{column}' at row {row}")]
    NullValue { column: String, row: usize },

    #[error("column '{column}' cannot be used as {expected}")]
    TypeMismatch { column: String, expected: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Schema/parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Debug, Default)]
pub struct ParseSummary {
    pub rows_processed: usize,
    pub errors: Vec<ParseError>,
}

#[derive(Debug)]
pub struct ParseError {
    /// 1-based line number in the source file
    pub row: usize,
    pub value: String,
}

/// A single cell value, used by predicates, imputation and row views
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Integer column
    Int(i64),
    /// Float column
    Float(f64),
    /// String column
    Str(String),
}

impl Value {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            Value::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Orders two values of compatible kinds; numbers are compared as f64.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Str(_), _) | (_, Value::Str(_)) => None,
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Int(v) => v.hash(state),
            Value::Float(v) => v.to_bits().hash(state),
            Value::Str(v) => v.hash(state),
        }
    }
}

/// Filter predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FilterPredicate {
    Equals(Value),
    NotEquals(Value),
    GreaterThan(Value),
    LessThan(Value),
    /// Inclusive on both ends
    Between(Value, Value),
    OneOf(Vec<Value>),
}

impl FilterPredicate {
    /// Evaluates the predicate against one present value.
    ///
    /// Returns `None` when the predicate's operand cannot be compared with `v`.
    pub fn matches(&self, v: &Value) -> Option<bool> {
        match self {
            FilterPredicate::Equals(t) => Some(v.compare(t)? == Ordering::Equal),
            FilterPredicate::NotEquals(t) => Some(v.compare(t)? != Ordering::Equal),
            FilterPredicate::GreaterThan(t) => Some(v.compare(t)? == Ordering::Greater),
            FilterPredicate::LessThan(t) => Some(v.compare(t)? == Ordering::Less),
            FilterPredicate::Between(lo, hi) => {
                Some(v.compare(lo)? != Ordering::Less && v.compare(hi)? != Ordering::Greater)
            }
            FilterPredicate::OneOf(ts) => {
                let mut hit = false;
                for t in ts {
                    hit |= v.compare(t)? == Ordering::Equal;
                }
                Some(hit)
            }
        }
    }

    fn operands(&self) -> Vec<&Value> {
        match self {
            FilterPredicate::Equals(t)
            | FilterPredicate::NotEquals(t)
            | FilterPredicate::GreaterThan(t)
            | FilterPredicate::LessThan(t) => vec![t],
            FilterPredicate::Between(lo, hi) => vec![lo, hi],
            FilterPredicate::OneOf(ts) => ts.iter().collect(),
        }
    }
}

/// A declarative `column <predicate>` condition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    pub column: String,
    pub predicate: FilterPredicate,
}

impl Condition {
    pub fn new(column: &str, predicate: FilterPredicate) -> Self {
        Condition {
            column: column.to_string(),
            predicate,
        }
    }
}

/// What to do with a null cell in a column a filter or group-by touches
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullPolicy {
    /// Rows with a null in the column are excluded
    #[default]
    Drop,
    /// A null fails the operation
    Error,
    /// A null is read as `numeric` in number columns and `text` in string columns
    Impute { numeric: Value, text: Value },
}

impl NullPolicy {
    /// Imputed value for a column of the given type
    pub fn fill_for(&self, col_type: ColumnType) -> Option<&Value> {
        match self {
            NullPolicy::Impute { numeric, .. } if col_type.is_numeric() => Some(numeric),
            NullPolicy::Impute { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Aggregate operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOp {
    /// Sum of all numeric values
    Sum,
    /// Count of all non-null values
    Count,
    /// Average of numeric values
    Avg,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AggregateOp::Sum => write!(f, "sum"),
            AggregateOp::Count => write!(f, "count"),
            AggregateOp::Avg => write!(f, "avg"),
            AggregateOp::Min => write!(f, "min"),
            AggregateOp::Max => write!(f, "max"),
        }
    }
}

/// Result of an aggregation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AggregateResult {
    Int(i64),
    Float(f64),
}

impl AggregateResult {
    pub fn as_f64(&self) -> f64 {
        match self {
            AggregateResult::Int(v) => *v as f64,
            AggregateResult::Float(v) => *v,
        }
    }

    /// Adds two results, staying integral when both sides are.
    pub fn add(self, other: AggregateResult) -> AggregateResult {
        match (self, other) {
            (AggregateResult::Int(a), AggregateResult::Int(b)) => AggregateResult::Int(a + b),
            (a, b) => AggregateResult::Float(a.as_f64() + b.as_f64()),
        }
    }
}
