use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

use crate::params::Argument;

pub mod column;
pub mod query_builder;
pub mod record_processor;

/// Message shown in place of an aggregate when the filtered list is empty
pub const NO_OBJECTS_MESSAGE: &str = "Error: no objects for aggregation";

/// Error type used across the crate
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("file not found")]
    FileNotFound,

    #[error("incorrect file extension")]
    IncorrectExtension,

    #[error("missing header line")]
    MissingHeader,

    #[error("no data rows")]
    NoDataRows,

    #[error("header/data mismatch: {headers} vs {fields}")]
    FieldCount { headers: usize, fields: usize },

    #[error("invalid {column_type} value {value:?} in column \"{column}\" at line {line}")]
    InvalidField {
        line: u64,
        column: String,
        column_type: column::ColumnType,
        value: String,
    },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("column \"{column}\" holds {found:?}, expected a {expected} value")]
    TypeMismatch {
        column: String,
        expected: column::ColumnType,
        found: Value,
    },

    #[error("incorrect format of the \"{0}\" argument")]
    MalformedArgument(Argument),

    #[error("invalid column in the \"{0}\" argument")]
    InvalidColumn(Argument),

    #[error("invalid column type in the \"{0}\" argument")]
    InvalidColumnType(Argument),

    #[error("invalid value in the \"{0}\" argument")]
    InvalidValue(Argument),

    #[error("the \"--order-by\" argument is not accepted together with the \"--aggregate\" argument")]
    MutuallyExclusive,
}

/// A single typed cell of a record
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer column
    Int(i64),
    /// Float column
    Float(f64),
    /// Text column
    Str(String),
}

impl Value {
    /// Natural ordering between two values.
    ///
    /// Integers and floats compare numerically with each other, text compares
    /// lexicographically. Text never orders against a number, and NaN never
    /// orders against anything.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total ordering used for sorting.
    ///
    /// Floats use IEEE total order, so NaN sorts after every other float
    /// (negative NaN before). Pairs that never order fall back to `Equal`.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            _ => self.compare(other).unwrap_or(Ordering::Equal),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            // Debug keeps the trailing ".0" on whole floats
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Str(v) => f.write_str(v),
        }
    }
}

/// Filter predicate
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    Equals(Value),
    GreaterThan(Value),
    LessThan(Value),
}

impl FilterPredicate {
    /// Builds a predicate from its operator symbol (`=`, `<` or `>`)
    pub fn from_operator(operator: &str, value: Value) -> Option<Self> {
        match operator {
            "=" => Some(FilterPredicate::Equals(value)),
            "<" => Some(FilterPredicate::LessThan(value)),
            ">" => Some(FilterPredicate::GreaterThan(value)),
            _ => None,
        }
    }

    pub fn operator(&self) -> &'static str {
        match self {
            FilterPredicate::Equals(_) => "=",
            FilterPredicate::LessThan(_) => "<",
            FilterPredicate::GreaterThan(_) => ">",
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            FilterPredicate::Equals(v)
            | FilterPredicate::LessThan(v)
            | FilterPredicate::GreaterThan(v) => v,
        }
    }

    /// True when `candidate <operator> value` holds
    pub fn matches(&self, candidate: &Value) -> bool {
        let ordering = candidate.compare(self.value());
        match self {
            FilterPredicate::Equals(_) => ordering == Some(Ordering::Equal),
            FilterPredicate::LessThan(_) => ordering == Some(Ordering::Less),
            FilterPredicate::GreaterThan(_) => ordering == Some(Ordering::Greater),
        }
    }
}

/// Aggregate operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateOp {
    /// Average of numeric values
    Avg,
    /// Minimum value
    Min,
    /// Maximum value
    Max,
}

impl AggregateOp {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "avg" => Some(AggregateOp::Avg),
            "min" => Some(AggregateOp::Min),
            "max" => Some(AggregateOp::Max),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateOp::Avg => "avg",
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
        }
    }
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction for order-by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Result of an aggregation
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateResult {
    Int(i64),
    Float(f64),
    /// The aggregated list was empty
    NoObjects,
}

impl fmt::Display for AggregateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateResult::Int(v) => write!(f, "{v}"),
            AggregateResult::Float(v) => write!(f, "{v:?}"),
            AggregateResult::NoObjects => f.write_str(NO_OBJECTS_MESSAGE),
        }
    }
}
