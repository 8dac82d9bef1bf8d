use log::{debug, info};
use memchr::memchr_iter;
use memmap2::Mmap;
use std::{cmp::Ordering, fs::File, path::Path};

use crate::{
    params::{AggregateParam, OrderByParam, WhereParam},
    processor::{
        AggregateOp, AggregateResult, ProcessorError, SortOrder, Value,
        column::{ColumnType, Schema, parse_float},
    },
};

/// One row of the dataset, positionally aligned with the [`Schema`]
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Record { values }
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// In-memory typed records loaded from one CSV file
///
/// # Examples
///
/// ```rust,no_run
/// # use csv_query::RecordProcessor;
/// let processor = RecordProcessor::load_csv("data.csv".as_ref()).unwrap();
/// println!("{} rows", processor.row_count());
/// ```
#[derive(Debug, Default)]
pub struct RecordProcessor {
    schema: Schema,
    records: Vec<Record>,
}

impl RecordProcessor {
    /// Loads a CSV file through a memory map.
    ///
    /// Column types come from the first data row (Int, Float, Str). The map
    /// and the file handle are released before this returns.
    ///
    /// # Errors
    /// Returns a [`ProcessorError`] if:
    /// - the file cannot be opened or mapped
    /// - the header or the first data row is missing
    /// - a row has a different field count than the header
    /// - a numeric field does not convert to its column's type
    pub fn load_csv(path: &Path) -> Result<Self, ProcessorError> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(ProcessorError::MissingHeader);
        }

        // SAFETY: the map is read-only and dropped before returning
        let mmap = unsafe { Mmap::map(&file)? };
        let processor = Self::from_bytes(&mmap[..])?;

        info!(
            "loaded {} rows x {} columns from {}",
            processor.row_count(),
            processor.schema.column_count(),
            path.display()
        );
        Ok(processor)
    }

    /// Parses CSV bytes: header line, one sample row for the schema, then
    /// every row converted to the sampled types.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, ProcessorError> {
        let estimated_rows = memchr_iter(b'\n', buf).count();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(buf);

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(ProcessorError::MissingHeader);
        }

        let mut rows = reader.records();
        let first = rows.next().ok_or(ProcessorError::NoDataRows)??;
        let schema = Schema::infer(headers.iter(), first.iter())?;
        debug!("inferred schema: {:?}", schema);

        let mut records = Vec::with_capacity(estimated_rows);
        records.push(Self::parse_row(&schema, &first)?);
        for row in rows {
            records.push(Self::parse_row(&schema, &row?)?);
        }

        Ok(RecordProcessor { schema, records })
    }

    fn parse_row(schema: &Schema, row: &csv::StringRecord) -> Result<Record, ProcessorError> {
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let values = schema
            .iter()
            .zip(row.iter())
            .map(|((column, column_type), field)| {
                let invalid = || ProcessorError::InvalidField {
                    line,
                    column: column.to_string(),
                    column_type,
                    value: field.to_string(),
                };

                match column_type {
                    ColumnType::Int64 => parse_int(field).map(Value::Int).ok_or_else(invalid),
                    ColumnType::Float64 => parse_float(field).map(Value::Float).ok_or_else(invalid),
                    ColumnType::Str => Ok(Value::Str(field.to_string())),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Record { values })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Every record, by reference, in file order
    pub fn rows(&self) -> Vec<&Record> {
        self.records.iter().collect()
    }

    /// Keeps the rows where `row[column] <operator> value` holds.
    ///
    /// The result borrows the same records as `rows`, in the same order.
    pub fn filter<'a>(
        &self,
        rows: &[&'a Record],
        param: &WhereParam,
    ) -> Result<Vec<&'a Record>, ProcessorError> {
        let (idx, _) = self.schema.get_col(param.column())?;
        let predicate = param.predicate();

        let out: Vec<&Record> = rows
            .iter()
            .copied()
            .filter(|row| row.get(idx).is_some_and(|v| predicate.matches(v)))
            .collect();

        debug!(
            "where {}{}{} kept {} of {} rows",
            param.column(),
            predicate.operator(),
            predicate.value(),
            out.len(),
            rows.len()
        );
        Ok(out)
    }

    /// Reduces `rows` to a single avg / min / max over a numeric column.
    ///
    /// An empty `rows` yields [`AggregateResult::NoObjects`] instead of an
    /// error.
    pub fn aggregate(
        &self,
        rows: &[&Record],
        param: &AggregateParam,
    ) -> Result<AggregateResult, ProcessorError> {
        let (idx, column_type) = self.schema.get_col(param.column())?;

        if rows.is_empty() {
            return Ok(AggregateResult::NoObjects);
        }

        match column_type {
            ColumnType::Int64 => {
                let values = rows
                    .iter()
                    .map(|row| match row.get(idx) {
                        Some(Value::Int(v)) => Ok(*v),
                        other => Err(self.mismatch(param.column(), column_type, other)),
                    })
                    .collect::<Result<Vec<i64>, _>>()?;
                Ok(aggregate_int_values(&values, param.op()))
            }
            ColumnType::Float64 => {
                let values = rows
                    .iter()
                    .map(|row| match row.get(idx) {
                        Some(Value::Float(v)) => Ok(*v),
                        other => Err(self.mismatch(param.column(), column_type, other)),
                    })
                    .collect::<Result<Vec<f64>, _>>()?;
                Ok(aggregate_float_values(&values, param.op()))
            }
            ColumnType::Str => Err(ProcessorError::InvalidColumnType(
                crate::params::Argument::Aggregate,
            )),
        }
    }

    /// Stable sort of `rows` by one column; equal keys keep their input
    /// order in both directions.
    pub fn order_by<'a>(
        &self,
        rows: &[&'a Record],
        param: &OrderByParam,
    ) -> Result<Vec<&'a Record>, ProcessorError> {
        let (idx, _) = self.schema.get_col(param.column())?;

        debug!("order by {} {}", param.column(), param.order().as_str());

        let mut sorted = rows.to_vec();
        sorted.sort_by(|a, b| {
            let ord = match (a.get(idx), b.get(idx)) {
                (Some(x), Some(y)) => x.sort_cmp(y),
                _ => Ordering::Equal,
            };
            match param.order() {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        Ok(sorted)
    }

    fn mismatch(&self, column: &str, expected: ColumnType, found: Option<&Value>) -> ProcessorError {
        match found {
            Some(value) => ProcessorError::TypeMismatch {
                column: column.to_string(),
                expected,
                found: value.clone(),
            },
            None => ProcessorError::MissingColumn(column.to_string()),
        }
    }
}

/// Integer field parser; one leading `+` is accepted, a sign after it is not
fn parse_int(field: &str) -> Option<i64> {
    let field = field.trim();
    let digits = field.strip_prefix('+').unwrap_or(field);
    if digits.starts_with(['+', '-']) && digits.len() != field.len() {
        return None;
    }
    atoi_simd::parse::<i64>(digits.as_bytes()).ok()
}

/// Helper to aggregate integer values; averages come back as floats
fn aggregate_int_values(values: &[i64], op: AggregateOp) -> AggregateResult {
    match op {
        AggregateOp::Avg => {
            let total: i128 = values.iter().map(|&v| v as i128).sum();
            AggregateResult::Float(average(total as f64, values.len()))
        }
        AggregateOp::Min => {
            AggregateResult::Int(values.iter().fold(i64::MAX, |a, &b| if b < a { b } else { a }))
        }
        AggregateOp::Max => {
            AggregateResult::Int(values.iter().fold(i64::MIN, |a, &b| if b > a { b } else { a }))
        }
    }
}

/// Helper to aggregate float values
fn aggregate_float_values(values: &[f64], op: AggregateOp) -> AggregateResult {
    match op {
        AggregateOp::Avg => {
            let total: f64 = values.iter().sum();
            AggregateResult::Float(average(total, values.len()))
        }
        AggregateOp::Min => AggregateResult::Float(
            values
                .iter()
                .fold(f64::INFINITY, |a, &b| if b < a { b } else { a }),
        ),
        AggregateOp::Max => AggregateResult::Float(
            values
                .iter()
                .fold(f64::NEG_INFINITY, |a, &b| if b > a { b } else { a }),
        ),
    }
}

/// total / count, or zero when there is nothing to divide by
fn average(total: f64, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    total / count as f64
}
