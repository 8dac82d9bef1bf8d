//! Parsing of the `--where`, `--aggregate` and `--order-by` expressions into
//! validated parameters.

use log::debug;
use once_cell::sync::Lazy;

use crate::processor::{
    AggregateOp, FilterPredicate, ProcessorError, SortOrder, Value,
    column::{ColumnType, Schema, parse_float},
};

mod grammar;

pub use grammar::{Argument, Clause, Grammar};

/// `-?\d+.?\d+` keeps signed decimals together; otherwise a run of words.
static WHERE_GRAMMAR: Lazy<Grammar> = Lazy::new(|| {
    Grammar::new(Argument::Where, &["=", "<", ">"], r"(?:-?\d+.?\d+)|(?:\w+\s?)+").unwrap()
});

static AGGREGATE_GRAMMAR: Lazy<Grammar> =
    Lazy::new(|| Grammar::new(Argument::Aggregate, &["="], r"\w+").unwrap());

static ORDER_BY_GRAMMAR: Lazy<Grammar> =
    Lazy::new(|| Grammar::new(Argument::OrderBy, &["="], r"\w+").unwrap());

/// Filtering parameter: `column (=|<|>) value`
#[derive(Debug, Clone, PartialEq)]
pub struct WhereParam {
    column: String,
    predicate: FilterPredicate,
}

impl WhereParam {
    pub fn new(column: &str, predicate: FilterPredicate) -> Self {
        WhereParam {
            column: column.to_string(),
            predicate,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn operator(&self) -> &'static str {
        self.predicate.operator()
    }

    pub fn value(&self) -> &Value {
        self.predicate.value()
    }

    pub fn predicate(&self) -> &FilterPredicate {
        &self.predicate
    }
}

/// Aggregation parameter: `column=avg|min|max` over a numeric column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateParam {
    column: String,
    op: AggregateOp,
}

impl AggregateParam {
    pub fn new(column: &str, op: AggregateOp) -> Self {
        AggregateParam {
            column: column.to_string(),
            op,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn operator(&self) -> &'static str {
        "="
    }

    pub fn op(&self) -> AggregateOp {
        self.op
    }
}

/// Sorting parameter: `column=asc|desc`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByParam {
    column: String,
    order: SortOrder,
}

impl OrderByParam {
    pub fn new(column: &str, order: SortOrder) -> Self {
        OrderByParam {
            column: column.to_string(),
            order,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn operator(&self) -> &'static str {
        "="
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }
}

/// Parses the `--where` argument.
///
/// The value is converted to the column's type: integer columns accept any
/// float and truncate it (`30.9` becomes `30`), float columns parse as
/// float, text columns keep the value verbatim.
pub fn parse_where(schema: &Schema, raw: Option<&str>) -> Result<Option<WhereParam>, ProcessorError> {
    let param = WHERE_GRAMMAR.parse_param(schema, raw, |clause, column_type| {
        let invalid = || ProcessorError::InvalidValue(Argument::Where);

        let value = match column_type {
            ColumnType::Int64 => parse_float(clause.value)
                .filter(|v| v.is_finite())
                .map(|v| Value::Int(v.trunc() as i64))
                .ok_or_else(invalid)?,
            ColumnType::Float64 => parse_float(clause.value)
                .map(Value::Float)
                .ok_or_else(invalid)?,
            ColumnType::Str => Value::Str(clause.value.to_string()),
        };

        let predicate = FilterPredicate::from_operator(clause.operator, value)
            .ok_or(ProcessorError::MalformedArgument(Argument::Where))?;

        Ok(WhereParam::new(clause.column, predicate))
    })?;

    if let Some(p) = &param {
        debug!("where: {:?}", p);
    }
    Ok(param)
}

/// Parses the `--aggregate` argument; text columns are rejected.
pub fn parse_aggregate(
    schema: &Schema,
    raw: Option<&str>,
) -> Result<Option<AggregateParam>, ProcessorError> {
    AGGREGATE_GRAMMAR.parse_param(schema, raw, |clause, column_type| {
        if !column_type.is_numeric() {
            return Err(ProcessorError::InvalidColumnType(Argument::Aggregate));
        }

        let op = AggregateOp::parse(clause.value)
            .ok_or(ProcessorError::InvalidValue(Argument::Aggregate))?;

        Ok(AggregateParam::new(clause.column, op))
    })
}

/// Parses the `--order-by` argument.
pub fn parse_order_by(
    schema: &Schema,
    raw: Option<&str>,
) -> Result<Option<OrderByParam>, ProcessorError> {
    ORDER_BY_GRAMMAR.parse_param(schema, raw, |clause, _| {
        let order = SortOrder::parse(clause.value)
            .ok_or(ProcessorError::InvalidValue(Argument::OrderBy))?;

        Ok(OrderByParam::new(clause.column, order))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::infer(["name", "year", "age"], ["alex", "1985", "40.5"]).unwrap()
    }

    fn where_param(raw: &str) -> Result<Option<WhereParam>, ProcessorError> {
        parse_where(&schema(), Some(raw))
    }

    #[test]
    fn test_parse_where() {
        let cases = [
            ("name=alex", WhereParam::new("name", FilterPredicate::Equals(Value::Str("alex".into())))),
            ("year<10", WhereParam::new("year", FilterPredicate::LessThan(Value::Int(10)))),
            ("age>30.1", WhereParam::new("age", FilterPredicate::GreaterThan(Value::Float(30.1)))),
            ("year>30.9", WhereParam::new("year", FilterPredicate::GreaterThan(Value::Int(30)))),
            (
                "name=galaxy z flip 5",
                WhereParam::new("name", FilterPredicate::Equals(Value::Str("galaxy z flip 5".into()))),
            ),
        ];

        for (raw, expected) in cases {
            assert_eq!(where_param(raw).unwrap(), Some(expected), "{raw}");
        }
        assert_eq!(parse_where(&schema(), None).unwrap(), None);
    }

    #[test]
    fn test_long_column_and_value() {
        let schema = Schema::infer(["name lastname middlename"], ["john"]).unwrap();
        let param = parse_where(&schema, Some("name lastname middlename=john carter bob"))
            .unwrap()
            .unwrap();

        assert_eq!(param.column(), "name lastname middlename");
        assert_eq!(param.operator(), "=");
        assert_eq!(param.value(), &Value::Str("john carter bob".into()));
    }

    #[test]
    fn test_negative_decimal_value() {
        let param = where_param("age>-2.5").unwrap().unwrap();
        assert_eq!(param.value(), &Value::Float(-2.5));
    }

    #[test]
    fn test_where_errors() {
        for raw in ["namealex", "name==alex", "name<=alex", "=alex", "name="] {
            assert!(
                matches!(where_param(raw), Err(ProcessorError::MalformedArgument(Argument::Where))),
                "{raw}"
            );
        }
        assert!(matches!(
            where_param("height=180"),
            Err(ProcessorError::InvalidColumn(Argument::Where))
        ));
        for raw in ["year=no_int", "age=no_float"] {
            assert!(
                matches!(where_param(raw), Err(ProcessorError::InvalidValue(Argument::Where))),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_where_error_messages() {
        let err = where_param("namealex").unwrap_err();
        assert_eq!(err.to_string(), "incorrect format of the \"--where\" argument");
        let err = where_param("height=180").unwrap_err();
        assert_eq!(err.to_string(), "invalid column in the \"--where\" argument");
    }

    #[test]
    fn test_parse_aggregate() {
        let param = parse_aggregate(&schema(), Some("year=avg")).unwrap().unwrap();
        assert_eq!(param, AggregateParam::new("year", AggregateOp::Avg));
        assert_eq!(param.operator(), "=");

        let param = parse_aggregate(&schema(), Some("age=max")).unwrap().unwrap();
        assert_eq!(param, AggregateParam::new("age", AggregateOp::Max));

        assert_eq!(parse_aggregate(&schema(), None).unwrap(), None);
    }

    #[test]
    fn test_aggregate_errors() {
        let parse = |raw| parse_aggregate(&schema(), Some(raw));

        for raw in ["yearavg", "year==avg", "year<=avg", "=avg", "year="] {
            assert!(
                matches!(parse(raw), Err(ProcessorError::MalformedArgument(Argument::Aggregate))),
                "{raw}"
            );
        }
        assert!(matches!(
            parse("height=avg"),
            Err(ProcessorError::InvalidColumn(Argument::Aggregate))
        ));
        assert!(matches!(
            parse("name=avg"),
            Err(ProcessorError::InvalidColumnType(Argument::Aggregate))
        ));
        assert!(matches!(
            parse("year=fff"),
            Err(ProcessorError::InvalidValue(Argument::Aggregate))
        ));
    }

    #[test]
    fn test_parse_order_by() {
        let param = parse_order_by(&schema(), Some("name=asc")).unwrap().unwrap();
        assert_eq!(param, OrderByParam::new("name", SortOrder::Asc));
        assert_eq!(parse_order_by(&schema(), None).unwrap(), None);
    }

    #[test]
    fn test_order_by_errors() {
        let parse = |raw| parse_order_by(&schema(), Some(raw));

        for raw in ["nameasc", "name==asc", "name<=asc", "=asc", "name="] {
            assert!(
                matches!(parse(raw), Err(ProcessorError::MalformedArgument(Argument::OrderBy))),
                "{raw}"
            );
        }
        assert!(matches!(
            parse("height=asc"),
            Err(ProcessorError::InvalidColumn(Argument::OrderBy))
        ));
        let err = parse("name=fff").unwrap_err();
        assert_eq!(err.to_string(), "invalid value in the \"--order-by\" argument");
    }
}
