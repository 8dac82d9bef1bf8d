use regex::Regex;
use std::fmt;

use crate::processor::{ProcessorError, column::ColumnType, column::Schema};

/// Command-line argument a parameter was parsed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Argument {
    Where,
    Aggregate,
    OrderBy,
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Argument::Where => "--where",
            Argument::Aggregate => "--aggregate",
            Argument::OrderBy => "--order-by",
        })
    }
}

/// The three raw pieces of a `<column><operator><value>` expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clause<'a> {
    pub column: &'a str,
    pub operator: &'a str,
    pub value: &'a str,
}

/// A labeled-operator-value grammar.
///
/// Column names are words separated by single spaces and run greedily up to
/// the operator. The pattern is searched, not anchored, so text around a
/// well-formed clause is ignored.
#[derive(Debug)]
pub struct Grammar {
    argument: Argument,
    pattern: Regex,
}

impl Grammar {
    pub fn new(
        argument: Argument,
        operators: &[&str],
        value_pattern: &str,
    ) -> Result<Self, regex::Error> {
        let operators = operators
            .iter()
            .map(|op| regex::escape(op))
            .collect::<Vec<_>>()
            .join("|");

        let pattern = Regex::new(&format!(
            r"(?P<column>(?:\w+\s?)+)(?P<operator>{operators})(?P<value>{value_pattern})"
        ))?;

        Ok(Grammar { argument, pattern })
    }

    pub fn parse<'a>(&self, raw: &'a str) -> Result<Clause<'a>, ProcessorError> {
        let caps = self
            .pattern
            .captures(raw)
            .ok_or(ProcessorError::MalformedArgument(self.argument))?;

        match (caps.name("column"), caps.name("operator"), caps.name("value")) {
            (Some(column), Some(operator), Some(value)) => Ok(Clause {
                column: column.as_str(),
                operator: operator.as_str(),
                value: value.as_str(),
            }),
            _ => Err(ProcessorError::MalformedArgument(self.argument)),
        }
    }

    /// Parses an optional argument and hands the clause with its column's
    /// type to `validate`.
    ///
    /// An absent argument is `Ok(None)`; an unknown column fails before
    /// `validate` runs.
    pub fn parse_param<T, F>(
        &self,
        schema: &Schema,
        raw: Option<&str>,
        validate: F,
    ) -> Result<Option<T>, ProcessorError>
    where
        F: FnOnce(Clause<'_>, ColumnType) -> Result<T, ProcessorError>,
    {
        let Some(raw) = raw else {
            return Ok(None);
        };

        let clause = self.parse(raw)?;
        let column_type = schema
            .column_type(clause.column)
            .ok_or(ProcessorError::InvalidColumn(self.argument))?;

        validate(clause, column_type).map(Some)
    }
}
