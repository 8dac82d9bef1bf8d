use std::fmt;

use crate::processor::ProcessorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Int64,
    Float64,
    Str,
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ColumnType::Int64 => "integer",
            ColumnType::Float64 => "float",
            ColumnType::Str => "text",
        })
    }
}

impl ColumnType {
    /// Classifies one raw field.
    ///
    /// Only unsigned digit runs are integers; signed, decimal and exponent
    /// forms fall through to the float parser, and anything else is text.
    pub fn infer(field: &str) -> Self {
        if !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit()) {
            ColumnType::Int64
        } else if parse_float(field).is_some() {
            ColumnType::Float64
        } else {
            ColumnType::Str
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Int64 | ColumnType::Float64)
    }
}

/// Float parsing shared by inference, loading and parameter validation
pub(crate) fn parse_float(field: &str) -> Option<f64> {
    fast_float::parse::<f64, _>(field.trim()).ok()
}

/// Ordered column name to type map
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    columns: Vec<(String, ColumnType)>,
}

impl Schema {
    /// Infers the schema from the header and the first data row only.
    ///
    /// A column that looks like text in the sample stays text for the whole
    /// dataset, whatever later rows hold.
    pub fn infer<'a, H, S>(headers: H, sample: S) -> Result<Self, ProcessorError>
    where
        H: IntoIterator<Item = &'a str>,
        S: IntoIterator<Item = &'a str>,
    {
        let headers: Vec<&str> = headers.into_iter().collect();
        let fields: Vec<&str> = sample.into_iter().collect();

        if fields.len() != headers.len() {
            return Err(ProcessorError::FieldCount {
                headers: headers.len(),
                fields: fields.len(),
            });
        }

        let columns = headers
            .into_iter()
            .zip(fields)
            .map(|(name, field)| (name.to_string(), ColumnType::infer(field)))
            .collect();

        Ok(Schema { columns })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ColumnType)> + '_ {
        self.columns.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|(cn, _)| cn == name)
            .map(|(_, ty)| *ty)
    }

    /// Position and type of a column
    pub fn get_col(&self, name: &str) -> Result<(usize, ColumnType), ProcessorError> {
        self.columns
            .iter()
            .position(|(cn, _)| cn == name)
            .map(|idx| (idx, self.columns[idx].1))
            .ok_or_else(|| ProcessorError::MissingColumn(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_sample_row() {
        let schema = Schema::infer(
            ["name", "year", "age", "website"],
            ["alex", "1985", "40.5", "55.com"],
        )
        .unwrap();

        assert_eq!(schema.column_type("name"), Some(ColumnType::Str));
        assert_eq!(schema.column_type("year"), Some(ColumnType::Int64));
        assert_eq!(schema.column_type("age"), Some(ColumnType::Float64));
        assert_eq!(schema.column_type("website"), Some(ColumnType::Str));
        assert_eq!(schema.headers(), vec!["name", "year", "age", "website"]);
        assert_eq!(schema.column_count(), 4);
    }

    #[test]
    fn test_signed_and_exponent_forms_are_float() {
        assert_eq!(ColumnType::infer("-12"), ColumnType::Float64);
        assert_eq!(ColumnType::infer("1e3"), ColumnType::Float64);
        assert_eq!(ColumnType::infer("007"), ColumnType::Int64);
        assert_eq!(ColumnType::infer(""), ColumnType::Str);
        assert_eq!(ColumnType::infer("12 apples"), ColumnType::Str);
    }

    #[test]
    fn test_field_count_mismatch() {
        let err = Schema::infer(["a", "b"], ["1"]).unwrap_err();
        assert!(matches!(
            err,
            ProcessorError::FieldCount {
                headers: 2,
                fields: 1
            }
        ));
    }

    #[test]
    fn test_get_col() {
        let schema = Schema::infer(["name", "year"], ["alex", "1985"]).unwrap();
        assert_eq!(schema.get_col("year").unwrap(), (1, ColumnType::Int64));
        assert!(matches!(
            schema.get_col("height"),
            Err(ProcessorError::MissingColumn(c)) if c == "height"
        ));
    }
}
