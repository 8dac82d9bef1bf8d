//! # csv-query
//!
//! `csv-query` loads a CSV file into memory, infers a type for every column
//! and runs one small query over the records:
//!
//! - Memory-mapped CSV loading (the map lives only for the load)
//! - Schema inference from the first data row (integer, float, text)
//! - Free-text `--where`, `--aggregate` and `--order-by` expressions parsed
//!   into typed parameters
//! - Filtering with `=`, `<`, `>`
//! - Aggregation: average, min, max
//! - Stable ascending / descending ordering
//!
//! # Example
//!
//! ```rust,no_run
//! use csv_query::{RecordProcessor, parse_aggregate, parse_where, render_table};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let processor = RecordProcessor::load_csv(Path::new("data.csv"))?;
//!     let schema = processor.schema();
//!
//!     let result = processor
//!         .query()
//!         .filter(parse_where(schema, Some("age>30"))?)
//!         .aggregate(parse_aggregate(schema, Some("year=avg"))?)
//!         .execute()?;
//!
//!     println!("{}", render_table(&result));
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod helpers;
pub mod params;
pub mod processor;

pub use helpers::{discovery::find_csv_file, table::render_table};
pub use params::{
    AggregateParam, Argument, OrderByParam, WhereParam, parse_aggregate, parse_order_by,
    parse_where,
};
pub use processor::{
    AggregateOp, AggregateResult, FilterPredicate, ProcessorError, SortOrder, Value,
    column::{ColumnType, Schema},
    query_builder::{QueryBuilder, QueryResult},
    record_processor::{Record, RecordProcessor},
};
