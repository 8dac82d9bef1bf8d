use crate::utils::sample_csv_path;
use csv_query::{QueryResult, RecordProcessor, parse_order_by, parse_where};
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = sample_csv_path();
    let processor = RecordProcessor::load_csv(path.as_path())?;
    let schema = processor.schema();

    // Rows where 'city' is Berlin, youngest first
    let result = processor
        .query()
        .filter(parse_where(schema, Some("city=Berlin"))?)
        .order_by(parse_order_by(schema, Some("age=asc"))?)
        .execute()?;

    if let QueryResult::Select { rows, .. } = &result {
        println!("{} rows in Berlin", rows.len());
    }
    println!("{}", csv_query::render_table(&result));
    Ok(())
}
