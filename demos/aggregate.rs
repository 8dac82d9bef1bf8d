use csv_query::{RecordProcessor, parse_aggregate};

use crate::utils::sample_csv_path;
mod utils;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = sample_csv_path();
    let processor = RecordProcessor::load_csv(path.as_path())?;
    let schema = processor.schema();

    for expr in ["year=min", "year=max", "age=avg"] {
        let result = processor
            .query()
            .aggregate(parse_aggregate(schema, Some(expr))?)
            .execute()?;
        println!("{expr}: {:?}", result.body());
    }

    Ok(())
}
