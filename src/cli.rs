use clap::Parser;
use log::info;
use std::{io::Write, path::PathBuf};

use crate::{
    helpers::{discovery::find_csv_file, table::render_table},
    params::{parse_aggregate, parse_order_by, parse_where},
    processor::{ProcessorError, record_processor::RecordProcessor},
};

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "csv-query",
    version,
    about = "Filter, aggregate or sort a CSV file and print the result as a table",
    after_help = "Examples:\n  \
      csv-query -f people.csv --where \"age>30\"           # Filter rows\n  \
      csv-query -f people.csv --aggregate \"year=avg\"     # avg, min or max\n  \
      csv-query --order-by \"name=desc\"                   # Uses the first .csv in the current dir\n\n\
      Set RUST_LOG=debug to trace loading and query steps."
)]
pub struct Cli {
    /// Path to the CSV file; defaults to the first .csv file in the current directory
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Filtering parameter in the "column=value" format (operators: = < >)
    #[arg(short, long = "where", value_name = "EXPR", allow_hyphen_values = true)]
    pub where_clause: Option<String>,

    /// Aggregation parameter in the "column=avg|min|max" format
    #[arg(short, long, value_name = "EXPR")]
    pub aggregate: Option<String>,

    /// Sorting parameter in the "column=asc|desc" format
    #[arg(short, long, value_name = "EXPR")]
    pub order_by: Option<String>,
}

/// Runs one query end to end and writes the table to `out`.
///
/// Every failure comes back as a [`ProcessorError`]; nothing is written to
/// `out` in that case.
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<(), ProcessorError> {
    let cwd = std::env::current_dir()?;
    let path = find_csv_file(cli.file.as_deref(), &cwd)?;

    let processor = RecordProcessor::load_csv(&path)?;
    let schema = processor.schema();

    let where_param = parse_where(schema, cli.where_clause.as_deref())?;
    let aggregate_param = parse_aggregate(schema, cli.aggregate.as_deref())?;
    let order_by_param = parse_order_by(schema, cli.order_by.as_deref())?;

    let result = processor
        .query()
        .filter(where_param)
        .aggregate(aggregate_param)
        .order_by(order_by_param)
        .execute()?;

    info!("rendering {} rows", result.body().len());
    writeln!(out, "{}", render_table(&result))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn csv_file() -> NamedTempFile {
        let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(tmp, "name,year,age\nmark,1990,35.0\nalex,1985,40.5\ncole,2000,25.0\n").unwrap();
        tmp
    }

    fn run_to_string(cli: &Cli) -> Result<String, ProcessorError> {
        let mut out = Vec::new();
        run(cli, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "csv-query",
            "-f",
            "data.csv",
            "-w",
            "age>-1.5",
            "--order-by",
            "name=asc",
        ])
        .unwrap();

        assert_eq!(cli.file, Some(PathBuf::from("data.csv")));
        assert_eq!(cli.where_clause.as_deref(), Some("age>-1.5"));
        assert_eq!(cli.aggregate, None);
        assert_eq!(cli.order_by.as_deref(), Some("name=asc"));
    }

    #[test]
    fn test_run_sorted() {
        let tmp = csv_file();
        let cli = Cli {
            file: Some(tmp.path().to_path_buf()),
            order_by: Some("year=desc".into()),
            ..Cli::default()
        };

        let out = run_to_string(&cli).unwrap();
        let cole = out.find("cole").unwrap();
        let mark = out.find("mark").unwrap();
        let alex = out.find("alex").unwrap();
        assert!(cole < mark && mark < alex);
    }

    #[test]
    fn test_run_aggregate() {
        let tmp = csv_file();
        let cli = Cli {
            file: Some(tmp.path().to_path_buf()),
            where_clause: Some("name>alex".into()),
            aggregate: Some("year=max".into()),
            ..Cli::default()
        };

        let out = run_to_string(&cli).unwrap();
        assert!(out.contains("max"));
        assert!(out.contains("2000"));
        assert!(!out.contains("cole"));
    }

    #[test]
    fn test_run_rejects_conflict_without_output() {
        let tmp = csv_file();
        let cli = Cli {
            file: Some(tmp.path().to_path_buf()),
            aggregate: Some("year=avg".into()),
            order_by: Some("name=asc".into()),
            ..Cli::default()
        };

        let mut out = Vec::new();
        let err = run(&cli, &mut out).unwrap_err();
        assert!(matches!(err, ProcessorError::MutuallyExclusive));
        assert!(out.is_empty());
    }

    #[test]
    fn test_run_bad_where() {
        let tmp = csv_file();
        let cli = Cli {
            file: Some(tmp.path().to_path_buf()),
            where_clause: Some("year=no_int".into()),
            ..Cli::default()
        };

        let err = run_to_string(&cli).unwrap_err();
        assert_eq!(err.to_string(), "invalid value in the \"--where\" argument");
    }
}
