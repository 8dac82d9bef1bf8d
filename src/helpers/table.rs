//! Table output using comfy-table.

use comfy_table::{Cell, CellAlignment, Table, presets::ASCII_FULL};

use crate::processor::{AggregateResult, query_builder::QueryResult};

/// Render a query result as a grid table.
///
/// Records get one column per header; an aggregate gets its operation name
/// as the only header and the value (or the no-objects message) below it.
pub fn render_table(result: &QueryResult<'_>) -> Table {
    let mut table = Table::new();
    table.load_preset(ASCII_FULL).set_header(result.header());

    match result {
        QueryResult::Select { rows, .. } => {
            for row in rows {
                table.add_row(row.values().iter().map(|v| {
                    let cell = Cell::new(v);
                    if v.is_numeric() {
                        cell.set_alignment(CellAlignment::Right)
                    } else {
                        cell
                    }
                }));
            }
        }
        QueryResult::Aggregate { result, .. } => {
            let cell = Cell::new(result);
            table.add_row(vec![match result {
                AggregateResult::NoObjects => cell,
                _ => cell.set_alignment(CellAlignment::Right),
            }]);
        }
    }

    table
}
