//! Materializes a raw [`Table`] from delimited input. The reader is
//! the external edge of the pipeline: everything downstream operates
//! on the in-memory table and performs no I/O.

pub mod fingerprint;

use std::fs;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::domain::{Cell, Table};
use crate::error::Result;

/// Read a comma-delimited table with a header row. Every field comes
/// in as text; empty fields are already missing at this stage, the
/// same way the upstream reader treated them.
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let width = headers.len();
    let mut table = Table::new(headers);
    let mut truncated = 0usize;

    for record in rdr.records() {
        let record = record?;
        if record.len() > width {
            truncated += 1;
        }
        let mut row: Vec<Cell> = record
            .iter()
            .take(width)
            .map(|field| {
                if field.is_empty() {
                    Cell::Missing
                } else {
                    Cell::Text(field.to_string())
                }
            })
            .collect();
        // Short records are padded so every row matches the header set
        row.resize(width, Cell::Missing);
        table.push_row(row);
    }

    if truncated > 0 {
        debug!(truncated, "records wider than the header set were truncated");
    }
    debug!(rows = table.len(), columns = width, "read raw table");
    Ok(table)
}

/// Read a CSV file from disk.
pub fn read_csv_path(path: &Path) -> Result<Table> {
    let bytes = fs::read(path)?;
    read_csv(bytes.as_slice())
}
