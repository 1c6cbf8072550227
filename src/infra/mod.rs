//! Sink implementations for the [`TableSink`] output port: JSON lines
//! and CSV writers over any `io::Write`.

use std::io::Write;

use serde_json::{Map, Value};

use crate::app::TableSink;
use crate::domain::Table;
use crate::error::Result;

/// Writes each row as one JSON object per line, keyed by canonical
/// header. Missing cells serialize as `null`.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TableSink for JsonLinesSink<W> {
    fn write_table(&mut self, table: &Table) -> Result<()> {
        for row in table.rows() {
            let mut object = Map::with_capacity(table.headers().len());
            for (header, cell) in table.headers().iter().zip(row) {
                object.insert(header.clone(), serde_json::to_value(cell)?);
            }
            serde_json::to_writer(&mut self.writer, &Value::Object(object))?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes the cleaned table back out as CSV with canonical headers.
/// Missing cells become empty fields.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }
}

impl<W: Write> TableSink for CsvSink<W> {
    fn write_table(&mut self, table: &Table) -> Result<()> {
        self.writer.write_record(table.headers())?;
        for row in table.rows() {
            let fields: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
            self.writer.write_record(&fields)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
