//! Application-layer driver for the preparation pipeline: reads input
//! bytes, memoizes cleaned tables by content fingerprint, and hands
//! results to an output port.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::domain::Table;
use crate::error::Result;
use crate::pipeline::ingestion::{self, fingerprint::fingerprint};
use crate::pipeline::{self, PrepareSummary};

/// Output port for cleaned tables. Sinks live in `infra`.
pub trait TableSink {
    fn write_table(&mut self, table: &Table) -> Result<()>;
}

/// A cleaned table together with its run summary.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub table: Table,
    pub summary: PrepareSummary,
}

/// Use case wrapping the pure pipeline with the caching policy the
/// pipeline itself does not own: results are memoized per content
/// fingerprint, so repeated preparation of identical input bytes
/// re-parses nothing.
#[derive(Default)]
pub struct PrepareUseCase {
    cache: HashMap<String, Prepared>,
}

impl PrepareUseCase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare a table from raw CSV bytes, memoized.
    pub fn prepare_bytes(&mut self, bytes: &[u8]) -> Result<&Prepared> {
        let key = fingerprint(bytes);
        match self.cache.entry(key) {
            Entry::Occupied(entry) => {
                debug!("prepared table served from cache");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let raw = ingestion::read_csv(bytes)?;
                let (table, summary) = pipeline::prepare(raw)?;
                Ok(entry.insert(Prepared { table, summary }))
            }
        }
    }

    /// Prepare a table from a CSV file on disk.
    pub fn prepare_path(&mut self, path: &Path) -> Result<&Prepared> {
        let bytes = fs::read(path)?;
        self.prepare_bytes(&bytes)
    }

    /// Prepare and write the cleaned table to the given sink.
    pub fn prepare_into(&mut self, bytes: &[u8], sink: &mut dyn TableSink) -> Result<PrepareSummary> {
        let prepared = self.prepare_bytes(bytes)?;
        let summary = prepared.summary.clone();
        sink.write_table(&prepared.table)?;
        Ok(summary)
    }

    pub fn cached_runs(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Cell;

    #[test]
    fn test_prepare_bytes_memoizes_by_content() {
        let csv = b"time,number_of_casualties\n08:15:00,2\n";
        let mut use_case = PrepareUseCase::new();

        let rows = use_case.prepare_bytes(csv).unwrap().table.len();
        assert_eq!(rows, 1);
        use_case.prepare_bytes(csv).unwrap();
        assert_eq!(use_case.cached_runs(), 1);

        use_case.prepare_bytes(b"time\n09:00:00\n").unwrap();
        assert_eq!(use_case.cached_runs(), 2);
    }

    #[test]
    fn test_prepare_into_writes_cleaned_rows() {
        struct CollectSink(Vec<Vec<Cell>>);
        impl TableSink for CollectSink {
            fn write_table(&mut self, table: &Table) -> Result<()> {
                self.0.extend(table.rows().iter().cloned());
                Ok(())
            }
        }

        let mut use_case = PrepareUseCase::new();
        let mut sink = CollectSink(Vec::new());
        let summary = use_case
            .prepare_into(b"accident_severity\nSerious Injury\nUnknown\n", &mut sink)
            .unwrap();

        assert_eq!(summary.rows, 2);
        assert_eq!(summary.cleared_cells, 1);
        assert_eq!(sink.0.len(), 2);
        assert_eq!(sink.0[1][0], Cell::Missing);
    }
}
