//! The preparation pipeline: raw table in, cleaned table plus a run
//! summary out. Pure and synchronous; the only failure modes are the
//! structural ones (ambiguous schema), never individual cells.

pub mod ingestion;
pub mod processing;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

use crate::domain::Table;
use crate::error::Result;
use self::processing::derive::DerivationRegistry;
use self::processing::normalize;

/// What a prepare run did, for reporting. Cell-level coercion failures
/// are never logged per record; they are only visible here as missing
/// counts.
#[derive(Debug, Clone, Serialize)]
pub struct PrepareSummary {
    pub rows: usize,
    pub cleared_cells: usize,
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
    pub missing_by_column: BTreeMap<String, usize>,
}

/// Run the full pipeline: schema normalization, then every available
/// built-in derivation.
pub fn prepare(raw: Table) -> Result<(Table, PrepareSummary)> {
    let normalized = normalize::normalize(raw)?;
    let mut table = normalized.table;

    let registry = DerivationRegistry::builtin();
    let report = registry.apply_available(&mut table);

    let missing_by_column = table
        .headers()
        .iter()
        .map(|h| (h.clone(), table.missing_count(h)))
        .collect();

    let summary = PrepareSummary {
        rows: table.len(),
        cleared_cells: normalized.cleared_cells,
        applied: report.applied.iter().map(|s| s.to_string()).collect(),
        skipped: report.skipped.iter().map(|s| s.to_string()).collect(),
        missing_by_column,
    };

    info!(
        rows = summary.rows,
        cleared = summary.cleared_cells,
        applied = summary.applied.len(),
        skipped = summary.skipped.len(),
        "table prepared"
    );
    Ok((table, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Cell;

    #[test]
    fn test_prepare_full_row_scenario() {
        let mut raw = Table::new(vec![
            "Time".into(),
            "Number of Casualties".into(),
            "Accident severity".into(),
        ]);
        raw.push_row(vec![
            Cell::Text("08:15:00".into()),
            Cell::Text("2".into()),
            Cell::Text("Serious Injury".into()),
        ]);

        let (table, summary) = prepare(raw).unwrap();
        assert_eq!(summary.rows, 1);
        assert_eq!(
            table.headers(),
            &[
                "time".to_string(),
                "numberofcasualties".to_string(),
                "accidentseverity".to_string(),
                "hour".to_string(),
            ]
        );

        let hour = table.column_index("hour").unwrap();
        assert_eq!(table.cell(0, hour), Some(&Cell::Number(8.0)));
        // Casualty and severity columns did not canonicalize to the
        // names the derivations read, so those derivations skipped
        assert!(summary.skipped.contains(&"casualty_count".to_string()));
    }

    #[test]
    fn test_prepare_canonical_headers_full_derivation() {
        let mut raw = Table::new(vec![
            "time".into(),
            "number_of_casualties".into(),
            "accident_severity".into(),
        ]);
        raw.push_row(vec![
            Cell::Text("08:15:00".into()),
            Cell::Text("2".into()),
            Cell::Text("Serious Injury".into()),
        ]);

        let (table, summary) = prepare(raw).unwrap();
        assert!(summary.applied.contains(&"casualty_count".to_string()));
        assert!(summary.applied.contains(&"accident_severity".to_string()));

        let count = table.column_index("casualty_count").unwrap();
        assert_eq!(table.cell(0, count), Some(&Cell::Number(2.0)));
        let severity = table.column_index("accident_severity").unwrap();
        assert_eq!(
            table.cell(0, severity),
            Some(&Cell::Category {
                value: "Serious Injury".to_string(),
                rank: 1
            })
        );
    }

    #[test]
    fn test_prepare_sentinel_then_cast_stays_missing() {
        let mut raw = Table::new(vec!["age_band_of_driver".into()]);
        raw.push_row(vec![Cell::Text("Unknown".into())]);
        raw.push_row(vec![Cell::Text("18-30".into())]);

        let (table, summary) = prepare(raw).unwrap();
        assert_eq!(summary.cleared_cells, 1);
        assert_eq!(table.cell(0, 0), Some(&Cell::Missing));
        assert_eq!(
            table.cell(1, 0),
            Some(&Cell::Category {
                value: "18-30".to_string(),
                rank: 1
            })
        );
        assert_eq!(summary.missing_by_column["age_band_of_driver"], 1);
    }

    #[test]
    fn test_prepare_empty_table() {
        let raw = Table::new(vec!["time".into(), "day_of_week".into()]);
        let (table, summary) = prepare(raw).unwrap();
        assert!(table.is_empty());
        assert_eq!(summary.rows, 0);
        // Derivations on present columns still count as applied
        assert!(summary.applied.contains(&"day_of_week".to_string()));
    }
}
