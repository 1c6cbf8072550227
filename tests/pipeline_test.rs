use std::fs;
use std::io::Write;

use anyhow::Result;
use tempfile::NamedTempFile;

use rta_prep::app::PrepareUseCase;
use rta_prep::domain::Cell;
use rta_prep::infra::JsonLinesSink;
use rta_prep::pipeline::ingestion;
use rta_prep::pipeline::prepare;
use rta_prep::PrepError;

const SAMPLE_CSV: &str = "\
Time,Day_of_week,Age_band_of_driver,Educational_level,Number_of_casualties,Accident_severity
08:15:00,Monday,18-30,Junior high school,2,Serious Injury
25:61:00,Tuesday,Unknown,na,many,Slight Injury
17:30:45,Funday,Over 51,College & above,1,Fatal Injury
";

#[test]
fn test_end_to_end_prepare_from_file() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(SAMPLE_CSV.as_bytes())?;

    let raw = ingestion::read_csv_path(file.path())?;
    let (table, summary) = prepare(raw)?;

    assert_eq!(summary.rows, 3);
    // "Unknown" and "na" cleared
    assert_eq!(summary.cleared_cells, 2);

    // Worked scenario row: 08:15:00 / 2 / Serious Injury
    let hour = table.column_index("hour").unwrap();
    let count = table.column_index("casualty_count").unwrap();
    let severity = table.column_index("accident_severity").unwrap();
    assert_eq!(table.cell(0, hour), Some(&Cell::Number(8.0)));
    assert_eq!(table.cell(0, count), Some(&Cell::Number(2.0)));
    assert_eq!(
        table.cell(0, severity),
        Some(&Cell::Category {
            value: "Serious Injury".to_string(),
            rank: 1
        })
    );

    // Invalid time degrades to missing time and missing hour
    let time = table.column_index("time").unwrap();
    assert_eq!(table.cell(1, time), Some(&Cell::Missing));
    assert_eq!(table.cell(1, hour), Some(&Cell::Missing));
    // Non-numeric casualty count is missing, not zero
    assert_eq!(table.cell(1, count), Some(&Cell::Missing));
    // Sentinel-cleared age band stays missing through the cast
    let age = table.column_index("age_band_of_driver").unwrap();
    assert_eq!(table.cell(1, age), Some(&Cell::Missing));

    // Out-of-domain day of week becomes missing
    let day = table.column_index("day_of_week").unwrap();
    assert_eq!(table.cell(2, day), Some(&Cell::Missing));
    assert_eq!(
        table.cell(2, severity).and_then(Cell::rank),
        Some(2)
    );

    Ok(())
}

#[test]
fn test_ambiguous_headers_fail_before_rows() -> Result<()> {
    let csv = "Number of Casualties ,number-of-Casualties\n1,2\n";
    let raw = ingestion::read_csv(csv.as_bytes())?;
    let err = prepare(raw).unwrap_err();
    assert!(matches!(err, PrepError::AmbiguousSchema { .. }));
    Ok(())
}

#[test]
fn test_empty_table_prepares_cleanly() -> Result<()> {
    let csv = "Time,Accident_severity\n";
    let raw = ingestion::read_csv(csv.as_bytes())?;
    let (table, summary) = prepare(raw)?;
    assert!(table.is_empty());
    assert_eq!(summary.rows, 0);
    Ok(())
}

#[test]
fn test_aggregates_back_the_dashboard_queries() -> Result<()> {
    let raw = ingestion::read_csv(SAMPLE_CSV.as_bytes())?;
    let (table, _) = prepare(raw)?;

    // Mean casualties over the parseable rows (2 and 1)
    assert_eq!(table.mean("casualty_count"), Some(1.5));

    // Severity histogram in domain-rank order
    let counts = table.counts_by("accident_severity");
    assert_eq!(
        counts,
        vec![
            ("Slight Injury".to_string(), 1),
            ("Serious Injury".to_string(), 1),
            ("Fatal Injury".to_string(), 1),
        ]
    );

    // Sidebar-style critical severity filter
    let critical = table.filter_in("accident_severity", &["Serious Injury", "Fatal Injury"]);
    assert_eq!(critical.len(), 2);

    Ok(())
}

#[test]
fn test_use_case_memoizes_and_writes_sink() -> Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(SAMPLE_CSV.as_bytes())?;
    let bytes = fs::read(file.path())?;

    let mut use_case = PrepareUseCase::new();
    use_case.prepare_bytes(&bytes)?;
    use_case.prepare_bytes(&bytes)?;
    assert_eq!(use_case.cached_runs(), 1);

    let mut sink = JsonLinesSink::new(Vec::new());
    let summary = use_case.prepare_into(&bytes, &mut sink)?;
    assert_eq!(summary.rows, 3);

    let out = String::from_utf8(sink.into_inner())?;
    assert_eq!(out.lines().count(), 3);
    let first: serde_json::Value = serde_json::from_str(out.lines().next().unwrap())?;
    assert_eq!(first["hour"], 8.0);
    assert_eq!(first["accident_severity"], "Serious Injury");

    Ok(())
}
