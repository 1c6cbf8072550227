//! Schema normalization: canonical column identifiers and sentinel
//! clearing. This is the only stage that looks at the header set as a
//! whole; everything after it works per row.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::constants::SENTINEL_VALUES;
use crate::domain::{Cell, Table};
use crate::error::{PrepError, Result};

static CANONICAL_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid canonical key pattern"));

/// Reduce a raw header to its canonical identifier: strip everything
/// outside `[A-Za-z0-9_]`, then lowercase. Idempotent.
pub fn canonical_key(header: &str) -> String {
    CANONICAL_KEY_RE.replace_all(header, "").to_lowercase()
}

/// Result of schema normalization, with the count of sentinel cells
/// cleared for the run summary.
#[derive(Debug)]
pub struct Normalized {
    pub table: Table,
    pub cleared_cells: usize,
}

/// Canonicalize every header and clear sentinel values table-wide.
///
/// Two distinct raw headers collapsing to one canonical key is an
/// ambiguous schema, surfaced before any row is touched; silently
/// overwriting a column is never acceptable.
pub fn normalize(table: Table) -> Result<Normalized> {
    let mut seen: HashMap<String, String> = HashMap::new();
    let mut headers = Vec::with_capacity(table.headers().len());
    for raw in table.headers() {
        let key = canonical_key(raw);
        if let Some(first) = seen.get(&key) {
            return Err(PrepError::AmbiguousSchema {
                first: first.clone(),
                second: raw.clone(),
                canonical: key,
            });
        }
        seen.insert(key.clone(), raw.clone());
        headers.push(key);
    }

    let mut cleared = 0usize;
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Cell::Text(v) if SENTINEL_VALUES.contains(&v.as_str()) => {
                        cleared += 1;
                        Cell::Missing
                    }
                    other => other.clone(),
                })
                .collect()
        })
        .collect();

    debug!(cleared, "schema normalized");
    Ok(Normalized {
        table: Table::with_rows(headers, rows),
        cleared_cells: cleared,
    })
}
