//! The built-in derivations for the accident dataset, in dependency
//! order: strict time parsing, hour extraction, casualty coercion, and
//! one ordered-categorical tagging pass per fixed domain.

use chrono::NaiveTime;

use super::Derivation;
use crate::constants::{
    ordered_domains, CASUALTIES_COLUMN, CASUALTY_COUNT_COLUMN, HOUR_COLUMN, TIME_COLUMN,
    TIME_FORMAT,
};
use crate::domain::{Cell, CategoricalDomain, Table};

/// Strict `HH:MM:SS` parse of the time column, in place. Anything the
/// format rejects (including out-of-range components) becomes missing;
/// there is no fallback format and no partial parse.
fn parse_time(table: &mut Table) {
    let Some(index) = table.column_index(TIME_COLUMN) else {
        return;
    };
    table.map_column(index, |cell| match cell {
        Cell::Text(v) => match NaiveTime::parse_from_str(v, TIME_FORMAT) {
            Ok(t) => Cell::Time(t),
            Err(_) => Cell::Missing,
        },
        Cell::Time(t) => Cell::Time(*t),
        _ => Cell::Missing,
    });
}

/// Integer hour of day from the parsed time column, appended as a
/// numeric column so downstream aggregation treats it like any other
/// measure. Missing time propagates to missing hour.
fn derive_hour(table: &mut Table) {
    let Some(index) = table.column_index(TIME_COLUMN) else {
        return;
    };
    let hours: Vec<Cell> = table
        .rows()
        .iter()
        .map(|row| match row.get(index).and_then(Cell::hour) {
            Some(h) => Cell::Number(f64::from(h)),
            None => Cell::Missing,
        })
        .collect();
    table.set_column(HOUR_COLUMN, hours);
}

/// Numeric coercion of the casualties column into `casualty_count`.
/// Non-numeric input degrades to missing, never to zero.
fn derive_casualty_count(table: &mut Table) {
    let Some(index) = table.column_index(CASUALTIES_COLUMN) else {
        return;
    };
    let counts: Vec<Cell> = table
        .rows()
        .iter()
        .map(|row| {
            match row.get(index) {
                Some(Cell::Text(v)) => match v.trim().parse::<f64>() {
                    Ok(n) => Cell::Number(n),
                    Err(_) => Cell::Missing,
                },
                Some(Cell::Number(n)) => Cell::Number(*n),
                _ => Cell::Missing,
            }
        })
        .collect();
    table.set_column(CASUALTY_COUNT_COLUMN, counts);
}

/// Tag a column against its fixed ordered domain, in place. In-domain
/// values keep their identity and gain a rank; everything else,
/// sentinel-cleared cells included, is missing.
fn tag_categorical(table: &mut Table, domain: &'static CategoricalDomain) {
    let Some(index) = table.column_index(domain.name()) else {
        return;
    };
    table.map_column(index, |cell| {
        let value = match cell {
            Cell::Text(v) => v.as_str(),
            Cell::Category { value, .. } => value.as_str(),
            _ => return Cell::Missing,
        };
        match domain.rank_of(value) {
            Some(rank) => Cell::Category {
                value: value.to_string(),
                rank,
            },
            None => Cell::Missing,
        }
    });
}

/// The full built-in set, dependency-ordered (time before hour).
pub fn builtin_derivations() -> Vec<Derivation> {
    let mut derivations = vec![
        Derivation::new("time", vec![TIME_COLUMN], parse_time),
        Derivation::new("hour", vec![TIME_COLUMN], derive_hour).depends_on(vec!["time"]),
        Derivation::new(
            "casualty_count",
            vec![CASUALTIES_COLUMN],
            derive_casualty_count,
        ),
    ];
    for domain in ordered_domains() {
        derivations.push(Derivation::new(
            domain.name(),
            vec![domain.name()],
            move |table: &mut Table| tag_categorical(table, domain),
        ));
    }
    derivations
}
