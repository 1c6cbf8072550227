//! Core data shapes shared across pipeline stages: typed cells, the
//! in-memory table, and the fixed ordered categorical domains.

use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Serialize, Serializer};

use crate::constants::TIME_FORMAT;

/// A single typed cell value. `Missing` is the explicit marker every
/// failed coercion and cleared sentinel degrades to.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Text(String),
    Number(f64),
    Time(NaiveTime),
    /// An in-domain categorical value tagged with its rank within the
    /// domain's fixed ordering (0 = lowest).
    Category { value: String, rank: usize },
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// The textual identity of the cell, used for domain membership
    /// checks and group-by keys. Missing cells have none.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(v) => Some(v),
            Cell::Category { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Cell::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Rank within the categorical ordering, if this cell was tagged.
    pub fn rank(&self) -> Option<usize> {
        match self {
            Cell::Category { rank, .. } => Some(*rank),
            _ => None,
        }
    }

    /// Hour-of-day component of a parsed time cell.
    pub fn hour(&self) -> Option<u32> {
        self.as_time().map(|t| t.hour())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => Ok(()),
            Cell::Text(v) => f.write_str(v),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Time(t) => write!(f, "{}", t.format(TIME_FORMAT)),
            Cell::Category { value, .. } => f.write_str(value),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Cell::Missing => serializer.serialize_none(),
            Cell::Text(v) => serializer.serialize_str(v),
            Cell::Number(n) => serializer.serialize_f64(*n),
            Cell::Time(t) => serializer.serialize_str(&t.format(TIME_FORMAT).to_string()),
            Cell::Category { value, .. } => serializer.serialize_str(value),
        }
    }
}

/// A fixed, ordered set of allowed values for a categorical column.
/// Rank is the index within the declared order.
#[derive(Debug)]
pub struct CategoricalDomain {
    name: &'static str,
    values: &'static [&'static str],
}

impl CategoricalDomain {
    pub const fn new(name: &'static str, values: &'static [&'static str]) -> Self {
        Self { name, values }
    }

    /// The canonical column name this domain applies to.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn values(&self) -> &'static [&'static str] {
        self.values
    }

    /// Position of `value` in the declared order, or `None` when the
    /// value is outside the domain.
    pub fn rank_of(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|v| *v == value)
    }
}

/// An in-memory table: ordered headers plus positionally indexed rows.
/// Rows carry no identity beyond their position; every pipeline stage
/// preserves row count and row order.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Replace every cell of an existing column in place.
    pub fn map_column<F>(&mut self, index: usize, mut f: F)
    where
        F: FnMut(&Cell) -> Cell,
    {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(index) {
                *cell = f(cell);
            }
        }
    }

    /// Append a derived column, or overwrite it if a column with the
    /// same name already exists. `cells` must have one entry per row.
    pub fn set_column(&mut self, name: &str, cells: Vec<Cell>) {
        debug_assert_eq!(cells.len(), self.rows.len());
        match self.column_index(name) {
            Some(index) => {
                for (row, cell) in self.rows.iter_mut().zip(cells) {
                    row[index] = cell;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, cell) in self.rows.iter_mut().zip(cells) {
                    row.push(cell);
                }
            }
        }
    }

    /// Number of missing cells in the named column.
    pub fn missing_count(&self, name: &str) -> usize {
        match self.column_index(name) {
            Some(index) => self
                .rows
                .iter()
                .filter(|r| r.get(index).is_some_and(Cell::is_missing))
                .count(),
            None => 0,
        }
    }

    /// Mean of the numeric cells in the named column. Missing and
    /// non-numeric cells are excluded; `None` if nothing is numeric.
    pub fn mean(&self, name: &str) -> Option<f64> {
        let index = self.column_index(name)?;
        let mut sum = 0.0;
        let mut count = 0usize;
        for row in &self.rows {
            if let Some(n) = row.get(index).and_then(Cell::as_number) {
                sum += n;
                count += 1;
            }
        }
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    /// Group counts over the named column, missing cells excluded.
    /// Tagged categorical values come back in domain-rank order;
    /// untagged values in first-seen order after them.
    pub fn counts_by(&self, name: &str) -> Vec<(String, usize)> {
        let Some(index) = self.column_index(name) else {
            return Vec::new();
        };
        let mut order: Vec<(String, Option<usize>)> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        for row in &self.rows {
            let Some(cell) = row.get(index) else { continue };
            let Some(key) = cell.as_text() else { continue };
            if !counts.contains_key(key) {
                order.push((key.to_string(), cell.rank()));
            }
            *counts.entry(key.to_string()).or_default() += 1;
        }
        order.sort_by_key(|(_, rank)| rank.unwrap_or(usize::MAX));
        order
            .into_iter()
            .map(|(key, _)| {
                let count = counts.get(&key).copied().unwrap_or(0);
                (key, count)
            })
            .collect()
    }

    /// Keep only rows whose cell in the named column matches one of
    /// `keep` (by textual identity). A table without the column is
    /// returned unchanged; the filter does not apply to it.
    pub fn filter_in(&self, name: &str, keep: &[&str]) -> Table {
        let Some(index) = self.column_index(name) else {
            return self.clone();
        };
        let rows = self
            .rows
            .iter()
            .filter(|row| {
                row.get(index)
                    .and_then(Cell::as_text)
                    .is_some_and(|v| keep.contains(&v))
            })
            .cloned()
            .collect();
        Table {
            headers: self.headers.clone(),
            rows,
        }
    }
}
