//! Feature derivation over a normalized table. Each derivation is a
//! descriptor declaring the columns it reads; the registry applies the
//! available ones in dependency order and skips the rest, so a table
//! missing a source column is simply not enriched by that derivation.

mod derivations;

pub use self::derivations::builtin_derivations;

use tracing::debug;

use crate::domain::Table;
use crate::error::{PrepError, Result};

/// A single derivation: a name, the canonical columns it requires, and
/// the transform itself. Transforms are pure per-row rewrites; they
/// never fail on malformed cells, which degrade to missing instead.
pub struct Derivation {
    name: &'static str,
    required: Vec<&'static str>,
    depends_on: Vec<&'static str>,
    apply: Box<dyn Fn(&mut Table) + Send + Sync>,
}

impl Derivation {
    pub fn new(
        name: &'static str,
        required: Vec<&'static str>,
        apply: impl Fn(&mut Table) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            required,
            depends_on: Vec::new(),
            apply: Box::new(apply),
        }
    }

    /// Declare other derivations this one reads the output of. They
    /// are pulled in automatically when this derivation is requested
    /// by name.
    pub fn depends_on(mut self, names: Vec<&'static str>) -> Self {
        self.depends_on = names;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn required(&self) -> &[&'static str] {
        &self.required
    }

    /// Whether every required source column is present.
    pub fn is_available(&self, table: &Table) -> bool {
        self.required.iter().all(|c| table.has_column(c))
    }

    fn first_absent(&self, table: &Table) -> Option<&'static str> {
        self.required.iter().find(|c| !table.has_column(c)).copied()
    }
}

/// Outcome of a registry pass: which derivations ran and which were
/// skipped for lack of a source column.
#[derive(Debug, Default, Clone)]
pub struct DeriveReport {
    pub applied: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
}

/// Ordered collection of derivations. Order is dependency order: the
/// built-in set parses `time` before extracting `hour` from it.
pub struct DerivationRegistry {
    derivations: Vec<Derivation>,
}

impl DerivationRegistry {
    pub fn new(derivations: Vec<Derivation>) -> Self {
        Self { derivations }
    }

    /// The built-in derivation set for the accident dataset.
    pub fn builtin() -> Self {
        Self::new(builtin_derivations())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Derivation> {
        self.derivations.iter()
    }

    /// Apply every derivation whose source columns are present; absent
    /// ones are skipped, not failed.
    pub fn apply_available(&self, table: &mut Table) -> DeriveReport {
        let mut report = DeriveReport::default();
        for derivation in &self.derivations {
            if derivation.is_available(table) {
                (derivation.apply)(table);
                report.applied.push(derivation.name);
            } else {
                debug!(derivation = derivation.name, "skipped, source column absent");
                report.skipped.push(derivation.name);
            }
        }
        report
    }

    /// Apply an explicitly requested subset by name, in registry
    /// order, together with any derivations the requested ones declare
    /// a dependency on. Requesting a derivation whose source column is
    /// absent is the caller's error and fails; so is an unknown name.
    pub fn apply_named(&self, table: &mut Table, names: &[&str]) -> Result<DeriveReport> {
        for name in names {
            if !self.derivations.iter().any(|d| d.name == *name) {
                return Err(PrepError::Config(format!("unknown derivation {name:?}")));
            }
        }
        // Expand declared dependencies transitively
        let mut wanted: Vec<&str> = names.to_vec();
        let mut i = 0;
        while i < wanted.len() {
            if let Some(derivation) = self.derivations.iter().find(|d| d.name == wanted[i]) {
                for dep in derivation.depends_on.iter().copied() {
                    if !wanted.contains(&dep) {
                        wanted.push(dep);
                    }
                }
            }
            i += 1;
        }
        let mut report = DeriveReport::default();
        for derivation in &self.derivations {
            if !wanted.contains(&derivation.name) {
                continue;
            }
            if let Some(column) = derivation.first_absent(table) {
                return Err(PrepError::MissingColumn {
                    derivation: derivation.name.to_string(),
                    column: column.to_string(),
                });
            }
            (derivation.apply)(table);
            report.applied.push(derivation.name);
        }
        Ok(report)
    }
}
