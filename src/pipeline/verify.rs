// src/pipeline/verify.rs
//! Rating distributions of the processed tables, for human inspection.
//!
//! Nothing here fails the run. Disagreement between the two tables of one
//! split becomes a `JoinIntegrityWarning` in the report.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{info, warn};

use super::Split;
use crate::config::DataPaths;
use crate::error::Result;
use crate::table::Table;

const LABEL: &str = "esrb_rating";

/// Normalized value counts of one label column, ordered by label.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Distribution {
    pub rows: usize,
    pub fractions: BTreeMap<String, f64>,
}

impl Distribution {
    /// Missing labels are left out of both counts and denominator.
    pub fn of(table: &Table, column: &str) -> Result<Self> {
        let counts = table.value_counts(column)?;
        let total: usize = counts.values().sum();
        let fractions = counts
            .into_iter()
            .map(|(k, n)| (k, n as f64 / total as f64))
            .collect();
        Ok(Self { rows: table.len(), fractions })
    }

    pub fn get(&self, label: &str) -> f64 {
        self.fractions.get(label).copied().unwrap_or(0.0)
    }

    /// Largest per-label difference; labels missing on one side count as 0.
    pub fn max_deviation(&self, other: &Distribution) -> f64 {
        self.fractions
            .keys()
            .chain(other.fractions.keys())
            .map(|k| (self.get(k) - other.get(k)).abs())
            .fold(0.0, f64::max)
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fractions.is_empty() {
            return writeln!(f, "  (no labelled rows)");
        }
        for (label, frac) in &self.fractions {
            writeln!(f, "  {label:<6} {frac:.6}")?;
        }
        writeln!(f, "  ({} rows)", self.rows)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum JoinIntegrityWarning {
    RowCountMismatch { split: Split, description_based: usize, original_filtered: usize },
    DistributionDrift { split: Split, max_deviation: f64 },
}

impl fmt::Display for JoinIntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowCountMismatch { split, description_based, original_filtered } => write!(
                f,
                "{split}: description-based has {description_based} rows, original-filtered has {original_filtered}"
            ),
            Self::DistributionDrift { split, max_deviation } => write!(
                f,
                "{split}: rating distributions differ by up to {max_deviation:.3e}"
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SplitReport {
    pub split: Split,
    /// Rating distribution of the raw reference table, when it is on disk.
    pub reference: Option<Distribution>,
    pub original_filtered: Distribution,
    pub description_based: Distribution,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VerifyReport {
    pub splits: Vec<SplitReport>,
    pub warnings: Vec<JoinIntegrityWarning>,
}

impl VerifyReport {
    pub fn split(&self, split: Split) -> Option<&SplitReport> {
        self.splits.iter().find(|s| s.split == split)
    }

    pub fn is_consistent(&self) -> bool { self.warnings.is_empty() }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Verifying the distribution of ESRB ratings...")?;
        for s in &self.splits {
            let name = match s.split {
                Split::Train => "Training",
                Split::Test => "Test",
            };
            if let Some(r) = &s.reference {
                writeln!(f, "\nReference {name} Rating Distribution:")?;
                write!(f, "{r}")?;
            }
            writeln!(f, "\nOriginal {name} Rating Distribution:")?;
            write!(f, "{}", s.original_filtered)?;
            writeln!(f, "\nNew {name} Rating Distribution:")?;
            write!(f, "{}", s.description_based)?;
        }
        for w in &self.warnings {
            writeln!(f, "\nwarning: {w}")?;
        }
        Ok(())
    }
}

/// Load the four processed tables under `paths` and compare them.
pub fn verify_outputs(paths: &DataPaths, tolerance: f64) -> Result<VerifyReport> {
    let dir = paths.processed_dir();
    let mut report = VerifyReport::default();

    for split in Split::ALL {
        let description_based =
            Distribution::of(&Table::read(&split.description_based_path(&dir))?, LABEL)?;
        let original_filtered =
            Distribution::of(&Table::read(&split.original_filtered_path(&dir))?, LABEL)?;

        let raw = match split {
            Split::Train => paths.train_esrb(),
            Split::Test => paths.test_esrb(),
        };
        let reference = if raw.is_file() {
            Some(Distribution::of(&Table::read(&raw)?, LABEL)?)
        } else {
            None
        };

        report.warnings.extend(check_split(split, &description_based, &original_filtered, tolerance));
        report.splits.push(SplitReport { split, reference, original_filtered, description_based });
    }

    for w in &report.warnings {
        warn!("{w}");
    }
    info!(warnings = report.warnings.len(), "verified processed datasets");
    Ok(report)
}

fn check_split(
    split: Split,
    description_based: &Distribution,
    original_filtered: &Distribution,
    tolerance: f64,
) -> Vec<JoinIntegrityWarning> {
    let mut out = Vec::new();
    if description_based.rows != original_filtered.rows {
        out.push(JoinIntegrityWarning::RowCountMismatch {
            split,
            description_based: description_based.rows,
            original_filtered: original_filtered.rows,
        });
    }
    let max_deviation = description_based.max_deviation(original_filtered);
    if max_deviation > tolerance {
        out.push(JoinIntegrityWarning::DistributionDrift { split, max_deviation });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractions_ignore_missing_labels() {
        let t = Table::from_csv_str("title,esrb_rating\nA,M\nB,E\nC,\nD,M\n");
        let d = Distribution::of(&t, LABEL).unwrap();
        assert_eq!(d.rows, 4);
        assert!((d.get("M") - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(d.get("T"), 0.0);
    }

    #[test]
    fn deviation_counts_one_sided_labels() {
        let a = Distribution::of(&Table::from_csv_str("esrb_rating\nM\nE\n"), LABEL).unwrap();
        let b = Distribution::of(&Table::from_csv_str("esrb_rating\nM\n"), LABEL).unwrap();
        assert!((a.max_deviation(&b) - 0.5).abs() < 1e-12);
        assert_eq!(a.max_deviation(&a), 0.0);
    }

    #[test]
    fn mismatch_produces_warnings() {
        let a = Distribution::of(&Table::from_csv_str("esrb_rating\nM\nE\n"), LABEL).unwrap();
        let b = Distribution::of(&Table::from_csv_str("esrb_rating\nM\n"), LABEL).unwrap();
        let w = check_split(Split::Train, &a, &b, 1e-9);
        assert_eq!(w.len(), 2);
        assert!(matches!(w[0], JoinIntegrityWarning::RowCountMismatch { description_based: 2, original_filtered: 1, .. }));
        assert!(check_split(Split::Test, &a, &a, 1e-9).is_empty());
    }

    #[test]
    fn verify_reads_processed_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        let processed = paths.processed_dir();
        for split in Split::ALL {
            Table::from_csv_str("title,description,esrb_rating\nA,x,M\nB,y,E\n")
                .write(&split.description_based_path(&processed))
                .unwrap();
            Table::from_csv_str("title,esrb_rating\nA,M\nB,E\n")
                .write(&split.original_filtered_path(&processed))
                .unwrap();
        }
        let report = verify_outputs(&paths, 1e-9).unwrap();
        assert!(report.is_consistent());
        assert!(report.split(Split::Train).unwrap().reference.is_none());
        let text = report.to_string();
        assert!(text.contains("New Test Rating Distribution:"));
    }
}
