// src/pipeline/mod.rs
//! # Join pipeline
//!
//! ESRB reference tables in, four processed tables out:
//!
//! ```text
//! train_esrb.csv ─┐                         ┌─ train_description_based_esrb_dataset.csv
//!                 ├─ assign_app_ids ─ merge ┤  train_original_filtered_esrb_dataset.csv
//! test_esrb.csv ──┘        ▲                │  test_description_based_esrb_dataset.csv
//!                   TitleIndex (catalog)    └─ test_original_filtered_esrb_dataset.csv
//! ```
//!
//! The description-based and original-filtered tables of a split are cut
//! from the same merged rows, so they always agree in row count and rating
//! distribution; `verify` checks that after the fact.
pub mod join;
pub mod verify;

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::clean_html;
use crate::error::Result;
use crate::table::Table;

pub use join::{assign_app_ids, descriptions_table, merge_inner, unique_app_ids, DuplicatePolicy, TitleIndex};
pub use verify::{verify_outputs, Distribution, JoinIntegrityWarning, SplitReport, VerifyReport};

/// Columns of the description-based table, in output order.
pub const DESCRIPTION_BASED_COLUMNS: [&str; 3] = ["title", "description", "esrb_rating"];
/// Join-only columns stripped from the original-filtered table.
pub const JOIN_ONLY_COLUMNS: [&str; 3] = ["console", "description", "app_id"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub const ALL: [Split; 2] = [Split::Train, Split::Test];

    pub fn name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }

    pub fn description_based_path(self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_description_based_esrb_dataset.csv", self.name()))
    }

    pub fn original_filtered_path(self, dir: &Path) -> PathBuf {
        dir.join(format!("{}_original_filtered_esrb_dataset.csv", self.name()))
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Train and test reference tables, each checked for `title` and `esrb_rating`.
pub fn load_esrb(train: &Path, test: &Path) -> Result<(Table, Table)> {
    let load = |p: &Path| -> Result<Table> {
        let t = Table::read(p)?;
        t.require("title")?;
        t.require("esrb_rating")?;
        info!(path = %p.display(), rows = t.len(), "loaded ESRB reference");
        Ok(t)
    };
    Ok((load(train)?, load(test)?))
}

/// The two processed tables of one split.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitOutputs {
    pub description_based: Table,
    pub original_filtered: Table,
}

impl SplitOutputs {
    pub fn write(&self, split: Split, dir: &Path) -> Result<()> {
        self.description_based.write(&split.description_based_path(dir))?;
        self.original_filtered.write(&split.original_filtered_path(dir))?;
        info!(%split, rows = self.description_based.len(), dir = %dir.display(), "wrote processed split");
        Ok(())
    }
}

/// Join one reference split against the fetched descriptions on `title`.
///
/// `reference` is the split as loaded; the `app_id` column comes from
/// `descriptions`.
pub fn build_split(reference: &Table, descriptions: &Table) -> Result<SplitOutputs> {
    let merged = merge_inner(reference, descriptions, "title")?;
    let description_based = merged.select(&DESCRIPTION_BASED_COLUMNS)?;

    let strip: Vec<&str> = JOIN_ONLY_COLUMNS
        .iter()
        .copied()
        .filter(|c| merged.column_index(c).is_some())
        .collect();
    let original_filtered = merged.drop_columns(strip.as_slice())?;

    info!(
        reference = reference.len(),
        merged = merged.len(),
        dropped = reference.len().saturating_sub(merged.len()),
        "joined split"
    );
    Ok(SplitOutputs { description_based, original_filtered })
}

/// Append `cleaned_<column>` holding the markup-free text of `column`.
pub fn clean_table(table: &mut Table, column: &str) -> Result<()> {
    let cleaned: Vec<String> = table.column(column)?.map(clean_html).collect();
    table.push_column(&format!("cleaned_{column}"), cleaned)
}

/// Read `input`, clean `column`, write everything to `output`.
pub fn clean_dataset(input: &Path, output: &Path, column: &str) -> Result<usize> {
    let mut table = Table::read(input)?;
    clean_table(&mut table, column)?;
    table.write(output)?;
    info!(rows = table.len(), column, output = %output.display(), "cleaned dataset");
    Ok(table.len())
}
