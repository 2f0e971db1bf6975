// src/store.rs
//
// Local cache for fetched datasets. Each cache is one CSV file; whether a
// file counts as fresh is decided by an explicit `Staleness` policy instead
// of by callers checking `path.exists()` themselves.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::table::{RowRef, Table};

/// Load-or-fetch storage for one value.
pub trait Cache<T> {
    /// `Ok(None)` when nothing usable is stored.
    fn load_if_present(&self) -> Result<Option<T>>;
    fn store(&self, value: &T) -> Result<()>;
}

/// A record type with a fixed CSV column set.
pub trait CsvRecord: Sized {
    const HEADERS: &'static [&'static str];

    fn to_row(&self) -> Vec<String>;
    fn from_row(row: RowRef<'_>) -> std::result::Result<Self, String>;

    fn to_table(records: &[Self]) -> Table {
        let mut t = Table::new(Self::HEADERS);
        for r in records {
            t.push_row(r.to_row());
        }
        t
    }

    fn from_table(table: &Table) -> Result<Vec<Self>> {
        for h in Self::HEADERS {
            table.require(h)?;
        }
        table
            .row_refs()
            .enumerate()
            .map(|(i, row)| {
                Self::from_row(row).map_err(|msg| PipelineError::Csv {
                    path: PathBuf::from(&table.label),
                    row: i + 2, // 1-based, after the header line
                    msg,
                })
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Staleness {
    /// Any existing file is used, however old.
    Never,
    /// Files last modified longer ago than this are ignored.
    MaxAge(Duration),
}

pub struct CsvCache<R> {
    path: PathBuf,
    staleness: Staleness,
    _record: PhantomData<R>,
}

impl<R: CsvRecord> CsvCache<R> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), staleness: Staleness::Never, _record: PhantomData }
    }

    pub fn with_staleness(mut self, staleness: Staleness) -> Self {
        self.staleness = staleness;
        self
    }

    pub fn path(&self) -> &Path { &self.path }

    fn is_fresh(&self) -> bool {
        match self.staleness {
            Staleness::Never => true,
            Staleness::MaxAge(max) => fs::metadata(&self.path)
                .and_then(|m| m.modified())
                .ok()
                .and_then(|t| SystemTime::now().duration_since(t).ok())
                .is_some_and(|age| age <= max),
        }
    }
}

impl<R: CsvRecord> Cache<Vec<R>> for CsvCache<R> {
    fn load_if_present(&self) -> Result<Option<Vec<R>>> {
        if !self.path.is_file() {
            debug!(path = %self.path.display(), "cache miss");
            return Ok(None);
        }
        if !self.is_fresh() {
            info!(path = %self.path.display(), "cache file is stale; ignoring it");
            return Ok(None);
        }
        let table = Table::read(&self.path)?;
        let records = R::from_table(&table)?;
        info!(path = %self.path.display(), records = records.len(), "loaded from cache");
        Ok(Some(records))
    }

    fn store(&self, value: &Vec<R>) -> Result<()> {
        R::to_table(value).write(&self.path)?;
        info!(path = %self.path.display(), records = value.len(), "saved");
        Ok(())
    }
}
