// src/table.rs
//
// Header-addressed tabular data, the in-memory form of every CSV the
// pipeline reads or writes. Columns are looked up by name; a missing
// column is an error that names the table it came from.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::csv::{parse_rows, rows_to_string};
use crate::error::{PipelineError, Result};
use crate::file::write_atomic;

#[derive(Clone, Debug, Default)]
pub struct Table {
    /// Where the table came from, for error messages.
    pub label: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.headers == other.headers && self.rows == other.rows
    }
}

impl Table {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            label: s!("<memory>"),
            headers: headers.iter().map(|h| s!(h.as_ref())).collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// First row is the header. Short rows are padded, long rows truncated,
    /// so every row has exactly `headers.len()` cells.
    pub fn from_csv_str(text: &str) -> Self {
        let mut rows = parse_rows(text);
        if rows.is_empty() {
            return Self::default();
        }
        let mut headers = rows.remove(0);
        if let Some(first) = headers.first_mut() {
            // Excel-style BOM
            if let Some(stripped) = first.strip_prefix('\u{feff}') {
                *first = s!(stripped);
            }
        }
        let width = headers.len();
        for row in rows.iter_mut() {
            row.resize(width, s!());
        }
        Self { label: s!("<memory>"), headers, rows }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self::from_csv_str(&text).with_label(path.display().to_string()))
    }

    pub fn to_csv_string(&self) -> String {
        rows_to_string(&self.headers, &self.rows)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.to_csv_string())?;
        Ok(())
    }

    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Column index, or `MissingColumn` naming this table.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| PipelineError::MissingColumn {
            table: self.label.clone(),
            column: s!(name),
        })
    }

    pub fn column(&self, name: &str) -> Result<impl Iterator<Item = &str> + '_> {
        let ix = self.require(name)?;
        Ok(self.rows.iter().map(move |r| r[ix].as_str()))
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        let mut row = row;
        row.resize(self.headers.len(), s!());
        self.rows.push(row);
    }

    /// Append a column; `values` must have one entry per row.
    pub fn push_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(PipelineError::Data(format!(
                "{}: column {name:?} has {} values for {} rows",
                self.label,
                values.len(),
                self.rows.len()
            )));
        }
        self.headers.push(s!(name));
        for (row, v) in self.rows.iter_mut().zip(values) {
            row.push(v);
        }
        Ok(())
    }

    /// Keep only `names`, in that order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let idx = names
            .iter()
            .map(|n| self.require(n.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Table {
            label: self.label.clone(),
            headers: idx.iter().map(|&i| self.headers[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| idx.iter().map(|&i| r[i].clone()).collect())
                .collect(),
        })
    }

    /// Remove `names`; every one of them must exist.
    pub fn drop_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let mut dropped = Vec::with_capacity(names.len());
        for n in names {
            dropped.push(self.require(n.as_ref())?);
        }
        let keep: Vec<&str> = self
            .headers
            .iter()
            .enumerate()
            .filter(|(i, _)| !dropped.contains(i))
            .map(|(_, h)| h.as_str())
            .collect();
        self.select(keep.as_slice())
    }

    /// Stack `other` under `self`. Columns are the union (self's order first);
    /// cells a table does not have are left empty.
    pub fn concat(&self, other: &Table) -> Table {
        let mut headers = self.headers.clone();
        for h in &other.headers {
            if !headers.contains(h) {
                headers.push(h.clone());
            }
        }
        let mut out = Table { label: self.label.clone(), headers, rows: Vec::new() };
        for src in [self, other] {
            let map: Vec<Option<usize>> =
                out.headers.iter().map(|h| src.column_index(h)).collect();
            for r in &src.rows {
                out.rows.push(
                    map.iter()
                        .map(|ix| ix.map(|i| r[i].clone()).unwrap_or_default())
                        .collect(),
                );
            }
        }
        out
    }

    /// Occurrences per distinct non-empty value of `name`.
    /// Empty cells are missing values and are not counted.
    pub fn value_counts(&self, name: &str) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for v in self.column(name)? {
            if v.is_empty() { continue; }
            *counts.entry(s!(v)).or_insert(0) += 1;
        }
        Ok(counts)
    }

    pub fn row_ref(&self, i: usize) -> Option<RowRef<'_>> {
        self.rows.get(i).map(|cells| RowRef { headers: &self.headers, cells })
    }

    pub fn row_refs(&self) -> impl Iterator<Item = RowRef<'_>> {
        self.rows.iter().map(|cells| RowRef { headers: &self.headers, cells })
    }
}

/// One row with access by column name.
#[derive(Clone, Copy)]
pub struct RowRef<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> RowRef<'a> {
    /// Cell value, `None` when the column is absent.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        let ix = self.headers.iter().position(|h| h == name)?;
        self.cells.get(ix).map(|s| s.as_str())
    }

    /// Cell value, `None` when the column is absent or the cell is empty.
    pub fn non_empty(&self, name: &str) -> Option<&'a str> {
        self.get(name).filter(|v| !v.trim().is_empty())
    }

    /// Parse an optional integer cell. Accepts `"42"` and float-printed
    /// integers such as `"42.0"`.
    pub fn parse_int<T>(&self, name: &str) -> std::result::Result<Option<T>, String>
    where
        T: FromStr + TryFrom<i64>,
    {
        let Some(raw) = self.non_empty(name) else { return Ok(None) };
        let raw = raw.trim();
        if let Ok(v) = raw.parse::<T>() {
            return Ok(Some(v));
        }
        match raw.parse::<f64>() {
            Ok(f) if f.fract() == 0.0 && f.is_finite() => T::try_from(f as i64)
                .map(Some)
                .map_err(|_| format!("{name:?} out of range: {raw:?}")),
            _ => Err(format!("{name:?} is not an integer: {raw:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn esrb() -> Table {
        Table::from_csv_str("title,console,esrb_rating\nA,1,M\nB,0,E\nC,1,\n")
    }

    #[test]
    fn select_and_drop() {
        let t = esrb();
        let sel = t.select(&["esrb_rating", "title"]).unwrap();
        assert_eq!(sel.headers, vec!["esrb_rating", "title"]);
        assert_eq!(sel.rows[0], vec!["M", "A"]);

        let dropped = t.drop_columns(&["console"]).unwrap();
        assert_eq!(dropped.headers, vec!["title", "esrb_rating"]);

        let err = t.drop_columns(&["nope"]).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { column, .. } if column == "nope"));
    }

    #[test]
    fn concat_unions_columns() {
        let a = Table::from_csv_str("title,esrb_rating\nA,M\n");
        let b = Table::from_csv_str("title,console\nB,1\n");
        let c = a.concat(&b);
        assert_eq!(c.headers, vec!["title", "esrb_rating", "console"]);
        assert_eq!(c.rows[0], vec!["A", "M", ""]);
        assert_eq!(c.rows[1], vec!["B", "", "1"]);
    }

    #[test]
    fn value_counts_skip_missing() {
        let counts = esrb().value_counts("esrb_rating").unwrap();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["M"], 1);
        assert_eq!(counts["E"], 1);
    }

    #[test]
    fn short_rows_are_padded() {
        let t = Table::from_csv_str("a,b,c\n1\n");
        assert_eq!(t.rows[0], vec!["1", "", ""]);
    }

    #[test]
    fn row_ref_parses_ints() {
        let t = Table::from_csv_str("appid,last_modified\n10,1700000000.0\n,\nx,1\n");
        let r0 = t.row_ref(0).unwrap();
        assert_eq!(r0.parse_int::<u32>("appid").unwrap(), Some(10));
        assert_eq!(r0.parse_int::<i64>("last_modified").unwrap(), Some(1_700_000_000));
        assert_eq!(t.row_ref(1).unwrap().parse_int::<u32>("appid").unwrap(), None);
        assert!(t.row_ref(2).unwrap().parse_int::<u32>("appid").is_err());
    }

    #[test]
    fn push_column_checks_length() {
        let mut t = esrb();
        assert!(t.push_column("x", vec![s!("1")]).is_err());
        t.push_column("x", vec![s!("1"), s!("2"), s!("3")]).unwrap();
        assert_eq!(t.rows[2].last().unwrap(), "3");
    }
}
