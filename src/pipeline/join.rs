// src/pipeline/join.rs
//! Title → app id mapping and the inner join of ratings with descriptions.

use std::collections::HashMap;

use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::steam::{AppSummary, DescriptionRecord};
use crate::store::CsvRecord;
use crate::table::Table;

/// What to do when two catalog entries share a title.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    KeepFirst,
    /// Later entries overwrite earlier ones.
    #[default]
    KeepLast,
    /// Any duplicate title is an error.
    Reject,
}

#[derive(Clone, Debug, Default)]
pub struct TitleIndex {
    map: HashMap<String, u32>,
    duplicates: usize,
}

impl TitleIndex {
    pub fn build(apps: &[AppSummary], policy: DuplicatePolicy) -> Result<Self> {
        let mut map: HashMap<String, u32> = HashMap::with_capacity(apps.len());
        let mut duplicates = 0usize;
        for app in apps {
            if app.name.is_empty() {
                continue;
            }
            match map.get(&app.name) {
                Some(&prev) if prev != app.app_id => {
                    duplicates += 1;
                    match policy {
                        DuplicatePolicy::KeepFirst => {}
                        DuplicatePolicy::KeepLast => { map.insert(app.name.clone(), app.app_id); }
                        DuplicatePolicy::Reject => {
                            return Err(PipelineError::Data(format!(
                                "duplicate title {:?} (app ids {prev} and {})",
                                app.name, app.app_id
                            )));
                        }
                    }
                }
                Some(_) => {}
                None => { map.insert(app.name.clone(), app.app_id); }
            }
        }
        if duplicates > 0 {
            warn!(duplicates, ?policy, "catalog has titles shared by several app ids");
        }
        info!(titles = map.len(), "title index built");
        Ok(Self { map, duplicates })
    }

    /// Empty titles never resolve.
    pub fn get(&self, title: &str) -> Option<u32> {
        if title.is_empty() { None } else { self.map.get(title).copied() }
    }
    pub fn len(&self) -> usize { self.map.len() }
    pub fn is_empty(&self) -> bool { self.map.is_empty() }
    pub fn duplicates(&self) -> usize { self.duplicates }
}

/// Append an `app_id` column looked up by `title`. Unmatched titles get an
/// empty cell (a missing value, never 0).
pub fn assign_app_ids(reference: &mut Table, index: &TitleIndex) -> Result<usize> {
    let ids: Vec<String> = reference
        .column("title")?
        .map(|t| index.get(t).map(|id| id.to_string()).unwrap_or_default())
        .collect();
    let matched = ids.iter().filter(|v| !v.is_empty()).count();
    info!(matched, total = ids.len(), "mapped reference titles to app ids");
    reference.push_column("app_id", ids)?;
    Ok(matched)
}

/// Distinct non-missing `app_id` values, first-seen order.
pub fn unique_app_ids(table: &Table) -> Result<Vec<Option<u32>>> {
    let mut out: Vec<Option<u32>> = Vec::new();
    for (i, row) in table.row_refs().enumerate() {
        let id: Option<u32> = row.parse_int("app_id").map_err(|msg| PipelineError::Csv {
            path: table.label.clone().into(),
            row: i + 2,
            msg,
        })?;
        if id.is_some() && !out.contains(&id) {
            out.push(id);
        }
    }
    Ok(out)
}

pub fn descriptions_table(records: &[DescriptionRecord]) -> Table {
    DescriptionRecord::to_table(records).with_label("descriptions")
}

/// Inner join on column `on`.
///
/// One output row per matching (left, right) pair, in left order, then right
/// order. Columns: all of left, then right's minus `on`; names present on
/// both sides get `_x` / `_y` suffixes. Empty keys never match.
pub fn merge_inner(left: &Table, right: &Table, on: &str) -> Result<Table> {
    let lk = left.require(on)?;
    let rk = right.require(on)?;

    let right_cols: Vec<usize> = (0..right.headers.len()).filter(|&i| i != rk).collect();
    let mut headers: Vec<String> = Vec::with_capacity(left.headers.len() + right_cols.len());
    for (i, h) in left.headers.iter().enumerate() {
        let clash = i != lk && right_cols.iter().any(|&j| &right.headers[j] == h);
        headers.push(if clash { join!(h, "_x") } else { h.clone() });
    }
    for &j in &right_cols {
        let h = &right.headers[j];
        let clash = left.headers.iter().enumerate().any(|(i, lh)| i != lk && lh == h);
        headers.push(if clash { join!(h, "_y") } else { h.clone() });
    }

    let mut by_key: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, r) in right.rows.iter().enumerate() {
        if !r[rk].is_empty() {
            by_key.entry(r[rk].as_str()).or_default().push(i);
        }
    }

    let mut out = Table { label: join!(&left.label, " ⋈ ", &right.label), headers, rows: Vec::new() };
    for l in &left.rows {
        let Some(matches) = by_key.get(l[lk].as_str()) else { continue };
        for &ri in matches {
            let r = &right.rows[ri];
            let mut row = l.clone();
            row.extend(right_cols.iter().map(|&j| r[j].clone()));
            out.rows.push(row);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(id: u32, name: &str) -> AppSummary {
        AppSummary { app_id: id, name: s!(name), last_modified: None, price_change_number: None }
    }

    #[test]
    fn duplicate_titles_follow_policy() {
        let apps = [app(1, "Doom"), app(2, "Doom"), app(3, "Quake")];
        let last = TitleIndex::build(&apps, DuplicatePolicy::KeepLast).unwrap();
        assert_eq!(last.get("Doom"), Some(2));
        assert_eq!(last.duplicates(), 1);

        let first = TitleIndex::build(&apps, DuplicatePolicy::KeepFirst).unwrap();
        assert_eq!(first.get("Doom"), Some(1));

        assert!(TitleIndex::build(&apps, DuplicatePolicy::Reject).is_err());
    }

    #[test]
    fn unmatched_titles_get_missing_ids() {
        let mut t = Table::from_csv_str("title,esrb_rating\nA,M\nZ,E\n");
        let idx = TitleIndex::build(&[app(7, "A")], DuplicatePolicy::default()).unwrap();
        assert_eq!(assign_app_ids(&mut t, &idx).unwrap(), 1);
        assert_eq!(t.rows[0][2], "7");
        assert_eq!(t.rows[1][2], "");
        assert_eq!(unique_app_ids(&t).unwrap(), vec![Some(7)]);
    }

    #[test]
    fn blank_titles_are_never_mapped() {
        let apps = [app(99, ""), app(7, "A")];
        let idx = TitleIndex::build(&apps, DuplicatePolicy::Reject).unwrap();
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.get(""), None);

        let mut t = Table::from_csv_str("title,esrb_rating\n,M\nA,E\n");
        assert_eq!(assign_app_ids(&mut t, &idx).unwrap(), 1);
        assert_eq!(t.rows[0][2], "");
        assert_eq!(unique_app_ids(&t).unwrap(), vec![Some(7)]);
    }

    #[test]
    fn merge_keeps_left_order_and_multiplies_duplicates() {
        let left = Table::from_csv_str("title,esrb_rating\nB,E\nA,M\nC,T\n");
        let right = Table::from_csv_str("app_id,title,description\n1,A,a1\n2,B,b\n3,A,a2\n");
        let m = merge_inner(&left, &right, "title").unwrap();
        assert_eq!(m.headers, vec!["title", "esrb_rating", "app_id", "description"]);
        let titles: Vec<_> = m.column("title").unwrap().collect();
        assert_eq!(titles, vec!["B", "A", "A"]);
        assert_eq!(m.rows[2][3], "a2");
    }

    #[test]
    fn merge_suffixes_clashing_columns() {
        let left = Table::from_csv_str("title,app_id\nA,1\n");
        let right = Table::from_csv_str("app_id,title\n2,A\n");
        let m = merge_inner(&left, &right, "title").unwrap();
        assert_eq!(m.headers, vec!["title", "app_id_x", "app_id_y"]);
    }

    #[test]
    fn empty_keys_never_match() {
        let left = Table::from_csv_str("title,x\n,1\n");
        let right = Table::from_csv_str("title,y\n,2\n");
        assert!(merge_inner(&left, &right, "title").unwrap().is_empty());
    }
}
