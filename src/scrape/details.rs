// src/scrape/details.rs
//! Bulk detail fetches over a list of app ids.
//!
//! Every id is isolated: a rate limit is retried under the policy, any other
//! failure is logged and the loop moves on. Nothing here aborts the batch.

use std::collections::HashSet;

use tracing::{error, info, warn};

use crate::core::clean_html;
use crate::core::net::{Sleeper, Transport};
use crate::error::FetchError;
use crate::progress::Progress;
use crate::steam::models::NOT_AVAILABLE;
use crate::steam::{AppDetail, DescriptionRecord, GameRecord, RetryOutcome, RetryPolicy, SteamClient};

/// What a batch produced, including the ids it could not get.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchReport<R> {
    pub records: Vec<R>,
    /// Ids given up on: HTTP errors, transport errors, retries exhausted.
    pub failed: Vec<u32>,
    /// Ids the store answered for but had no data (`success: false`, bad payload).
    pub absent: Vec<u32>,
    /// Null entries in the input.
    pub skipped_null: usize,
    /// Set when the progress sink asked to stop; `records` holds what was fetched so far.
    pub cancelled: bool,
}

/// Short descriptions for `app_ids`, cleaned of markup.
pub fn fetch_many<T, S>(
    client: &SteamClient<T, S>,
    app_ids: &[Option<u32>],
    policy: &RetryPolicy,
    progress: Option<&mut dyn Progress>,
) -> FetchReport<DescriptionRecord>
where
    T: Transport,
    S: Sleeper,
{
    fetch_each(client, app_ids, policy, progress, |app_id, d| DescriptionRecord {
        app_id,
        title: if d.name.is_empty() { s!(NOT_AVAILABLE) } else { d.name.clone() },
        description: clean_html(d.short_description.as_deref().unwrap_or(NOT_AVAILABLE)),
    })
}

/// Full flattened detail rows for `app_ids`.
pub fn collect_game_data<T, S>(
    client: &SteamClient<T, S>,
    app_ids: &[Option<u32>],
    policy: &RetryPolicy,
    progress: Option<&mut dyn Progress>,
) -> FetchReport<GameRecord>
where
    T: Transport,
    S: Sleeper,
{
    fetch_each(client, app_ids, policy, progress, GameRecord::from_detail)
}

fn fetch_each<T, S, R, F>(
    client: &SteamClient<T, S>,
    app_ids: &[Option<u32>],
    policy: &RetryPolicy,
    mut progress: Option<&mut dyn Progress>,
    shape: F,
) -> FetchReport<R>
where
    T: Transport,
    S: Sleeper,
    F: Fn(u32, &AppDetail) -> R,
{
    let mut report = FetchReport {
        records: Vec::new(),
        failed: Vec::new(),
        absent: Vec::new(),
        skipped_null: 0,
        cancelled: false,
    };

    // Unique, non-null, first-seen order
    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(app_ids.len());
    for id in app_ids {
        match id {
            Some(id) if seen.insert(*id) => ids.push(*id),
            Some(_) => {}
            None => report.skipped_null += 1,
        }
    }

    if let Some(p) = progress.as_deref_mut() {
        p.begin(ids.len());
    }

    for &app_id in &ids {
        if progress.as_deref().is_some_and(|p| p.cancelled()) {
            warn!(fetched = report.records.len(), "detail fetch cancelled; keeping partial results");
            report.cancelled = true;
            break;
        }

        let mut ok = true;
        match client.fetch_details_outcome(app_id, policy) {
            RetryOutcome::Done { value: Some(detail), .. } => {
                report.records.push(shape(app_id, &detail));
            }
            RetryOutcome::Done { value: None, .. } => report.absent.push(app_id),
            RetryOutcome::Aborted { error: FetchError::Malformed(msg), .. } => {
                warn!("app_id {app_id}: malformed response ({msg}); skipping");
                report.absent.push(app_id);
            }
            RetryOutcome::Aborted { error, .. } => {
                error!("app_id {app_id}: {error}");
                report.failed.push(app_id);
                ok = false;
            }
            RetryOutcome::Exhausted { attempts, .. } => {
                error!("Failed to fetch details for app_id {app_id} after {attempts} attempts");
                report.failed.push(app_id);
                ok = false;
            }
        }

        if let Some(p) = progress.as_deref_mut() {
            if ok { p.item_done(app_id) } else { p.item_failed(app_id) }
        }
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    info!(
        fetched = report.records.len(),
        absent = report.absent.len(),
        failed = report.failed.len(),
        skipped_null = report.skipped_null,
        "detail fetch finished"
    );
    report
}
