// src/scrape/catalog.rs
//! Scan of the whole app catalog for a few games per ESRB rating.
//!
//! Unlike the targeted detail fetch there is no retry here: every request is
//! followed by the polite pause, whatever came back, and anything that is not
//! a usable game record is skipped.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::config::ScanOptions;
use crate::core::net::{Sleeper, Transport};
use crate::progress::Progress;
use crate::steam::{AppSummary, ScanRecord, SteamClient};

pub fn scan_catalog<T, S>(
    client: &SteamClient<T, S>,
    apps: &[AppSummary],
    opts: &ScanOptions,
    mut progress: Option<&mut dyn Progress>,
) -> Vec<ScanRecord>
where
    T: Transport,
    S: Sleeper,
{
    let mut found: BTreeMap<&str, Vec<ScanRecord>> =
        opts.target_ratings.iter().map(|r| (r.as_str(), Vec::new())).collect();
    let quota_met = |found: &BTreeMap<&str, Vec<ScanRecord>>| {
        found.values().all(|v| v.len() >= opts.per_rating)
    };

    if let Some(p) = progress.as_deref_mut() {
        p.begin(apps.len());
    }

    for app in apps {
        if quota_met(&found) {
            break;
        }
        if progress.as_deref().is_some_and(|p| p.cancelled()) {
            warn!("catalog scan cancelled");
            break;
        }

        match client.get_app_details(app.app_id) {
            Ok(Some(detail)) if detail.is_game() => {
                debug!(app_id = app.app_id, name = %detail.name, "game found");
                if let Some(rating) = detail.esrb_rating() {
                    if let Some(bucket) = found.get_mut(rating.as_str()) {
                        if bucket.len() < opts.per_rating {
                            let msg = format!("Added {} game: {}", rating.to_uppercase(), detail.name);
                            match progress.as_deref_mut() {
                                Some(p) => p.log(&msg),
                                None => info!("{msg}"),
                            }
                            bucket.push(ScanRecord {
                                steam_appid: app.app_id,
                                name: detail.name.clone(),
                                about_the_game: detail.about_the_game.clone().unwrap_or_default(),
                                esrb_rating: rating.clone(),
                            });
                        }
                    }
                }
                if let Some(p) = progress.as_deref_mut() { p.item_done(app.app_id); }
            }
            Ok(_) => {
                if let Some(p) = progress.as_deref_mut() { p.item_done(app.app_id); }
            }
            Err(e) => {
                warn!("Failed to process appid {}: {e}", app.app_id);
                if let Some(p) = progress.as_deref_mut() { p.item_failed(app.app_id); }
            }
        }

        client.sleeper().sleep(opts.polite_delay);
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }

    // Output grouped in target order (m, e, t by default)
    let mut out = Vec::new();
    for r in &opts.target_ratings {
        if let Some(v) = found.remove(r.as_str()) {
            out.extend(v);
        }
    }
    info!(records = out.len(), "catalog scan finished");
    out
}
