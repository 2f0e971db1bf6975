// src/steam/client.rs
use serde_json::Value;
use tracing::{debug, info, warn};

use super::models::{AppDetail, AppListEnvelope, AppListPage, AppSummary};
use super::retry::{RetryOutcome, RetryPolicy};
use crate::config::consts::{APP_DETAILS_PATH, APP_LIST_PATH};
use crate::config::{Config, EnumerateOptions};
use crate::core::net::{HttpTransport, Sleeper, ThreadSleeper, Transport};
use crate::error::FetchError;

/// Client for the app list and app details endpoints.
pub struct SteamClient<T = HttpTransport, S = ThreadSleeper> {
    transport: T,
    sleeper: S,
    api_key: String,
    list_url: String,
    details_url: String,
}

impl SteamClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, transport, ThreadSleeper))
    }
}

impl<T: Transport, S: Sleeper> SteamClient<T, S> {
    pub fn with_transport(config: &Config, transport: T, sleeper: S) -> Self {
        Self {
            transport,
            sleeper,
            api_key: config.api_key.clone(),
            list_url: join!(&config.api_url, APP_LIST_PATH),
            details_url: join!(&config.store_url, APP_DETAILS_PATH),
        }
    }

    pub fn sleeper(&self) -> &S { &self.sleeper }

    /// One page of the app list, starting after `last_appid` (0 = start).
    pub fn get_app_list(
        &self,
        opts: &EnumerateOptions,
        last_appid: u32,
    ) -> Result<AppListPage, FetchError> {
        let query = [
            ("key", self.api_key.clone()),
            ("max_results", opts.page_size().to_string()),
            ("include_games", opts.include_games.to_string()),
            ("include_dlc", opts.include_dlc.to_string()),
            ("include_software", opts.include_software.to_string()),
            ("include_videos", opts.include_videos.to_string()),
            ("include_hardware", opts.include_hardware.to_string()),
            ("last_appid", last_appid.to_string()),
        ];

        let resp = self.transport.get(&self.list_url, &query)?;
        if !resp.is_success() {
            return Err(FetchError::Upstream { status: resp.status, url: self.list_url.clone() });
        }

        let env: AppListEnvelope = serde_json::from_str(&resp.body)
            .map_err(|e| FetchError::Malformed(format!("app list: {e}")))?;
        Ok(AppListPage {
            apps: env.response.apps,
            have_more_results: env.response.have_more_results,
            last_appid: env.response.last_appid,
        })
    }

    /// Every app the list endpoint reports, in server pagination order.
    /// A failed page aborts the whole enumeration.
    pub fn enumerate_all_apps(&self, opts: &EnumerateOptions) -> Result<Vec<AppSummary>, FetchError> {
        if opts.max_results != opts.page_size() {
            debug!(requested = opts.max_results, sent = opts.page_size(), "page size capped");
        }

        let mut all = Vec::new();
        let mut cursor = 0u32;
        let mut pages = 0usize;
        loop {
            let page = self.get_app_list(opts, cursor)?;
            pages += 1;
            debug!(page = pages, apps = page.apps.len(), cursor, "app list page");
            all.extend(page.apps);

            if !page.have_more_results {
                break;
            }
            match page.last_appid {
                Some(next) if next != cursor => cursor = next,
                other => {
                    warn!(?other, cursor, "app list claims more results but cursor did not advance; stopping");
                    break;
                }
            }
        }
        info!(apps = all.len(), pages, "enumerated app list");
        Ok(all)
    }

    /// Details for one app, single attempt.
    ///
    /// `Ok(None)` when the store answers but has nothing for the id
    /// (`success: false`, or no `data` object).
    pub fn get_app_details(&self, app_id: u32) -> Result<Option<AppDetail>, FetchError> {
        let resp = self.transport.get(&self.details_url, &[("appids", app_id.to_string())])?;
        match resp.status {
            429 => return Err(FetchError::RateLimited { url: self.details_url.clone() }),
            s if !resp.is_success() => {
                return Err(FetchError::Upstream { status: s, url: self.details_url.clone() });
            }
            _ => {}
        }

        let body: Value = serde_json::from_str(&resp.body)
            .map_err(|e| FetchError::Malformed(format!("app {app_id}: {e}")))?;
        let Some(entry) = body.get(app_id.to_string()) else {
            return Ok(None);
        };
        if !entry.get("success").and_then(Value::as_bool).unwrap_or(false) {
            return Ok(None);
        }
        match entry.get("data") {
            Some(data @ Value::Object(_)) => serde_json::from_value(data.clone())
                .map(Some)
                .map_err(|e| FetchError::Malformed(format!("app {app_id}: {e}"))),
            _ => Ok(None),
        }
    }

    /// Details for one app under `policy`. Rate limits are retried; any other
    /// failure, and a malformed payload, count as absent.
    pub fn fetch_details(&self, app_id: u32, policy: &RetryPolicy) -> Option<AppDetail> {
        match self.fetch_details_outcome(app_id, policy) {
            RetryOutcome::Done { value, .. } => value,
            RetryOutcome::Aborted { error, .. } => {
                warn!("app {app_id}: {error}");
                None
            }
            RetryOutcome::Exhausted { attempts, .. } => {
                warn!("app {app_id}: still rate limited after {attempts} attempts");
                None
            }
        }
    }

    pub(crate) fn fetch_details_outcome(
        &self,
        app_id: u32,
        policy: &RetryPolicy,
    ) -> RetryOutcome<Option<AppDetail>> {
        policy.run(&self.sleeper, |_| self.get_app_details(app_id))
    }
}
