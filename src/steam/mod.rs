// src/steam/mod.rs
//! # Steam store access
//!
//! Everything that talks to the two upstream endpoints:
//!
//! - `IStoreService/GetAppList/v1` (needs an API key, paginated by `last_appid`)
//! - `store.steampowered.com/api/appdetails` (one app per call, rate limited)
//!
//! `client` issues the calls and maps statuses onto `FetchError`; `retry`
//! decides what happens after a 429; `models` holds the wire shapes and the
//! flat records persisted by the pipeline.
//!
//! Batch loops over many ids (progress, per-record failure containment,
//! polite pauses) live one layer up in `scrape`.
pub mod client;
pub mod models;
pub mod retry;

pub use client::SteamClient;
pub use models::{AppDetail, AppListPage, AppSummary, DescriptionRecord, GameRecord, ScanRecord};
pub use retry::{Backoff, RetryOutcome, RetryPolicy};
