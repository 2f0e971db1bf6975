// src/runner.rs
//! Stage orchestration shared by every frontend.
//!
//! Each stage reads its inputs, does its work, and writes its output file
//! only once it is complete. Cached inputs go through `store::Cache`.
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::consts::DISTRIBUTION_TOLERANCE;
use crate::config::{DataPaths, EnumerateOptions, ScanOptions};
use crate::core::net::{Sleeper, Transport};
use crate::error::Result;
use crate::pipeline::{
    self, assign_app_ids, build_split, descriptions_table, load_esrb, unique_app_ids,
    DuplicatePolicy, Split, TitleIndex, VerifyReport,
};
use crate::progress::Progress;
use crate::scrape::{collect_game_data, fetch_many, scan_catalog};
use crate::steam::{AppSummary, DescriptionRecord, GameRecord, RetryPolicy, ScanRecord, SteamClient};
use crate::store::{Cache, CsvCache, CsvRecord};
use crate::table::Table;
use crate::train::{train_model, MultinomialNb, TrainOptions, TrainOutcome, TrainingSpec};

/// Knobs for the fetch-and-join run.
#[derive(Clone, Debug)]
pub struct PipelineOptions {
    pub enumerate: EnumerateOptions,
    pub retry: RetryPolicy,
    pub duplicates: DuplicatePolicy,
    pub tolerance: f64,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            enumerate: EnumerateOptions::default(),
            retry: RetryPolicy::default(),
            duplicates: DuplicatePolicy::default(),
            tolerance: DISTRIBUTION_TOLERANCE,
        }
    }
}

/// Summary of what was produced.
#[derive(Debug)]
pub struct RunSummary {
    pub files_written: Vec<PathBuf>,
    pub apps: usize,
    pub reference_rows: usize,
    pub matched_titles: usize,
    pub descriptions: usize,
    pub report: VerifyReport,
}

/// The app catalog: cached file if present, otherwise a full enumeration
/// that is then cached.
pub fn load_or_enumerate_apps<T, S>(
    client: &SteamClient<T, S>,
    paths: &DataPaths,
    opts: &EnumerateOptions,
) -> Result<Vec<AppSummary>>
where
    T: Transport,
    S: Sleeper,
{
    let cache = CsvCache::<AppSummary>::new(paths.apps());
    if let Some(apps) = cache.load_if_present()? {
        return Ok(apps);
    }
    info!("Fetching all Steam apps...");
    let apps = client.enumerate_all_apps(opts)?;
    cache.store(&apps)?;
    Ok(apps)
}

/// Train and test references, plus both stacked with an `app_id` column.
struct Reference {
    train: Table,
    test: Table,
    combined: Table,
    apps: usize,
    matched: usize,
}

fn map_reference<T, S>(
    client: &SteamClient<T, S>,
    paths: &DataPaths,
    opts: &PipelineOptions,
) -> Result<Reference>
where
    T: Transport,
    S: Sleeper,
{
    let (train, test) = load_esrb(&paths.train_esrb(), &paths.test_esrb())?;
    let mut combined = train.concat(&test).with_label("esrb reference");

    let apps = load_or_enumerate_apps(client, paths, &opts.enumerate)?;
    let index = TitleIndex::build(&apps, opts.duplicates)?;
    let matched = assign_app_ids(&mut combined, &index)?;
    Ok(Reference { train, test, combined, apps: apps.len(), matched })
}

/// Full run: catalog → title mapping → descriptions → joined splits → verify.
pub fn run_pipeline<T, S>(
    client: &SteamClient<T, S>,
    paths: &DataPaths,
    opts: &PipelineOptions,
    progress: Option<&mut dyn Progress>,
) -> Result<RunSummary>
where
    T: Transport,
    S: Sleeper,
{
    let reference = map_reference(client, paths, opts)?;

    let cache = CsvCache::<DescriptionRecord>::new(paths.descriptions());
    let records = match cache.load_if_present()? {
        Some(records) => records,
        None => {
            info!("Fetching descriptions for all app IDs...");
            let ids = unique_app_ids(&reference.combined)?;
            let report = fetch_many(client, &ids, &opts.retry, progress);
            if report.cancelled {
                warn!(kept = report.records.len(), "saving partial descriptions");
            }
            cache.store(&report.records)?;
            report.records
        }
    };
    let descriptions = descriptions_table(&records);

    let dir = paths.processed_dir();
    let mut files_written = Vec::new();
    for (split, table) in [(Split::Train, &reference.train), (Split::Test, &reference.test)] {
        let outputs = build_split(table, &descriptions)?;
        outputs.write(split, &dir)?;
        files_written.push(split.description_based_path(&dir));
        files_written.push(split.original_filtered_path(&dir));
    }
    info!(dir = %dir.display(), "Data collection complete");

    let report = pipeline::verify_outputs(paths, opts.tolerance)?;
    Ok(RunSummary {
        files_written,
        apps: reference.apps,
        reference_rows: reference.combined.len(),
        matched_titles: reference.matched,
        descriptions: records.len(),
        report,
    })
}

/// Sample a few games per ESRB rating from the whole catalog.
pub fn run_scan<T, S>(
    client: &SteamClient<T, S>,
    paths: &DataPaths,
    enumerate: &EnumerateOptions,
    opts: &ScanOptions,
    progress: Option<&mut dyn Progress>,
) -> Result<PathBuf>
where
    T: Transport,
    S: Sleeper,
{
    let apps = load_or_enumerate_apps(client, paths, enumerate)?;
    let games = scan_catalog(client, &apps, opts, progress);
    let out = paths.scan();
    CsvCache::<ScanRecord>::new(&out).store(&games)?;
    Ok(out)
}

/// Full detail rows for every reference title found in the catalog.
pub fn run_collect<T, S>(
    client: &SteamClient<T, S>,
    paths: &DataPaths,
    opts: &PipelineOptions,
    progress: Option<&mut dyn Progress>,
) -> Result<PathBuf>
where
    T: Transport,
    S: Sleeper,
{
    let reference = map_reference(client, paths, opts)?;
    let ids = unique_app_ids(&reference.combined)?;
    let report = collect_game_data(client, &ids, &opts.retry, progress);
    let out = paths.game_details();
    GameRecord::to_table(&report.records).write(&out)?;
    info!(rows = report.records.len(), path = %out.display(), "saved game details");
    Ok(out)
}

pub fn run_verify(paths: &DataPaths) -> Result<VerifyReport> {
    pipeline::verify_outputs(paths, DISTRIBUTION_TOLERANCE)
}

pub fn run_clean(input: &Path, output: &Path, column: &str) -> Result<usize> {
    pipeline::clean_dataset(input, output, column)
}

/// Train on `input`. Without one, the cleaned details table is used, or the
/// raw one when it has not been cleaned yet.
pub fn run_train(paths: &DataPaths, input: Option<&Path>) -> Result<TrainOutcome<MultinomialNb>> {
    let path = match input {
        Some(p) => p.to_path_buf(),
        None if paths.cleaned_details().is_file() => paths.cleaned_details(),
        None => paths.game_details(),
    };
    let table = Table::read(&path)?;
    let spec = TrainingSpec::detect(&table)?;
    info!(path = %path.display(), text = %spec.text, "training");
    train_model(&table, &spec, &TrainOptions::default(), MultinomialNb::default())
}
