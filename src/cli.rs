// src/cli.rs
use std::path::PathBuf;

use tracing::info;

use crate::config::consts::DEFAULT_CLEAN_COLUMN;
use crate::config::{Config, DataPaths, EnumerateOptions, ScanOptions};
use crate::error::{PipelineError, Result};
use crate::progress::LogProgress;
use crate::runner::{self, PipelineOptions};
use crate::steam::SteamClient;

pub const HELP: &str = include_str!("cli_help.txt");

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Pipeline,
    Verify,
    Scan,
    Collect,
    Clean { input: PathBuf, output: PathBuf, column: String },
    Train { input: Option<PathBuf> },
    Help,
}

impl Command {
    /// Whether the command talks to the app list endpoint (and so needs a key).
    pub fn needs_api_key(&self) -> bool {
        matches!(self, Command::Pipeline | Command::Scan | Command::Collect)
    }
}

/// Arguments after the program name.
pub fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(first) = args.next() else { return Ok(Command::Pipeline) };

    let cmd = match first.as_str() {
        "-h" | "--help" | "help" => Command::Help,
        "verify" => Command::Verify,
        "scan" => Command::Scan,
        "collect" => Command::Collect,
        "clean" => {
            let input = args.next().ok_or_else(|| usage("clean: missing input path"))?;
            let output = args.next().ok_or_else(|| usage("clean: missing output path"))?;
            let column = args.next().unwrap_or_else(|| s!(DEFAULT_CLEAN_COLUMN));
            Command::Clean { input: input.into(), output: output.into(), column }
        }
        "train" => Command::Train { input: args.next().map(PathBuf::from) },
        other => return Err(usage(&format!("Unknown arg: {other}"))),
    };

    if let Some(extra) = args.next() {
        return Err(usage(&format!("Unexpected arg: {extra}")));
    }
    Ok(cmd)
}

fn usage(msg: &str) -> PipelineError {
    PipelineError::Usage(format!("{msg}\n\n{HELP}"))
}

/// Run one command to completion, printing reports to stdout.
pub fn run(cmd: Command) -> Result<()> {
    let paths = DataPaths::from_env();
    let config = if cmd.needs_api_key() { Some(Config::from_env()?) } else { None };
    let client = || -> Result<SteamClient> {
        let config = config.as_ref().ok_or_else(|| PipelineError::Data(s!("no configuration loaded")))?;
        info!(?config, "configuration loaded");
        Ok(SteamClient::new(config)?)
    };

    match cmd {
        Command::Help => println!("{HELP}"),
        Command::Pipeline => {
            let mut progress = LogProgress::default();
            let summary = runner::run_pipeline(&client()?, &paths, &PipelineOptions::default(), Some(&mut progress))?;
            info!(
                apps = summary.apps,
                reference_rows = summary.reference_rows,
                matched = summary.matched_titles,
                descriptions = summary.descriptions,
                "pipeline finished"
            );
            for f in &summary.files_written {
                println!("Wrote {}", f.display());
            }
            print!("{}", summary.report);
        }
        Command::Verify => print!("{}", runner::run_verify(&paths)?),
        Command::Scan => {
            let mut progress = LogProgress::default();
            let out = runner::run_scan(
                &client()?,
                &paths,
                &EnumerateOptions::default(),
                &ScanOptions::default(),
                Some(&mut progress),
            )?;
            println!("Data saved to {}", out.display());
        }
        Command::Collect => {
            let mut progress = LogProgress::default();
            let out = runner::run_collect(&client()?, &paths, &PipelineOptions::default(), Some(&mut progress))?;
            println!("Data saved to {}", out.display());
        }
        Command::Clean { input, output, column } => {
            runner::run_clean(&input, &output, &column)?;
            println!("Cleaned data saved to {}", output.display());
        }
        Command::Train { input } => {
            let outcome = runner::run_train(&paths, input.as_deref())?;
            println!("Selected features: {}", outcome.selected_features.join(", "));
            print!("{}", outcome.report);
        }
    }
    Ok(())
}

/// Process exit code for a failed run.
pub fn exit_code(err: &PipelineError) -> i32 {
    match err {
        PipelineError::Config(_) => 2,
        PipelineError::Fetch(_) => 3,
        PipelineError::Io(_)
        | PipelineError::Csv { .. }
        | PipelineError::MissingColumn { .. }
        | PipelineError::Data(_) => 4,
        PipelineError::Usage(_) => 64,
    }
}
