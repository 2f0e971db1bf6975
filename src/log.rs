// src/log.rs
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::consts::{DEFAULT_LOG_FILTER, LOG_FILE, STORE_DIR};
use crate::file::ensure_directory;

static START: OnceLock<Instant> = OnceLock::new();

fn start() -> Instant {
    *START.get_or_init(Instant::now)
}

fn fmt_elapsed(ms: u128) -> String {
    let total_ms = ms as u64;
    let h = total_ms / 3_600_000;
    let m = (total_ms % 3_600_000) / 60_000;
    let s = (total_ms % 60_000) / 1_000;
    let ms = total_ms % 1_000;
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

/// `[hh:mm:ss.mmm]` since process start.
#[derive(Clone, Copy, Debug, Default)]
pub struct Uptime;

impl FormatTime for Uptime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "[{}]", fmt_elapsed(start().elapsed().as_millis()))
    }
}

fn open_log_file(dir: &Path) -> Option<File> {
    ensure_directory(dir).ok()?;
    OpenOptions::new().create(true).append(true).open(dir.join(LOG_FILE)).ok()
}

/// Install the global subscriber: stderr plus an append-only file under the
/// local store dir. `RUST_LOG` overrides the default filter.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    start();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let stderr = fmt::layer().with_timer(Uptime).with_target(false).with_writer(std::io::stderr);
    let file = open_log_file(Path::new(STORE_DIR)).map(|f| {
        fmt::layer()
            .with_timer(Uptime)
            .with_ansi(false)
            .with_writer(Mutex::new(f))
    });

    let _ = tracing_subscriber::registry().with(filter).with(stderr).with(file).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_format() {
        assert_eq!(fmt_elapsed(0), "00:00:00.000");
        assert_eq!(fmt_elapsed(3_723_004), "01:02:03.004");
    }

    #[test]
    fn init_twice_is_fine() {
        init();
        init();
        tracing::info!("logging initialised");
    }
}
