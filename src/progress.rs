// src/progress.rs
use tracing::{info, warn};

/// Lightweight progress reporting used by long-running fetch loops.
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the total number of items (if known).
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one app id was handled successfully.
    fn item_done(&mut self, _id: u32) {}

    /// Called when one app id was given up on.
    fn item_failed(&mut self, _id: u32) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}

    /// Polled between items; `true` stops the loop and keeps what was fetched.
    fn cancelled(&self) -> bool { false }
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Progress sink that reports through `tracing`.
#[derive(Default)]
pub struct LogProgress {
    done: usize,
    failed: usize,
    total: usize,
}

impl LogProgress {
    fn position(&self) -> usize { self.done + self.failed }
}

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
        self.failed = 0;
    }
    fn log(&mut self, msg: &str) {
        info!("{msg}");
    }
    fn item_done(&mut self, id: u32) {
        self.done += 1;
        info!("Fetched details for app_id {id} ({}/{})", self.position(), self.total);
    }
    fn item_failed(&mut self, id: u32) {
        self.failed += 1;
        warn!("Failed to fetch details for app_id {id} ({}/{})", self.position(), self.total);
    }
    fn finish(&mut self) {
        if self.total == 0 {
            info!("Fetch complete");
        } else {
            info!("Fetch complete ({} ok, {} failed, {} total)", self.done, self.failed, self.total);
        }
    }
}
