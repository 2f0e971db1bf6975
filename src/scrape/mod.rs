// src/scrape/mod.rs
mod catalog;
mod details;

pub use catalog::scan_catalog;
pub use details::{collect_game_data, fetch_many, FetchReport};
