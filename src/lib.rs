// src/lib.rs

#[macro_use]
pub mod macros;

pub mod cli;
pub mod config;
pub mod core;
pub mod csv;
pub mod error;
pub mod file;
pub mod log;
pub mod pipeline;
pub mod progress;
pub mod runner;
pub mod scrape;
pub mod steam;
pub mod store;
pub mod table;
pub mod train;
