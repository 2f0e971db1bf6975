// src/core/mod.rs

pub mod html;
pub mod net;

pub use html::clean_html;
pub use net::{HttpResponse, HttpTransport, Sleeper, ThreadSleeper, Transport};
