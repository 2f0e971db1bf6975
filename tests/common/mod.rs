// tests/common/mod.rs
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::Path;
use std::time::Duration;

use esrb_scrape::config::Config;
use esrb_scrape::core::net::{HttpResponse, Sleeper, Transport};
use esrb_scrape::error::FetchError;
use esrb_scrape::progress::Progress;

pub fn config() -> Config {
    Config::new("test-key").unwrap()
}

/// Replays canned responses in order; 500 once they run out.
#[derive(Default)]
pub struct Scripted {
    replies: RefCell<VecDeque<HttpResponse>>,
    pub calls: RefCell<Vec<String>>,
}

impl Scripted {
    pub fn new(replies: Vec<HttpResponse>) -> Self {
        Self { replies: RefCell::new(replies.into()), calls: RefCell::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize { self.calls.borrow().len() }
}

impl Transport for Scripted {
    fn get(&self, url: &str, _query: &[(&str, String)]) -> Result<HttpResponse, FetchError> {
        self.calls.borrow_mut().push(url.to_string());
        Ok(self.replies.borrow_mut().pop_front().unwrap_or_else(|| HttpResponse::new(500, "")))
    }
}

/// Records every pause instead of sleeping.
#[derive(Default)]
pub struct RecordingSleeper {
    pub slept: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn pauses(&self) -> Vec<Duration> { self.slept.borrow().clone() }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, d: Duration) {
        self.slept.borrow_mut().push(d);
    }
}

/// Asks the fetch loop to stop once `limit` ids were handled.
pub struct StopAfter {
    pub limit: usize,
    pub handled: usize,
    pub finished: bool,
}

impl StopAfter {
    pub fn new(limit: usize) -> Self {
        Self { limit, handled: 0, finished: false }
    }
}

impl Progress for StopAfter {
    fn item_done(&mut self, _id: u32) { self.handled += 1; }
    fn item_failed(&mut self, _id: u32) { self.handled += 1; }
    fn finish(&mut self) { self.finished = true; }
    fn cancelled(&self) -> bool { self.handled >= self.limit }
}

/// A tiny in-memory Steam: one-page app list plus per-id detail replies.
#[derive(Default)]
pub struct FakeSteam {
    apps: Vec<(u32, String)>,
    details: HashMap<u32, HttpResponse>,
    pub list_calls: RefCell<usize>,
    pub detail_calls: RefCell<Vec<u32>>,
}

impl FakeSteam {
    pub fn new(apps: &[(u32, &str)]) -> Self {
        Self {
            apps: apps.iter().map(|(id, n)| (*id, n.to_string())).collect(),
            ..Self::default()
        }
    }

    pub fn with_detail(mut self, app_id: u32, reply: HttpResponse) -> Self {
        self.details.insert(app_id, reply);
        self
    }
}

impl Transport for FakeSteam {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse, FetchError> {
        if url.contains("GetAppList") {
            *self.list_calls.borrow_mut() += 1;
            let ids: Vec<(u32, &str)> = self.apps.iter().map(|(i, n)| (*i, n.as_str())).collect();
            return Ok(app_list_page(&ids, false));
        }
        let id: u32 = query
            .iter()
            .find(|(k, _)| *k == "appids")
            .and_then(|(_, v)| v.parse().ok())
            .ok_or_else(|| FetchError::Transport("no appids".into()))?;
        self.detail_calls.borrow_mut().push(id);
        Ok(self
            .details
            .get(&id)
            .cloned()
            .unwrap_or_else(|| HttpResponse::new(200, format!(r#"{{"{id}":{{"success":false}}}}"#))))
    }
}

pub fn app_list_page(apps: &[(u32, &str)], more: bool) -> HttpResponse {
    HttpResponse::new(200, app_list_body(apps, more))
}

pub fn app_list_body(apps: &[(u32, &str)], more: bool) -> String {
    let items: Vec<String> = apps
        .iter()
        .map(|(id, name)| format!(r#"{{"appid":{id},"name":"{name}","last_modified":1700000000}}"#))
        .collect();
    let last = apps.last().map(|(id, _)| *id).unwrap_or(0);
    format!(
        r#"{{"response":{{"apps":[{}],"have_more_results":{more},"last_appid":{last}}}}}"#,
        items.join(",")
    )
}

pub fn details_body(app_id: u32, name: &str, short: &str, esrb: Option<&str>) -> String {
    let ratings = esrb
        .map(|r| format!(r#","ratings":{{"esrb":{{"rating":"{r}"}}}}"#))
        .unwrap_or_default();
    format!(
        r#"{{"{app_id}":{{"success":true,"data":{{"type":"game","name":"{name}","steam_appid":{app_id},"short_description":"{short}","detailed_description":"{short}","about_the_game":"{short}"{ratings}}}}}}}"#
    )
}

pub fn details(app_id: u32, name: &str, short: &str) -> HttpResponse {
    HttpResponse::new(200, details_body(app_id, name, short, None))
}

pub fn rated(app_id: u32, name: &str, esrb: &str) -> HttpResponse {
    HttpResponse::new(200, details_body(app_id, name, "about", Some(esrb)))
}

pub fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}
