// tests/detail_retry.rs
mod common;

use std::time::Duration;

use esrb_scrape::core::net::HttpResponse;
use esrb_scrape::progress::NullProgress;
use esrb_scrape::scrape::fetch_many;
use esrb_scrape::steam::{Backoff, RetryPolicy, SteamClient};

use common::{config, details, FakeSteam, RecordingSleeper, Scripted, StopAfter};

#[test]
fn two_rate_limits_then_success_takes_three_attempts() {
    let transport = Scripted::new(vec![
        HttpResponse::new(429, ""),
        HttpResponse::new(429, ""),
        details(10, "Ten", "short"),
    ]);
    let sleeper = RecordingSleeper::default();
    let client = SteamClient::with_transport(&config(), &transport, &sleeper);

    let detail = client.fetch_details(10, &RetryPolicy::default());

    assert_eq!(detail.map(|d| d.name), Some("Ten".to_string()));
    assert_eq!(transport.calls(), 3);
    assert_eq!(sleeper.pauses(), vec![Duration::from_secs(1); 2]);
}

#[test]
fn permanent_rate_limit_gives_up_quietly() {
    let transport = Scripted::new(vec![HttpResponse::new(429, ""); 10]);
    let sleeper = RecordingSleeper::default();
    let client = SteamClient::with_transport(&config(), &transport, &sleeper);

    assert!(client.fetch_details(10, &RetryPolicy::default()).is_none());
    assert_eq!(transport.calls(), 3);
    // No pause after the final attempt
    assert_eq!(sleeper.pauses().len(), 2);
}

#[test]
fn other_http_errors_are_not_retried() {
    let transport = Scripted::new(vec![HttpResponse::new(503, ""), details(10, "Ten", "x")]);
    let sleeper = RecordingSleeper::default();
    let client = SteamClient::with_transport(&config(), &transport, &sleeper);

    assert!(client.fetch_details(10, &RetryPolicy::default()).is_none());
    assert_eq!(transport.calls(), 1);
    assert!(sleeper.pauses().is_empty());
}

#[test]
fn exponential_backoff_schedule() {
    let transport = Scripted::new(vec![HttpResponse::new(429, ""); 4]);
    let sleeper = RecordingSleeper::default();
    let client = SteamClient::with_transport(&config(), &transport, &sleeper);
    let policy = RetryPolicy::new(4, Duration::from_millis(100)).with_backoff(Backoff::Exponential { factor: 2 });

    assert!(client.fetch_details(1, &policy).is_none());
    assert_eq!(
        sleeper.pauses(),
        vec![Duration::from_millis(100), Duration::from_millis(200), Duration::from_millis(400)]
    );
}

#[test]
fn batch_contains_per_record_failures() {
    let steam = FakeSteam::new(&[])
        .with_detail(1, HttpResponse::new(500, "boom"))
        .with_detail(2, details(2, "Two", "<p>Fun <a href=x>link</a> game</p>"))
        .with_detail(3, HttpResponse::new(200, "not json"));
    let sleeper = RecordingSleeper::default();
    let client = SteamClient::with_transport(&config(), &steam, &sleeper);

    let ids = [Some(1), None, Some(2), Some(2), Some(3), Some(4)];
    let report = fetch_many(&client, &ids, &RetryPolicy::default(), Some(&mut NullProgress));

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].app_id, 2);
    assert_eq!(report.records[0].title, "Two");
    assert_eq!(report.records[0].description, "Fun   game");
    assert_eq!(report.failed, vec![1]);
    assert_eq!(report.absent, vec![3, 4]);
    assert_eq!(report.skipped_null, 1);
    // Duplicate id 2 fetched once
    assert_eq!(*steam.detail_calls.borrow(), vec![1, 2, 3, 4]);
}

#[test]
fn cancelling_keeps_what_was_fetched() {
    let steam = FakeSteam::new(&[])
        .with_detail(1, details(1, "One", "a"))
        .with_detail(2, HttpResponse::new(500, ""))
        .with_detail(3, details(3, "Three", "c"))
        .with_detail(4, details(4, "Four", "d"));
    let sleeper = RecordingSleeper::default();
    let client = SteamClient::with_transport(&config(), &steam, &sleeper);
    let mut stop = StopAfter::new(3);

    let ids = [Some(1), Some(2), Some(3), Some(4)];
    let report = fetch_many(&client, &ids, &RetryPolicy::default(), Some(&mut stop));

    assert!(report.cancelled);
    let titles: Vec<&str> = report.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["One", "Three"]);
    assert_eq!(report.failed, vec![2]);
    assert_eq!(*steam.detail_calls.borrow(), vec![1, 2, 3]);
    assert!(stop.finished);
}
