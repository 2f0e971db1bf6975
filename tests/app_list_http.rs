// tests/app_list_http.rs
//! App list enumeration over real HTTP against a local mock server.
mod common;

use mockito::{Matcher, Server};

use esrb_scrape::config::EnumerateOptions;
use esrb_scrape::error::FetchError;
use esrb_scrape::steam::SteamClient;

use common::{app_list_body, config};

const LIST_PATH: &str = "/IStoreService/GetAppList/v1/";

#[test]
fn pages_are_concatenated_in_order() {
    let mut server = Server::new();
    let first = server
        .mock("GET", LIST_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("key".into(), "test-key".into()),
            Matcher::UrlEncoded("last_appid".into(), "0".into()),
            Matcher::UrlEncoded("max_results".into(), "50000".into()),
            Matcher::UrlEncoded("include_games".into(), "true".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(app_list_body(&[(10, "Ten"), (20, "Twenty")], true))
        .expect(1)
        .create();
    let second = server
        .mock("GET", LIST_PATH)
        .match_query(Matcher::UrlEncoded("last_appid".into(), "20".into()))
        .with_status(200)
        .with_body(app_list_body(&[(30, "Thirty")], false))
        .expect(1)
        .create();

    let client = SteamClient::new(&config().with_base_url(&server.url())).unwrap();
    let apps = client.enumerate_all_apps(&EnumerateOptions::default()).unwrap();

    first.assert();
    second.assert();
    let ids: Vec<u32> = apps.iter().map(|a| a.app_id).collect();
    assert_eq!(ids, vec![10, 20, 30]);
    assert_eq!(apps[0].last_modified, Some(1_700_000_000));
}

#[test]
fn upstream_error_aborts_enumeration() {
    let mut server = Server::new();
    let _denied = server
        .mock("GET", LIST_PATH)
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body("Forbidden")
        .create();

    let client = SteamClient::new(&config().with_base_url(&server.url())).unwrap();
    let err = client.enumerate_all_apps(&EnumerateOptions::default()).unwrap_err();
    assert!(matches!(err, FetchError::Upstream { status: 403, .. }));
}

#[test]
fn details_rate_limit_maps_to_error() {
    let mut server = Server::new();
    let _limited = server
        .mock("GET", "/api/appdetails")
        .match_query(Matcher::UrlEncoded("appids".into(), "7".into()))
        .with_status(429)
        .create();

    let client = SteamClient::new(&config().with_base_url(&server.url())).unwrap();
    assert!(client.get_app_details(7).unwrap_err().is_rate_limited());
}
