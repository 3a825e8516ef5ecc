mod common;

use chrono::{Datelike, Utc};
use httpmock::prelude::*;
use portfolio_stats_fetcher::{pipeline::Completion, run_with, Source};
use serde_json::json;

use common::{read_json, Harness};

fn calendar(year: i32, counts: &[u32]) -> serde_json::Value {
    let contributions: Vec<_> = counts
        .iter()
        .enumerate()
        .map(|(i, count)| {
            json!({
                "date": format!("{year}-01-{:02}", i + 1),
                "count": count,
                "level": (*count).min(4),
            })
        })
        .collect();
    let total: u32 = counts.iter().sum();
    json!({ "total": { (year.to_string()): total }, "contributions": contributions })
}

#[tokio::test]
async fn failed_year_is_skipped_but_listed() {
    let server = MockServer::start_async().await;
    let current = Utc::now().year();

    // Year-scoped mocks first: the yearless mock would match them too.
    let good_year = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rizkyilhampra")
                .query_param("y", "2023");
            then.status(200).json_body(calendar(2023, &[3, 0, 7]));
        })
        .await;
    let bad_year = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rizkyilhampra")
                .query_param("y".to_string(), current.to_string());
            then.status(502).body("bad gateway");
        })
        .await;
    let discovery = server
        .mock_async(|when, then| {
            when.method(GET).path("/rizkyilhampra");
            then.status(200).json_body(json!({
                "total": { "2022": 0, "2023": 10, (current.to_string()): 0, "lastYear": 10 },
                "contributions": []
            }));
        })
        .await;

    let harness = Harness::new(&server, &[]);
    let completion = run_with(Source::GitHub, &harness.config).await.unwrap();

    discovery.assert_hits_async(1).await;
    good_year.assert_hits_async(1).await;
    bad_year.assert_hits_async(2).await;

    let Completion::Written { published, partial } = completion else {
        panic!("expected live artifacts");
    };
    assert!(partial);
    assert_eq!(published.len(), 2);
    assert_eq!(published[1].path, harness.path("github/years.json"));

    let manifest = read_json(&harness.path("github/years.json"));
    assert_eq!(manifest["years"], json!([2023, current]));
    assert!(manifest["fetchedAt"].is_string());

    let year = read_json(&harness.path("github/2023.json"));
    assert_eq!(year["year"], json!(2023));
    assert_eq!(year["fetchedAt"], manifest["fetchedAt"]);
    assert_eq!(year["contributions"][2], json!({ "date": "2023-01-03", "count": 7, "level": 4 }));
    assert!(!harness.path(&format!("github/{current}.json")).exists());
}

#[tokio::test]
async fn configured_username_addresses_every_call() {
    let server = MockServer::start_async().await;
    let current = Utc::now().year();

    let year = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/octocat")
                .query_param("y".to_string(), current.to_string());
            then.status(200).json_body(calendar(current, &[1, 2]));
        })
        .await;
    let discovery = server
        .mock_async(|when, then| {
            when.method(GET).path("/octocat");
            then.status(200).json_body(json!({ "total": {} }));
        })
        .await;

    let harness = Harness::new(&server, &[("GITHUB_USERNAME", "octocat")]);
    let completion = run_with(Source::GitHub, &harness.config).await.unwrap();

    discovery.assert_hits_async(1).await;
    year.assert_hits_async(1).await;
    assert!(matches!(completion, Completion::Written { partial: false, .. }));
    assert_eq!(read_json(&harness.path("github/years.json"))["years"], json!([current]));
    assert_eq!(
        read_json(&harness.path(&format!("github/{current}.json")))["contributions"]
            .as_array()
            .map(Vec::len),
        Some(2)
    );
}

#[tokio::test]
async fn discovery_failure_is_fatal() {
    let server = MockServer::start_async().await;
    let discovery = server
        .mock_async(|when, then| {
            when.method(GET).path("/rizkyilhampra");
            then.status(404).json_body(json!({ "error": "not found" }));
        })
        .await;

    let harness = Harness::new(&server, &[]);
    assert!(run_with(Source::GitHub, &harness.config).await.is_err());

    discovery.assert_hits_async(1).await;
    assert!(!harness.path("github/years.json").exists());
}
