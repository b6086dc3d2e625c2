//! End-to-end tests: tracker → HTTP server → stores → analytics
//!
//! These tests verify the complete flow over real sockets:
//! Tracker (reqwest) → Ingress → Log stores → Aggregator → Observability

use reso_core::StoreCapacities;
use reso_ingress::DelayConfig;
use reso_integration_tests::{TestServer, get_json};
use reso_tracker::{Tracker, TrackerConfig, TrackerContext};
use serde_json::json;
use std::time::Duration;

fn tracker_config(server: &TestServer) -> TrackerConfig {
    TrackerConfig {
        endpoint: server.url("/api/client-log"),
        flush_idle_ms: 10_000,
        ..TrackerConfig::default()
    }
}

#[tokio::test]
async fn test_tracker_session_shows_up_in_analytics() {
    let server = TestServer::start().await.unwrap();
    let client = reqwest::Client::new();

    // a visitor browses the storefront
    let context = TrackerContext::with_user_id("visitor-1")
        .user_agent("Mozilla/5.0 (X11; Linux x86_64)");
    let mut tracker = Tracker::http(tracker_config(&server), context).unwrap();
    tracker.pageview(server.url("/"));
    tracker.scroll(40);
    tracker.hover("3");
    tracker.click("3");
    tracker.search("wireless headphones");
    tracker.unload().await.unwrap();

    // the page also reports the search and click through the dedicated endpoints
    let response = client
        .post(server.url("/api/log-search"))
        .header("x-session-id", "visitor-1")
        .json(&json!({"query": "wireless headphones"}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let response = client
        .post(server.url("/api/log-click"))
        .header("x-session-id", "visitor-1")
        .json(&json!({"productId": "3", "title": "Sony WH-1000XM5", "category": "audio"}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let client_log = get_json(&client, &server.url("/api/client-log")).await.unwrap();
    assert_eq!(client_log["total"], 5);
    assert_eq!(client_log["stats"]["pageview"], 1);
    assert_eq!(client_log["stats"]["hover"], 1);
    assert_eq!(client_log["data"][0]["userId"], "visitor-1");
    assert_eq!(client_log["data"][0]["userAgent"], "Mozilla/5.0 (X11; Linux x86_64)");
    assert_eq!(client_log["data"][0]["ip"], "localhost");

    let analytics = get_json(&client, &server.url("/api/analytics")).await.unwrap();
    let summary = &analytics["data"]["summary"];
    assert_eq!(summary["totalSearches"], 1);
    assert_eq!(summary["totalClicks"], 1);
    assert_eq!(summary["totalClientEvents"], 5);
    // the session id and the tracker user id are the same visitor
    assert_eq!(summary["uniqueUsers"], 1);
    assert_eq!(summary["topCategories"][0]["category"], "audio");

    let timeline = analytics["data"]["timeline"].as_array().unwrap();
    assert_eq!(timeline[23]["pageviews"], 1);

    let kinds: Vec<&str> = analytics["data"]["recentActivity"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds.len(), 3);
    assert!(kinds.contains(&"pageview"));

    server.stop().await;
}

#[tokio::test]
async fn test_idle_flush_reaches_server() {
    let server = TestServer::start().await.unwrap();

    let config = TrackerConfig {
        flush_idle_ms: 100,
        ..tracker_config(&server)
    };
    let mut tracker = Tracker::http(config, TrackerContext::new()).unwrap();
    tracker.pageview(server.url("/thread/1"));
    tracker.scroll(90);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(server.stores.client().unwrap().len(), 2);

    tracker.unload().await.unwrap();
    server.stop().await;
}

#[tokio::test]
async fn test_small_store_keeps_latest_tracker_events() {
    let server = TestServer::start_with(
        StoreCapacities {
            search_capacity: 10,
            click_capacity: 10,
            client_capacity: 20,
        },
        DelayConfig::disabled(),
    )
    .await
    .unwrap();

    let config = TrackerConfig {
        max_batch: 8,
        ..tracker_config(&server)
    };
    let tracker = Tracker::http(config, TrackerContext::with_user_id("u1")).unwrap();
    for i in 0..30 {
        tracker.click(&i.to_string());
    }
    tracker.unload().await.unwrap();

    let client_log = get_json(&reqwest::Client::new(), &server.url("/api/client-log"))
        .await
        .unwrap();
    assert_eq!(client_log["total"], 20);
    assert_eq!(client_log["data"][0]["payload"]["productId"], "10");
    assert_eq!(client_log["data"][19]["payload"]["productId"], "29");

    let evicted = server
        .metrics
        .events_evicted
        .with_label_values(&["client"])
        .get();
    assert_eq!(evicted, 10.0);

    server.stop().await;
}
