//! End-to-end tests for health, readiness and metrics over HTTP

use reso_integration_tests::{TestServer, get_json};
use serde_json::json;

#[tokio::test]
async fn test_metrics_reflect_api_traffic() {
    let server = TestServer::start().await.unwrap();
    let client = reqwest::Client::new();

    client
        .post(server.url("/api/log-search"))
        .json(&json!({"query": "boots"}))
        .send()
        .await
        .unwrap();
    client
        .post(server.url("/api/vibe"))
        .json(&json!({"uuid": "u1", "query": "hiking boots"}))
        .send()
        .await
        .unwrap();
    let response = client
        .get(server.url("/api/thread?id=404"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    assert!(response.headers().get("x-request-id").is_some());

    let metrics = client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(metrics.contains("reso_events_recorded_total{log=\"search\"} 1"));
    assert!(metrics.contains("reso_intent_classifications_total{bucket=\"shoes\"} 1"));
    assert!(metrics.contains("reso_request_errors_total{status=\"404\"} 1"));

    server.stop().await;
}

#[tokio::test]
async fn test_readiness_reports_store_levels() {
    let server = TestServer::start().await.unwrap();
    let client = reqwest::Client::new();

    client
        .post(server.url("/api/client-log"))
        .json(&json!([{"type": "pageview", "ts": 1_700_000_000_000i64}]))
        .send()
        .await
        .unwrap();

    let health = get_json(&client, &server.url("/healthz")).await.unwrap();
    assert_eq!(health["status"], "ok");

    let ready = get_json(&client, &server.url("/readyz")).await.unwrap();
    assert_eq!(ready["status"], "ready");
    let client_store = ready["stores"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "client")
        .cloned()
        .unwrap();
    assert_eq!(client_store["entries"], 1);
    assert_eq!(client_store["capacity"], 200);
    assert_eq!(client_store["pressure"], "normal");
    assert_eq!(client_store["total_evicted"], 0);

    server.stop().await;
}
