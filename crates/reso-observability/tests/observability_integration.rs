//! Integration tests for observability
//!
//! These tests verify that metrics and health checks follow the log stores
//! as they fill up at runtime.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use reso_core::{ClientLog, LogStores, RequestOrigin, StoreCapacities, TrackedEvent};
use reso_observability::{HealthState, Metrics, StorePressure, StoreReport, health_router};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn client_event(name: &str) -> ClientLog {
    let event: TrackedEvent = serde_json::from_value(serde_json::json!({
        "type": "click",
        "userId": "user-1",
        "payload": {"name": name},
    }))
    .unwrap();
    ClientLog::from_event(event, &RequestOrigin::default(), chrono::Utc::now()).unwrap()
}

async fn get_json(state: HealthState, uri: &str) -> (StatusCode, Value) {
    let response = health_router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn client_report(body: &Value) -> StoreReport {
    let reports: Vec<StoreReport> = serde_json::from_value(body["stores"].clone()).unwrap();
    reports.into_iter().find(|r| r.name == "client").unwrap()
}

#[tokio::test]
async fn test_readiness_follows_store_pressure() {
    let metrics = Arc::new(Metrics::new().unwrap());
    let stores = Arc::new(
        LogStores::new(StoreCapacities {
            client_capacity: 10,
            ..StoreCapacities::default()
        })
        .unwrap(),
    );
    let state = HealthState::new(metrics).with_stores(stores.clone());

    let (status, body) = get_json(state.clone(), "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(client_report(&body).pressure, StorePressure::Empty);

    stores.client_mut().unwrap().extend((0..5).map(|i| client_event(&format!("e{}", i))));
    let (_, body) = get_json(state.clone(), "/readyz").await;
    assert_eq!(client_report(&body).pressure, StorePressure::Normal);

    stores.client_mut().unwrap().extend((5..9).map(|i| client_event(&format!("e{}", i))));
    let (_, body) = get_json(state.clone(), "/readyz").await;
    let report = client_report(&body);
    assert_eq!(report.pressure, StorePressure::NearCapacity);
    assert_eq!(report.entries, 9);

    stores.client_mut().unwrap().extend((9..12).map(|i| client_event(&format!("e{}", i))));
    let (status, body) = get_json(state.clone(), "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    let report = client_report(&body);
    assert_eq!(report.pressure, StorePressure::Evicting);
    assert_eq!(report.entries, 10);
    assert_eq!(report.total_evicted, 2);

    // liveness does not depend on the stores
    let (status, body) = get_json(state, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_metrics_workflow_is_exported() {
    let metrics = Arc::new(Metrics::new().unwrap());
    metrics.record_events("client", 5, 0, 5);
    metrics.record_events("client", 200, 5, 200);
    metrics.record_classification("shoes");
    metrics.record_analytics(0.001);
    metrics.record_error(500);

    let response = health_router(HealthState::new(metrics))
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    assert!(text.contains("reso_events_recorded_total{log=\"client\"} 205"));
    assert!(text.contains("reso_events_evicted_total{log=\"client\"} 5"));
    assert!(text.contains("reso_log_store_entries{log=\"client\"} 200"));
    assert!(text.contains("reso_intent_classifications_total{bucket=\"shoes\"} 1"));
    assert!(text.contains("reso_analytics_requests_total 1"));
    assert!(text.contains("reso_request_errors_total{status=\"500\"} 1"));
}
