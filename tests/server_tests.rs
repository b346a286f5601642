use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use ping_sweep_rs::probe::Prober;
use ping_sweep_rs::server::{router, AppState};
use ping_sweep_rs::sweep::{SweepConfig, SweepEngine};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

struct ListProber(HashSet<IpAddr>);

#[async_trait]
impl Prober for ListProber {
    async fn probe(&self, host: IpAddr) -> bool {
        self.0.contains(&host)
    }
}

fn app_with(alive: &[&str], shutdown: CancellationToken) -> Router {
    let prober = ListProber(alive.iter().map(|s| s.parse().unwrap()).collect());
    let config = SweepConfig {
        max_hosts: 1024,
        concurrency: 16,
        timeout: Duration::from_millis(100),
    };
    let state = AppState::new(SweepEngine::new(config, Arc::new(prober)), shutdown);
    router(state, "ui-does-not-exist")
}

fn app(alive: &[&str]) -> Router {
    app_with(alive, CancellationToken::new())
}

async fn post_ping(app: Router, body: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/ping")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn sweep_returns_alive_hosts_only() {
    let (status, body) = post_ping(
        app(&["192.168.1.1", "192.168.1.20"]),
        r#"{"ip":"192.168.1.1","subnet":"24"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["network"], "192.168.1.0/24");
    assert_eq!(body["alive_count"], 2);
    assert_eq!(body["scanned"], 254);
    assert_eq!(
        body["results"],
        json!([
            {"host": "192.168.1.1", "alive": true},
            {"host": "192.168.1.20", "alive": true},
        ])
    );
    assert!(body["completed_at"].is_string());
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    for body in [r#"{"ip":"10.0.0.1"}"#, r#"{"ip":"  ","subnet":"24"}"#, "not json", ""] {
        let (status, json) = post_ping(app(&[]), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json["error"], "IP address and subnet are required.");
    }
}

#[tokio::test]
async fn bad_prefix_and_address_are_rejected() {
    let (status, json) = post_ping(app(&[]), r#"{"ip":"10.0.0.1","subnet":"/24"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Subnet must be a number like 24.");

    let (status, json) = post_ping(app(&[]), r#"{"ip":"10.0.0.999","subnet":"24"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid IP address or subnet.");

    let (_, json) = post_ping(app(&[]), r#"{"ip":"10.0.0.1","subnet":"40"}"#).await;
    assert_eq!(json["error"], "Invalid IP address or subnet.");

    // An integer too wide for any machine type is still a number.
    let body = r#"{"ip":"10.0.0.1","subnet":"99999999999999999999"}"#;
    let (status, json) = post_ping(app(&[]), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid IP address or subnet.");
}

#[tokio::test]
async fn oversized_subnet_is_rejected() {
    let (status, json) = post_ping(app(&[]), r#"{"ip":"10.0.0.1","subnet":"21"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["error"],
        "Subnet too large (2046 hosts). Please use a smaller subnet."
    );
}

#[tokio::test]
async fn largest_allowed_subnet_is_swept() {
    // /22 has 1022 hosts, under the 1024 limit.
    let (status, json) = post_ping(app(&[]), r#"{"ip":"10.0.0.1","subnet":"22"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["alive_count"], 0);
    assert_eq!(json["results"], json!([]));
}

#[tokio::test]
async fn shutdown_cancels_sweeps() {
    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let (status, json) = post_ping(
        app_with(&[], shutdown),
        r#"{"ip":"10.0.0.1","subnet":"30"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"], "Sweep cancelled.");
}

#[tokio::test]
async fn unknown_paths_fall_back_to_static_files() {
    let req = Request::builder().uri("/nothing-here").body(Body::empty()).unwrap();
    let resp = app(&[]).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
