// End-to-end: relay router + hyper client adapter against a loopback upstream
mod common;

use std::{net::SocketAddr, sync::Arc};

use api_relay::HttpClientAdapter;
use axum::{
    Json, Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use common::{assert_cors_headers, router_with, test_config};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_http::compression::CompressionLayer;

async fn events(headers: HeaderMap) -> impl IntoResponse {
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    (
        [(header::SET_COOKIE, "seen=1; Path=/")],
        Json(json!({ "events": [], "cookie": cookie })),
    )
}

async fn echo(headers: HeaderMap, body: String) -> Json<Value> {
    let value_of = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "body": body,
        "content_type": value_of(header::CONTENT_TYPE),
        "host": value_of(header::HOST),
    }))
}

async fn report() -> Json<Value> {
    let rows: Vec<Value> = (0..50)
        .map(|i| json!({ "id": i, "venue": "Grieghallen", "sold": i * 3 }))
        .collect();
    Json(json!({ "rows": rows }))
}

async fn plain() -> &'static str {
    "pong"
}

async fn spawn_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/api/events", get(events))
        .route("/api/echo", post(echo))
        .route("/api/ping", get(plain))
        .route(
            "/api/report",
            get(report).layer(CompressionLayer::new().gzip(true)),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn relay_router(upstream: SocketAddr) -> Router {
    let client = Arc::new(HttpClientAdapter::new().unwrap());
    router_with(&test_config(&format!("http://{upstream}")), client)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn relays_json_and_cookies_over_the_wire() {
    let upstream = spawn_upstream().await;
    let app = relay_router(upstream);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/events")
                .header(header::COOKIE, "session=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_cors_headers(response.headers());
    assert_eq!(response.headers()[header::SET_COOKIE], "seen=1; Path=/");
    assert_eq!(
        json_body(response).await,
        json!({ "events": [], "cookie": "session=abc" })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn wraps_text_body_and_sets_upstream_host() {
    let upstream = spawn_upstream().await;
    let app = relay_router(upstream);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/echo")
                .header(header::HOST, "relay.example.com")
                .header(header::CONTENT_TYPE, "text/plain")
                .body(Body::from("hello"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let echoed = json_body(response).await;
    assert_eq!(echoed["body"], r#"{"data":"hello"}"#);
    assert_eq!(echoed["content_type"], "text/plain");
    assert_eq!(echoed["host"], upstream.to_string());
}

#[tokio::test(flavor = "multi_thread")]
async fn decodes_compressed_upstream_json() {
    let upstream = spawn_upstream().await;
    let app = relay_router(upstream);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/report")
                .header(header::ACCEPT_ENCODING, "gzip")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let report = json_body(response).await;
    assert_eq!(report["rows"].as_array().map(Vec::len), Some(50));
    assert_eq!(report["rows"][49]["sold"], 147);
}

#[tokio::test(flavor = "multi_thread")]
async fn relays_text_and_missing_routes() {
    let upstream = spawn_upstream().await;
    let app = relay_router(upstream);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/ping")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"pong");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/nowhere")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_cors_headers(response.headers());
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_upstream_is_reported_as_500() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead = listener.local_addr().unwrap();
    drop(listener);
    let app = relay_router(dead);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/events")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_cors_headers(response.headers());
    let payload = json_body(response).await;
    assert_eq!(payload["error"], "Proxy request failed");
    assert!(payload["message"].as_str().is_some());
}
