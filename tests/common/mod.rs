#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use api_relay::{
    CorsHeaders, NoopObserver, RelayHandler, RelayService,
    config::RelayConfig,
    ports::http_client::{
        HttpClient, HttpClientError, HttpClientResult, OutboundRequest, UpstreamResponse,
    },
};
use async_trait::async_trait;
use axum::{
    Router,
    http::{HeaderMap, HeaderValue, StatusCode, header},
};
use bytes::Bytes;

/// In-memory upstream: answers every call with a clone of `reply` and records
/// what it was sent.
pub struct FakeUpstream {
    reply: Mutex<Result<UpstreamResponse, String>>,
    sent: Mutex<Vec<OutboundRequest>>,
}

impl FakeUpstream {
    pub fn replying(
        status: u16,
        content_type: Option<&'static str>,
        body: &'static str,
    ) -> Arc<Self> {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        Self::with_response(UpstreamResponse {
            status: StatusCode::from_u16(status).unwrap(),
            headers,
            body: Bytes::from_static(body.as_bytes()),
        })
    }

    pub fn with_response(response: UpstreamResponse) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Ok(response)),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(Err(message.to_string())),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<OutboundRequest> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for FakeUpstream {
    async fn send(&self, req: OutboundRequest) -> HttpClientResult<UpstreamResponse> {
        self.sent.lock().unwrap().push(req);
        match &*self.reply.lock().unwrap() {
            Ok(response) => Ok(response.clone()),
            Err(message) => Err(HttpClientError::ConnectionError(message.clone())),
        }
    }
}

/// Full relay router (CORS, timing, tracing layers included) over `client`.
pub fn router_with(config: &RelayConfig, client: Arc<dyn HttpClient>) -> Router {
    let relay = RelayService::new(&config.upstream, client, Arc::new(NoopObserver)).unwrap();
    let cors = CorsHeaders::from_config(&config.cors).unwrap();
    Arc::new(RelayHandler::new(Arc::new(relay), config.max_body_bytes)).router(cors)
}

pub fn test_config(origin: &str) -> RelayConfig {
    RelayConfig::builder().origin(origin).build()
}

pub fn assert_cors_headers(headers: &HeaderMap) {
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, PUT, DELETE, OPTIONS"
    );
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "Content-Type, Authorization, Cookie"
    );
}
