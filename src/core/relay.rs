//! The request relay.
//!
//! `RelayService` turns one inbound request into at most one upstream call and
//! turns the upstream's answer (or the failure to get one) into the response for
//! the original caller. It holds no per-request state, so a single instance is
//! shared by every connection.
use std::sync::Arc;

use eyre::{Result, WrapErr};
use http::{HeaderMap, HeaderValue, Method, StatusCode, header};

use crate::{
    config::models::UpstreamConfig,
    core::{
        body::{InboundBody, RelayBody, method_carries_body},
        error::{ErrorPayload, RelayError},
        headers::{ExcludedHeaders, forward_headers},
    },
    ports::{
        http_client::{HttpClient, OutboundRequest, UpstreamResponse},
        observer::RelayObserver,
    },
};

/// A request as received from the caller.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: Method,
    /// Path plus query string, exactly as received
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<InboundBody>,
}

impl InboundRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: header::HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: InboundBody) -> Self {
        self.body = Some(body);
        self
    }
}

/// The response handed back to the caller.
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: RelayBody,
}

impl RelayResponse {
    /// CORS preflight answer: 200, no body.
    pub fn preflight() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: RelayBody::Empty,
        }
    }

    /// 500 carrying the fixed error kind and the failure's message.
    pub fn failure(error: &RelayError) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            headers,
            body: RelayBody::Json(ErrorPayload::from_error(error).into_value()),
        }
    }
}

/// Join origin, prefix and the prefix-stripped inbound path.
///
/// Paths outside the prefix are appended whole, so they still land under the
/// prefix upstream.
pub fn build_upstream_url(origin: &str, prefix: &str, path: &str) -> String {
    let rest = path.strip_prefix(prefix).unwrap_or(path);
    format!("{}{}{}", origin.trim_end_matches('/'), prefix, rest)
}

pub struct RelayService {
    origin: String,
    prefix: String,
    excluded: ExcludedHeaders,
    client: Arc<dyn HttpClient>,
    observer: Arc<dyn RelayObserver>,
}

impl RelayService {
    pub fn new(
        upstream: &UpstreamConfig,
        client: Arc<dyn HttpClient>,
        observer: Arc<dyn RelayObserver>,
    ) -> Result<Self> {
        let excluded = ExcludedHeaders::parse(upstream.excluded_headers.as_slice())
            .wrap_err("Invalid name in upstream.excluded_headers")?;

        Ok(Self {
            origin: upstream.origin.trim_end_matches('/').to_string(),
            prefix: upstream.prefix.clone(),
            excluded,
            client,
            observer,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Relay one request. Never fails: errors become a 500 response.
    pub async fn relay(&self, req: InboundRequest) -> RelayResponse {
        self.observer.inbound(&req);

        if req.method == Method::OPTIONS {
            return RelayResponse::preflight();
        }

        match self.forward(req).await {
            Ok(response) => response,
            Err(error) => self.fail(error),
        }
    }

    /// Report a failure that happened before or during the relay and build its 500.
    pub fn fail(&self, error: RelayError) -> RelayResponse {
        self.observer.relay_failed(&error);
        RelayResponse::failure(&error)
    }

    async fn forward(&self, req: InboundRequest) -> Result<RelayResponse, RelayError> {
        let outbound = self.prepare(req);
        let upstream = self.client.send(outbound).await?;
        self.respond(upstream)
    }

    /// Assemble the outbound request: URL, headers and body.
    pub fn prepare(&self, req: InboundRequest) -> OutboundRequest {
        let url = build_upstream_url(&self.origin, &self.prefix, &req.path);
        self.observer.upstream_url(&url);

        let headers = forward_headers(&req.headers, &self.excluded);

        let body = if method_carries_body(&req.method) {
            req.body
                .as_ref()
                .and_then(|body| self.encoded_body(body.to_outbound()))
        } else {
            None
        };
        self.observer.outbound_body(body.as_ref().map_or(0, String::len));

        OutboundRequest {
            method: req.method,
            url,
            headers,
            body,
        }
    }

    /// A body that failed to encode is reported and dropped; the request still goes out.
    ///
    /// Encoding a `serde_json::Value` does not fail in practice, so the error arm
    /// is only reached when the encoder itself reports an error.
    fn encoded_body(&self, encoded: serde_json::Result<String>) -> Option<String> {
        match encoded {
            Ok(text) => Some(text),
            Err(e) => {
                self.observer.body_serialization_failed(&e);
                None
            }
        }
    }

    fn respond(&self, upstream: UpstreamResponse) -> Result<RelayResponse, RelayError> {
        let content_type = upstream.content_type().map(str::to_owned);
        self.observer
            .upstream_response(upstream.status, content_type.as_deref());

        let mut headers = HeaderMap::new();
        let mut cookies = 0;
        for value in upstream.headers.get_all(header::SET_COOKIE) {
            headers.append(header::SET_COOKIE, value.clone());
            cookies += 1;
        }
        if cookies > 0 {
            self.observer.cookies_forwarded(cookies);
        }

        let body = if upstream.is_json() {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
            RelayBody::Json(serde_json::from_slice(&upstream.body)?)
        } else {
            let content_type = upstream
                .headers
                .get(header::CONTENT_TYPE)
                .cloned()
                .unwrap_or_else(|| HeaderValue::from_static("text/plain; charset=utf-8"));
            headers.insert(header::CONTENT_TYPE, content_type);
            RelayBody::Text(upstream.body)
        };

        Ok(RelayResponse {
            status: upstream.status,
            headers,
            body,
        })
    }
}
