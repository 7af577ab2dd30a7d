use std::error::Error as StdError;

use async_trait::async_trait;
use bytes::Bytes;
use eyre::Result;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Uri, Version, header, header::HeaderValue};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use rustls_native_certs::load_native_certs;
use tower::ServiceExt;
use tower_http::decompression::Decompression;
use tracing::Instrument;

use crate::ports::http_client::{
    HttpClient, HttpClientError, HttpClientResult, OutboundRequest, UpstreamResponse,
};

type HyperClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// HTTP client adapter using Hyper with Rustls.
///
/// Responsibilities:
/// * Sets the `Host` header from the upstream URL
/// * Forces request version to HTTP/1.1
/// * Transparently decodes gzip / deflate / br / zstd response bodies
/// * Buffers the whole upstream body
///
/// No retries and no timeout beyond the connector defaults.
pub struct HttpClientAdapter {
    client: Decompression<HyperClient>,
}

impl HttpClientAdapter {
    /// Create a new HTTP client adapter.
    pub fn new() -> Result<Self> {
        // Install default crypto provider for rustls if not already set
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let mut http_connector = HttpConnector::new();
        http_connector.enforce_http(false); // Allow HTTPS URLs

        let mut root_cert_store = rustls::RootCertStore::empty();
        let native_certs = load_native_certs();

        if !native_certs.certs.is_empty() {
            for cert in native_certs.certs {
                if root_cert_store.add(cert).is_err() {
                    tracing::warn!("Failed to add native certificate to rustls RootCertStore");
                }
            }
            tracing::debug!("Loaded {} native root certificates.", root_cert_store.len());
        }

        if !native_certs.errors.is_empty() {
            tracing::warn!(
                "Some native certificates failed to load: {:?}",
                native_certs.errors
            );
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_cert_store)
            .with_no_client_auth();

        let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .wrap_connector(http_connector);

        let client = Client::builder(TokioExecutor::new()).build::<_, Full<Bytes>>(https_connector);

        tracing::debug!("Created upstream HTTP client");
        Ok(Self {
            client: Decompression::new(client),
        })
    }

    /// Turn an outbound request into a hyper request with a `Host` header.
    fn build_request(req: OutboundRequest) -> HttpClientResult<Request<Full<Bytes>>> {
        let uri: Uri = req
            .url
            .parse()
            .map_err(|e| HttpClientError::InvalidRequest(format!("{}: {e}", req.url)))?;

        let host = uri
            .authority()
            .map(|authority| authority.as_str().to_string())
            .ok_or_else(|| {
                HttpClientError::InvalidRequest(format!("Outgoing URI has no host: {uri}"))
            })?;
        let host = HeaderValue::from_str(&host)
            .map_err(|e| HttpClientError::InvalidRequest(format!("Invalid host '{host}': {e}")))?;

        let body = req.body.map(Bytes::from).unwrap_or_default();
        let mut request = Request::builder()
            .method(req.method)
            .uri(uri)
            .version(Version::HTTP_11)
            .body(Full::new(body))
            .map_err(|e| HttpClientError::InvalidRequest(e.to_string()))?;

        *request.headers_mut() = req.headers;
        request.headers_mut().insert(header::HOST, host);

        Ok(request)
    }
}

/// Render an error with its source chain; hyper's top-level messages are terse.
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl HttpClient for HttpClientAdapter {
    async fn send(&self, req: OutboundRequest) -> HttpClientResult<UpstreamResponse> {
        let span = tracing::info_span!(
            "upstream_request",
            http.method = %req.method,
            http.url = %req.url,
            http.status_code = tracing::field::Empty,
        );

        async move {
            let request = Self::build_request(req)?;
            let method = request.method().clone();
            let uri = request.uri().clone();

            tracing::debug!("Outgoing request headers: {:?}", request.headers());

            let response = self
                .client
                .clone()
                .oneshot(request)
                .await
                .map_err(|e| {
                    tracing::Span::current().record("http.status_code", 599u16);
                    let detail = error_chain(&e);
                    tracing::error!("Error making request to upstream ({method} {uri}): {detail}");
                    HttpClientError::ConnectionError(format!(
                        "Request to {method} {uri} failed: {detail}"
                    ))
                })?;

            tracing::Span::current().record("http.status_code", response.status().as_u16());

            let (parts, body) = response.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|e| HttpClientError::BodyError(error_chain(e.as_ref())))?
                .to_bytes();

            Ok(UpstreamResponse {
                status: parts.status,
                headers: parts.headers,
                body,
            })
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderMap, Method};

    use super::*;

    fn outbound(url: &str, body: Option<&str>) -> OutboundRequest {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session=abc"));
        OutboundRequest {
            method: Method::POST,
            url: url.to_string(),
            headers,
            body: body.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_http_client_creation() {
        let client = HttpClientAdapter::new();
        assert!(client.is_ok());
    }

    #[test]
    fn build_request_sets_host_and_keeps_headers() {
        let request =
            HttpClientAdapter::build_request(outbound("http://backend:8000/api/x", Some("{}")))
                .unwrap();

        assert_eq!(request.headers()[header::HOST], "backend:8000");
        assert_eq!(request.headers()[header::COOKIE], "session=abc");
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.version(), Version::HTTP_11);
    }

    #[test]
    fn build_request_rejects_relative_url() {
        let result = HttpClientAdapter::build_request(outbound("/api/x", None));
        assert!(matches!(result, Err(HttpClientError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_connection_error() {
        let client = HttpClientAdapter::new().unwrap();
        // Port 9 (discard) on loopback is closed in test environments.
        let result = client
            .send(outbound("http://127.0.0.1:9/api/events", None))
            .await;

        match result {
            Err(HttpClientError::ConnectionError(message)) => {
                assert!(message.contains("127.0.0.1:9"), "{message}");
            }
            other => panic!("expected connection error, got {other:?}"),
        }
    }
}
