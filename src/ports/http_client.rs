use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode, header};
use thiserror::Error;

/// Custom error type for HTTP client operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpClientError {
    /// Error when connection to the upstream fails
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error when the request cannot be built (bad URL, bad header)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Error while reading or decoding the upstream response body
    #[error("Response body error: {0}")]
    BodyError(String),
}

/// Result type alias for HTTP client operations
pub type HttpClientResult<T> = Result<T, HttpClientError>;

/// A fully assembled request bound for the upstream.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// A buffered upstream response. The body is already content-decoded.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// The `content-type` header as text, if present and valid.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// Whether the upstream declared a JSON body.
    pub fn is_json(&self) -> bool {
        self.content_type()
            .is_some_and(|ct| ct.contains("application/json"))
    }
}

/// HttpClient defines the port (interface) for making the single upstream call of a relay
#[async_trait]
pub trait HttpClient: Send + Sync + 'static {
    /// Send a request to the upstream and buffer its response
    ///
    /// # Arguments
    /// * `req` - The assembled outbound request
    ///
    /// # Returns
    /// A future that resolves to the upstream's response or an error
    async fn send(&self, req: OutboundRequest) -> HttpClientResult<UpstreamResponse>;
}
