use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::http_client::HttpClientError;

/// Fixed `error` field of every failed relay response.
pub const RELAY_FAILURE: &str = "Proxy request failed";

/// Any failure that aborts a relay. Variants only shape the message; every one
/// of them surfaces to the caller as the same 500 [`ErrorPayload`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RelayError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] HttpClientError),

    #[error("upstream returned malformed JSON: {0}")]
    UpstreamJson(#[from] serde_json::Error),

    #[error("failed to read inbound body: {0}")]
    InboundBody(String),
}

/// JSON body returned to the caller when a relay fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub message: String,
}

impl ErrorPayload {
    pub fn from_error(error: &RelayError) -> Self {
        Self {
            error: RELAY_FAILURE.to_string(),
            message: error.to_string(),
        }
    }

    pub fn into_value(self) -> serde_json::Value {
        serde_json::json!({
            "error": self.error,
            "message": self.message,
        })
    }
}
