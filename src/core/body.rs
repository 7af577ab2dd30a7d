//! Request and response body shapes.
//!
//! Inbound bodies arrive either as raw text or as an already-parsed JSON value;
//! both are turned into the JSON text sent upstream. Upstream bodies are kept as
//! parsed JSON when the upstream declares them so and as raw bytes otherwise.
use bytes::Bytes;
use http::Method;
use serde_json::Value;

/// Body of an inbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundBody {
    /// Text the caller sent without a usable JSON content-type
    Raw(String),
    /// A JSON value the caller sent with a JSON content-type
    Structured(Value),
}

impl InboundBody {
    /// Classify buffered inbound bytes. Empty bodies yield `None`.
    ///
    /// A JSON content-type with bytes that parse becomes `Structured`; everything
    /// else becomes `Raw` (invalid UTF-8 is replaced, not rejected).
    pub fn from_bytes(content_type: Option<&str>, bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }

        let declared_json = content_type.is_some_and(|ct| ct.contains("application/json"));
        if declared_json {
            if let Ok(value) = serde_json::from_slice::<Value>(bytes) {
                return Some(Self::Structured(value));
            }
        }

        Some(Self::Raw(String::from_utf8_lossy(bytes).into_owned()))
    }

    /// JSON text forwarded upstream for this body.
    ///
    /// Raw text that is already valid JSON goes through untouched; any other raw
    /// text is wrapped as `{"data": <text>}`.
    pub fn to_outbound(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Raw(text) => {
                if serde_json::from_str::<serde::de::IgnoredAny>(text).is_ok() {
                    Ok(text.clone())
                } else {
                    serde_json::to_string(&serde_json::json!({ "data": text }))
                }
            }
            Self::Structured(value) => serde_json::to_string(value),
        }
    }
}

/// Only methods other than GET and HEAD carry a body upstream.
pub fn method_carries_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::HEAD
}

/// Body of the response handed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayBody {
    Empty,
    Json(Value),
    Text(Bytes),
}
