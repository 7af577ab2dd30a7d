use http::StatusCode;

use crate::{
    core::{error::RelayError, relay::InboundRequest},
    ports::observer::RelayObserver,
};

/// Reports every relay stage as a `tracing` event under the `relay` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RelayObserver for TracingObserver {
    fn inbound(&self, req: &InboundRequest) {
        tracing::info!(
            target: "relay",
            method = %req.method,
            path = %req.path,
            headers = req.headers.len(),
            has_body = req.body.is_some(),
            "Inbound request"
        );
    }

    fn upstream_url(&self, url: &str) {
        tracing::debug!(target: "relay", %url, "Forwarding to upstream");
    }

    fn outbound_body(&self, len: usize) {
        tracing::debug!(target: "relay", body_len = len, "Prepared outbound body");
    }

    fn body_serialization_failed(&self, error: &serde_json::Error) {
        tracing::warn!(target: "relay", %error, "Could not serialize body, sending none");
    }

    fn upstream_response(&self, status: StatusCode, content_type: Option<&str>) {
        tracing::info!(
            target: "relay",
            status = status.as_u16(),
            content_type = content_type.unwrap_or("-"),
            "Upstream responded"
        );
    }

    fn cookies_forwarded(&self, count: usize) {
        tracing::debug!(target: "relay", count, "Forwarding set-cookie to caller");
    }

    fn relay_failed(&self, error: &RelayError) {
        tracing::error!(target: "relay", %error, "Relay failed");
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RelayObserver for NoopObserver {}
