use http::StatusCode;

use crate::core::{error::RelayError, relay::InboundRequest};

/// RelayObserver receives a notification at each stage of a relay.
///
/// Observers are diagnostics only: nothing they do can change the outcome of a
/// relay. Every method has an empty default so implementors pick the stages
/// they care about.
pub trait RelayObserver: Send + Sync + 'static {
    /// An inbound request entered the relay
    fn inbound(&self, _req: &InboundRequest) {}

    /// The upstream URL was computed
    fn upstream_url(&self, _url: &str) {}

    /// The outbound body was prepared; `len` is 0 when no body is sent
    fn outbound_body(&self, _len: usize) {}

    /// Preparing the outbound body failed; the relay continues without one
    fn body_serialization_failed(&self, _error: &serde_json::Error) {}

    /// The upstream answered
    fn upstream_response(&self, _status: StatusCode, _content_type: Option<&str>) {}

    /// `count` set-cookie values were copied onto the relayed response
    fn cookies_forwarded(&self, _count: usize) {}

    /// The relay failed and a 500 is being returned
    fn relay_failed(&self, _error: &RelayError) {}
}
