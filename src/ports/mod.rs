pub mod http_client;
pub mod observer;

pub use http_client::{
    HttpClient, HttpClientError, HttpClientResult, OutboundRequest, UpstreamResponse,
};
pub use observer::RelayObserver;
