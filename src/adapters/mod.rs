pub mod http_client;
pub mod http_handler;
pub mod middleware;
pub mod observer;

/// Re-export commonly used types from adapters
pub use http_client::HttpClientAdapter;
pub use http_handler::RelayHandler;
pub use middleware::*;
pub use observer::{NoopObserver, TracingObserver};
