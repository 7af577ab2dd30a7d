//! api-relay - a single-upstream API relay.
//!
//! The relay accepts every request under a fixed path prefix (default `/api`),
//! forwards it to one configured upstream origin and hands the upstream's answer
//! back to the caller. Along the way it:
//!
//! - answers CORS preflights (`OPTIONS`) locally and stamps CORS headers on every response
//! - forwards inbound headers (minus `host`, `connection`, `content-length`) and cookies
//! - normalises request bodies to JSON (`{"data": ...}` wrapping for plain text)
//! - relays the upstream status, `set-cookie` headers and a JSON or verbatim text body
//! - turns any failure into a `500` with `{"error": ..., "message": ...}`
//!
//! # Quick Example
//! ```no_run
//! use std::sync::Arc;
//!
//! use api_relay::{
//!     CorsHeaders, HttpClientAdapter, RelayHandler, RelayService, TracingObserver,
//!     config::RelayConfig,
//! };
//!
//! # #[tokio::main] async fn main() -> eyre::Result<()> {
//! let config = RelayConfig::builder().origin("http://127.0.0.1:8000").build();
//! let relay = RelayService::new(
//!     &config.upstream,
//!     Arc::new(HttpClientAdapter::new()?),
//!     Arc::new(TracingObserver),
//! )?;
//! let app = Arc::new(RelayHandler::new(Arc::new(relay), config.max_body_bytes))
//!     .router(CorsHeaders::from_config(&config.cors)?);
//! let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
//! axum::serve(listener, app).await?;
//! # Ok(()) }
//! ```
//!
//! # Architecture
//! The crate separates **ports** (traits) from **adapters** (implementations) while keeping
//! the relay logic inside `core`. `core` never touches the network: the upstream call goes
//! through the [`HttpClient`] port and diagnostics through the [`RelayObserver`] port, so the
//! relay can be exercised with in-memory fakes.
//!
//! # Error Handling
//! Setup APIs return `eyre::Result<T>`; the relay itself never fails and folds every error
//! into the response via [`core::RelayError`].
pub mod config;
pub mod ports;
pub mod tracing_setup;
pub mod utils;

pub mod adapters;
pub mod core;

pub use crate::{
    adapters::{CorsHeaders, HttpClientAdapter, NoopObserver, RelayHandler, TracingObserver},
    core::{InboundBody, InboundRequest, RelayBody, RelayResponse, RelayService},
    ports::{HttpClient, RelayObserver},
    utils::GracefulShutdown,
};
