//! Axum middleware wrapped around the relay route.
//!
//! Both layers are stateless apart from the CORS header values, which are
//! parsed once from configuration at startup.
use std::{sync::Arc, time::Instant};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::Response,
};
use eyre::{Result, WrapErr};

use crate::config::models::CorsConfig;

/// Pre-parsed CORS header values.
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    allow_origin: HeaderValue,
    allow_credentials: bool,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
}

impl CorsHeaders {
    pub fn from_config(cors: &CorsConfig) -> Result<Self> {
        Ok(Self {
            allow_origin: HeaderValue::from_str(&cors.allow_origin)
                .wrap_err("Invalid cors.allow_origin")?,
            allow_credentials: cors.allow_credentials,
            allow_methods: HeaderValue::from_str(&cors.allow_methods.join(", "))
                .wrap_err("Invalid cors.allow_methods")?,
            allow_headers: HeaderValue::from_str(&cors.allow_headers.join(", "))
                .wrap_err("Invalid cors.allow_headers")?,
        })
    }

    /// Overwrite the CORS headers on a response.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            self.allow_origin.clone(),
        );
        if self.allow_credentials {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            self.allow_methods.clone(),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            self.allow_headers.clone(),
        );
    }
}

/// Stamp the configured CORS headers on every response, errors included.
pub async fn cors_middleware(
    State(cors): State<Arc<CorsHeaders>>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    cors.apply(response.headers_mut());
    response
}

/// Log start/end of a request including latency.
pub async fn request_timing_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    tracing::debug!("Started processing {} {}", method, uri);

    let response = next.run(req).await;

    tracing::info!(
        "Completed {} {} - {} in {:?}",
        method,
        uri,
        response.status(),
        start.elapsed()
    );

    response
}
