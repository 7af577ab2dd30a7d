use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{Method, StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
};
use tower_http::trace::TraceLayer;

use crate::{
    adapters::middleware::{CorsHeaders, cors_middleware, request_timing_middleware},
    core::{
        body::{InboundBody, RelayBody, method_carries_body},
        error::RelayError,
        relay::{InboundRequest, RelayResponse, RelayService},
    },
    tracing_setup,
};

/// Axum-facing side of the relay: buffers the inbound request, runs it through
/// [`RelayService`] and renders the result.
pub struct RelayHandler {
    relay: Arc<RelayService>,
    max_body_bytes: usize,
}

impl RelayHandler {
    pub fn new(relay: Arc<RelayService>, max_body_bytes: usize) -> Self {
        Self {
            relay,
            max_body_bytes,
        }
    }

    /// Relay an axum request. Failures are already folded into the response.
    pub async fn handle_request(&self, req: Request) -> RelayResponse {
        let (parts, body) = req.into_parts();
        let path = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());

        // Preflights and GET/HEAD never forward a body, so it is not read.
        let body = if parts.method != Method::OPTIONS && method_carries_body(&parts.method) {
            let bytes = match axum::body::to_bytes(body, self.max_body_bytes).await {
                Ok(bytes) => bytes,
                Err(e) => return self.relay.fail(RelayError::InboundBody(e.to_string())),
            };
            let content_type = parts
                .headers
                .get(header::CONTENT_TYPE)
                .and_then(|value| value.to_str().ok());
            InboundBody::from_bytes(content_type, &bytes)
        } else {
            None
        };

        let inbound = InboundRequest {
            method: parts.method,
            path,
            headers: parts.headers,
            body,
        };

        self.relay.relay(inbound).await
    }

    /// Build the router: the relay mounted under its prefix, a 404 fallback,
    /// and CORS applied outermost so every response carries it.
    pub fn router(self: Arc<Self>, cors: CorsHeaders) -> Router {
        let base = self.relay.prefix().trim_end_matches('/').to_string();
        let exact = if base.is_empty() { "/".to_string() } else { base.clone() };
        let nested = format!("{base}/{{*rest}}");

        let mut router = Router::new()
            .route(&exact, any(relay_route))
            .route(&nested, any(relay_route));
        // `{*rest}` needs at least one character, so `/api/` is mounted on its own.
        if !base.is_empty() {
            router = router.route(&format!("{base}/"), any(relay_route));
        }

        router
            .fallback(not_found)
            .with_state(self)
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing_setup::create_request_span(req.method().as_str(), req.uri().path())
            }))
            .layer(middleware::from_fn(request_timing_middleware))
            .layer(middleware::from_fn_with_state(Arc::new(cors), cors_middleware))
    }
}

async fn relay_route(State(handler): State<Arc<RelayHandler>>, req: Request) -> Response {
    handler.handle_request(req).await.into_response()
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

impl IntoResponse for RelayResponse {
    fn into_response(self) -> Response {
        let body = match self.body {
            RelayBody::Empty => Body::empty(),
            RelayBody::Json(value) => match serde_json::to_vec(&value) {
                Ok(bytes) => Body::from(bytes),
                Err(e) => {
                    tracing::error!("Failed to serialize relayed JSON body: {}", e);
                    return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                        .into_response();
                }
            },
            RelayBody::Text(bytes) => Body::from(bytes),
        };

        let mut response = Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
