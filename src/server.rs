//! HTTP surface.
//!
//! Two routes: `POST /api/recipe` feeding the pipeline, and `GET /health`.
//! The handler collects the raw pieces the pipeline needs (client identity,
//! content type, body bytes) and converts the pipeline's typed result into
//! the response; all status/message mapping lives in
//! [`PipelineError`](crate::PipelineError).

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::PipelineError;
use crate::pipeline::RecipePipeline;

/// Application state shared across all handlers.
pub type AppState = Arc<RecipePipeline>;

/// Shared error response body used by all endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Client identity for rate limiting.
///
/// Prefers the first `X-Forwarded-For` hop (the deployment sits behind a
/// proxy in production), falling back to the peer socket address when the
/// server was started with connect info, then to a fixed placeholder.
pub struct ClientIdentity(pub String);

impl<S> FromRequestParts<S> for ClientIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|hop| hop.trim().to_string())
            .filter(|hop| !hop.is_empty());

        let identity = forwarded
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|info| info.0.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Self(identity))
    }
}

/// Build the application router.
pub fn router(pipeline: AppState, cors_origin: Option<&str>) -> Router {
    Router::new()
        .route("/api/recipe", post(generate_recipe))
        .route("/health", get(health))
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(pipeline)
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    match origin {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(value) => CorsLayer::new()
                .allow_origin(value)
                .allow_methods(Any)
                .allow_headers(Any),
            Err(_) => {
                warn!(origin, "unparseable CORS origin, falling back to permissive");
                CorsLayer::permissive()
            }
        },
        None => CorsLayer::permissive(),
    }
}

async fn generate_recipe(
    State(pipeline): State<AppState>,
    ClientIdentity(identity): ClientIdentity,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    match pipeline.handle(&identity, content_type, &body).await {
        Ok(envelope) => (StatusCode::OK, Json(envelope)).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

async fn method_not_allowed() -> Response {
    error_response(PipelineError::MethodNotAllowed)
}

/// Convert a classified error into its HTTP response.
///
/// Logged with context here, once, before the response is written; the body
/// carries only the mapped message.
fn error_response(error: PipelineError) -> Response {
    warn!(kind = error.kind(), %error, "request failed");
    let status =
        StatusCode::from_u16(error.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            error: error.client_message(),
        }),
    )
        .into_response()
}
