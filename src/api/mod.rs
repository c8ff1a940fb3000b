// HTTP API

pub mod form;
pub mod integrations;

pub use form::FormData;
pub use integrations::{create_integration_router, IntegrationAppState};

use axum::{http::HeaderValue, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

/// Full application: integration routes, health check and CORS for the frontend.
pub fn create_app(state: IntegrationAppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(create_integration_router(state))
        .layer(cors_layer(allowed_origins))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
