//! Route definitions and router construction.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::bootstrap::{AxumContext, CorsConfig};
use crate::handlers;
use crate::state::AppState;

/// Build CORS layer from configuration.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            use axum::http::HeaderValue;
            let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Create the router with every route under the context's prefix.
///
/// Routes are spelled out with the prefix instead of nested, since an empty
/// prefix is valid and `Router::nest` rejects it.
///
/// # Path Parameter Syntax
/// Axum 0.8 uses brace syntax for path parameters: `{connector_id}`
pub fn create_router(ctx: AxumContext, cors_config: &CorsConfig) -> Router {
    let prefix = ctx.prefix.clone();
    let state: AppState = Arc::new(ctx);

    Router::new()
        .route(&format!("{prefix}/live"), get(handlers::health::live))
        .route(&format!("{prefix}/ready"), get(handlers::health::ready))
        .route(
            &format!("{prefix}/sse/{{connector_id}}"),
            get(handlers::sse::connect),
        )
        .route(
            &format!("{prefix}/messages/"),
            post(handlers::messages::post),
        )
        .with_state(state)
        .layer(build_cors_layer(cors_config))
        .layer(TraceLayer::new_for_http())
}
