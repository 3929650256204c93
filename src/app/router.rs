use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::get,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    api::http::comments as comments_http,
    app::{middleware::security_headers, state::AppState},
    auth::middleware::auth_middleware,
    telemetry::request_logging_middleware,
};

pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/api/admin/comments", get(comments_http::list_comments_handle))
        .route(
            "/api/admin/comments/authors",
            get(comments_http::list_authors_handle),
        )
        .route(
            "/api/admin/comments/contexts",
            get(comments_http::list_contexts_handle),
        )
        .route(
            "/api/admin/comments/context-items",
            get(comments_http::list_context_items_handle),
        )
        .layer(middleware::from_fn_with_state(
            state.jwt_config.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(comments_http::health_handle))
        .merge(admin_routes)
        .layer(middleware::from_fn(security_headers))
        .layer(cors_layer(&state.config.cors_origin))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_logging_middleware))
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    match origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(error) => {
            tracing::warn!(%error, origin, "Ignoring invalid CORS origin");
            cors
        }
    }
}
