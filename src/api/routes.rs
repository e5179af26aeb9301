use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::{
    error::{AppError, AppResult},
    middleware::request_id::{make_span_with_request_id, request_id_middleware, REQUEST_ID_HEADER},
};

/// Largest transcript upload accepted by `/upload-pdf`
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Recommendations
        .route("/recommend", post(handlers::recommend))
        .route(
            "/recommend-from-courses",
            post(handlers::recommend_from_courses),
        )
        // Transcripts
        .route("/extract-courses", post(handlers::extract_courses))
        .route(
            "/upload-pdf",
            post(handlers::upload_pdf).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// CORS policy allowing the web frontend at `origin`
pub fn cors_layer(origin: &str) -> AppResult<CorsLayer> {
    let origin = origin
        .parse::<HeaderValue>()
        .map_err(|_| AppError::InvalidInput(format!("invalid CORS origin: {}", origin)))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(REQUEST_ID_HEADER)])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]))
}
