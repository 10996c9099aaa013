pub mod api;
pub mod client;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::api::error::method_not_allowed;
use crate::config::AppConfig;
use crate::services::status_store::StatusStore;
use crate::services::upload_service::UploadService;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::upload::create_upload_url,
        api::handlers::status::check_processing_status,
        api::handlers::stitched::check_stitched_video,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::UploadUrlRequest,
            models::UploadUrlResponse,
            models::StitchedVideoResponse,
            models::ErrorResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "upload", description = "Signed upload URLs"),
        (name = "status", description = "Processing status and stitched output"),
        (name = "system", description = "Health")
    )
)]
pub struct ApiDoc;

/// Process-wide shared clients, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub upload_service: Arc<UploadService>,
    pub status_store: Arc<dyn StatusStore>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/api/upload",
            post(api::handlers::upload::create_upload_url).fallback(method_not_allowed),
        )
        .route(
            "/api/check-processing-status",
            get(api::handlers::status::check_processing_status).fallback(method_not_allowed),
        )
        .route(
            "/api/check-stitched-video",
            get(api::handlers::stitched::check_stitched_video).fallback(method_not_allowed),
        )
        .layer(from_fn(api::middleware::security::security_headers))
        .layer(from_fn(api::middleware::metrics::metrics_middleware))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(cors_layer(&state.config.allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let allow_origin = if allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(
            allowed_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([api::middleware::request_id::REQUEST_ID_HEADER])
}
