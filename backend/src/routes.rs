use axum::{
    http::{HeaderName, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    docs::ApiDoc,
    error::AppError,
    handlers::requests,
    middleware::{
        self,
        actor::{ACTOR_ID_HEADER, ACTOR_NAME_HEADER, ACTOR_ROLE_HEADER},
    },
    state::AppState,
};

/// Request routes behind the actor-identity layer.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/{resource}",
            get(requests::list_requests).post(requests::create_request),
        )
        .route("/api/{resource}/stats", get(requests::request_stats))
        .route(
            "/api/{resource}/{id}",
            get(requests::get_request).put(requests::update_status),
        )
        .route(
            "/api/{resource}/{id}/status",
            patch(requests::update_status).put(requests::update_status),
        )
        .route(
            "/api/{resource}/{id}/acknowledge",
            post(requests::acknowledge_request),
        )
        .route(
            "/api/{resource}/{id}/override",
            post(requests::override_request),
        )
        .route(
            "/api/{resource}/{id}/history",
            get(requests::request_history),
        )
        .route_layer(axum_middleware::from_fn(middleware::require_actor))
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static(ACTOR_ID_HEADER),
            HeaderName::from_static(ACTOR_NAME_HEADER),
            HeaderName::from_static(ACTOR_ROLE_HEADER),
            HeaderName::from_static(middleware::request_id::REQUEST_ID_HEADER),
        ])
}

/// Full application: API, OpenAPI document, Swagger UI and shared layers.
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api/docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router(state))
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(middleware::request_id))
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(axum_middleware::from_fn(middleware::log_error_responses)),
        )
}
