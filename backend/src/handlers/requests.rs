use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use civreg_lifecycle::{
    lifecycle_for, AcknowledgePayload, OverridePayload, Priority, RequestFilter, RequestKind,
    RequestPage, RequestStats, ServiceRequest, StatusHistoryEntry, StatusUpdate,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::extract::{ApiJson, ApiQuery};
use crate::{
    error::AppError,
    models::{actor::Actor, service_request::SubmissionPayload},
    state::AppState,
};

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_PER_PAGE: i64 = 25;
const MAX_PER_PAGE: i64 = 100;
const MAX_PAGE: i64 = 1_000;
const MAX_SEARCH_LEN: usize = 100;

#[derive(Debug, Default, Deserialize, Serialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct RequestListQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub data: Vec<StatusHistoryEntry>,
}

fn parse_kind(resource: &str) -> Result<RequestKind, AppError> {
    resource
        .parse()
        .map_err(|_| AppError::NotFound(format!("Unknown resource `{}`", resource)))
}

fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::BadRequest("Invalid request id".to_string()))
}

fn parse_target(resource: &str, id: &str) -> Result<(RequestKind, Uuid), AppError> {
    Ok((parse_kind(resource)?, parse_id(id)?))
}

fn normalize_filter(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn validate_list_query(
    kind: RequestKind,
    q: RequestListQuery,
) -> Result<(i64, i64, RequestFilter), AppError> {
    let page = q.page.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE);
    let per_page = q
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);

    let status = match normalize_filter(q.status) {
        Some(raw) => Some(
            lifecycle_for(kind)
                .canonical(&raw)
                .ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "`status` {} is not a {} status",
                        raw,
                        kind.display_name()
                    ))
                })?
                .to_string(),
        ),
        None => None,
    };

    let priority = normalize_filter(q.priority)
        .map(|raw| raw.parse::<Priority>())
        .transpose()
        .map_err(|_| {
            AppError::BadRequest("`priority` must be low, medium, high, or urgent".to_string())
        })?;

    let search = normalize_filter(q.search);
    if search
        .as_deref()
        .is_some_and(|term| term.chars().count() > MAX_SEARCH_LEN)
    {
        return Err(AppError::BadRequest(format!(
            "`search` must be at most {} characters",
            MAX_SEARCH_LEN
        )));
    }

    Ok((
        page,
        per_page,
        RequestFilter {
            status,
            priority,
            search,
        },
    ))
}

#[utoipa::path(
    get,
    path = "/api/{resource}",
    params(("resource" = String, Path, description = "Request type slug"), RequestListQuery),
    responses(
        (status = 200, body = RequestPage),
        (status = 400, description = "Invalid filter"),
        (status = 404, description = "Unknown resource")
    ),
    tag = "requests"
)]
pub async fn list_requests(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    ApiQuery(q): ApiQuery<RequestListQuery>,
) -> Result<Json<RequestPage>, AppError> {
    let kind = parse_kind(&resource)?;
    let (page, per_page, filter) = validate_list_query(kind, q)?;
    let result = state
        .transitions()
        .list(kind, &filter, page, per_page)
        .await?;
    Ok(Json(result))
}

#[utoipa::path(
    get,
    path = "/api/{resource}/stats",
    params(("resource" = String, Path, description = "Request type slug")),
    responses((status = 200, body = RequestStats), (status = 404, description = "Unknown resource")),
    tag = "requests"
)]
pub async fn request_stats(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> Result<Json<RequestStats>, AppError> {
    let kind = parse_kind(&resource)?;
    Ok(Json(state.transitions().stats(kind).await?))
}

#[utoipa::path(
    post,
    path = "/api/{resource}",
    params(("resource" = String, Path, description = "Request type slug")),
    request_body = SubmissionPayload,
    responses(
        (status = 201, body = ServiceRequest),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Unknown resource")
    ),
    tag = "requests"
)]
pub async fn create_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(resource): Path<String>,
    ApiJson(payload): ApiJson<SubmissionPayload>,
) -> Result<(StatusCode, Json<ServiceRequest>), AppError> {
    let kind = parse_kind(&resource)?;
    payload.validate()?;
    let created = state.transitions().submit(kind, &actor, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Request type slug"),
        ("id" = Uuid, Path, description = "Request id")
    ),
    responses((status = 200, body = ServiceRequest), (status = 404, description = "Not found")),
    tag = "requests"
)]
pub async fn get_request(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<ServiceRequest>, AppError> {
    let (kind, id) = parse_target(&resource, &id)?;
    Ok(Json(state.transitions().get(kind, id).await?))
}

#[utoipa::path(
    patch,
    path = "/api/{resource}/{id}/status",
    params(
        ("resource" = String, Path, description = "Request type slug"),
        ("id" = Uuid, Path, description = "Request id")
    ),
    request_body = StatusUpdate,
    responses(
        (status = 200, body = ServiceRequest),
        (status = 400, description = "Unknown status or missing required fields"),
        (status = 403, description = "Staff role required"),
        (status = 409, description = "Transition not allowed or request changed concurrently")
    ),
    tag = "requests"
)]
pub async fn update_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((resource, id)): Path<(String, String)>,
    ApiJson(update): ApiJson<StatusUpdate>,
) -> Result<Json<ServiceRequest>, AppError> {
    let (kind, id) = parse_target(&resource, &id)?;
    if update.status.trim().is_empty() {
        return Err(AppError::BadRequest("`status` is required".to_string()));
    }
    let updated = state
        .transitions()
        .update_status(kind, id, &actor, update)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    post,
    path = "/api/{resource}/{id}/acknowledge",
    params(
        ("resource" = String, Path, description = "Request type slug"),
        ("id" = Uuid, Path, description = "Request id")
    ),
    request_body = AcknowledgePayload,
    responses(
        (status = 200, body = ServiceRequest),
        (status = 400, description = "Missing acknowledged_by or kind cannot be acknowledged"),
        (status = 409, description = "Request is past acknowledgement")
    ),
    tag = "requests"
)]
pub async fn acknowledge_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((resource, id)): Path<(String, String)>,
    ApiJson(payload): ApiJson<AcknowledgePayload>,
) -> Result<Json<ServiceRequest>, AppError> {
    let (kind, id) = parse_target(&resource, &id)?;
    let updated = state
        .transitions()
        .acknowledge(kind, id, &actor, payload)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    post,
    path = "/api/{resource}/{id}/override",
    params(
        ("resource" = String, Path, description = "Request type slug"),
        ("id" = Uuid, Path, description = "Request id")
    ),
    request_body = OverridePayload,
    responses(
        (status = 200, body = ServiceRequest),
        (status = 400, description = "Missing reason or unsupported request type"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Override rejected for the current state")
    ),
    tag = "requests"
)]
pub async fn override_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((resource, id)): Path<(String, String)>,
    ApiJson(payload): ApiJson<OverridePayload>,
) -> Result<Json<ServiceRequest>, AppError> {
    let (kind, id) = parse_target(&resource, &id)?;
    let updated = state
        .transitions()
        .apply_override(kind, id, &actor, payload)
        .await?;
    Ok(Json(updated))
}

#[utoipa::path(
    get,
    path = "/api/{resource}/{id}/history",
    params(
        ("resource" = String, Path, description = "Request type slug"),
        ("id" = Uuid, Path, description = "Request id")
    ),
    responses((status = 200, body = HistoryResponse), (status = 404, description = "Not found")),
    tag = "requests"
)]
pub async fn request_history(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> Result<Json<HistoryResponse>, AppError> {
    let (kind, id) = parse_target(&resource, &id)?;
    let data = state.transitions().history(kind, id).await?;
    Ok(Json(HistoryResponse { data }))
}
