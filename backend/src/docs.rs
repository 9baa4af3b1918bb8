use civreg_lifecycle::{
    AcknowledgePayload, ActionInput, OverrideAction, OverridePayload, Priority, RequestKind,
    RequestPage, RequestStats, ServiceRequest, StatusHistoryEntry, StatusUpdate,
};
use utoipa::OpenApi;

use crate::{
    error::ErrorResponse,
    handlers::requests::{self, HistoryResponse, RequestListQuery},
    models::service_request::SubmissionPayload,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Civil Registry Requests API",
        description = "Lifecycle-driven processing of municipal civil-registry and utility requests."
    ),
    paths(
        requests::list_requests,
        requests::request_stats,
        requests::create_request,
        requests::get_request,
        requests::update_status,
        requests::acknowledge_request,
        requests::override_request,
        requests::request_history,
    ),
    components(schemas(
        AcknowledgePayload,
        ActionInput,
        ErrorResponse,
        HistoryResponse,
        OverrideAction,
        OverridePayload,
        Priority,
        RequestKind,
        RequestListQuery,
        RequestPage,
        RequestStats,
        ServiceRequest,
        StatusHistoryEntry,
        StatusUpdate,
        SubmissionPayload,
    )),
    tags((name = "requests", description = "Service request lifecycle"))
)]
pub struct ApiDoc;
