#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::Utc;
use civreg_console::{ActorIdentity, ApiClient, RequestBoardViewModel, RequestsRepository};
use civreg_lifecycle::{
    AcknowledgePayload, OverrideAction, OverridePayload, Priority, RequestFilter, RequestKind,
    RequestPage,
    RequestStats, ServiceRequest, StatusHistoryEntry, StatusUpdate,
};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Minimal stand-in for the registry API, served on an ephemeral port.
#[derive(Default)]
pub struct StubRegistry {
    pub requests: Mutex<Vec<ServiceRequest>>,
    pub last_query: Mutex<HashMap<String, String>>,
    pub last_actor: Mutex<Option<(String, Option<String>, String)>>,
    pub list_calls: AtomicUsize,
    pub mutation_calls: AtomicUsize,
    pub conflict_next: AtomicBool,
    pub fail_lists: AtomicBool,
}

impl StubRegistry {
    pub fn with_requests(requests: Vec<ServiceRequest>) -> Arc<Self> {
        let stub = Self::default();
        *stub.requests.lock().expect("lock") = requests;
        Arc::new(stub)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    pub fn status_of(&self, id: Uuid) -> Option<String> {
        self.requests
            .lock()
            .expect("lock")
            .iter()
            .find(|request| request.id == id)
            .map(|request| request.status.clone())
    }
}

type Shared = Arc<StubRegistry>;

fn error(status: StatusCode, message: &str, code: &str) -> Response {
    (status, Json(json!({ "error": message, "code": code }))).into_response()
}

fn check_actor(stub: &StubRegistry, headers: &HeaderMap) -> Result<(), Response> {
    let read = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let Some(id) = read("x-actor-id") else {
        return Err(error(
            StatusCode::UNAUTHORIZED,
            "Missing actor identity",
            "UNAUTHORIZED",
        ));
    };
    let role = read("x-actor-role").unwrap_or_default();
    *stub.last_actor.lock().expect("lock") = Some((id, read("x-actor-name"), role));
    Ok(())
}

async fn list(
    State(stub): State<Shared>,
    headers: HeaderMap,
    Path(_resource): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = check_actor(&stub, &headers) {
        return response;
    }
    stub.list_calls.fetch_add(1, Ordering::SeqCst);
    *stub.last_query.lock().expect("lock") = query.clone();
    if stub.fail_lists.load(Ordering::SeqCst) {
        return (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response();
    }
    let filter = RequestFilter {
        status: query.get("status").cloned(),
        priority: query.get("priority").and_then(|raw| raw.parse::<Priority>().ok()),
        search: query.get("search").cloned(),
    };
    let page: i64 = query.get("page").and_then(|raw| raw.parse().ok()).unwrap_or(1);
    let per_page: i64 = query
        .get("per_page")
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(20);
    let requests = stub.requests.lock().expect("lock");
    let matched = filter.apply(&requests);
    let total = matched.len() as i64;
    let data = matched
        .into_iter()
        .skip(((page - 1) * per_page) as usize)
        .take(per_page as usize)
        .cloned()
        .collect();
    Json(RequestPage {
        data,
        total,
        page,
        per_page,
    })
    .into_response()
}

async fn stats(State(stub): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(response) = check_actor(&stub, &headers) {
        return response;
    }
    let requests = stub.requests.lock().expect("lock");
    let mut by_status = BTreeMap::new();
    for request in requests.iter() {
        *by_status.entry(request.status.clone()).or_insert(0) += 1;
    }
    Json(RequestStats {
        total: requests.len() as i64,
        by_status,
        submitted_today: 0,
    })
    .into_response()
}

async fn get_one(
    State(stub): State<Shared>,
    headers: HeaderMap,
    Path((_resource, id)): Path<(String, Uuid)>,
) -> Response {
    if let Err(response) = check_actor(&stub, &headers) {
        return response;
    }
    let requests = stub.requests.lock().expect("lock");
    match requests.iter().find(|request| request.id == id) {
        Some(request) => Json(request.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "no such request").into_response(),
    }
}

fn mutate(
    stub: &StubRegistry,
    id: Uuid,
    change: impl FnOnce(&mut ServiceRequest),
) -> Response {
    stub.mutation_calls.fetch_add(1, Ordering::SeqCst);
    if stub.conflict_next.swap(false, Ordering::SeqCst) {
        return error(
            StatusCode::CONFLICT,
            "Request was updated by someone else; reload and try again",
            "CONFLICT",
        );
    }
    let mut requests = stub.requests.lock().expect("lock");
    let Some(request) = requests.iter_mut().find(|request| request.id == id) else {
        return error(StatusCode::NOT_FOUND, "Request not found", "NOT_FOUND");
    };
    change(request);
    request.updated_at = Utc::now();
    Json(request.clone()).into_response()
}

async fn update_status(
    State(stub): State<Shared>,
    headers: HeaderMap,
    Path((_resource, id)): Path<(String, Uuid)>,
    Json(update): Json<StatusUpdate>,
) -> Response {
    if let Err(response) = check_actor(&stub, &headers) {
        return response;
    }
    mutate(&stub, id, |request| {
        request.status = update.status;
        if let Some(or_number) = update.input.or_number {
            request.or_number = Some(or_number);
        }
    })
}

async fn acknowledge(
    State(stub): State<Shared>,
    headers: HeaderMap,
    Path((_resource, id)): Path<(String, Uuid)>,
    Json(payload): Json<AcknowledgePayload>,
) -> Response {
    if let Err(response) = check_actor(&stub, &headers) {
        return response;
    }
    mutate(&stub, id, |request| {
        request.status = "ACKNOWLEDGED".to_string();
        request.acknowledged_by = Some(payload.acknowledged_by);
        request.acknowledged_at = Some(Utc::now());
    })
}

async fn apply_override(
    State(stub): State<Shared>,
    headers: HeaderMap,
    Path((_resource, id)): Path<(String, Uuid)>,
    Json(payload): Json<OverridePayload>,
) -> Response {
    if let Err(response) = check_actor(&stub, &headers) {
        return response;
    }
    mutate(&stub, id, |request| match payload.action {
        OverrideAction::Expedite => request.expedited = true,
        OverrideAction::ForceApprove => request.status = "issued".to_string(),
        _ => {}
    })
}

async fn history(
    State(stub): State<Shared>,
    headers: HeaderMap,
    Path((_resource, id)): Path<(String, Uuid)>,
) -> Response {
    if let Err(response) = check_actor(&stub, &headers) {
        return response;
    }
    let entry = StatusHistoryEntry {
        id: Uuid::new_v4(),
        request_id: id,
        from_status: None,
        to_status: "submitted".to_string(),
        action: "Submitted".to_string(),
        actor_id: "citizen-1".to_string(),
        actor_name: None,
        reason: None,
        is_override: false,
        created_at: Utc::now(),
    };
    Json(json!({ "data": [entry] })).into_response()
}

pub async fn spawn(stub: Shared) -> String {
    let app = Router::new()
        .route("/api/{resource}", get(list))
        .route("/api/{resource}/stats", get(stats))
        .route("/api/{resource}/{id}", get(get_one))
        .route("/api/{resource}/{id}/status", patch(update_status))
        .route("/api/{resource}/{id}/acknowledge", post(acknowledge))
        .route("/api/{resource}/{id}/override", post(apply_override))
        .route("/api/{resource}/{id}/history", get(history))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub registry");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve stub registry");
    });
    format!("http://{}", addr)
}

pub fn staff() -> ActorIdentity {
    ActorIdentity::new("clerk-7", "staff").with_name("Maria Santos")
}

pub fn board(base_url: &str, kind: RequestKind) -> RequestBoardViewModel {
    let client = ApiClient::new_with_base_url(base_url).with_actor(staff());
    RequestBoardViewModel::new(RequestsRepository::new(client), kind)
}

pub fn request_fixture(kind: RequestKind, reference: &str, status: &str) -> ServiceRequest {
    let fixture: Value = json!({
        "id": Uuid::new_v4(),
        "kind": kind,
        "reference_number": reference,
        "status": status,
        "priority": Priority::Medium,
        "subject_name": "Juan Dela Cruz",
        "requester_name": "Rosa Dela Cruz",
        "barangay": "Poblacion",
        "details": {},
        "created_at": Utc::now(),
        "updated_at": Utc::now()
    });
    serde_json::from_value(fixture).expect("request fixture")
}
