#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use civreg_backend::{
    config::Config, error::AppError, repositories::ServiceRequestRepository, state::AppState,
};
use civreg_lifecycle::{
    Priority, RequestFilter, RequestKind, RequestStats, ServiceRequest, StatusHistoryEntry,
};
use serde_json::{json, Value};
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};
use tower::ServiceExt;
use uuid::Uuid;

type Interference = Box<dyn FnOnce(&mut ServiceRequest) + Send>;

/// Repository kept in process memory. Mirrors the revision-checked writes
/// of the PostgreSQL implementation.
#[derive(Default)]
pub struct InMemoryRepository {
    requests: Mutex<Vec<ServiceRequest>>,
    history: Mutex<Vec<StatusHistoryEntry>>,
    counters: Mutex<HashMap<(RequestKind, i32), i64>>,
    after_next_find: Mutex<Option<Interference>>,
}

impl InMemoryRepository {
    pub fn seed(&self, request: ServiceRequest) {
        self.requests.lock().expect("lock requests").push(request);
    }

    pub fn stored(&self, id: Uuid) -> Option<ServiceRequest> {
        self.requests
            .lock()
            .expect("lock requests")
            .iter()
            .find(|request| request.id == id)
            .cloned()
    }

    /// Simulates another writer storing `change` right after the next read.
    /// The stored revision is bumped the way a committed write would.
    pub fn change_after_next_find(&self, change: impl FnOnce(&mut ServiceRequest) + Send + 'static) {
        *self.after_next_find.lock().expect("lock hook") = Some(Box::new(change));
    }

    pub fn change_status_after_next_find(&self, status: &str) {
        let status = status.to_string();
        self.change_after_next_find(move |request| request.status = status);
    }

    pub fn history_len(&self, request_id: Uuid) -> usize {
        self.history
            .lock()
            .expect("lock history")
            .iter()
            .filter(|entry| entry.request_id == request_id)
            .count()
    }
}

#[async_trait]
impl ServiceRequestRepository for InMemoryRepository {
    async fn insert(
        &self,
        request: &ServiceRequest,
        entry: &StatusHistoryEntry,
    ) -> Result<(), AppError> {
        self.requests
            .lock()
            .expect("lock requests")
            .push(request.clone());
        self.history.lock().expect("lock history").push(entry.clone());
        Ok(())
    }

    async fn find(&self, kind: RequestKind, id: Uuid) -> Result<Option<ServiceRequest>, AppError> {
        let mut requests = self.requests.lock().expect("lock requests");
        let found = requests
            .iter()
            .find(|request| request.id == id && request.kind == kind)
            .cloned();
        if found.is_some() {
            if let Some(change) = self.after_next_find.lock().expect("lock hook").take() {
                if let Some(stored) = requests.iter_mut().find(|request| request.id == id) {
                    change(stored);
                    stored.revision += 1;
                }
            }
        }
        Ok(found)
    }

    async fn list(
        &self,
        kind: RequestKind,
        filter: &RequestFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ServiceRequest>, i64), AppError> {
        let requests = self.requests.lock().expect("lock requests");
        let mut matched: Vec<ServiceRequest> = requests
            .iter()
            .filter(|request| request.kind == kind && filter.matches(request))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = matched.len() as i64;
        let page = matched
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn stats(
        &self,
        kind: RequestKind,
        today_start: DateTime<Utc>,
    ) -> Result<RequestStats, AppError> {
        let requests = self.requests.lock().expect("lock requests");
        let mut by_status = BTreeMap::new();
        let mut total = 0;
        let mut submitted_today = 0;
        for request in requests.iter().filter(|request| request.kind == kind) {
            total += 1;
            *by_status.entry(request.status.clone()).or_insert(0) += 1;
            if request.created_at >= today_start {
                submitted_today += 1;
            }
        }
        Ok(RequestStats {
            total,
            by_status,
            submitted_today,
        })
    }

    async fn next_reference_sequence(
        &self,
        kind: RequestKind,
        year: i32,
    ) -> Result<i64, AppError> {
        let mut counters = self.counters.lock().expect("lock counters");
        let value = counters.entry((kind, year)).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn save_transition(
        &self,
        request: &ServiceRequest,
        expected_revision: i64,
        entry: &StatusHistoryEntry,
    ) -> Result<bool, AppError> {
        let mut requests = self.requests.lock().expect("lock requests");
        let Some(stored) = requests.iter_mut().find(|stored| {
            stored.id == request.id
                && stored.kind == request.kind
                && stored.revision == expected_revision
        }) else {
            return Ok(false);
        };
        *stored = request.clone();
        self.history.lock().expect("lock history").push(entry.clone());
        Ok(true)
    }

    async fn history(&self, request_id: Uuid) -> Result<Vec<StatusHistoryEntry>, AppError> {
        Ok(self
            .history
            .lock()
            .expect("lock history")
            .iter()
            .filter(|entry| entry.request_id == request_id)
            .cloned()
            .collect())
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".into(),
        server_host: "127.0.0.1".into(),
        server_port: 0,
        db_max_connections: 1,
        time_zone: chrono_tz::Asia::Manila,
        cors_allowed_origins: Vec::new(),
    }
}

pub fn test_state() -> (AppState, Arc<InMemoryRepository>) {
    let repository = Arc::new(InMemoryRepository::default());
    let state = AppState::new(repository.clone(), test_config());
    (state, repository)
}

#[derive(Debug, Clone, Copy)]
pub enum As {
    Anonymous,
    Citizen,
    Staff,
    Admin,
}

impl As {
    fn headers(self) -> Option<(&'static str, &'static str, &'static str)> {
        match self {
            As::Anonymous => None,
            As::Citizen => Some(("citizen-1", "Ana Reyes", "citizen")),
            As::Staff => Some(("staff-1", "Lorna Cruz", "staff")),
            As::Admin => Some(("admin-1", "Mayor's Office", "admin")),
        }
    }
}

/// Sends one request through `app` and returns the status and JSON body
/// (`Value::Null` for empty bodies).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    actor: As,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, name, role)) = actor.headers() {
        builder = builder
            .header("x-actor-id", id)
            .header("x-actor-name", name)
            .header("x-actor-role", role);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");

    let response = app.clone().oneshot(request).await.expect("call router");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

pub fn request_fixture(kind: RequestKind, status: &str) -> ServiceRequest {
    let created = Utc::now() - Duration::days(2);
    ServiceRequest {
        id: Uuid::new_v4(),
        kind,
        reference_number: format!(
            "{}-2026-{:06}",
            kind.reference_prefix(),
            rand_suffix()
        ),
        status: status.to_string(),
        priority: Some(Priority::Medium),
        subject_name: "Juan Dela Cruz".into(),
        subject_ref: None,
        requester_name: "Maria Dela Cruz".into(),
        requester_contact: Some("+63 917 555 0101".into()),
        barangay: Some("San Roque".into()),
        department: None,
        amount_due_centavos: Some(20_000),
        or_number: None,
        fee_waived: false,
        expedited: false,
        assigned_staff_id: None,
        acknowledged_by: None,
        acknowledged_at: None,
        remarks: None,
        rejection_reason: None,
        details: json!({}),
        created_at: created,
        updated_at: created,
        approved_at: None,
        paid_at: None,
        resolved_at: None,
        closed_at: None,
        revision: 1,
    }
}

fn rand_suffix() -> u32 {
    Uuid::new_v4().as_u128() as u32 % 1_000_000
}

pub fn submission(subject: &str) -> Value {
    json!({
        "subject_name": subject,
        "requester_name": "Maria Dela Cruz",
        "requester_contact": "maria@example.ph",
        "barangay": "San Roque",
        "priority": "high",
        "amount_due_centavos": 15000,
        "details": { "relationship": "spouse" }
    })
}
