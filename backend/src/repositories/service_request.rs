//! Persistence for service requests and their status history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use civreg_lifecycle::{RequestFilter, RequestKind, RequestStats, ServiceRequest, StatusHistoryEntry};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::common::{like_pattern, push_clause};
use super::transaction::{begin_transaction, commit_transaction};
use crate::error::AppError;
use crate::models::service_request::{ServiceRequestRow, SERVICE_REQUEST_COLUMNS};
use crate::models::status_history::StatusHistoryRow;

/// Storage seam for the transition service.
///
/// Use `MockServiceRequestRepository` in unit tests; integration tests plug
/// in an in-memory implementation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceRequestRepository: Send + Sync {
    /// Stores a new request together with its first history entry.
    async fn insert(
        &self,
        request: &ServiceRequest,
        entry: &StatusHistoryEntry,
    ) -> Result<(), AppError>;

    async fn find(&self, kind: RequestKind, id: Uuid) -> Result<Option<ServiceRequest>, AppError>;

    /// Newest first. Returns the page and the total number of matches.
    async fn list(
        &self,
        kind: RequestKind,
        filter: &RequestFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ServiceRequest>, i64), AppError>;

    async fn stats(
        &self,
        kind: RequestKind,
        today_start: DateTime<Utc>,
    ) -> Result<RequestStats, AppError>;

    /// Next value of the per-kind, per-year reference counter, starting at 1.
    async fn next_reference_sequence(&self, kind: RequestKind, year: i32)
        -> Result<i64, AppError>;

    /// Writes `request` only if the stored revision still equals
    /// `expected_revision`, appending `entry` in the same transaction.
    /// `request.revision` is the revision being written. Returns `false`
    /// when another writer changed the request first, whether or not that
    /// write touched the status.
    async fn save_transition(
        &self,
        request: &ServiceRequest,
        expected_revision: i64,
        entry: &StatusHistoryEntry,
    ) -> Result<bool, AppError>;

    /// Oldest first.
    async fn history(&self, request_id: Uuid) -> Result<Vec<StatusHistoryEntry>, AppError>;
}

#[derive(Clone)]
pub struct PgServiceRequestRepository {
    pool: PgPool,
}

impl PgServiceRequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_domain(rows: Vec<ServiceRequestRow>) -> Result<Vec<ServiceRequest>, AppError> {
    rows.into_iter()
        .map(|row| ServiceRequest::try_from(row).map_err(|e| AppError::InternalServerError(e.into())))
        .collect()
}

fn apply_filters<'a>(
    builder: &mut QueryBuilder<'a, Postgres>,
    kind: RequestKind,
    filter: &'a RequestFilter,
) {
    let mut has_clause = false;
    push_clause(builder, &mut has_clause);
    builder.push("kind = ").push_bind(kind.slug());

    if let Some(status) = filter.status.as_deref() {
        push_clause(builder, &mut has_clause);
        builder.push("status = ").push_bind(status);
    }
    if let Some(priority) = filter.priority {
        push_clause(builder, &mut has_clause);
        builder.push("priority = ").push_bind(priority.as_str());
    }
    if let Some(search) = filter.search.as_deref() {
        let pattern = like_pattern(search);
        push_clause(builder, &mut has_clause);
        builder.push("(");
        for (i, column) in [
            "reference_number",
            "subject_name",
            "requester_name",
            "department",
            "barangay",
        ]
        .into_iter()
        .enumerate()
        {
            if i > 0 {
                builder.push(" OR ");
            }
            builder
                .push(column)
                .push(" ILIKE ")
                .push_bind(pattern.clone());
        }
        builder.push(")");
    }
}

const SAVE_TRANSITION_SQL: &str = "UPDATE service_requests SET status = $1, \
     amount_due_centavos = $2, or_number = $3, fee_waived = $4, expedited = $5, \
     assigned_staff_id = $6, acknowledged_by = $7, acknowledged_at = $8, remarks = $9, \
     rejection_reason = $10, updated_at = $11, approved_at = $12, paid_at = $13, \
     resolved_at = $14, closed_at = $15, revision = $16 \
     WHERE id = $17 AND kind = $18 AND revision = $19";

async fn insert_history(
    tx: &mut sqlx::PgConnection,
    entry: &StatusHistoryEntry,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO request_status_history \
         (id, request_id, from_status, to_status, action, actor_id, actor_name, reason, is_override, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(entry.id)
    .bind(entry.request_id)
    .bind(&entry.from_status)
    .bind(&entry.to_status)
    .bind(&entry.action)
    .bind(&entry.actor_id)
    .bind(&entry.actor_name)
    .bind(&entry.reason)
    .bind(entry.is_override)
    .bind(entry.created_at)
    .execute(tx)
    .await
    .map(|_| ())
}

#[async_trait]
impl ServiceRequestRepository for PgServiceRequestRepository {
    async fn insert(
        &self,
        request: &ServiceRequest,
        entry: &StatusHistoryEntry,
    ) -> Result<(), AppError> {
        let mut tx = begin_transaction(&self.pool).await?;
        sqlx::query(&format!(
            "INSERT INTO service_requests ({SERVICE_REQUEST_COLUMNS}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, \
              $19, $20, $21, $22, $23, $24, $25, $26, $27, $28)"
        ))
        .bind(request.id)
        .bind(request.kind.slug())
        .bind(&request.reference_number)
        .bind(&request.status)
        .bind(request.priority.map(|p| p.as_str()))
        .bind(&request.subject_name)
        .bind(&request.subject_ref)
        .bind(&request.requester_name)
        .bind(&request.requester_contact)
        .bind(&request.barangay)
        .bind(&request.department)
        .bind(request.amount_due_centavos)
        .bind(&request.or_number)
        .bind(request.fee_waived)
        .bind(request.expedited)
        .bind(&request.assigned_staff_id)
        .bind(&request.acknowledged_by)
        .bind(request.acknowledged_at)
        .bind(&request.remarks)
        .bind(&request.rejection_reason)
        .bind(&request.details)
        .bind(request.created_at)
        .bind(request.updated_at)
        .bind(request.approved_at)
        .bind(request.paid_at)
        .bind(request.resolved_at)
        .bind(request.closed_at)
        .bind(request.revision)
        .execute(&mut *tx)
        .await?;
        insert_history(&mut tx, entry).await?;
        commit_transaction(tx).await
    }

    async fn find(&self, kind: RequestKind, id: Uuid) -> Result<Option<ServiceRequest>, AppError> {
        let row = sqlx::query_as::<_, ServiceRequestRow>(&format!(
            "SELECT {SERVICE_REQUEST_COLUMNS} FROM service_requests WHERE id = $1 AND kind = $2"
        ))
        .bind(id)
        .bind(kind.slug())
        .fetch_optional(&self.pool)
        .await?;
        row.map(ServiceRequest::try_from)
            .transpose()
            .map_err(|e| AppError::InternalServerError(e.into()))
    }

    async fn list(
        &self,
        kind: RequestKind,
        filter: &RequestFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<ServiceRequest>, i64), AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {SERVICE_REQUEST_COLUMNS} FROM service_requests"
        ));
        apply_filters(&mut builder, kind, filter);
        builder
            .push(" ORDER BY created_at DESC, id DESC")
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let rows = builder
            .build_query_as::<ServiceRequestRow>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM service_requests");
        apply_filters(&mut count_builder, kind, filter);
        let total = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok((into_domain(rows)?, total))
    }

    async fn stats(
        &self,
        kind: RequestKind,
        today_start: DateTime<Utc>,
    ) -> Result<RequestStats, AppError> {
        let counts: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM service_requests WHERE kind = $1 GROUP BY status",
        )
        .bind(kind.slug())
        .fetch_all(&self.pool)
        .await?;

        let submitted_today: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM service_requests WHERE kind = $1 AND created_at >= $2",
        )
        .bind(kind.slug())
        .bind(today_start)
        .fetch_one(&self.pool)
        .await?;

        let total = counts.iter().map(|(_, count)| count).sum();
        Ok(RequestStats {
            total,
            by_status: counts.into_iter().collect::<BTreeMap<_, _>>(),
            submitted_today,
        })
    }

    async fn next_reference_sequence(
        &self,
        kind: RequestKind,
        year: i32,
    ) -> Result<i64, AppError> {
        let value: i64 = sqlx::query_scalar(
            "INSERT INTO reference_counters (kind, year, last_value) VALUES ($1, $2, 1) \
             ON CONFLICT (kind, year) DO UPDATE SET last_value = reference_counters.last_value + 1 \
             RETURNING last_value",
        )
        .bind(kind.slug())
        .bind(year)
        .fetch_one(&self.pool)
        .await?;
        Ok(value)
    }

    async fn save_transition(
        &self,
        request: &ServiceRequest,
        expected_revision: i64,
        entry: &StatusHistoryEntry,
    ) -> Result<bool, AppError> {
        let mut tx = begin_transaction(&self.pool).await?;
        let result = sqlx::query(SAVE_TRANSITION_SQL)
        .bind(&request.status)
        .bind(request.amount_due_centavos)
        .bind(&request.or_number)
        .bind(request.fee_waived)
        .bind(request.expedited)
        .bind(&request.assigned_staff_id)
        .bind(&request.acknowledged_by)
        .bind(request.acknowledged_at)
        .bind(&request.remarks)
        .bind(&request.rejection_reason)
        .bind(request.updated_at)
        .bind(request.approved_at)
        .bind(request.paid_at)
        .bind(request.resolved_at)
        .bind(request.closed_at)
        .bind(request.revision)
        .bind(request.id)
        .bind(request.kind.slug())
        .bind(expected_revision)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        insert_history(&mut tx, entry).await?;
        commit_transaction(tx).await?;
        Ok(true)
    }

    async fn history(&self, request_id: Uuid) -> Result<Vec<StatusHistoryEntry>, AppError> {
        let rows = sqlx::query_as::<_, StatusHistoryRow>(
            "SELECT id, request_id, from_status, to_status, action, actor_id, actor_name, reason, \
             is_override, created_at FROM request_status_history \
             WHERE request_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(StatusHistoryEntry::from).collect())
    }
}
