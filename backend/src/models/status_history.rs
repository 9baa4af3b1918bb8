use chrono::{DateTime, Utc};
use civreg_lifecycle::StatusHistoryEntry;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct StatusHistoryRow {
    pub id: Uuid,
    pub request_id: Uuid,
    pub from_status: Option<String>,
    pub to_status: String,
    pub action: String,
    pub actor_id: String,
    pub actor_name: Option<String>,
    pub reason: Option<String>,
    pub is_override: bool,
    pub created_at: DateTime<Utc>,
}

impl From<StatusHistoryRow> for StatusHistoryEntry {
    fn from(row: StatusHistoryRow) -> Self {
        StatusHistoryEntry {
            id: row.id,
            request_id: row.request_id,
            from_status: row.from_status,
            to_status: row.to_status,
            action: row.action,
            actor_id: row.actor_id,
            actor_name: row.actor_name,
            reason: row.reason,
            is_override: row.is_override,
            created_at: row.created_at,
        }
    }
}
