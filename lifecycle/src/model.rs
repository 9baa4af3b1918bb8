//! JSON shapes exchanged between the registry API and its clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::actions::ActionInput;
use crate::kind::RequestKind;
use crate::progress::{render_status, StatusBadge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            other => Err(format!("Invalid priority: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub kind: RequestKind,
    pub reference_number: String,
    pub status: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    pub subject_name: String,
    #[serde(default)]
    pub subject_ref: Option<String>,
    pub requester_name: String,
    #[serde(default)]
    pub requester_contact: Option<String>,
    #[serde(default)]
    pub barangay: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub amount_due_centavos: Option<i64>,
    #[serde(default)]
    pub or_number: Option<String>,
    #[serde(default)]
    pub fee_waived: bool,
    #[serde(default)]
    pub expedited: bool,
    #[serde(default)]
    pub assigned_staff_id: Option<String>,
    #[serde(default)]
    pub acknowledged_by: Option<String>,
    #[serde(default)]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub details: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    /// Bumped on every stored change. Writes are conditional on it.
    #[serde(default)]
    pub revision: i64,
}

impl ServiceRequest {
    pub fn badge(&self) -> StatusBadge {
        render_status(self.kind, &self.status)
    }

    pub fn is_paid(&self) -> bool {
        self.paid_at.is_some() || self.fee_waived
    }
}

/// Citizen submission payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    pub subject_name: String,
    #[serde(default)]
    pub subject_ref: Option<String>,
    pub requester_name: String,
    #[serde(default)]
    pub requester_contact: Option<String>,
    #[serde(default)]
    pub barangay: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub amount_due_centavos: Option<i64>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub details: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusUpdate {
    pub status: String,
    #[serde(flatten)]
    pub input: ActionInput,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AcknowledgePayload {
    #[serde(default)]
    pub acknowledged_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// List envelope. Older endpoints answer `{ success, data }`, so everything
/// except `data` is optional when reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RequestPage {
    pub data: Vec<ServiceRequest>,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub per_page: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RequestStats {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
    #[serde(default)]
    pub submitted_today: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusHistoryEntry {
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
