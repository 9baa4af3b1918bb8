use chrono::{DateTime, Utc};
use civreg_lifecycle::{CreateServiceRequest, Priority, RequestKind, ServiceRequest, UnknownKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Stored shape of a service request; `kind` and `priority` are kept as text.
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRequestRow {
    pub id: Uuid,
    pub kind: String,
    pub reference_number: String,
    pub status: String,
    pub priority: Option<String>,
    pub subject_name: String,
    pub subject_ref: Option<String>,
    pub requester_name: String,
    pub requester_contact: Option<String>,
    pub barangay: Option<String>,
    pub department: Option<String>,
    pub amount_due_centavos: Option<i64>,
    pub or_number: Option<String>,
    pub fee_waived: bool,
    pub expedited: bool,
    pub assigned_staff_id: Option<String>,
    pub acknowledged_by: Option<String>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
    pub rejection_reason: Option<String>,
    pub details: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub revision: i64,
}

pub const SERVICE_REQUEST_COLUMNS: &str = "id, kind, reference_number, status, priority, \
     subject_name, subject_ref, requester_name, requester_contact, barangay, department, \
     amount_due_centavos, or_number, fee_waived, expedited, assigned_staff_id, acknowledged_by, \
     acknowledged_at, remarks, rejection_reason, details, created_at, updated_at, approved_at, \
     paid_at, resolved_at, closed_at, revision";

/// A stored row that no longer matches the domain vocabulary.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error(transparent)]
    Kind(#[from] UnknownKind),
    #[error("stored priority `{0}` is not recognized")]
    Priority(String),
}

impl TryFrom<ServiceRequestRow> for ServiceRequest {
    type Error = RowError;

    fn try_from(row: ServiceRequestRow) -> Result<Self, Self::Error> {
        let kind: RequestKind = row.kind.parse()?;
        let priority = match row.priority {
            Some(raw) => Some(raw.parse::<Priority>().map_err(|_| RowError::Priority(raw))?),
            None => None,
        };
        Ok(ServiceRequest {
            id: row.id,
            kind,
            reference_number: row.reference_number,
            status: row.status,
            priority,
            subject_name: row.subject_name,
            subject_ref: row.subject_ref,
            requester_name: row.requester_name,
            requester_contact: row.requester_contact,
            barangay: row.barangay,
            department: row.department,
            amount_due_centavos: row.amount_due_centavos,
            or_number: row.or_number,
            fee_waived: row.fee_waived,
            expedited: row.expedited,
            assigned_staff_id: row.assigned_staff_id,
            acknowledged_by: row.acknowledged_by,
            acknowledged_at: row.acknowledged_at,
            remarks: row.remarks,
            rejection_reason: row.rejection_reason,
            details: row.details,
            created_at: row.created_at,
            updated_at: row.updated_at,
            approved_at: row.approved_at,
            paid_at: row.paid_at,
            resolved_at: row.resolved_at,
            closed_at: row.closed_at,
            revision: row.revision,
        })
    }
}

/// Submission body as accepted over HTTP. Mirrors [`CreateServiceRequest`]
/// with field-level validation attached.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct SubmissionPayload {
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::rules::validate_not_blank")
    )]
    pub subject_name: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub subject_ref: Option<String>,
    #[validate(
        length(min = 1, max = 200),
        custom(function = "crate::validation::rules::validate_not_blank")
    )]
    pub requester_name: String,
    #[serde(default)]
    #[validate(custom(function = "crate::validation::rules::validate_contact"))]
    pub requester_contact: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub barangay: Option<String>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub department: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub amount_due_centavos: Option<i64>,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub remarks: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub details: Value,
}

impl SubmissionPayload {
    /// Trims text and turns blank optional values into `None`.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            subject_name: self.subject_name.trim().to_string(),
            subject_ref: clean(self.subject_ref),
            requester_name: self.requester_name.trim().to_string(),
            requester_contact: clean(self.requester_contact),
            barangay: clean(self.barangay),
            department: clean(self.department),
            priority: self.priority,
            amount_due_centavos: self.amount_due_centavos,
            remarks: clean(self.remarks),
            details: self.details,
        }
    }
}

impl From<CreateServiceRequest> for SubmissionPayload {
    fn from(value: CreateServiceRequest) -> Self {
        Self {
            subject_name: value.subject_name,
            subject_ref: value.subject_ref,
            requester_name: value.requester_name,
            requester_contact: value.requester_contact,
            barangay: value.barangay,
            department: value.department,
            priority: value.priority,
            amount_due_centavos: value.amount_due_centavos,
            remarks: value.remarks,
            details: value.details,
        }
    }
}

/// `DR-2026-000042` style numbers, unique per kind and calendar year.
pub fn format_reference_number(kind: RequestKind, year: i32, sequence: i64) -> String {
    format!("{}-{}-{:06}", kind.reference_prefix(), year, sequence)
}
