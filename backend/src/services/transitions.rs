//! Executes submissions, status changes, acknowledgements and overrides
//! against the lifecycle tables.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use civreg_lifecycle::{
    available_actions, lifecycle_for, plan_override, AcknowledgePayload, ActionInput, Lifecycle,
    OverrideAction, OverridePayload, OverrideSnapshot, RequestFilter, RequestKind, RequestPage,
    RequestStats, ServiceRequest, StageStamp, StatusHistoryEntry, StatusUpdate, TransitionError,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        actor::Actor,
        service_request::{format_reference_number, SubmissionPayload},
    },
    repositories::ServiceRequestRepository,
    utils::time,
};

const SUBMITTED_ACTION: &str = "Submitted";
const FALLBACK_ACTION: &str = "Update Status";

#[derive(Clone)]
pub struct TransitionService {
    repository: Arc<dyn ServiceRequestRepository>,
    time_zone: Tz,
}

impl TransitionService {
    pub fn new(repository: Arc<dyn ServiceRequestRepository>, time_zone: Tz) -> Self {
        Self {
            repository,
            time_zone,
        }
    }

    pub async fn submit(
        &self,
        kind: RequestKind,
        actor: &Actor,
        payload: SubmissionPayload,
    ) -> Result<ServiceRequest, AppError> {
        let payload = payload.normalized();
        let lifecycle = lifecycle_for(kind);
        let now = time::now_utc(&self.time_zone);
        let sequence = self
            .repository
            .next_reference_sequence(kind, time::local_year(&self.time_zone, now))
            .await?;

        let request = ServiceRequest {
            id: Uuid::new_v4(),
            kind,
            reference_number: format_reference_number(
                kind,
                time::local_year(&self.time_zone, now),
                sequence,
            ),
            status: lifecycle.initial_status().to_string(),
            priority: payload.priority,
            subject_name: payload.subject_name,
            subject_ref: payload.subject_ref,
            requester_name: payload.requester_name,
            requester_contact: payload.requester_contact,
            barangay: payload.barangay,
            department: payload.department,
            amount_due_centavos: payload.amount_due_centavos,
            or_number: None,
            fee_waived: false,
            expedited: false,
            assigned_staff_id: None,
            acknowledged_by: None,
            acknowledged_at: None,
            remarks: payload.remarks,
            rejection_reason: None,
            details: payload.details,
            created_at: now,
            updated_at: now,
            approved_at: None,
            paid_at: None,
            resolved_at: None,
            closed_at: None,
            revision: 1,
        };

        let entry = StatusHistoryEntry {
            id: Uuid::new_v4(),
            request_id: request.id,
            from_status: None,
            to_status: request.status.clone(),
            action: SUBMITTED_ACTION.to_string(),
            actor_id: actor.id.clone(),
            actor_name: actor.name.clone(),
            reason: None,
            is_override: false,
            created_at: now,
        };
        self.repository.insert(&request, &entry).await?;

        tracing::info!(
            kind = %kind,
            request_id = %request.id,
            reference_number = %request.reference_number,
            "service request submitted"
        );
        Ok(request)
    }

    pub async fn get(&self, kind: RequestKind, id: Uuid) -> Result<ServiceRequest, AppError> {
        self.repository.find(kind, id).await?.ok_or_else(|| {
            AppError::NotFound(format!("{} {} not found", kind.display_name(), id))
        })
    }

    pub async fn list(
        &self,
        kind: RequestKind,
        filter: &RequestFilter,
        page: i64,
        per_page: i64,
    ) -> Result<RequestPage, AppError> {
        let offset = (page - 1) * per_page;
        let (data, total) = self.repository.list(kind, filter, per_page, offset).await?;
        Ok(RequestPage {
            data,
            total,
            page,
            per_page,
        })
    }

    pub async fn stats(&self, kind: RequestKind) -> Result<RequestStats, AppError> {
        let today_start = time::start_of_today_utc(&self.time_zone);
        self.repository.stats(kind, today_start).await
    }

    pub async fn history(
        &self,
        kind: RequestKind,
        id: Uuid,
    ) -> Result<Vec<StatusHistoryEntry>, AppError> {
        let request = self.get(kind, id).await?;
        self.repository.history(request.id).await
    }

    pub async fn update_status(
        &self,
        kind: RequestKind,
        id: Uuid,
        actor: &Actor,
        update: StatusUpdate,
    ) -> Result<ServiceRequest, AppError> {
        if !actor.is_staff() {
            return Err(AppError::Forbidden(
                "Staff role required to change request status".to_string(),
            ));
        }

        let lifecycle = lifecycle_for(kind);
        let current = self.get(kind, id).await?;
        let target = lifecycle
            .canonical(&update.status)
            .ok_or_else(|| TransitionError::UnknownStatus {
                kind,
                status: update.status.clone(),
            })?;
        lifecycle.check_transition(&current.status, target)?;

        let input = update.input.normalized();
        input.check(lifecycle.requirements_for(target))?;

        let action = available_actions(kind, &current.status)
            .into_iter()
            .find(|action| action.target == target)
            .map(|action| action.label)
            .unwrap_or(FALLBACK_ACTION);

        let now = time::now_utc(&self.time_zone);
        let mut next = current.clone();
        apply_input(&mut next, &input, lifecycle, target, now);
        move_to(&mut next, lifecycle, target, now);

        let reason = input.rejection_reason.clone().or(input.remarks.clone());
        self.commit(&current, next, actor, action.to_string(), reason, false)
            .await
    }

    pub async fn acknowledge(
        &self,
        kind: RequestKind,
        id: Uuid,
        actor: &Actor,
        payload: AcknowledgePayload,
    ) -> Result<ServiceRequest, AppError> {
        let Some(status) = lifecycle_for(kind).acknowledge_status else {
            return Err(AppError::BadRequest(format!(
                "{} requests cannot be acknowledged",
                kind.display_name()
            )));
        };
        let acknowledged_by = payload.acknowledged_by.trim();
        if acknowledged_by.is_empty() {
            return Err(AppError::BadRequest(
                "acknowledged_by is required".to_string(),
            ));
        }

        let update = StatusUpdate {
            status: status.to_string(),
            input: ActionInput {
                acknowledged_by: Some(acknowledged_by.to_string()),
                remarks: payload.remarks,
                ..Default::default()
            },
        };
        self.update_status(kind, id, actor, update).await
    }

    pub async fn apply_override(
        &self,
        kind: RequestKind,
        id: Uuid,
        actor: &Actor,
        payload: OverridePayload,
    ) -> Result<ServiceRequest, AppError> {
        if !actor.is_admin() {
            return Err(AppError::Forbidden(
                "Admin role required for override actions".to_string(),
            ));
        }

        let lifecycle = lifecycle_for(kind);
        let current = self.get(kind, id).await?;
        let plan = plan_override(
            lifecycle,
            OverrideSnapshot {
                status: &current.status,
                amount_due_centavos: current.amount_due_centavos,
                fee_waived: current.fee_waived,
                expedited: current.expedited,
            },
            &payload,
        )?;

        let now = time::now_utc(&self.time_zone);
        let mut next = current.clone();
        if let Some(amount) = plan.amount_due_centavos {
            next.amount_due_centavos = Some(amount);
        }
        if let Some(waived) = plan.fee_waived {
            next.fee_waived = waived;
        }
        if let Some(expedited) = plan.expedited {
            next.expedited = expedited;
        }
        if let Some(rejection_reason) = plan.rejection_reason.clone() {
            next.rejection_reason = Some(rejection_reason);
        }
        if let Some(target) = plan.to_status {
            move_to(&mut next, lifecycle, target, now);
            if plan.action == OverrideAction::ForceApprove {
                next.approved_at.get_or_insert(now);
            }
        } else {
            next.updated_at = now;
        }

        tracing::warn!(
            kind = %kind,
            request_id = %id,
            action = %plan.action,
            actor_id = %actor.id,
            "override applied"
        );
        self.commit(
            &current,
            next,
            actor,
            format!("override:{}", plan.action),
            Some(plan.reason),
            true,
        )
        .await
    }

    async fn commit(
        &self,
        previous: &ServiceRequest,
        mut next: ServiceRequest,
        actor: &Actor,
        action: String,
        reason: Option<String>,
        is_override: bool,
    ) -> Result<ServiceRequest, AppError> {
        next.revision = previous.revision + 1;
        let entry = StatusHistoryEntry {
            id: Uuid::new_v4(),
            request_id: next.id,
            from_status: Some(previous.status.clone()),
            to_status: next.status.clone(),
            action,
            actor_id: actor.id.clone(),
            actor_name: actor.name.clone(),
            reason,
            is_override,
            created_at: next.updated_at,
        };

        let saved = self
            .repository
            .save_transition(&next, previous.revision, &entry)
            .await?;
        if !saved {
            return Err(AppError::Conflict(
                "Request was updated by someone else; reload and try again".to_string(),
            ));
        }

        tracing::info!(
            kind = %next.kind,
            request_id = %next.id,
            from = %previous.status,
            to = %next.status,
            action = %entry.action,
            "request status changed"
        );
        Ok(next)
    }
}

fn apply_input(
    request: &mut ServiceRequest,
    input: &ActionInput,
    lifecycle: &Lifecycle,
    target: &str,
    now: DateTime<Utc>,
) {
    if let Some(or_number) = &input.or_number {
        request.or_number = Some(or_number.clone());
    }
    if let Some(remarks) = &input.remarks {
        request.remarks = Some(remarks.clone());
    }
    if let Some(staff) = &input.assigned_staff_id {
        request.assigned_staff_id = Some(staff.clone());
    }
    if let Some(reason) = &input.rejection_reason {
        request.rejection_reason = Some(reason.clone());
    }
    // Acknowledgement fields belong to the acknowledge stage only.
    if lifecycle.acknowledge_status == Some(target) {
        if let Some(by) = &input.acknowledged_by {
            request.acknowledged_by = Some(by.clone());
        }
        request.acknowledged_at.get_or_insert(now);
    }
}

/// Sets the status and the timestamp owned by the stage being entered.
fn move_to(request: &mut ServiceRequest, lifecycle: &Lifecycle, target: &str, now: DateTime<Utc>) {
    request.status = target.to_string();
    request.updated_at = now;

    match lifecycle.stage(target).and_then(|stage| stage.stamp) {
        Some(StageStamp::Approved) => {
            request.approved_at.get_or_insert(now);
        }
        Some(StageStamp::Paid) => {
            request.paid_at.get_or_insert(now);
        }
        Some(StageStamp::Resolved) => {
            request.resolved_at.get_or_insert(now);
        }
        Some(StageStamp::Closed) | None => {}
    }
    if lifecycle.is_terminal(target) {
        request.closed_at.get_or_insert(now);
    }
}
