//! Admin overrides that bypass the forward-only lifecycle.
//!
//! Planning is pure: given the request's current state and the override
//! payload, [`plan_override`] returns the field changes to persist. Callers
//! record every applied plan in the status history together with the actor and
//! the mandatory reason.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::error::{InputError, OverrideError, TransitionError};
use crate::lifecycle::Lifecycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OverrideAction {
    ForceApprove,
    ForceReject,
    WaiveFee,
    AdjustFee,
    Expedite,
}

impl OverrideAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideAction::ForceApprove => "force_approve",
            OverrideAction::ForceReject => "force_reject",
            OverrideAction::WaiveFee => "waive_fee",
            OverrideAction::AdjustFee => "adjust_fee",
            OverrideAction::Expedite => "expedite",
        }
    }
}

impl fmt::Display for OverrideAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct OverridePayload {
    pub action: OverrideAction,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_amount_centavos: Option<i64>,
}

/// The parts of a request an override looks at.
#[derive(Debug, Clone, Copy)]
pub struct OverrideSnapshot<'a> {
    pub status: &'a str,
    pub amount_due_centavos: Option<i64>,
    pub fee_waived: bool,
    pub expedited: bool,
}

/// Field changes produced by an override. `None` leaves a field untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverridePlan {
    pub action: OverrideAction,
    pub to_status: Option<&'static str>,
    pub amount_due_centavos: Option<i64>,
    pub fee_waived: Option<bool>,
    pub expedited: Option<bool>,
    pub rejection_reason: Option<String>,
    pub reason: String,
}

impl OverridePlan {
    fn new(action: OverrideAction, reason: &str) -> Self {
        Self {
            action,
            to_status: None,
            amount_due_centavos: None,
            fee_waived: None,
            expedited: None,
            rejection_reason: None,
            reason: reason.to_string(),
        }
    }
}

pub fn plan_override(
    lifecycle: &Lifecycle,
    snapshot: OverrideSnapshot<'_>,
    payload: &OverridePayload,
) -> Result<OverridePlan, OverrideError> {
    let Some(approve_to) = lifecycle.override_approve_to else {
        return Err(OverrideError::Unsupported(lifecycle.kind));
    };

    let reason = payload.reason.trim();
    if reason.is_empty() {
        return Err(InputError::MissingFields(vec!["reason"]).into());
    }

    let current = lifecycle
        .canonical(snapshot.status)
        .ok_or_else(|| TransitionError::UnknownStatus {
            kind: lifecycle.kind,
            status: snapshot.status.to_string(),
        })?;
    if lifecycle.is_terminal(current) {
        return Err(TransitionError::Terminal { status: current }.into());
    }

    let mut plan = OverridePlan::new(payload.action, reason);
    let already_paid = lifecycle
        .paid_status
        .is_some_and(|paid| lifecycle.reached(current, paid));

    match payload.action {
        OverrideAction::ForceApprove => {
            if lifecycle.reached(current, approve_to) {
                return Err(OverrideError::Rejected(
                    "request is already approved",
                ));
            }
            plan.to_status = Some(approve_to);
        }
        OverrideAction::ForceReject => {
            let rejected = lifecycle
                .rejection_status
                .ok_or(OverrideError::Unsupported(lifecycle.kind))?;
            plan.to_status = Some(rejected);
            plan.rejection_reason = Some(reason.to_string());
        }
        OverrideAction::WaiveFee => {
            if snapshot.fee_waived {
                return Err(OverrideError::Rejected("fee is already waived"));
            }
            if already_paid {
                return Err(OverrideError::Rejected("fee has already been paid"));
            }
            plan.amount_due_centavos = Some(0);
            plan.fee_waived = Some(true);
            if lifecycle.payment_status == Some(current) {
                plan.to_status = lifecycle.paid_status;
            }
        }
        OverrideAction::AdjustFee => {
            let amount = payload
                .new_amount_centavos
                .ok_or_else(|| InputError::MissingFields(vec!["new_amount_centavos"]))?;
            if amount < 0 {
                return Err(InputError::Negative {
                    field: "new_amount_centavos",
                }
                .into());
            }
            if already_paid {
                return Err(OverrideError::Rejected(
                    "fee can no longer be adjusted once paid",
                ));
            }
            plan.amount_due_centavos = Some(amount);
            if snapshot.fee_waived && amount > 0 {
                plan.fee_waived = Some(false);
            }
        }
        OverrideAction::Expedite => {
            if snapshot.expedited {
                return Err(OverrideError::Rejected("request is already expedited"));
            }
            plan.expedited = Some(true);
        }
    }

    Ok(plan)
}
