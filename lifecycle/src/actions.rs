//! Staff actions offered for a request and the payload checks behind them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::definitions::lifecycle_for;
use crate::error::InputError;
use crate::kind::RequestKind;
use crate::lifecycle::{Lifecycle, Requirement, StatusPosition, TransitionKind};

/// Auxiliary fields sent alongside a status change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActionInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub or_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_staff_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_by: Option<String>,
}

impl ActionInput {
    fn value_for(&self, requirement: Requirement) -> Option<&str> {
        let value = match requirement {
            Requirement::OrNumber => self.or_number.as_deref(),
            Requirement::RejectionReason => self.rejection_reason.as_deref(),
            Requirement::AssignedStaff => self.assigned_staff_id.as_deref(),
            Requirement::AcknowledgedBy => self.acknowledged_by.as_deref(),
            Requirement::Remarks => self.remarks.as_deref(),
        };
        value.map(str::trim).filter(|value| !value.is_empty())
    }

    /// Fails with every blank field listed in `requires`.
    pub fn check(&self, requires: &[Requirement]) -> Result<(), InputError> {
        let missing: Vec<&'static str> = requires
            .iter()
            .filter(|requirement| self.value_for(**requirement).is_none())
            .map(Requirement::field)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(InputError::MissingFields(missing))
        }
    }

    /// Copy with surrounding whitespace removed and blank values dropped.
    pub fn normalized(&self) -> Self {
        fn clean(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        }
        Self {
            or_number: clean(&self.or_number),
            remarks: clean(&self.remarks),
            assigned_staff_id: clean(&self.assigned_staff_id),
            rejection_reason: clean(&self.rejection_reason),
            acknowledged_by: clean(&self.acknowledged_by),
        }
    }
}

/// A button a staff member may press for a request in its current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StaffAction {
    pub label: &'static str,
    pub target: &'static str,
    pub kind: TransitionKind,
    pub requires: &'static [Requirement],
}

impl StaffAction {
    pub fn validate(&self, input: &ActionInput) -> Result<(), InputError> {
        input.check(self.requires)
    }
}

/// Actions enabled for `status`. Terminal and unknown statuses get none.
pub fn available_actions(kind: RequestKind, status: &str) -> Vec<StaffAction> {
    lifecycle_for(kind).available_actions(status)
}

impl Lifecycle {
    pub fn available_actions(&self, status: &str) -> Vec<StaffAction> {
        let Some(position) = self.locate(status) else {
            return Vec::new();
        };
        if self.is_terminal(status) {
            return Vec::new();
        }

        match position {
            StatusPosition::Forward(index) => {
                let current = self.stages[index].status;
                let forward = self.forward_targets(index).map(|stage| StaffAction {
                    label: stage.entry_action,
                    target: stage.status,
                    kind: TransitionKind::Forward,
                    requires: stage.requires,
                });
                let exits = self
                    .side_exits
                    .iter()
                    .filter(|exit| exit.from.contains(&current))
                    .map(|exit| StaffAction {
                        label: exit.action,
                        target: exit.status,
                        kind: TransitionKind::SideExit,
                        requires: exit.requires,
                    });
                forward.chain(exits).collect()
            }
            StatusPosition::SideExit(index) => self.side_exits[index]
                .resume
                .map(|resume| StaffAction {
                    label: resume.action,
                    target: resume.to,
                    kind: TransitionKind::Resume,
                    requires: self.requirements_for(resume.to),
                })
                .into_iter()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(kind: RequestKind, status: &str) -> Vec<&'static str> {
        available_actions(kind, status)
            .into_iter()
            .map(|action| action.label)
            .collect()
    }

    #[test]
    fn paid_death_registration_offers_only_complete_registration() {
        let actions = available_actions(RequestKind::DeathRegistration, "PAID");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].label, "Complete Registration");
        assert_eq!(actions[0].target, "REGISTERED");
    }

    #[test]
    fn early_states_offer_side_exits() {
        assert_eq!(
            labels(RequestKind::DeathRegistration, "SUBMITTED"),
            vec![
                "Start Verification",
                "Reject",
                "Mark Expired",
                "Return to Applicant"
            ]
        );
    }

    #[test]
    fn optional_stage_offers_both_targets() {
        assert_eq!(
            labels(RequestKind::WaterIssue, "PENDING"),
            vec!["Acknowledge", "Assign Staff"]
        );
    }

    #[test]
    fn returned_registration_can_only_be_resubmitted() {
        let actions = available_actions(RequestKind::DeathRegistration, "RETURNED");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, TransitionKind::Resume);
        assert_eq!(actions[0].target, "SUBMITTED");
    }

    #[test]
    fn lifecycle_method_matches_kind_lookup() {
        let lifecycle = lifecycle_for(RequestKind::AmenityReservation);
        assert_eq!(
            lifecycle.available_actions("pending_review"),
            available_actions(RequestKind::AmenityReservation, "PENDING_REVIEW")
        );
        assert!(!lifecycle.available_actions("PENDING_REVIEW").is_empty());
    }

    #[test]
    fn terminal_and_unknown_statuses_have_no_actions() {
        assert!(available_actions(RequestKind::BurialPermit, "claimed").is_empty());
        assert!(available_actions(RequestKind::BurialPermit, "cancelled").is_empty());
        assert!(available_actions(RequestKind::BurialPermit, "mystery").is_empty());
    }

    #[test]
    fn validate_lists_blank_required_fields() {
        let action = available_actions(RequestKind::BurialPermit, "for_payment")
            .into_iter()
            .find(|action| action.target == "paid")
            .expect("payment action");
        let input = ActionInput {
            or_number: Some("   ".to_string()),
            ..ActionInput::default()
        };
        assert_eq!(
            action.validate(&input),
            Err(InputError::MissingFields(vec!["or_number"]))
        );

        let input = ActionInput {
            or_number: Some("OR-1001".to_string()),
            ..ActionInput::default()
        };
        assert!(action.validate(&input).is_ok());
    }

    #[test]
    fn normalized_trims_and_drops_blank_values() {
        let input = ActionInput {
            remarks: Some("  checked  ".to_string()),
            or_number: Some(" ".to_string()),
            ..ActionInput::default()
        };
        let normalized = input.normalized();
        assert_eq!(normalized.remarks.as_deref(), Some("checked"));
        assert!(normalized.or_number.is_none());
    }
}
