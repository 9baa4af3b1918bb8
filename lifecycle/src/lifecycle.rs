//! Lifecycle definitions: ordered forward stages plus side exits.
//!
//! A lifecycle is static data. Every lookup takes the raw status string as
//! stored on a request, resolves it case-insensitively, and treats anything it
//! cannot resolve as unknown instead of failing hard.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::TransitionError;
use crate::kind::RequestKind;

/// Badge palette shared by every request type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BadgeColor {
    Gray,
    Blue,
    Cyan,
    Yellow,
    Orange,
    Purple,
    Indigo,
    Teal,
    Green,
    Red,
}

/// Fields a status change must carry before it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    OrNumber,
    RejectionReason,
    AssignedStaff,
    AcknowledgedBy,
    Remarks,
}

impl Requirement {
    /// Payload field name reported back to callers.
    pub fn field(&self) -> &'static str {
        match self {
            Requirement::OrNumber => "or_number",
            Requirement::RejectionReason => "rejection_reason",
            Requirement::AssignedStaff => "assigned_staff_id",
            Requirement::AcknowledgedBy => "acknowledged_by",
            Requirement::Remarks => "remarks",
        }
    }
}

/// Timestamp column written when a request enters a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStamp {
    Approved,
    Paid,
    Resolved,
    Closed,
}

#[derive(Debug, Clone, Copy)]
pub struct Stage {
    pub status: &'static str,
    pub label: &'static str,
    pub color: BadgeColor,
    /// Label of the staff action that moves a request into this stage.
    pub entry_action: &'static str,
    pub requires: &'static [Requirement],
    pub optional: bool,
    pub stamp: Option<StageStamp>,
}

impl Stage {
    pub const fn new(
        status: &'static str,
        label: &'static str,
        color: BadgeColor,
        entry_action: &'static str,
    ) -> Self {
        Self {
            status,
            label,
            color,
            entry_action,
            requires: &[],
            optional: false,
            stamp: None,
        }
    }

    pub const fn requiring(mut self, requires: &'static [Requirement]) -> Self {
        self.requires = requires;
        self
    }

    pub const fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub const fn stamping(mut self, stamp: StageStamp) -> Self {
        self.stamp = Some(stamp);
        self
    }
}

/// Way back onto the forward path from a non-terminal side exit.
#[derive(Debug, Clone, Copy)]
pub struct Resume {
    pub to: &'static str,
    pub action: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct SideExit {
    pub status: &'static str,
    pub label: &'static str,
    pub color: BadgeColor,
    pub action: &'static str,
    /// Forward statuses this exit is reachable from.
    pub from: &'static [&'static str],
    pub requires: &'static [Requirement],
    pub resume: Option<Resume>,
}

impl SideExit {
    pub const fn new(
        status: &'static str,
        label: &'static str,
        color: BadgeColor,
        action: &'static str,
        from: &'static [&'static str],
    ) -> Self {
        Self {
            status,
            label,
            color,
            action,
            from,
            requires: &[],
            resume: None,
        }
    }

    pub const fn requiring(mut self, requires: &'static [Requirement]) -> Self {
        self.requires = requires;
        self
    }

    pub const fn resuming(mut self, to: &'static str, action: &'static str) -> Self {
        self.resume = Some(Resume { to, action });
        self
    }

    fn reachable_from(&self, status: &str) -> bool {
        self.from.iter().any(|candidate| *candidate == status)
    }
}

/// Where a status sits within a lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusPosition {
    Forward(usize),
    SideExit(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransitionKind {
    Forward,
    SideExit,
    Resume,
}

#[derive(Debug)]
pub struct Lifecycle {
    pub kind: RequestKind,
    pub stages: &'static [Stage],
    pub side_exits: &'static [SideExit],
    /// Stage in which a request waits for payment.
    pub payment_status: Option<&'static str>,
    /// Stage entered once payment is confirmed.
    pub paid_status: Option<&'static str>,
    pub rejection_status: Option<&'static str>,
    /// Stage entered through an explicit acknowledge call.
    pub acknowledge_status: Option<&'static str>,
    /// Target of a force-approve override; `None` disables overrides.
    pub override_approve_to: Option<&'static str>,
}

impl Lifecycle {
    pub fn initial_status(&self) -> &'static str {
        self.stages[0].status
    }

    pub fn supports_overrides(&self) -> bool {
        self.override_approve_to.is_some()
    }

    pub fn locate(&self, status: &str) -> Option<StatusPosition> {
        let status = status.trim();
        if let Some(index) = self
            .stages
            .iter()
            .position(|stage| stage.status.eq_ignore_ascii_case(status))
        {
            return Some(StatusPosition::Forward(index));
        }
        self.side_exits
            .iter()
            .position(|exit| exit.status.eq_ignore_ascii_case(status))
            .map(StatusPosition::SideExit)
    }

    /// Declared spelling of `status`, if the lifecycle knows it.
    pub fn canonical(&self, status: &str) -> Option<&'static str> {
        self.locate(status).map(|position| self.status_at(position))
    }

    pub fn stage(&self, status: &str) -> Option<&Stage> {
        match self.locate(status)? {
            StatusPosition::Forward(index) => self.stages.get(index),
            StatusPosition::SideExit(_) => None,
        }
    }

    pub fn side_exit(&self, status: &str) -> Option<&SideExit> {
        match self.locate(status)? {
            StatusPosition::SideExit(index) => self.side_exits.get(index),
            StatusPosition::Forward(_) => None,
        }
    }

    pub fn is_terminal(&self, status: &str) -> bool {
        match self.locate(status) {
            Some(position) => self.position_is_terminal(position),
            None => false,
        }
    }

    /// Position along the forward path, `None` for side exits and unknown values.
    pub fn forward_index(&self, status: &str) -> Option<usize> {
        match self.locate(status)? {
            StatusPosition::Forward(index) => Some(index),
            StatusPosition::SideExit(_) => None,
        }
    }

    /// `true` when `status` is on the forward path at or after `reference`.
    pub fn reached(&self, status: &str, reference: &str) -> bool {
        match (self.forward_index(status), self.forward_index(reference)) {
            (Some(current), Some(target)) => current >= target,
            _ => false,
        }
    }

    /// Progress as `(index + 1) * 100 / len`; the last forward stage is 100.
    pub fn progress_percent(&self, status: &str) -> Option<u8> {
        let index = self.forward_index(status)?;
        let percent = (index + 1) * 100 / self.stages.len();
        u8::try_from(percent).ok()
    }

    /// Stages reachable by a forward move from `index`: the next stage, plus
    /// any stage after a run of optional ones.
    pub fn forward_targets(&self, index: usize) -> impl Iterator<Item = &Stage> + '_ {
        let mut done = false;
        self.stages
            .iter()
            .skip(index + 1)
            .take_while(move |stage| {
                if done {
                    return false;
                }
                if !stage.optional {
                    done = true;
                }
                true
            })
    }

    pub fn check_transition(
        &self,
        from: &str,
        to: &str,
    ) -> Result<TransitionKind, TransitionError> {
        let from_position = self.locate(from).ok_or_else(|| self.unknown(from))?;
        let to_position = self.locate(to).ok_or_else(|| self.unknown(to))?;
        let from_status = self.status_at(from_position);
        let to_status = self.status_at(to_position);

        if self.position_is_terminal(from_position) {
            return Err(TransitionError::Terminal {
                status: from_status,
            });
        }

        let not_allowed = TransitionError::NotAllowed {
            from: from_status,
            to: to_status,
        };

        match (from_position, to_position) {
            (StatusPosition::Forward(current), StatusPosition::Forward(_)) => {
                if self
                    .forward_targets(current)
                    .any(|stage| stage.status == to_status)
                {
                    Ok(TransitionKind::Forward)
                } else {
                    Err(not_allowed)
                }
            }
            (StatusPosition::Forward(_), StatusPosition::SideExit(exit)) => {
                if self.side_exits[exit].reachable_from(from_status) {
                    Ok(TransitionKind::SideExit)
                } else {
                    Err(not_allowed)
                }
            }
            (StatusPosition::SideExit(exit), _) => match self.side_exits[exit].resume {
                Some(resume) if resume.to == to_status => Ok(TransitionKind::Resume),
                _ => Err(not_allowed),
            },
        }
    }

    /// Requirements a move into `status` must satisfy.
    pub fn requirements_for(&self, status: &str) -> &'static [Requirement] {
        match self.locate(status) {
            Some(StatusPosition::Forward(index)) => self.stages[index].requires,
            Some(StatusPosition::SideExit(index)) => self.side_exits[index].requires,
            None => &[],
        }
    }

    fn status_at(&self, position: StatusPosition) -> &'static str {
        match position {
            StatusPosition::Forward(index) => self.stages[index].status,
            StatusPosition::SideExit(index) => self.side_exits[index].status,
        }
    }

    fn position_is_terminal(&self, position: StatusPosition) -> bool {
        match position {
            StatusPosition::Forward(index) => index + 1 == self.stages.len(),
            StatusPosition::SideExit(index) => self.side_exits[index].resume.is_none(),
        }
    }

    fn unknown(&self, status: &str) -> TransitionError {
        TransitionError::UnknownStatus {
            kind: self.kind,
            status: status.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::lifecycle_for;

    #[test]
    fn locate_is_case_insensitive() {
        let lifecycle = lifecycle_for(RequestKind::BurialPermit);
        assert_eq!(lifecycle.canonical("FOR_PAYMENT"), Some("for_payment"));
        assert_eq!(lifecycle.canonical(" paid "), Some("paid"));
        assert_eq!(lifecycle.canonical("archived"), None);
    }

    #[test]
    fn forward_moves_follow_the_ordered_path() {
        let lifecycle = lifecycle_for(RequestKind::DeathRegistration);
        assert_eq!(
            lifecycle.check_transition("PAID", "REGISTERED"),
            Ok(TransitionKind::Forward)
        );
        assert_eq!(
            lifecycle.check_transition("PAID", "CLAIMED"),
            Err(TransitionError::NotAllowed {
                from: "PAID",
                to: "CLAIMED"
            })
        );
        assert_eq!(
            lifecycle.check_transition("REGISTERED", "PAID"),
            Err(TransitionError::NotAllowed {
                from: "REGISTERED",
                to: "PAID"
            })
        );
    }

    #[test]
    fn optional_stages_can_be_skipped() {
        let lifecycle = lifecycle_for(RequestKind::WaterIssue);
        assert_eq!(
            lifecycle.check_transition("PENDING", "ACKNOWLEDGED"),
            Ok(TransitionKind::Forward)
        );
        assert_eq!(
            lifecycle.check_transition("PENDING", "ASSIGNED"),
            Ok(TransitionKind::Forward)
        );
        assert!(lifecycle.check_transition("PENDING", "IN_PROGRESS").is_err());
    }

    #[test]
    fn side_exits_are_limited_to_their_source_states() {
        let lifecycle = lifecycle_for(RequestKind::DeathRegistration);
        assert_eq!(
            lifecycle.check_transition("PENDING_VERIFICATION", "REJECTED"),
            Ok(TransitionKind::SideExit)
        );
        assert!(lifecycle.check_transition("PAID", "REJECTED").is_err());
    }

    #[test]
    fn returned_requests_resume_at_submission() {
        let lifecycle = lifecycle_for(RequestKind::DeathRegistration);
        assert!(!lifecycle.is_terminal("RETURNED"));
        assert_eq!(
            lifecycle.check_transition("RETURNED", "SUBMITTED"),
            Ok(TransitionKind::Resume)
        );
        assert!(lifecycle.check_transition("RETURNED", "PROCESSING").is_err());
    }

    #[test]
    fn terminal_states_reject_every_move() {
        let lifecycle = lifecycle_for(RequestKind::BurialPermit);
        assert!(lifecycle.is_terminal("claimed"));
        assert!(lifecycle.is_terminal("rejected"));
        assert_eq!(
            lifecycle.check_transition("cancelled", "submitted"),
            Err(TransitionError::Terminal {
                status: "cancelled"
            })
        );
    }

    #[test]
    fn unknown_statuses_are_reported_not_panicked() {
        let lifecycle = lifecycle_for(RequestKind::AmenityReservation);
        assert!(!lifecycle.is_terminal("ON_HOLD"));
        assert_eq!(lifecycle.progress_percent("ON_HOLD"), None);
        assert_eq!(
            lifecycle.check_transition("ON_HOLD", "PAID"),
            Err(TransitionError::UnknownStatus {
                kind: RequestKind::AmenityReservation,
                status: "ON_HOLD".to_string()
            })
        );
    }

    #[test]
    fn progress_reaches_one_hundred_on_the_last_stage() {
        let lifecycle = lifecycle_for(RequestKind::DrainageTicket);
        assert_eq!(lifecycle.progress_percent("CLOSED"), Some(100));
        assert_eq!(lifecycle.progress_percent("PENDING"), Some(16));
    }

    #[test]
    fn reached_compares_forward_positions() {
        let lifecycle = lifecycle_for(RequestKind::BurialPermit);
        assert!(lifecycle.reached("issued", "paid"));
        assert!(lifecycle.reached("paid", "paid"));
        assert!(!lifecycle.reached("for_payment", "paid"));
        assert!(!lifecycle.reached("rejected", "paid"));
    }
}
