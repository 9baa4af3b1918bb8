//! Errors raised while checking transitions and action payloads.

use crate::kind::RequestKind;

/// A requested status change that the lifecycle does not permit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("status `{status}` is not defined for {kind}")]
    UnknownStatus { kind: RequestKind, status: String },
    #[error("request is already in terminal status `{status}`")]
    Terminal { status: &'static str },
    #[error("cannot move from `{from}` to `{to}`")]
    NotAllowed { from: &'static str, to: &'static str },
}

/// Payload problems that are caught before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("`{field}` must not be negative")]
    Negative { field: &'static str },
}

/// Reasons an admin override cannot be planned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OverrideError {
    #[error("overrides are not available for {0}")]
    Unsupported(RequestKind),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("{0}")]
    Rejected(&'static str),
}
