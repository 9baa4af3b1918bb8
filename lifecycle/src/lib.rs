//! Request lifecycle model shared by the registry backend and the staff console.
//!
//! Every request type (death registration, burial permit, water connection,
//! tickets, reservations, certificates) is described by one static
//! [`Lifecycle`] table looked up through [`lifecycle_for`]. Badges, progress,
//! enabled staff actions and override planning are all derived from that table.

pub mod actions;
pub mod definitions;
pub mod error;
pub mod filter;
pub mod kind;
pub mod lifecycle;
pub mod model;
pub mod overrides;
pub mod progress;

pub use actions::{available_actions, ActionInput, StaffAction};
pub use definitions::lifecycle_for;
pub use error::{InputError, OverrideError, TransitionError};
pub use filter::RequestFilter;
pub use kind::{RequestKind, UnknownKind};
pub use lifecycle::{
    BadgeColor, Lifecycle, Requirement, SideExit, Stage, StageStamp, StatusPosition,
    TransitionKind,
};
pub use model::{
    AcknowledgePayload, CreateServiceRequest, Priority, RequestPage, RequestStats,
    ServiceRequest, StatusHistoryEntry, StatusUpdate,
};
pub use overrides::{plan_override, OverrideAction, OverridePayload, OverridePlan, OverrideSnapshot};
pub use progress::{render_status, StatusBadge};
