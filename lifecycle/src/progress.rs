//! Status badges and progress bars.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::definitions::lifecycle_for;
use crate::kind::RequestKind;
use crate::lifecycle::{BadgeColor, StatusPosition};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusBadge {
    pub status: String,
    pub label: String,
    pub color: BadgeColor,
    /// `None` for side exits and statuses the lifecycle does not know.
    pub progress_percent: Option<u8>,
    pub known: bool,
}

/// Maps a stored status to its badge. Unknown values get a gray "Unknown"
/// badge that keeps the raw value in `status`.
pub fn render_status(kind: RequestKind, status: &str) -> StatusBadge {
    let lifecycle = lifecycle_for(kind);
    match lifecycle.locate(status) {
        Some(StatusPosition::Forward(index)) => {
            let stage = &lifecycle.stages[index];
            StatusBadge {
                status: stage.status.to_string(),
                label: stage.label.to_string(),
                color: stage.color,
                progress_percent: lifecycle.progress_percent(stage.status),
                known: true,
            }
        }
        Some(StatusPosition::SideExit(index)) => {
            let exit = &lifecycle.side_exits[index];
            StatusBadge {
                status: exit.status.to_string(),
                label: exit.label.to_string(),
                color: exit.color,
                progress_percent: None,
                known: true,
            }
        }
        None => unknown_badge(status),
    }
}

fn unknown_badge(status: &str) -> StatusBadge {
    StatusBadge {
        status: status.to_string(),
        label: "Unknown".to_string(),
        color: BadgeColor::Gray,
        progress_percent: None,
        known: false,
    }
}
