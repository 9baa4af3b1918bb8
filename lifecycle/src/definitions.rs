//! Lifecycle tables for every request type.

use crate::kind::RequestKind;
use crate::lifecycle::{
    BadgeColor::*, Lifecycle, Requirement::*, SideExit, Stage, StageStamp,
};

const DEATH_EARLY: &[&str] = &["SUBMITTED", "PENDING_VERIFICATION", "PROCESSING"];

static DEATH_REGISTRATION: Lifecycle = Lifecycle {
    kind: RequestKind::DeathRegistration,
    stages: &[
        Stage::new("SUBMITTED", "Submitted", Gray, "Submit"),
        Stage::new(
            "PENDING_VERIFICATION",
            "Pending Verification",
            Yellow,
            "Start Verification",
        ),
        Stage::new("PROCESSING", "Processing", Blue, "Mark Verified"),
        Stage::new("PAID", "Paid", Teal, "Record Payment")
            .requiring(&[OrNumber])
            .stamping(StageStamp::Paid),
        Stage::new("REGISTERED", "Registered", Indigo, "Complete Registration")
            .stamping(StageStamp::Approved),
        Stage::new("FOR_PICKUP", "For Pickup", Purple, "Mark Ready for Pickup"),
        Stage::new("CLAIMED", "Claimed", Green, "Mark as Claimed").stamping(StageStamp::Closed),
    ],
    side_exits: &[
        SideExit::new("REJECTED", "Rejected", Red, "Reject", DEATH_EARLY)
            .requiring(&[RejectionReason]),
        SideExit::new("EXPIRED", "Expired", Gray, "Mark Expired", DEATH_EARLY),
        SideExit::new(
            "RETURNED",
            "Returned",
            Orange,
            "Return to Applicant",
            DEATH_EARLY,
        )
        .requiring(&[Remarks])
        .resuming("SUBMITTED", "Resubmit"),
    ],
    payment_status: Some("PROCESSING"),
    paid_status: Some("PAID"),
    rejection_status: Some("REJECTED"),
    acknowledge_status: None,
    override_approve_to: None,
};

static BURIAL_PERMIT: Lifecycle = Lifecycle {
    kind: RequestKind::BurialPermit,
    stages: &[
        Stage::new("submitted", "Submitted", Gray, "Submit"),
        Stage::new(
            "pending_verification",
            "Pending Verification",
            Yellow,
            "Start Verification",
        ),
        Stage::new("for_payment", "For Payment", Orange, "Approve for Payment"),
        Stage::new("paid", "Paid", Teal, "Confirm Payment")
            .requiring(&[OrNumber])
            .stamping(StageStamp::Paid),
        Stage::new("issued", "Issued", Indigo, "Issue Permit").stamping(StageStamp::Approved),
        Stage::new("claimed", "Claimed", Green, "Mark as Claimed").stamping(StageStamp::Closed),
    ],
    side_exits: &[
        SideExit::new(
            "rejected",
            "Rejected",
            Red,
            "Reject",
            &["submitted", "pending_verification", "for_payment", "paid"],
        )
        .requiring(&[RejectionReason]),
        SideExit::new(
            "cancelled",
            "Cancelled",
            Gray,
            "Cancel",
            &["submitted", "pending_verification", "for_payment"],
        ),
    ],
    payment_status: Some("for_payment"),
    paid_status: Some("paid"),
    rejection_status: Some("rejected"),
    acknowledge_status: None,
    override_approve_to: Some("issued"),
};

const CERTIFICATE_OPEN: &[&str] = &["PENDING", "PROCESSING", "FOR_PAYMENT"];

static CERTIFICATE_REQUEST: Lifecycle = Lifecycle {
    kind: RequestKind::CertificateRequest,
    stages: &[
        Stage::new("PENDING", "Pending", Gray, "Submit"),
        Stage::new("PROCESSING", "Processing", Blue, "Start Processing"),
        Stage::new("FOR_PAYMENT", "For Payment", Orange, "Request Payment"),
        Stage::new("PAID", "Paid", Teal, "Confirm Payment")
            .requiring(&[OrNumber])
            .stamping(StageStamp::Paid),
        Stage::new(
            "READY_FOR_PICKUP",
            "Ready for Pickup",
            Purple,
            "Mark Ready for Pickup",
        )
        .stamping(StageStamp::Approved),
        Stage::new("CLAIMED", "Claimed", Green, "Release Certificate")
            .stamping(StageStamp::Closed),
    ],
    side_exits: &[
        SideExit::new("REJECTED", "Rejected", Red, "Reject", CERTIFICATE_OPEN)
            .requiring(&[RejectionReason]),
        SideExit::new("CANCELLED", "Cancelled", Gray, "Cancel", CERTIFICATE_OPEN),
    ],
    payment_status: Some("FOR_PAYMENT"),
    paid_status: Some("PAID"),
    rejection_status: Some("REJECTED"),
    acknowledge_status: None,
    override_approve_to: Some("READY_FOR_PICKUP"),
};

static WATER_CONNECTION: Lifecycle = Lifecycle {
    kind: RequestKind::WaterConnection,
    stages: &[
        Stage::new("PENDING", "Pending", Gray, "Submit"),
        Stage::new("FOR_INSPECTION", "For Inspection", Yellow, "Schedule Inspection"),
        Stage::new("INSPECTED", "Inspected", Cyan, "Record Inspection").requiring(&[Remarks]),
        Stage::new("FOR_APPROVAL", "For Approval", Orange, "Submit for Approval"),
        Stage::new("APPROVED", "Approved", Blue, "Approve").stamping(StageStamp::Approved),
        Stage::new("FOR_PAYMENT", "For Payment", Orange, "Request Payment"),
        Stage::new("PAYMENT_VERIFIED", "Payment Verified", Teal, "Verify Payment")
            .requiring(&[OrNumber])
            .stamping(StageStamp::Paid),
        Stage::new(
            "FOR_INSTALLATION",
            "For Installation",
            Purple,
            "Schedule Installation",
        )
        .requiring(&[AssignedStaff]),
        Stage::new("INSTALLED", "Installed", Indigo, "Mark Installed"),
        Stage::new("ACTIVE", "Active", Green, "Activate Service").stamping(StageStamp::Closed),
    ],
    side_exits: &[SideExit::new(
        "REJECTED",
        "Rejected",
        Red,
        "Reject",
        &[
            "PENDING",
            "FOR_INSPECTION",
            "INSPECTED",
            "FOR_APPROVAL",
            "APPROVED",
            "FOR_PAYMENT",
            "PAYMENT_VERIFIED",
            "FOR_INSTALLATION",
        ],
    )
    .requiring(&[RejectionReason])],
    payment_status: Some("FOR_PAYMENT"),
    paid_status: Some("PAYMENT_VERIFIED"),
    rejection_status: Some("REJECTED"),
    acknowledge_status: None,
    override_approve_to: None,
};

static WATER_ISSUE: Lifecycle = Lifecycle {
    kind: RequestKind::WaterIssue,
    stages: &[
        Stage::new("PENDING", "Pending", Gray, "Report"),
        Stage::new("ACKNOWLEDGED", "Acknowledged", Yellow, "Acknowledge")
            .requiring(&[AcknowledgedBy])
            .optional(),
        Stage::new("ASSIGNED", "Assigned", Blue, "Assign Staff").requiring(&[AssignedStaff]),
        Stage::new("IN_PROGRESS", "In Progress", Orange, "Start Work"),
        Stage::new("RESOLVED", "Resolved", Teal, "Mark Resolved").stamping(StageStamp::Resolved),
        Stage::new("CLOSED", "Closed", Green, "Close Ticket").stamping(StageStamp::Closed),
    ],
    side_exits: &[],
    payment_status: None,
    paid_status: None,
    rejection_status: None,
    acknowledge_status: Some("ACKNOWLEDGED"),
    override_approve_to: None,
};

static DRAINAGE_TICKET: Lifecycle = Lifecycle {
    kind: RequestKind::DrainageTicket,
    stages: &[
        Stage::new("PENDING", "Pending", Gray, "Report"),
        Stage::new("ACKNOWLEDGED", "Acknowledged", Yellow, "Acknowledge")
            .requiring(&[AcknowledgedBy])
            .optional(),
        Stage::new("ASSIGNED", "Assigned", Blue, "Assign Crew").requiring(&[AssignedStaff]),
        Stage::new("ONGOING", "Ongoing", Orange, "Start Work"),
        Stage::new("COMPLETED", "Completed", Teal, "Mark Completed")
            .stamping(StageStamp::Resolved),
        Stage::new("CLOSED", "Closed", Green, "Close Ticket").stamping(StageStamp::Closed),
    ],
    side_exits: &[],
    payment_status: None,
    paid_status: None,
    rejection_status: None,
    acknowledge_status: Some("ACKNOWLEDGED"),
    override_approve_to: None,
};

const AMENITY_OPEN: &[&str] = &["PENDING_REVIEW", "AWAITING_PAYMENT", "PAID", "APPROVED"];

static AMENITY_RESERVATION: Lifecycle = Lifecycle {
    kind: RequestKind::AmenityReservation,
    stages: &[
        Stage::new("PENDING_REVIEW", "Pending Review", Gray, "Submit"),
        Stage::new(
            "AWAITING_PAYMENT",
            "Awaiting Payment",
            Orange,
            "Accept Reservation",
        ),
        Stage::new("PAID", "Paid", Teal, "Confirm Payment")
            .requiring(&[OrNumber])
            .stamping(StageStamp::Paid),
        Stage::new("APPROVED", "Approved", Blue, "Approve Reservation")
            .stamping(StageStamp::Approved),
        Stage::new("CHECKED_IN", "Checked In", Purple, "Check In"),
        Stage::new("COMPLETED", "Completed", Green, "Complete Reservation")
            .stamping(StageStamp::Closed),
    ],
    side_exits: &[
        SideExit::new("REJECTED", "Rejected", Red, "Reject", AMENITY_OPEN)
            .requiring(&[RejectionReason]),
        SideExit::new("CANCELLED", "Cancelled", Gray, "Cancel", AMENITY_OPEN),
    ],
    payment_status: Some("AWAITING_PAYMENT"),
    paid_status: Some("PAID"),
    rejection_status: Some("REJECTED"),
    acknowledge_status: None,
    override_approve_to: None,
};

/// Lifecycle table for `kind`.
pub fn lifecycle_for(kind: RequestKind) -> &'static Lifecycle {
    match kind {
        RequestKind::DeathRegistration => &DEATH_REGISTRATION,
        RequestKind::BurialPermit => &BURIAL_PERMIT,
        RequestKind::CertificateRequest => &CERTIFICATE_REQUEST,
        RequestKind::WaterConnection => &WATER_CONNECTION,
        RequestKind::WaterIssue => &WATER_ISSUE,
        RequestKind::DrainageTicket => &DRAINAGE_TICKET,
        RequestKind::AmenityReservation => &AMENITY_RESERVATION,
    }
}
