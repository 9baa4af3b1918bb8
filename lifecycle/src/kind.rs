//! Request types tracked by the registry and their resource slugs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// One variant per request type. The serialized form is the resource slug used
/// in `/api/{resource}` paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum RequestKind {
    #[serde(rename = "death-registrations")]
    DeathRegistration,
    #[serde(rename = "burial-permits")]
    BurialPermit,
    #[serde(rename = "certificate-requests")]
    CertificateRequest,
    #[serde(rename = "water-connections")]
    WaterConnection,
    #[serde(rename = "water-issues")]
    WaterIssue,
    #[serde(rename = "drainage-tickets")]
    DrainageTicket,
    #[serde(rename = "amenity-reservations")]
    AmenityReservation,
}

impl RequestKind {
    pub const ALL: [RequestKind; 7] = [
        RequestKind::DeathRegistration,
        RequestKind::BurialPermit,
        RequestKind::CertificateRequest,
        RequestKind::WaterConnection,
        RequestKind::WaterIssue,
        RequestKind::DrainageTicket,
        RequestKind::AmenityReservation,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            RequestKind::DeathRegistration => "death-registrations",
            RequestKind::BurialPermit => "burial-permits",
            RequestKind::CertificateRequest => "certificate-requests",
            RequestKind::WaterConnection => "water-connections",
            RequestKind::WaterIssue => "water-issues",
            RequestKind::DrainageTicket => "drainage-tickets",
            RequestKind::AmenityReservation => "amenity-reservations",
        }
    }

    /// Prefix used when minting reference numbers, e.g. `DR-2026-000123`.
    pub fn reference_prefix(&self) -> &'static str {
        match self {
            RequestKind::DeathRegistration => "DR",
            RequestKind::BurialPermit => "BP",
            RequestKind::CertificateRequest => "CR",
            RequestKind::WaterConnection => "WC",
            RequestKind::WaterIssue => "WI",
            RequestKind::DrainageTicket => "DT",
            RequestKind::AmenityReservation => "AR",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RequestKind::DeathRegistration => "Death Registration",
            RequestKind::BurialPermit => "Burial Permit",
            RequestKind::CertificateRequest => "Certificate Request",
            RequestKind::WaterConnection => "Water Connection",
            RequestKind::WaterIssue => "Water Issue",
            RequestKind::DrainageTicket => "Drainage Ticket",
            RequestKind::AmenityReservation => "Amenity Reservation",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown request type `{0}`")]
pub struct UnknownKind(pub String);

impl FromStr for RequestKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        RequestKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == normalized)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}
