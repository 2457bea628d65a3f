use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FacultyError;

/// Position of a faculty record in the approval workflow.
///
/// ```text
/// pending ──verify──► verified ──approve──► confirmed ──notify──► notified_principal
///    │                   │                                              │ ack hoo
///    ▼                   ▼                                              ▼
/// rejected_verification  rejected_approval                         notified_hoo
///                                                                       │ ack si
///                                                                       ▼
///                                                                  notified_si
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Pending,
    Verified,
    Confirmed,
    RejectedVerification,
    RejectedApproval,
    NotifiedPrincipal,
    NotifiedHoo,
    NotifiedSi,
}

impl WorkflowStatus {
    /// Statuses visible as the pending collection.
    pub const PENDING: &'static [WorkflowStatus] = &[Self::Pending, Self::Verified];

    /// Statuses visible as the confirmed collection.
    pub const CONFIRMED: &'static [WorkflowStatus] = &[Self::Confirmed];

    /// Statuses visible as the notified collection.
    pub const NOTIFIED: &'static [WorkflowStatus] =
        &[Self::NotifiedPrincipal, Self::NotifiedHoo, Self::NotifiedSi];

    /// Convert to database string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Confirmed => "confirmed",
            Self::RejectedVerification => "rejected_verification",
            Self::RejectedApproval => "rejected_approval",
            Self::NotifiedPrincipal => "notified_principal",
            Self::NotifiedHoo => "notified_hoo",
            Self::NotifiedSi => "notified_si",
        }
    }

    pub fn is_pending(&self) -> bool {
        Self::PENDING.contains(self)
    }

    pub fn is_confirmed(&self) -> bool {
        *self == Self::Confirmed
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::RejectedVerification | Self::RejectedApproval)
    }

    pub fn is_notified(&self) -> bool {
        Self::NOTIFIED.contains(self)
    }

    /// Whether this status can only be reached through verification.
    pub fn is_verified(&self) -> bool {
        !matches!(self, Self::Pending | Self::RejectedVerification)
    }

    pub fn principal_notified(&self) -> bool {
        self.is_notified()
    }

    pub fn hoo_acknowledged(&self) -> bool {
        matches!(self, Self::NotifiedHoo | Self::NotifiedSi)
    }

    pub fn si_acknowledged(&self) -> bool {
        *self == Self::NotifiedSi
    }

    /// Whether `next` is a legal single step from this status.
    pub fn can_transition_to(&self, next: WorkflowStatus) -> bool {
        use WorkflowStatus::*;
        matches!(
            (self, next),
            (Pending, Verified)
                | (Pending, RejectedVerification)
                | (Verified, RejectedVerification)
                | (Verified, Confirmed)
                | (Verified, RejectedApproval)
                | (Confirmed, NotifiedPrincipal)
                | (NotifiedPrincipal, NotifiedHoo)
                | (NotifiedHoo, NotifiedSi)
        )
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowStatus {
    type Err = FacultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "confirmed" => Ok(Self::Confirmed),
            "rejected_verification" => Ok(Self::RejectedVerification),
            "rejected_approval" => Ok(Self::RejectedApproval),
            "notified_principal" => Ok(Self::NotifiedPrincipal),
            "notified_hoo" => Ok(Self::NotifiedHoo),
            "notified_si" => Ok(Self::NotifiedSi),
            other => Err(FacultyError::Database(format!(
                "Unknown workflow status '{}'",
                other
            ))),
        }
    }
}

/// Kind of faculty engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacultyType {
    Internal,
    External,
    Contract,
}

impl FacultyType {
    pub const ALL: [FacultyType; 3] = [Self::Internal, Self::External, Self::Contract];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
            Self::Contract => "contract",
        }
    }
}

impl fmt::Display for FacultyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacultyType {
    type Err = FacultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "internal" => Ok(Self::Internal),
            "external" => Ok(Self::External),
            "contract" => Ok(Self::Contract),
            other => Err(FacultyError::validation(format!(
                "Unknown faculty type '{}'",
                other
            ))),
        }
    }
}
