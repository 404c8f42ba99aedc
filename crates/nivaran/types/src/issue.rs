//! The Issue entity and its status lifecycle.
//!
//! An issue is created by a citizen submission and routed through the
//! region → department hierarchy. When a referenced region or department
//! does not exist yet, the issue is *parked* (`PendingRegion` /
//! `PendingDepartment`) carrying the requested name until the
//! reconciliation sweep can bind it to a real entity.

use crate::{DepartmentId, IssueId, RegionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum description length quoted back in notifications.
pub const SNIPPET_MAX_CHARS: usize = 80;

// ── Status ───────────────────────────────────────────────────────────

/// Issue lifecycle status.
///
/// `PendingRegion` and `PendingDepartment` are park states entered only
/// when a name-based reference could not be resolved at submission time.
/// `Completed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    Pending,
    PendingRegion,
    PendingDepartment,
    InProgress,
    Completed,
}

impl IssueStatus {
    /// Human-readable label used in reporter-facing notifications.
    pub fn label(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "Pending",
            IssueStatus::PendingRegion => "Awaiting region",
            IssueStatus::PendingDepartment => "Awaiting department",
            IssueStatus::InProgress => "In progress",
            IssueStatus::Completed => "Completed",
        }
    }

    /// Park states await entity creation rather than admin action.
    pub fn is_parked(&self) -> bool {
        matches!(self, IssueStatus::PendingRegion | IssueStatus::PendingDepartment)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, IssueStatus::Completed)
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── Location ─────────────────────────────────────────────────────────

/// Where the issue was observed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            address: None,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

// ── Issue ────────────────────────────────────────────────────────────

/// A citizen-reported civic issue.
///
/// Field invariants (upheld by the state machine, never by hand-editing):
/// - `region_id` and `requested_region_name` are mutually exclusive once
///   resolution has happened; same for the department pair.
/// - `Completed` implies `completion_photo_ref`, `completed_at` and
///   `completed_by_id` are all set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub reporter_id: UserId,
    pub description: String,
    /// Opaque object-storage reference to the submitted photo.
    pub photo_ref: String,
    pub location: Location,
    pub status: IssueStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_id: Option<RegionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_region_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<DepartmentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_department_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_photo_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_by_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    /// Create a new issue shell; routing fields are filled in by the
    /// submission path before the first insert.
    pub fn new(
        reporter_id: UserId,
        description: impl Into<String>,
        photo_ref: impl Into<String>,
        location: Location,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: IssueId::generate(),
            reporter_id,
            description: description.into(),
            photo_ref: photo_ref.into(),
            location,
            status: IssueStatus::Pending,
            region_id: None,
            requested_region_name: None,
            department_id: None,
            requested_department_name: None,
            completion_photo_ref: None,
            completed_at: None,
            completed_by_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Description truncated for inclusion in a notification message.
    pub fn description_snippet(&self) -> String {
        let trimmed = self.description.trim();
        if trimmed.chars().count() <= SNIPPET_MAX_CHARS {
            return trimmed.to_string();
        }
        let cut: String = trimmed.chars().take(SNIPPET_MAX_CHARS - 1).collect();
        format!("{}…", cut.trim_end())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
