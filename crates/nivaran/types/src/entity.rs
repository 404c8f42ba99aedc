//! Administrative hierarchy entities: regions, departments, users.
//!
//! Regions and departments form the two-level routing hierarchy an issue
//! must be bound to before anyone can work on it. Names are the natural
//! key for late binding: a submission may reference a region or department
//! that does not exist yet, and the reconciliation sweep matches the
//! requested name against entities created afterwards.

use crate::{DepartmentId, RegionId, UserId};
use serde::{Deserialize, Serialize};

/// Normalize a name for resolution: trimmed, case-folded, exact match only.
///
/// Fuzzy or partial matching is deliberately excluded — misrouting an
/// issue to an unintended entity is worse than leaving it parked.
pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// ── Regions & Departments ────────────────────────────────────────────

/// Top tier of the routing hierarchy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    /// Natural resolution key, matched via [`normalize_name`].
    pub name: String,
}

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RegionId::generate(),
            name: name.into(),
        }
    }

    /// Whether `requested` resolves to this region.
    pub fn matches_name(&self, requested: &str) -> bool {
        normalize_name(&self.name) == normalize_name(requested)
    }
}

/// Second tier; always scoped to exactly one region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub region_id: RegionId,
}

impl Department {
    pub fn new(name: impl Into<String>, region_id: RegionId) -> Self {
        Self {
            id: DepartmentId::generate(),
            name: name.into(),
            region_id,
        }
    }

    pub fn matches_name(&self, requested: &str) -> bool {
        normalize_name(&self.name) == normalize_name(requested)
    }
}

// ── Users ────────────────────────────────────────────────────────────

/// Administrative tier of a user account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Citizen,
    SuperAdmin,
    RegionalAdmin,
    DepartmentalAdmin,
}

/// A user account.
///
/// `region_id` is set only for regional admins; `department_id` only for
/// departmental admins (whose region is implied by the department).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_id: Option<RegionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<DepartmentId>,
}

impl User {
    pub fn citizen(email: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            email: email.into(),
            role: Role::Citizen,
            region_id: None,
            department_id: None,
        }
    }

    pub fn super_admin(email: impl Into<String>) -> Self {
        Self {
            id: UserId::generate(),
            email: email.into(),
            role: Role::SuperAdmin,
            region_id: None,
            department_id: None,
        }
    }

    pub fn regional_admin(email: impl Into<String>, region_id: RegionId) -> Self {
        Self {
            id: UserId::generate(),
            email: email.into(),
            role: Role::RegionalAdmin,
            region_id: Some(region_id),
            department_id: None,
        }
    }

    pub fn departmental_admin(email: impl Into<String>, department_id: DepartmentId) -> Self {
        Self {
            id: UserId::generate(),
            email: email.into(),
            role: Role::DepartmentalAdmin,
            region_id: None,
            department_id: Some(department_id),
        }
    }
}
