//! Storage interfaces for the routing core.
//!
//! Every component takes the store as an injected `Arc<dyn EntityStore>`,
//! so the engine is testable against the in-memory adapter and deployable
//! against a transactional backend behind the same seams.

use crate::StoreResult;
use async_trait::async_trait;
use nivaran_types::{
    Department, DepartmentId, Issue, IssueId, IssueStatus, Notification, NotificationId,
    NotificationKind, Region, RegionId, Role, User, UserId,
};

/// Storage interface for regions.
#[async_trait]
pub trait RegionStore: Send + Sync {
    async fn insert_region(&self, region: Region) -> StoreResult<()>;

    async fn get_region(&self, id: &RegionId) -> StoreResult<Option<Region>>;

    /// Find a region by normalized (trimmed, case-insensitive) name.
    async fn find_region_by_name(&self, name: &str) -> StoreResult<Option<Region>>;

    async fn list_regions(&self) -> StoreResult<Vec<Region>>;
}

/// Storage interface for departments.
#[async_trait]
pub trait DepartmentStore: Send + Sync {
    async fn insert_department(&self, department: Department) -> StoreResult<()>;

    async fn get_department(&self, id: &DepartmentId) -> StoreResult<Option<Department>>;

    /// Normalized name match scoped to one region.
    async fn find_department_in_region(
        &self,
        region_id: &RegionId,
        name: &str,
    ) -> StoreResult<Option<Department>>;

    /// Normalized name match across all regions. Multiple hits mean the
    /// name is ambiguous and must not be bound blindly.
    async fn find_departments_by_name(&self, name: &str) -> StoreResult<Vec<Department>>;

    async fn list_departments(&self) -> StoreResult<Vec<Department>>;
}

/// Storage interface for user accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: User) -> StoreResult<()>;

    async fn get_user(&self, id: &UserId) -> StoreResult<Option<User>>;

    async fn list_users_by_role(&self, role: Role) -> StoreResult<Vec<User>>;

    /// All regional admins assigned to a region.
    async fn regional_admins(&self, region_id: &RegionId) -> StoreResult<Vec<User>>;

    /// All departmental admins assigned to a department.
    async fn departmental_admins(&self, department_id: &DepartmentId) -> StoreResult<Vec<User>>;
}

/// Storage interface for issues.
#[async_trait]
pub trait IssueStore: Send + Sync {
    async fn insert_issue(&self, issue: Issue) -> StoreResult<()>;

    async fn get_issue(&self, id: &IssueId) -> StoreResult<Option<Issue>>;

    /// Conditional write: replaces the stored issue only if its current
    /// status equals `expected_status`, otherwise fails with `Conflict`
    /// and leaves the record untouched. This is the entire concurrency
    /// story — a lost race degrades to a no-op, never a corrupted record.
    async fn update_issue(&self, issue: Issue, expected_status: IssueStatus) -> StoreResult<()>;

    async fn list_issues_by_status(&self, status: IssueStatus) -> StoreResult<Vec<Issue>>;

    async fn list_issues(&self) -> StoreResult<Vec<Issue>>;
}

/// Storage interface for notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: Notification) -> StoreResult<()>;

    /// Idempotency probe: does `recipient` already hold a notification of
    /// `kind` for `issue_id`?
    async fn notification_exists(
        &self,
        recipient: &UserId,
        kind: NotificationKind,
        issue_id: &IssueId,
    ) -> StoreResult<bool>;

    /// Notifications addressed to one user, newest first.
    async fn list_notifications_for_user(&self, user_id: &UserId)
        -> StoreResult<Vec<Notification>>;

    /// Mark one notification read; fails with `NotFound` unless it exists
    /// and belongs to `user_id`.
    async fn mark_read(&self, id: &NotificationId, user_id: &UserId) -> StoreResult<()>;

    /// Mark every notification of one user read; returns how many changed.
    async fn mark_all_read(&self, user_id: &UserId) -> StoreResult<usize>;

    /// Delete every notification of `kind` scoped to `issue_id`; returns
    /// how many rows were removed.
    async fn delete_notifications_for_issue(
        &self,
        issue_id: &IssueId,
        kind: NotificationKind,
    ) -> StoreResult<usize>;
}

/// The full entity store the engine operates against.
pub trait EntityStore:
    RegionStore + DepartmentStore + UserStore + IssueStore + NotificationStore
{
}

impl<T> EntityStore for T where
    T: RegionStore + DepartmentStore + UserStore + IssueStore + NotificationStore
{
}
