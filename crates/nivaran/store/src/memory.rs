//! In-memory reference implementation of the Nivaran storage traits.
//!
//! This adapter is deterministic and test-friendly. Production deployments
//! should use a transactional backend behind the same traits.

use crate::traits::{DepartmentStore, IssueStore, NotificationStore, RegionStore, UserStore};
use crate::{StoreError, StoreResult};
use async_trait::async_trait;
use nivaran_types::{
    normalize_name, Department, DepartmentId, Issue, IssueId, IssueStatus, Notification,
    NotificationId, NotificationKind, Region, RegionId, Role, User, UserId,
};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory entity store.
#[derive(Default)]
pub struct MemoryStore {
    regions: RwLock<HashMap<RegionId, Region>>,
    departments: RwLock<HashMap<DepartmentId, Department>>,
    users: RwLock<HashMap<UserId, User>>,
    issues: RwLock<HashMap<IssueId, Issue>>,
    notifications: RwLock<HashMap<NotificationId, Notification>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(collection: &str) -> StoreError {
    StoreError::Backend(format!("{collection} lock poisoned"))
}

#[async_trait]
impl RegionStore for MemoryStore {
    async fn insert_region(&self, region: Region) -> StoreResult<()> {
        let mut guard = self.regions.write().map_err(|_| poisoned("regions"))?;
        if guard.contains_key(&region.id) {
            return Err(StoreError::Conflict(format!(
                "region {} already exists",
                region.id
            )));
        }
        guard.insert(region.id.clone(), region);
        Ok(())
    }

    async fn get_region(&self, id: &RegionId) -> StoreResult<Option<Region>> {
        let guard = self.regions.read().map_err(|_| poisoned("regions"))?;
        Ok(guard.get(id).cloned())
    }

    async fn find_region_by_name(&self, name: &str) -> StoreResult<Option<Region>> {
        let needle = normalize_name(name);
        let guard = self.regions.read().map_err(|_| poisoned("regions"))?;
        Ok(guard
            .values()
            .find(|r| normalize_name(&r.name) == needle)
            .cloned())
    }

    async fn list_regions(&self) -> StoreResult<Vec<Region>> {
        let guard = self.regions.read().map_err(|_| poisoned("regions"))?;
        let mut values = guard.values().cloned().collect::<Vec<_>>();
        values.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(values)
    }
}

#[async_trait]
impl DepartmentStore for MemoryStore {
    async fn insert_department(&self, department: Department) -> StoreResult<()> {
        let mut guard = self
            .departments
            .write()
            .map_err(|_| poisoned("departments"))?;
        if guard.contains_key(&department.id) {
            return Err(StoreError::Conflict(format!(
                "department {} already exists",
                department.id
            )));
        }
        guard.insert(department.id.clone(), department);
        Ok(())
    }

    async fn get_department(&self, id: &DepartmentId) -> StoreResult<Option<Department>> {
        let guard = self
            .departments
            .read()
            .map_err(|_| poisoned("departments"))?;
        Ok(guard.get(id).cloned())
    }

    async fn find_department_in_region(
        &self,
        region_id: &RegionId,
        name: &str,
    ) -> StoreResult<Option<Department>> {
        let needle = normalize_name(name);
        let guard = self
            .departments
            .read()
            .map_err(|_| poisoned("departments"))?;
        Ok(guard
            .values()
            .find(|d| d.region_id == *region_id && normalize_name(&d.name) == needle)
            .cloned())
    }

    async fn find_departments_by_name(&self, name: &str) -> StoreResult<Vec<Department>> {
        let needle = normalize_name(name);
        let guard = self
            .departments
            .read()
            .map_err(|_| poisoned("departments"))?;
        Ok(guard
            .values()
            .filter(|d| normalize_name(&d.name) == needle)
            .cloned()
            .collect())
    }

    async fn list_departments(&self) -> StoreResult<Vec<Department>> {
        let guard = self
            .departments
            .read()
            .map_err(|_| poisoned("departments"))?;
        let mut values = guard.values().cloned().collect::<Vec<_>>();
        values.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(values)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> StoreResult<()> {
        let mut guard = self.users.write().map_err(|_| poisoned("users"))?;
        if guard.contains_key(&user.id) {
            return Err(StoreError::Conflict(format!(
                "user {} already exists",
                user.id
            )));
        }
        guard.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> StoreResult<Option<User>> {
        let guard = self.users.read().map_err(|_| poisoned("users"))?;
        Ok(guard.get(id).cloned())
    }

    async fn list_users_by_role(&self, role: Role) -> StoreResult<Vec<User>> {
        let guard = self.users.read().map_err(|_| poisoned("users"))?;
        Ok(guard.values().filter(|u| u.role == role).cloned().collect())
    }

    async fn regional_admins(&self, region_id: &RegionId) -> StoreResult<Vec<User>> {
        let guard = self.users.read().map_err(|_| poisoned("users"))?;
        Ok(guard
            .values()
            .filter(|u| u.role == Role::RegionalAdmin && u.region_id.as_ref() == Some(region_id))
            .cloned()
            .collect())
    }

    async fn departmental_admins(&self, department_id: &DepartmentId) -> StoreResult<Vec<User>> {
        let guard = self.users.read().map_err(|_| poisoned("users"))?;
        Ok(guard
            .values()
            .filter(|u| {
                u.role == Role::DepartmentalAdmin && u.department_id.as_ref() == Some(department_id)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl IssueStore for MemoryStore {
    async fn insert_issue(&self, issue: Issue) -> StoreResult<()> {
        let mut guard = self.issues.write().map_err(|_| poisoned("issues"))?;
        if guard.contains_key(&issue.id) {
            return Err(StoreError::Conflict(format!(
                "issue {} already exists",
                issue.id
            )));
        }
        guard.insert(issue.id.clone(), issue);
        Ok(())
    }

    async fn get_issue(&self, id: &IssueId) -> StoreResult<Option<Issue>> {
        let guard = self.issues.read().map_err(|_| poisoned("issues"))?;
        Ok(guard.get(id).cloned())
    }

    async fn update_issue(&self, issue: Issue, expected_status: IssueStatus) -> StoreResult<()> {
        let mut guard = self.issues.write().map_err(|_| poisoned("issues"))?;
        let current = guard
            .get(&issue.id)
            .ok_or_else(|| StoreError::NotFound(format!("issue {} not found", issue.id)))?;

        if current.status != expected_status {
            return Err(StoreError::Conflict(format!(
                "issue {}: expected status {:?}, found {:?}",
                issue.id, expected_status, current.status
            )));
        }

        guard.insert(issue.id.clone(), issue);
        Ok(())
    }

    async fn list_issues_by_status(&self, status: IssueStatus) -> StoreResult<Vec<Issue>> {
        let guard = self.issues.read().map_err(|_| poisoned("issues"))?;
        let mut values = guard
            .values()
            .filter(|i| i.status == status)
            .cloned()
            .collect::<Vec<_>>();
        values.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(values)
    }

    async fn list_issues(&self) -> StoreResult<Vec<Issue>> {
        let guard = self.issues.read().map_err(|_| poisoned("issues"))?;
        let mut values = guard.values().cloned().collect::<Vec<_>>();
        values.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(values)
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(&self, notification: Notification) -> StoreResult<()> {
        let mut guard = self
            .notifications
            .write()
            .map_err(|_| poisoned("notifications"))?;
        guard.insert(notification.id.clone(), notification);
        Ok(())
    }

    async fn notification_exists(
        &self,
        recipient: &UserId,
        kind: NotificationKind,
        issue_id: &IssueId,
    ) -> StoreResult<bool> {
        let guard = self
            .notifications
            .read()
            .map_err(|_| poisoned("notifications"))?;
        Ok(guard.values().any(|n| {
            n.recipient_user_id == *recipient
                && n.kind == kind
                && n.issue_id.as_ref() == Some(issue_id)
        }))
    }

    async fn list_notifications_for_user(
        &self,
        user_id: &UserId,
    ) -> StoreResult<Vec<Notification>> {
        let guard = self
            .notifications
            .read()
            .map_err(|_| poisoned("notifications"))?;
        let mut values = guard
            .values()
            .filter(|n| n.recipient_user_id == *user_id)
            .cloned()
            .collect::<Vec<_>>();
        values.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(values)
    }

    async fn mark_read(&self, id: &NotificationId, user_id: &UserId) -> StoreResult<()> {
        let mut guard = self
            .notifications
            .write()
            .map_err(|_| poisoned("notifications"))?;
        let notification = guard
            .get_mut(id)
            .filter(|n| n.recipient_user_id == *user_id)
            .ok_or_else(|| {
                StoreError::NotFound(format!("notification {id} not found for user {user_id}"))
            })?;
        notification.read = true;
        Ok(())
    }

    async fn mark_all_read(&self, user_id: &UserId) -> StoreResult<usize> {
        let mut guard = self
            .notifications
            .write()
            .map_err(|_| poisoned("notifications"))?;
        let mut changed = 0;
        for notification in guard.values_mut() {
            if notification.recipient_user_id == *user_id && !notification.read {
                notification.read = true;
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn delete_notifications_for_issue(
        &self,
        issue_id: &IssueId,
        kind: NotificationKind,
    ) -> StoreResult<usize> {
        let mut guard = self
            .notifications
            .write()
            .map_err(|_| poisoned("notifications"))?;
        let before = guard.len();
        guard.retain(|_, n| !(n.kind == kind && n.issue_id.as_ref() == Some(issue_id)));
        Ok(before - guard.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nivaran_types::Location;

    fn sample_issue(status: IssueStatus) -> Issue {
        let mut issue = Issue::new(
            UserId::new("citizen-1"),
            "Streetlight out",
            "photos/light.jpg",
            Location::new(16.69, 74.23),
        );
        issue.status = status;
        issue
    }

    #[tokio::test]
    async fn region_name_lookup_is_normalized() {
        let store = MemoryStore::new();
        store
            .insert_region(Region::new("  Kagal "))
            .await
            .unwrap();

        let found = store.find_region_by_name("kagal").await.unwrap();
        assert!(found.is_some());
        assert!(store.find_region_by_name("kag").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn department_lookup_scopes_to_region() {
        let store = MemoryStore::new();
        let kolhapur = Region::new("Kolhapur");
        let kagal = Region::new("Kagal");
        store.insert_region(kolhapur.clone()).await.unwrap();
        store.insert_region(kagal.clone()).await.unwrap();

        store
            .insert_department(Department::new("Road Dept", kolhapur.id.clone()))
            .await
            .unwrap();
        store
            .insert_department(Department::new("Road Dept", kagal.id.clone()))
            .await
            .unwrap();

        let scoped = store
            .find_department_in_region(&kolhapur.id, "road dept")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(scoped.region_id, kolhapur.id);

        let global = store.find_departments_by_name("Road Dept").await.unwrap();
        assert_eq!(global.len(), 2);
    }

    #[tokio::test]
    async fn conditional_update_rejects_stale_status() {
        let store = MemoryStore::new();
        let issue = sample_issue(IssueStatus::Pending);
        let id = issue.id.clone();
        store.insert_issue(issue.clone()).await.unwrap();

        let mut advanced = issue.clone();
        advanced.status = IssueStatus::InProgress;
        let result = store
            .update_issue(advanced, IssueStatus::PendingRegion)
            .await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));

        // Record untouched after the failed write.
        let stored = store.get_issue(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, IssueStatus::Pending);
    }

    #[tokio::test]
    async fn admin_queries_filter_by_assignment() {
        let store = MemoryStore::new();
        let region = Region::new("Kolhapur");
        let dept = Department::new("Water Dept", region.id.clone());
        store.insert_region(region.clone()).await.unwrap();
        store.insert_department(dept.clone()).await.unwrap();

        let ra = User::regional_admin("ra@example.org", region.id.clone());
        let da = User::departmental_admin("da@example.org", dept.id.clone());
        let sa = User::super_admin("sa@example.org");
        for u in [ra.clone(), da.clone(), sa] {
            store.insert_user(u).await.unwrap();
        }

        let ras = store.regional_admins(&region.id).await.unwrap();
        assert_eq!(ras.len(), 1);
        assert_eq!(ras[0].id, ra.id);

        let das = store.departmental_admins(&dept.id).await.unwrap();
        assert_eq!(das.len(), 1);
        assert_eq!(das[0].id, da.id);

        assert_eq!(
            store.list_users_by_role(Role::SuperAdmin).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn mark_read_is_scoped_to_the_owner() {
        let store = MemoryStore::new();
        let owner = UserId::new("owner");
        let other = UserId::new("other");
        let n = Notification::new(
            owner.clone(),
            NotificationKind::MissingRegion,
            "New region requested",
            "msg",
        );
        let nid = n.id.clone();
        store.insert_notification(n).await.unwrap();

        assert!(store.mark_read(&nid, &other).await.is_err());
        store.mark_read(&nid, &owner).await.unwrap();

        let listed = store.list_notifications_for_user(&owner).await.unwrap();
        assert!(listed[0].read);
    }

    #[tokio::test]
    async fn delete_for_issue_removes_only_matching_kind() {
        let store = MemoryStore::new();
        let user = UserId::new("sa");
        let issue_id = IssueId::new("issue-1");

        let missing = Notification::new(
            user.clone(),
            NotificationKind::MissingRegion,
            "t",
            "m",
        )
        .for_issue(issue_id.clone());
        let status = Notification::new(user.clone(), NotificationKind::IssueStatus, "t", "m")
            .for_issue(issue_id.clone());
        store.insert_notification(missing).await.unwrap();
        store.insert_notification(status).await.unwrap();

        let removed = store
            .delete_notifications_for_issue(&issue_id, NotificationKind::MissingRegion)
            .await
            .unwrap();
        assert_eq!(removed, 1);

        let left = store.list_notifications_for_user(&user).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].kind, NotificationKind::IssueStatus);
    }
}
