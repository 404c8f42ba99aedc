//! End-to-end scenarios: submission, escalation, reconciliation, and the
//! admin lifecycle, run against the in-memory store.

use nivaran_engine::{IssueService, IssueTarget, NewIssue};
use nivaran_store::{DepartmentStore, MemoryStore, RegionStore, UserStore};
use nivaran_types::{
    Department, IssueStatus, Location, NotificationKind, Region, User, UserId,
};
use std::sync::Arc;

fn new_issue(reporter: &UserId, target: IssueTarget) -> NewIssue {
    NewIssue {
        reporter_id: reporter.clone(),
        description: "Potholes along the state highway service road".to_string(),
        photo_ref: "photos/potholes.jpg".to_string(),
        location: Location::new(16.705, 74.243).with_address("Service Rd, Kolhapur"),
        target,
    }
}

#[tokio::test]
async fn missing_department_in_adminless_region_falls_back_to_super_admins() {
    let store = Arc::new(MemoryStore::new());
    let citizen = User::citizen("citizen@example.org");
    let sa1 = User::super_admin("sa1@example.org");
    let sa2 = User::super_admin("sa2@example.org");
    // Region exists but has no regional admin.
    let region = Region::new("Kolhapur");
    store.insert_user(citizen.clone()).await.unwrap();
    store.insert_user(sa1.clone()).await.unwrap();
    store.insert_user(sa2.clone()).await.unwrap();
    store.insert_region(region).await.unwrap();

    let service = IssueService::new(store.clone());
    let issue = service
        .submit_issue(new_issue(
            &citizen.id,
            IssueTarget::Named {
                department_name: "Road Dept".to_string(),
                region_name: Some("Kolhapur".to_string()),
            },
        ))
        .await
        .unwrap();

    assert_eq!(issue.status, IssueStatus::PendingDepartment);
    assert_eq!(issue.requested_department_name.as_deref(), Some("Road Dept"));

    // The no-admin fallback reaches every super admin.
    for sa in [&sa1, &sa2] {
        let rows = service.list_notifications(&sa.id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, NotificationKind::MissingRegion);
    }
}

#[tokio::test]
async fn parked_issue_heals_once_entities_appear_and_then_completes() {
    let store = Arc::new(MemoryStore::new());
    let citizen = User::citizen("citizen@example.org");
    let sa = User::super_admin("sa@example.org");
    store.insert_user(citizen.clone()).await.unwrap();
    store.insert_user(sa.clone()).await.unwrap();

    let service = IssueService::new(store.clone());

    // Submission references a region nobody has created yet.
    let issue = service
        .submit_issue(new_issue(
            &citizen.id,
            IssueTarget::Named {
                department_name: "Road Dept".to_string(),
                region_name: Some("Kagal".to_string()),
            },
        ))
        .await
        .unwrap();
    assert_eq!(issue.status, IssueStatus::PendingRegion);
    assert_eq!(service.list_notifications(&sa.id).await.unwrap().len(), 1);

    // A sweep with nothing new changes nothing.
    let report = service.run_reconciliation_sweep().await.unwrap();
    assert_eq!(report.resolved_regions, 0);

    // The super admin creates the region (casing differs); a regional
    // admin creates the department; admins are assigned.
    let region = Region::new("  kagal ");
    let department = Department::new("road dept", region.id.clone());
    let da = User::departmental_admin("da@example.org", department.id.clone());
    store.insert_region(region).await.unwrap();
    store.insert_department(department.clone()).await.unwrap();
    store.insert_user(da.clone()).await.unwrap();

    let report = service.run_reconciliation_sweep().await.unwrap();
    assert_eq!(report.resolved_regions, 1);
    assert_eq!(report.resolved_departments, 1);
    // The stale MISSING_REGION notification is gone.
    assert!(report.notifications_retired >= 1);
    assert!(service
        .list_notifications(&sa.id)
        .await
        .unwrap()
        .iter()
        .all(|n| n.kind != NotificationKind::MissingRegion));

    // Fully routed: the department admin has the assignment notice.
    let rows = service.list_notifications(&da.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, NotificationKind::NewIssueAssigned);

    // Normal lifecycle from here on.
    let advanced = service
        .advance_issue(&issue.id, &department.id)
        .await
        .unwrap();
    assert_eq!(advanced.status, IssueStatus::InProgress);

    let completed = service
        .complete_issue(&issue.id, &da.id, "photos/repaired.jpg")
        .await
        .unwrap();
    assert_eq!(completed.status, IssueStatus::Completed);
    assert!(completed.completion_photo_ref.is_some());
    assert!(completed.completed_at.is_some());
    assert_eq!(completed.completed_by_id, Some(da.id.clone()));

    // Reporter saw both status changes.
    let reporter_rows = service.list_notifications(&citizen.id).await.unwrap();
    assert_eq!(reporter_rows.len(), 2);
    assert!(reporter_rows
        .iter()
        .all(|n| n.kind == NotificationKind::IssueStatus));

    // And a final sweep has nothing left to do.
    let report = service.run_reconciliation_sweep().await.unwrap();
    assert_eq!(report.resolved_regions, 0);
    assert_eq!(report.resolved_departments, 0);
    assert_eq!(report.notifications_retired, 0);
}

#[tokio::test]
async fn repeated_sweeps_never_duplicate_escalations() {
    let store = Arc::new(MemoryStore::new());
    let citizen = User::citizen("citizen@example.org");
    let sa = User::super_admin("sa@example.org");
    let region = Region::new("Kagal");
    let ra = User::regional_admin("ra@example.org", region.id.clone());
    store.insert_user(citizen.clone()).await.unwrap();
    store.insert_user(sa.clone()).await.unwrap();
    store.insert_user(ra.clone()).await.unwrap();

    let service = IssueService::new(store.clone());
    service
        .submit_issue(new_issue(
            &citizen.id,
            IssueTarget::Named {
                department_name: "Sanitation".to_string(),
                region_name: Some("Kagal".to_string()),
            },
        ))
        .await
        .unwrap();

    // Region appears; the department still does not. Every sweep after
    // the first re-evaluates the same parked issue.
    store.insert_region(region).await.unwrap();
    service.run_reconciliation_sweep().await.unwrap();
    service.run_reconciliation_sweep().await.unwrap();
    service.run_reconciliation_sweep().await.unwrap();

    // The regional admin holds exactly one MISSING_DEPARTMENT notice.
    let rows = service.list_notifications(&ra.id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, NotificationKind::MissingDepartment);
}
