#![deny(unsafe_code)]
//! Self-contained demo of the Nivaran routing core.
//!
//! Walks the full escalation story against an in-memory store:
//! 1. a submission routed straight to a department,
//! 2. a submission parked on an unknown department,
//! 3. a submission parked on an unknown region,
//! 4. late creation of the missing entities and a reconciliation sweep,
//! 5. the admin lifecycle through completion.
//!
//! No external services required.

use anyhow::Result;
use nivaran_engine::{IssueService, IssueTarget, NewIssue};
use nivaran_store::{DepartmentStore, MemoryStore, RegionStore, UserStore};
use nivaran_types::{Department, Location, Region, User, UserId};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn submission(reporter: &UserId, description: &str, target: IssueTarget) -> NewIssue {
    NewIssue {
        reporter_id: reporter.clone(),
        description: description.to_string(),
        photo_ref: "photos/demo.jpg".to_string(),
        location: Location::new(16.705, 74.243).with_address("Kolhapur district"),
        target,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = Arc::new(MemoryStore::new());

    // Seed the hierarchy: one region with a water department, admins on
    // every tier.
    let citizen = User::citizen("citizen@example.org");
    let super_admin = User::super_admin("sa@example.org");
    let kolhapur = Region::new("Kolhapur");
    let water = Department::new("Water Dept", kolhapur.id.clone());
    let regional_admin = User::regional_admin("ra@example.org", kolhapur.id.clone());
    let water_admin = User::departmental_admin("da@example.org", water.id.clone());

    for user in [
        citizen.clone(),
        super_admin.clone(),
        regional_admin.clone(),
        water_admin.clone(),
    ] {
        store.insert_user(user).await?;
    }
    store.insert_region(kolhapur.clone()).await?;
    store.insert_department(water.clone()).await?;

    let service = IssueService::new(store.clone());

    // 1. Routed directly: the water admin is notified.
    let routed = service
        .submit_issue(submission(
            &citizen.id,
            "Leaking pipeline near the bridge",
            IssueTarget::Department(water.id.clone()),
        ))
        .await?;
    println!("routed issue {} -> {}", routed.id, routed.status);

    // 2. Unknown department in a known region: parks, regional admin is
    // asked to create it.
    let parked_dept = service
        .submit_issue(submission(
            &citizen.id,
            "Streetlights dark on the ring road",
            IssueTarget::Named {
                department_name: "Electricity Dept".to_string(),
                region_name: Some("Kolhapur".to_string()),
            },
        ))
        .await?;
    println!("parked issue {} -> {}", parked_dept.id, parked_dept.status);

    // 3. Unknown region: parks, super admins are asked to create it.
    let parked_region = service
        .submit_issue(submission(
            &citizen.id,
            "Garbage pileup at the weekly market",
            IssueTarget::Named {
                department_name: "Sanitation".to_string(),
                region_name: Some("Kagal".to_string()),
            },
        ))
        .await?;
    println!(
        "parked issue {} -> {}",
        parked_region.id, parked_region.status
    );

    for admin in [&super_admin, &regional_admin, &water_admin] {
        let rows = service.list_notifications(&admin.id).await?;
        println!("{} has {} notification(s)", admin.email, rows.len());
    }

    // 4. The missing entities appear (note the casing); the sweep heals
    // both parked issues.
    let kagal = Region::new("  kagal ");
    let sanitation = Department::new("sanitation", kagal.id.clone());
    let electricity = Department::new("electricity dept", kolhapur.id.clone());
    store.insert_region(kagal).await?;
    store.insert_department(sanitation).await?;
    store.insert_department(electricity.clone()).await?;

    let report = service.run_reconciliation_sweep().await?;
    println!(
        "sweep: {} region(s) resolved, {} department(s) resolved, {} notification(s) retired",
        report.resolved_regions, report.resolved_departments, report.notifications_retired
    );

    // 5. Admin lifecycle on the directly routed issue.
    let advanced = service.advance_issue(&routed.id, &water.id).await?;
    println!("issue {} -> {}", advanced.id, advanced.status);
    let completed = service
        .complete_issue(&routed.id, &water_admin.id, "photos/repaired.jpg")
        .await?;
    println!("issue {} -> {}", completed.id, completed.status);

    let reporter_rows = service.list_notifications(&citizen.id).await?;
    println!(
        "reporter has {} status notification(s)",
        reporter_rows.len()
    );

    Ok(())
}
