//! Reconciliation sweeper: heals issues that were parked because their
//! region or department did not exist at submission time.
//!
//! Regions and departments can be created *after* an issue referenced
//! them by name. The sweep re-applies the same resolution logic the
//! router would have applied at creation time, binds the issue to the
//! now-existing entity, and retires the escalation notifications that are
//! no longer relevant.
//!
//! The sweep is idempotent and safe to run repeatedly, concurrently with
//! live traffic, and concurrently with itself: every write is a
//! status-guarded conditional update, so a lost race is a logged no-op.

use crate::router::{EscalationRouter, RoutingDecision};
use crate::{FanoutEngine, StateMachine};
use nivaran_store::{EntityStore, StoreError};
use nivaran_types::{
    Issue, IssueStatus, NotificationKind, RoutingError, RoutingResult,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Summary of one full sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub resolved_regions: usize,
    pub resolved_departments: usize,
    pub notifications_retired: usize,
}

/// Batch process binding parked issues to entities created after the fact.
#[derive(Clone)]
pub struct ReconciliationSweeper {
    store: Arc<dyn EntityStore>,
    state_machine: StateMachine,
    router: EscalationRouter,
    fanout: FanoutEngine,
}

impl ReconciliationSweeper {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            router: EscalationRouter::new(store.clone()),
            fanout: FanoutEngine::new(store.clone()),
            state_machine: StateMachine::new(),
            store,
        }
    }

    /// One full sweep. Issues are processed independently and
    /// sequentially; a failure on one issue is logged and does not abort
    /// the rest. Only a failure to list the work items aborts the sweep.
    pub async fn run(&self) -> RoutingResult<SweepReport> {
        let mut report = SweepReport::default();

        // Pass 1: bind parked regions. Issues resolved here drop into
        // PENDING_DEPARTMENT and get a chance in pass 2 below.
        let parked = self
            .store
            .list_issues_by_status(IssueStatus::PendingRegion)
            .await?;
        for issue in parked {
            let issue_id = issue.id.clone();
            match self.try_resolve_region(issue).await {
                Ok(Some(retired)) => {
                    report.resolved_regions += 1;
                    report.notifications_retired += retired;
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(issue_id = %issue_id, error = %err, "region pass failed for issue");
                }
            }
        }

        // Pass 2: bind parked departments.
        let parked = self
            .store
            .list_issues_by_status(IssueStatus::PendingDepartment)
            .await?;
        for issue in parked {
            let issue_id = issue.id.clone();
            match self.try_resolve_department(issue).await {
                Ok(Some(retired)) => {
                    report.resolved_departments += 1;
                    report.notifications_retired += retired;
                }
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(issue_id = %issue_id, error = %err, "department pass failed for issue");
                }
            }
        }

        // Pass 3: retire escalation notifications that survived past
        // resolution (ordering races between router and sweep).
        report.notifications_retired += self.retire_orphaned_notifications().await?;

        tracing::info!(
            resolved_regions = report.resolved_regions,
            resolved_departments = report.resolved_departments,
            notifications_retired = report.notifications_retired,
            "reconciliation sweep finished"
        );
        Ok(report)
    }

    /// Returns the number of notifications retired when the issue was
    /// resolved, `None` when it stays parked (no match, or lost race).
    async fn try_resolve_region(&self, mut issue: Issue) -> RoutingResult<Option<usize>> {
        let Some(requested) = issue.requested_region_name.clone() else {
            tracing::warn!(issue_id = %issue.id, "parked in PENDING_REGION without a requested name; skipping");
            return Ok(None);
        };

        let Some(region) = self.store.find_region_by_name(&requested).await? else {
            return Ok(None);
        };

        self.state_machine.resolve_region(&mut issue, &region)?;
        match self
            .store
            .update_issue(issue.clone(), IssueStatus::PendingRegion)
            .await
        {
            Ok(()) => {}
            Err(StoreError::Conflict(msg)) => {
                tracing::debug!(issue_id = %issue.id, %msg, "lost race resolving region; skipping");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        }

        let retired = self
            .store
            .delete_notifications_for_issue(&issue.id, NotificationKind::MissingRegion)
            .await?;

        // If the requested department still does not exist in the newly
        // bound region, escalate to the regional tier now; otherwise pass
        // 2 will bind it in this same sweep.
        if let Some(department_name) = issue.requested_department_name.clone() {
            if self
                .store
                .find_department_in_region(&region.id, &department_name)
                .await?
                .is_none()
            {
                let plan = self
                    .router
                    .escalation_plan(
                        &issue,
                        &RoutingDecision::MissingDepartment {
                            region,
                            requested: department_name,
                        },
                    )
                    .await?;
                self.fanout.deliver(&issue, &plan).await;
            }
        }

        Ok(Some(retired))
    }

    async fn try_resolve_department(&self, mut issue: Issue) -> RoutingResult<Option<usize>> {
        let Some(requested) = issue.requested_department_name.clone() else {
            tracing::warn!(issue_id = %issue.id, "parked in PENDING_DEPARTMENT without a requested name; skipping");
            return Ok(None);
        };

        let department = match &issue.region_id {
            Some(region_id) => {
                self.store
                    .find_department_in_region(region_id, &requested)
                    .await?
            }
            // No resolved region to scope by: only bind on a globally
            // unique match, never on a guess.
            None => {
                let mut matches = self.store.find_departments_by_name(&requested).await?;
                match matches.len() {
                    0 => None,
                    1 => Some(matches.remove(0)),
                    n => {
                        return Err(RoutingError::ResolutionAmbiguous {
                            name: requested,
                            matches: n,
                        })
                    }
                }
            }
        };
        let Some(department) = department else {
            return Ok(None);
        };

        self.state_machine.resolve_department(&mut issue, &department)?;
        match self
            .store
            .update_issue(issue.clone(), IssueStatus::PendingDepartment)
            .await
        {
            Ok(()) => {}
            Err(StoreError::Conflict(msg)) => {
                tracing::debug!(issue_id = %issue.id, %msg, "lost race resolving department; skipping");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        }

        let retired = self
            .store
            .delete_notifications_for_issue(&issue.id, NotificationKind::MissingDepartment)
            .await?;

        // The issue is finally routable: tell the department's admins
        // (or escalate if there are none). Idempotent like any fan-out.
        let plan = self
            .router
            .escalation_plan(&issue, &RoutingDecision::Assigned { department })
            .await?;
        self.fanout.deliver(&issue, &plan).await;

        Ok(Some(retired))
    }

    async fn retire_orphaned_notifications(&self) -> RoutingResult<usize> {
        let mut retired = 0;
        for issue in self.store.list_issues().await? {
            if issue.region_id.is_some() {
                match self
                    .store
                    .delete_notifications_for_issue(&issue.id, NotificationKind::MissingRegion)
                    .await
                {
                    Ok(n) => retired += n,
                    Err(err) => {
                        tracing::warn!(issue_id = %issue.id, error = %err, "failed to retire MISSING_REGION notifications");
                    }
                }
            }
            if issue.department_id.is_some() {
                match self
                    .store
                    .delete_notifications_for_issue(&issue.id, NotificationKind::MissingDepartment)
                    .await
                {
                    Ok(n) => retired += n,
                    Err(err) => {
                        tracing::warn!(issue_id = %issue.id, error = %err, "failed to retire MISSING_DEPARTMENT notifications");
                    }
                }
            }
        }
        Ok(retired)
    }
}
