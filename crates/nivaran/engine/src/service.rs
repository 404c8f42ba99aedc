//! The issue service: the operation surface consumed by the HTTP layer
//! and other collaborators.
//!
//! The service composes the store, state machine, router, fan-out engine
//! and sweeper. Every issue-side operation persists first and notifies
//! second; a notification failure never blocks or fails the operation
//! that triggered it.

use crate::router::{EscalationRouter, IssueTarget, RoutingDecision};
use crate::sweeper::{ReconciliationSweeper, SweepReport};
use crate::{FanoutEngine, StateMachine};
use nivaran_store::EntityStore;
use nivaran_types::{
    DepartmentId, Issue, IssueId, IssueStatus, Location, Notification, NotificationId, Role,
    RoutingError, RoutingResult, UserId,
};
use std::sync::Arc;

/// A citizen submission, as handed over by the HTTP layer.
#[derive(Clone, Debug)]
pub struct NewIssue {
    pub reporter_id: UserId,
    pub description: String,
    pub photo_ref: String,
    pub location: Location,
    pub target: IssueTarget,
}

/// Facade over the routing core.
#[derive(Clone)]
pub struct IssueService {
    store: Arc<dyn EntityStore>,
    state_machine: StateMachine,
    router: EscalationRouter,
    fanout: FanoutEngine,
    sweeper: ReconciliationSweeper,
}

impl IssueService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            state_machine: StateMachine::new(),
            router: EscalationRouter::new(store.clone()),
            fanout: FanoutEngine::new(store.clone()),
            sweeper: ReconciliationSweeper::new(store.clone()),
            store,
        }
    }

    // ── Submission ───────────────────────────────────────────────────

    /// Create an issue, routing it as far as the current hierarchy
    /// allows, and notify the tier that has to act next.
    pub async fn submit_issue(&self, new_issue: NewIssue) -> RoutingResult<Issue> {
        if new_issue.description.trim().is_empty() {
            return Err(RoutingError::validation("description must not be empty"));
        }
        if new_issue.photo_ref.trim().is_empty() {
            return Err(RoutingError::validation("photo reference must not be empty"));
        }
        if let IssueTarget::Named {
            department_name, ..
        } = &new_issue.target
        {
            if department_name.trim().is_empty() {
                return Err(RoutingError::validation("department name must not be empty"));
            }
        }
        self.store
            .get_user(&new_issue.reporter_id)
            .await?
            .ok_or_else(|| {
                RoutingError::not_found(format!("reporter {}", new_issue.reporter_id))
            })?;

        let decision = self.router.classify_submission(&new_issue.target).await?;

        let mut issue = Issue::new(
            new_issue.reporter_id,
            new_issue.description,
            new_issue.photo_ref,
            new_issue.location,
        );
        apply_decision(&mut issue, &decision);

        self.store.insert_issue(issue.clone()).await?;
        tracing::info!(
            issue_id = %issue.id,
            status = %issue.status,
            "issue submitted"
        );

        // Escalation is a side effect: plan failures are logged, delivery
        // failures are swallowed inside the fan-out engine.
        match self.router.escalation_plan(&issue, &decision).await {
            Ok(plan) => {
                self.fanout.deliver(&issue, &plan).await;
            }
            Err(err) => {
                tracing::warn!(issue_id = %issue.id, error = %err, "escalation planning failed");
            }
        }

        Ok(issue)
    }

    // ── Admin transitions ────────────────────────────────────────────

    /// Move a routed issue to `IN_PROGRESS`, on behalf of the owning
    /// department.
    pub async fn advance_issue(
        &self,
        issue_id: &IssueId,
        actor_department_id: &DepartmentId,
    ) -> RoutingResult<Issue> {
        let mut issue = self.load_issue(issue_id).await?;
        if issue.department_id.as_ref() != Some(actor_department_id) {
            return Err(RoutingError::validation(format!(
                "issue {issue_id} is not owned by department {actor_department_id}"
            )));
        }

        let expected = issue.status;
        self.state_machine.advance(&mut issue)?;
        self.store.update_issue(issue.clone(), expected).await?;

        self.notify_reporter(&issue).await;
        Ok(issue)
    }

    /// Complete an issue with a proof-of-work photo.
    pub async fn complete_issue(
        &self,
        issue_id: &IssueId,
        actor_id: &UserId,
        completion_photo_ref: &str,
    ) -> RoutingResult<Issue> {
        let mut issue = self.load_issue(issue_id).await?;
        let actor = self
            .store
            .get_user(actor_id)
            .await?
            .ok_or_else(|| RoutingError::not_found(format!("user {actor_id}")))?;

        // Completion is reserved to the owning department's admins.
        if actor.role != Role::DepartmentalAdmin
            || actor.department_id.is_none()
            || actor.department_id != issue.department_id
        {
            return Err(RoutingError::validation(format!(
                "user {actor_id} may not complete issue {issue_id}"
            )));
        }

        let expected = issue.status;
        self.state_machine
            .complete(&mut issue, completion_photo_ref, actor_id)?;
        self.store.update_issue(issue.clone(), expected).await?;

        self.notify_reporter(&issue).await;
        Ok(issue)
    }

    // ── Notification reads ───────────────────────────────────────────

    pub async fn list_notifications(&self, user_id: &UserId) -> RoutingResult<Vec<Notification>> {
        Ok(self.store.list_notifications_for_user(user_id).await?)
    }

    pub async fn mark_read(
        &self,
        notification_id: &NotificationId,
        user_id: &UserId,
    ) -> RoutingResult<()> {
        Ok(self.store.mark_read(notification_id, user_id).await?)
    }

    pub async fn mark_all_read(&self, user_id: &UserId) -> RoutingResult<usize> {
        Ok(self.store.mark_all_read(user_id).await?)
    }

    // ── Reconciliation ───────────────────────────────────────────────

    /// Run one reconciliation sweep (cron or manual trigger).
    pub async fn run_reconciliation_sweep(&self) -> RoutingResult<SweepReport> {
        self.sweeper.run().await
    }

    // ── Helpers ──────────────────────────────────────────────────────

    async fn load_issue(&self, issue_id: &IssueId) -> RoutingResult<Issue> {
        self.store
            .get_issue(issue_id)
            .await?
            .ok_or_else(|| RoutingError::not_found(format!("issue {issue_id}")))
    }

    async fn notify_reporter(&self, issue: &Issue) {
        let plan = self.router.status_update_plan(issue);
        self.fanout.deliver(issue, &plan).await;
    }
}

/// Fill in the routing fields of a fresh issue from its classification.
fn apply_decision(issue: &mut Issue, decision: &RoutingDecision) {
    match decision {
        RoutingDecision::Assigned { department } => {
            issue.status = IssueStatus::Pending;
            issue.department_id = Some(department.id.clone());
            issue.region_id = Some(department.region_id.clone());
        }
        RoutingDecision::MissingDepartment { region, requested } => {
            issue.status = IssueStatus::PendingDepartment;
            issue.region_id = Some(region.id.clone());
            issue.requested_department_name = Some(requested.clone());
        }
        RoutingDecision::MissingRegion {
            requested_region,
            requested_department,
        } => {
            issue.status = IssueStatus::PendingRegion;
            issue.requested_region_name = Some(requested_region.clone());
            issue.requested_department_name = requested_department.clone();
        }
    }
}
