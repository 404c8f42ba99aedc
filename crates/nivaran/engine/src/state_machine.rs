//! Status state machine: the only code allowed to move an issue between
//! statuses or touch its resolution fields.
//!
//! Every transition checks its source-status precondition first and leaves
//! the issue untouched on failure. Persistence is the caller's concern;
//! transitions here mutate an owned copy which the caller then writes back
//! with a status-guarded conditional update.

use nivaran_types::{
    Department, Issue, IssueStatus, Region, RoutingError, RoutingResult, UserId,
};

/// Transition logic for the issue lifecycle.
#[derive(Clone, Debug, Default)]
pub struct StateMachine;

impl StateMachine {
    pub fn new() -> Self {
        Self
    }

    fn require(issue: &Issue, allowed: &[IssueStatus], action: &'static str) -> RoutingResult<()> {
        if allowed.contains(&issue.status) {
            Ok(())
        } else {
            Err(RoutingError::InvalidTransition {
                from: issue.status,
                action,
            })
        }
    }

    /// Bind a parked issue to a now-known region.
    ///
    /// `PENDING_REGION` → `PENDING_DEPARTMENT`: the department still needs
    /// resolving against the newly known region.
    pub fn resolve_region(&self, issue: &mut Issue, region: &Region) -> RoutingResult<()> {
        Self::require(issue, &[IssueStatus::PendingRegion], "resolve the region of")?;

        issue.region_id = Some(region.id.clone());
        issue.requested_region_name = None;
        issue.status = IssueStatus::PendingDepartment;
        issue.touch();

        tracing::info!(
            issue_id = %issue.id,
            region_id = %region.id,
            region = %region.name,
            "issue region resolved"
        );
        Ok(())
    }

    /// Bind a parked issue to a now-known department.
    ///
    /// `PENDING_DEPARTMENT` → `PENDING`. The department's region also
    /// back-fills `region_id`, since a department implies exactly one
    /// region.
    pub fn resolve_department(
        &self,
        issue: &mut Issue,
        department: &Department,
    ) -> RoutingResult<()> {
        Self::require(
            issue,
            &[IssueStatus::PendingDepartment],
            "resolve the department of",
        )?;

        issue.department_id = Some(department.id.clone());
        issue.requested_department_name = None;
        issue.region_id = Some(department.region_id.clone());
        issue.requested_region_name = None;
        issue.status = IssueStatus::Pending;
        issue.touch();

        tracing::info!(
            issue_id = %issue.id,
            department_id = %department.id,
            department = %department.name,
            "issue department resolved"
        );
        Ok(())
    }

    /// `PENDING` → `IN_PROGRESS`, performed by a departmental admin of the
    /// owning department (ownership is checked by the service layer).
    pub fn advance(&self, issue: &mut Issue) -> RoutingResult<()> {
        Self::require(issue, &[IssueStatus::Pending], "advance")?;

        issue.status = IssueStatus::InProgress;
        issue.touch();

        tracing::info!(issue_id = %issue.id, "issue advanced to in-progress");
        Ok(())
    }

    /// `PENDING` | `IN_PROGRESS` → `COMPLETED` (terminal).
    ///
    /// Requires a non-empty completion photo reference; sets the full
    /// completion triple so the `COMPLETED ⇒ all completion fields set`
    /// invariant holds by construction.
    pub fn complete(
        &self,
        issue: &mut Issue,
        completion_photo_ref: &str,
        actor_id: &UserId,
    ) -> RoutingResult<()> {
        Self::require(
            issue,
            &[IssueStatus::Pending, IssueStatus::InProgress],
            "complete",
        )?;

        if completion_photo_ref.trim().is_empty() {
            return Err(RoutingError::validation(
                "completion photo reference must not be empty",
            ));
        }

        issue.status = IssueStatus::Completed;
        issue.completion_photo_ref = Some(completion_photo_ref.to_string());
        issue.completed_at = Some(chrono::Utc::now());
        issue.completed_by_id = Some(actor_id.clone());
        issue.touch();

        tracing::info!(issue_id = %issue.id, completed_by = %actor_id, "issue completed");
        Ok(())
    }
}
