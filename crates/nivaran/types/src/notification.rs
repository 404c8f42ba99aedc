//! Notification rows produced by the fan-out engine.

use crate::{IssueId, NotificationId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a notification is about.
///
/// The escalation kinds are issue-scoped and recipient-scoped: the fan-out
/// engine guarantees at most one outstanding row per
/// `(recipient, kind, issue)` triple for them. `IssueStatus` updates are
/// exempt — every status change notifies the reporter again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    IssueStatus,
    NewIssueAssigned,
    MissingDepartment,
    MissingDepartmentAdmin,
    MissingRegion,
}

impl NotificationKind {
    /// Escalation kinds are subject to the per-triple idempotency check.
    pub fn is_escalation(&self) -> bool {
        !matches!(self, NotificationKind::IssueStatus)
    }
}

/// A durable notification addressed to a single recipient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_user_id: UserId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<IssueId>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient_user_id: UserId,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: NotificationId::generate(),
            recipient_user_id,
            title: title.into(),
            message: message.into(),
            kind,
            issue_id: None,
            read: false,
            created_at: Utc::now(),
        }
    }

    pub fn for_issue(mut self, issue_id: IssueId) -> Self {
        self.issue_id = Some(issue_id);
        self
    }
}
