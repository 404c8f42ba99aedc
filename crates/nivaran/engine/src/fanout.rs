//! Notification fan-out: turns an escalation plan into durable rows.
//!
//! Delivery is a side effect, not a precondition: nothing here ever
//! returns an error to the caller. Failed inserts are logged and skipped,
//! and a partial batch never rolls back rows already written for other
//! recipients.

use crate::router::EscalationPlan;
use nivaran_store::EntityStore;
use nivaran_types::{Issue, Notification};
use std::sync::Arc;

/// Idempotent, best-effort notification writer.
#[derive(Clone)]
pub struct FanoutEngine {
    store: Arc<dyn EntityStore>,
}

impl FanoutEngine {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Persist one notification per plan recipient, enforcing at most one
    /// outstanding `(recipient, kind, issue)` row for escalation kinds.
    /// Returns how many rows were actually inserted.
    pub async fn deliver(&self, issue: &Issue, plan: &EscalationPlan) -> usize {
        if plan.recipients.is_empty() {
            tracing::warn!(
                issue_id = %issue.id,
                kind = ?plan.kind,
                "no recipients for notification; nothing delivered"
            );
            return 0;
        }

        let mut inserted = 0;
        for recipient in &plan.recipients {
            if plan.kind.is_escalation() {
                match self
                    .store
                    .notification_exists(recipient, plan.kind, &issue.id)
                    .await
                {
                    Ok(true) => {
                        tracing::debug!(
                            issue_id = %issue.id,
                            recipient = %recipient,
                            kind = ?plan.kind,
                            "notification already outstanding; skipping"
                        );
                        continue;
                    }
                    Ok(false) => {}
                    Err(err) => {
                        tracing::warn!(
                            issue_id = %issue.id,
                            recipient = %recipient,
                            error = %err,
                            "idempotency check failed; skipping recipient"
                        );
                        continue;
                    }
                }
            }

            let notification = Notification::new(
                recipient.clone(),
                plan.kind,
                plan.title.clone(),
                plan.message.clone(),
            )
            .for_issue(issue.id.clone());

            match self.store.insert_notification(notification).await {
                Ok(()) => inserted += 1,
                Err(err) => {
                    tracing::warn!(
                        issue_id = %issue.id,
                        recipient = %recipient,
                        error = %err,
                        "notification insert failed; continuing"
                    );
                }
            }
        }

        tracing::debug!(
            issue_id = %issue.id,
            kind = ?plan.kind,
            inserted,
            "notification fan-out finished"
        );
        inserted
    }
}
