//! Escalation router: decides, for an issue that was just created or
//! resolved one level, which administrative tier must be told and why.
//!
//! The router only *decides* — it returns plans for the fan-out engine to
//! deliver. It never inserts notifications itself and never mutates the
//! issue.

use nivaran_store::EntityStore;
use nivaran_types::{
    Department, DepartmentId, Issue, NotificationKind, Region, Role, RoutingError, RoutingResult,
    UserId,
};
use std::sync::Arc;

/// How a submission addressed its target department.
#[derive(Clone, Debug)]
pub enum IssueTarget {
    /// A known department id was supplied directly.
    Department(DepartmentId),
    /// Name-based addressing; the names may not resolve yet.
    Named {
        department_name: String,
        region_name: Option<String>,
    },
}

/// Outcome of classifying a submission against the current hierarchy.
#[derive(Clone, Debug)]
pub enum RoutingDecision {
    /// Department resolved; the issue starts `PENDING`.
    Assigned { department: Department },
    /// Region known, department not; the issue parks in
    /// `PENDING_DEPARTMENT`.
    MissingDepartment { region: Region, requested: String },
    /// Not even the region resolved; the issue parks in `PENDING_REGION`.
    MissingRegion {
        requested_region: String,
        requested_department: Option<String>,
    },
}

/// A routing decision turned into concrete recipients and wording.
#[derive(Clone, Debug)]
pub struct EscalationPlan {
    pub kind: NotificationKind,
    pub recipients: Vec<UserId>,
    pub title: String,
    pub message: String,
}

/// Decides escalation targets; owns no state beyond the store handle.
#[derive(Clone)]
pub struct EscalationRouter {
    store: Arc<dyn EntityStore>,
}

impl EscalationRouter {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    // ── Submission classification (rules 1-4) ────────────────────────

    /// Resolve a submission target against the current hierarchy.
    ///
    /// Matching is normalized exact-string only; a near-miss parks the
    /// issue rather than risking a misroute.
    pub async fn classify_submission(&self, target: &IssueTarget) -> RoutingResult<RoutingDecision> {
        match target {
            IssueTarget::Department(id) => {
                let department = self
                    .store
                    .get_department(id)
                    .await?
                    .ok_or_else(|| RoutingError::not_found(format!("department {id}")))?;
                Ok(RoutingDecision::Assigned { department })
            }
            IssueTarget::Named {
                department_name,
                region_name,
            } => {
                self.classify_named(department_name, region_name.as_deref())
                    .await
            }
        }
    }

    async fn classify_named(
        &self,
        department_name: &str,
        region_name: Option<&str>,
    ) -> RoutingResult<RoutingDecision> {
        if let Some(region_name) = region_name {
            let Some(region) = self.store.find_region_by_name(region_name).await? else {
                return Ok(RoutingDecision::MissingRegion {
                    requested_region: region_name.trim().to_string(),
                    requested_department: Some(department_name.trim().to_string()),
                });
            };

            return Ok(
                match self
                    .store
                    .find_department_in_region(&region.id, department_name)
                    .await?
                {
                    Some(department) => RoutingDecision::Assigned { department },
                    None => RoutingDecision::MissingDepartment {
                        region,
                        requested: department_name.trim().to_string(),
                    },
                },
            );
        }

        // No region given: the department name must resolve uniquely on
        // its own.
        let mut matches = self.store.find_departments_by_name(department_name).await?;
        match matches.len() {
            1 => Ok(RoutingDecision::Assigned {
                department: matches.remove(0),
            }),
            0 => Err(RoutingError::validation(
                "a region name is required when the department is not known",
            )),
            n => Err(RoutingError::ResolutionAmbiguous {
                name: department_name.trim().to_string(),
                matches: n,
            }),
        }
    }

    // ── Escalation planning (recipient tiers, rules 5-6) ─────────────

    /// Turn a decision into recipients and wording, walking up the
    /// administrative tiers until someone can act. Returns a plan with an
    /// empty recipient list only when even the super-admin tier is empty.
    pub async fn escalation_plan(
        &self,
        issue: &Issue,
        decision: &RoutingDecision,
    ) -> RoutingResult<EscalationPlan> {
        match decision {
            RoutingDecision::Assigned { department } => {
                let admins = self.store.departmental_admins(&department.id).await?;
                if !admins.is_empty() {
                    return Ok(EscalationPlan {
                        kind: NotificationKind::NewIssueAssigned,
                        recipients: admins.into_iter().map(|u| u.id).collect(),
                        title: "New issue assigned".to_string(),
                        message: format!(
                            "A new issue was reported to {}: \"{}\"",
                            department.name,
                            issue.description_snippet()
                        ),
                    });
                }

                // No departmental admin to receive the assignment notice;
                // escalate to the regional tier instead.
                let regional = self.store.regional_admins(&department.region_id).await?;
                if !regional.is_empty() {
                    return Ok(EscalationPlan {
                        kind: NotificationKind::MissingDepartmentAdmin,
                        recipients: regional.into_iter().map(|u| u.id).collect(),
                        title: "Department has no admin".to_string(),
                        message: format!(
                            "Department '{}' has no departmental admin to receive a newly \
                             assigned issue. Assign an admin so the issue can be worked on.",
                            department.name
                        ),
                    });
                }

                self.super_admin_plan(format!(
                    "Department '{}' and its region have no administrators for a newly \
                     reported issue.",
                    department.name
                ))
                .await
            }
            RoutingDecision::MissingDepartment { region, requested } => {
                let regional = self.store.regional_admins(&region.id).await?;
                if !regional.is_empty() {
                    return Ok(EscalationPlan {
                        kind: NotificationKind::MissingDepartment,
                        recipients: regional.into_iter().map(|u| u.id).collect(),
                        title: "Department needed".to_string(),
                        message: format!(
                            "An issue in region '{}' requests department '{}', which does \
                             not exist yet. Create it to route the issue.",
                            region.name, requested
                        ),
                    });
                }

                // Region exists but has no admin who could create the
                // department; reuse the no-admin signal to super admins.
                self.super_admin_plan(format!(
                    "Region '{}' has no regional admin to create requested department '{}'.",
                    region.name, requested
                ))
                .await
            }
            RoutingDecision::MissingRegion {
                requested_region, ..
            } => {
                self.super_admin_plan(format!(
                    "An issue references region '{requested_region}', which does not exist \
                     yet. Create it to route the issue."
                ))
                .await
            }
        }
    }

    async fn super_admin_plan(&self, message: String) -> RoutingResult<EscalationPlan> {
        let supers = self.store.list_users_by_role(Role::SuperAdmin).await?;
        Ok(EscalationPlan {
            kind: NotificationKind::MissingRegion,
            recipients: supers.into_iter().map(|u| u.id).collect(),
            title: "Region needed".to_string(),
            message,
        })
    }

    // ── Reporter status updates ──────────────────────────────────────

    /// The single `ISSUE_STATUS` notice sent to the reporter on every
    /// non-resolution status change (`advance`, `complete`).
    pub fn status_update_plan(&self, issue: &Issue) -> EscalationPlan {
        EscalationPlan {
            kind: NotificationKind::IssueStatus,
            recipients: vec![issue.reporter_id.clone()],
            title: "Issue status updated".to_string(),
            message: format!(
                "Your issue \"{}\" is now: {}.",
                issue.description_snippet(),
                issue.status.label()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nivaran_store::{
        DepartmentStore, MemoryStore, RegionStore, UserStore,
    };
    use nivaran_types::{Issue, Location, Region, User};

    async fn store_with_hierarchy() -> (Arc<MemoryStore>, Region, Department) {
        let store = Arc::new(MemoryStore::new());
        let region = Region::new("Kolhapur");
        let department = Department::new("Water Dept", region.id.clone());
        store.insert_region(region.clone()).await.unwrap();
        store.insert_department(department.clone()).await.unwrap();
        (store, region, department)
    }

    fn sample_issue() -> Issue {
        Issue::new(
            UserId::new("citizen-1"),
            "Broken water pipe on main road",
            "photos/pipe.jpg",
            Location::new(16.69, 74.23),
        )
    }

    #[tokio::test]
    async fn known_department_id_is_assigned() {
        let (store, _region, department) = store_with_hierarchy().await;
        let router = EscalationRouter::new(store);

        let decision = router
            .classify_submission(&IssueTarget::Department(department.id.clone()))
            .await
            .unwrap();
        assert!(matches!(decision, RoutingDecision::Assigned { department: d } if d.id == department.id));
    }

    #[tokio::test]
    async fn unknown_department_id_is_not_found() {
        let (store, _, _) = store_with_hierarchy().await;
        let router = EscalationRouter::new(store);

        let err = router
            .classify_submission(&IssueTarget::Department(DepartmentId::new("nope")))
            .await
            .unwrap_err();
        assert!(matches!(err, RoutingError::NotFound(_)));
    }

    #[tokio::test]
    async fn department_name_resolves_within_known_region() {
        let (store, _region, department) = store_with_hierarchy().await;
        let router = EscalationRouter::new(store);

        let decision = router
            .classify_submission(&IssueTarget::Named {
                department_name: " water dept ".to_string(),
                region_name: Some("KOLHAPUR".to_string()),
            })
            .await
            .unwrap();
        assert!(matches!(decision, RoutingDecision::Assigned { department: d } if d.id == department.id));
    }

    #[tokio::test]
    async fn unknown_department_in_known_region_is_missing_department() {
        let (store, region, _) = store_with_hierarchy().await;
        let router = EscalationRouter::new(store);

        let decision = router
            .classify_submission(&IssueTarget::Named {
                department_name: "Road Dept".to_string(),
                region_name: Some("Kolhapur".to_string()),
            })
            .await
            .unwrap();
        match decision {
            RoutingDecision::MissingDepartment { region: r, requested } => {
                assert_eq!(r.id, region.id);
                assert_eq!(requested, "Road Dept");
            }
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_region_is_missing_region() {
        let (store, _, _) = store_with_hierarchy().await;
        let router = EscalationRouter::new(store);

        let decision = router
            .classify_submission(&IssueTarget::Named {
                department_name: "Road Dept".to_string(),
                region_name: Some("Kagal".to_string()),
            })
            .await
            .unwrap();
        match decision {
            RoutingDecision::MissingRegion {
                requested_region,
                requested_department,
            } => {
                assert_eq!(requested_region, "Kagal");
                assert_eq!(requested_department.as_deref(), Some("Road Dept"));
            }
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[tokio::test]
    async fn bare_department_name_must_be_unambiguous() {
        let (store, _region, _d) = store_with_hierarchy().await;
        let second_region = Region::new("Kagal");
        store.insert_region(second_region.clone()).await.unwrap();
        store
            .insert_department(Department::new("Water Dept", second_region.id.clone()))
            .await
            .unwrap();
        let router = EscalationRouter::new(store);

        let err = router
            .classify_submission(&IssueTarget::Named {
                department_name: "Water Dept".to_string(),
                region_name: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RoutingError::ResolutionAmbiguous { matches: 2, .. }));
    }

    #[tokio::test]
    async fn assigned_with_admins_notifies_department_admins() {
        let (store, _region, department) = store_with_hierarchy().await;
        let admin = User::departmental_admin("da@example.org", department.id.clone());
        store.insert_user(admin.clone()).await.unwrap();
        let router = EscalationRouter::new(store);

        let plan = router
            .escalation_plan(
                &sample_issue(),
                &RoutingDecision::Assigned {
                    department: department.clone(),
                },
            )
            .await
            .unwrap();
        assert_eq!(plan.kind, NotificationKind::NewIssueAssigned);
        assert_eq!(plan.recipients, vec![admin.id]);
    }

    #[tokio::test]
    async fn assigned_without_admins_escalates_to_regional_tier() {
        let (store, region, department) = store_with_hierarchy().await;
        let regional = User::regional_admin("ra@example.org", region.id.clone());
        store.insert_user(regional.clone()).await.unwrap();
        let router = EscalationRouter::new(store);

        let plan = router
            .escalation_plan(
                &sample_issue(),
                &RoutingDecision::Assigned {
                    department: department.clone(),
                },
            )
            .await
            .unwrap();
        assert_eq!(plan.kind, NotificationKind::MissingDepartmentAdmin);
        assert_eq!(plan.recipients, vec![regional.id]);
    }

    #[tokio::test]
    async fn missing_department_without_regional_admin_falls_back_to_supers() {
        let (store, region, _) = store_with_hierarchy().await;
        let sa = User::super_admin("sa@example.org");
        store.insert_user(sa.clone()).await.unwrap();
        let router = EscalationRouter::new(store);

        let plan = router
            .escalation_plan(
                &sample_issue(),
                &RoutingDecision::MissingDepartment {
                    region,
                    requested: "Road Dept".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(plan.kind, NotificationKind::MissingRegion);
        assert_eq!(plan.recipients, vec![sa.id]);
    }

    #[tokio::test]
    async fn status_update_targets_the_reporter_with_label_and_snippet() {
        let (store, _, _) = store_with_hierarchy().await;
        let router = EscalationRouter::new(store);
        let mut issue = sample_issue();
        issue.status = nivaran_types::IssueStatus::InProgress;

        let plan = router.status_update_plan(&issue);
        assert_eq!(plan.kind, NotificationKind::IssueStatus);
        assert_eq!(plan.recipients, vec![issue.reporter_id.clone()]);
        assert!(plan.message.contains("In progress"));
        assert!(plan.message.contains("Broken water pipe"));
    }
}
