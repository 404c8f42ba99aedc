//! Domain types for Nivaran, the civic issue routing core.
//!
//! Issues are routed through a region → department hierarchy. When a
//! submission references a region or department that does not exist yet,
//! the issue parks (`PENDING_REGION` / `PENDING_DEPARTMENT`) and an
//! escalation notification is sent to the administrative tier that can
//! create the missing entity. The reconciliation sweep later binds parked
//! issues to entities created after the fact.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod entity;
mod error;
mod id;
mod issue;
mod notification;

pub use entity::{normalize_name, Department, Region, Role, User};
pub use error::{RoutingError, RoutingResult};
pub use id::{DepartmentId, IssueId, NotificationId, RegionId, UserId};
pub use issue::{Issue, IssueStatus, Location, SNIPPET_MAX_CHARS};
pub use notification::{Notification, NotificationKind};
