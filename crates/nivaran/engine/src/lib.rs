//! Nivaran routing engine.
//!
//! Routes citizen-submitted civic issues through the region → department
//! hierarchy and escalates to the right administrative tier when routing
//! cannot complete automatically.
//!
//! # Architecture
//!
//! The [`IssueService`] facade composes specialized components:
//!
//! - [`StateMachine`] — legal status transitions and their side effects
//! - [`EscalationRouter`] — who must be told, and why
//! - [`FanoutEngine`] — idempotent, best-effort notification writes
//! - [`ReconciliationSweeper`] — heals issues parked on entities that
//!   did not exist at submission time
//!
//! Notifications are a side effect, never a precondition: a delivery
//! failure is logged and swallowed, and the issue-side operation that
//! triggered it still succeeds.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod fanout;
pub mod router;
pub mod service;
pub mod state_machine;
pub mod sweeper;

pub use fanout::FanoutEngine;
pub use router::{EscalationPlan, EscalationRouter, IssueTarget, RoutingDecision};
pub use service::{IssueService, NewIssue};
pub use state_machine::StateMachine;
pub use sweeper::{ReconciliationSweeper, SweepReport};
