//! Nivaran storage abstractions.
//!
//! This crate defines the storage contract the routing engine operates
//! against:
//! - regions, departments, users (the routing hierarchy)
//! - issues, with conditional status-guarded writes
//! - notifications, with the existence probe backing fan-out idempotency
//!
//! Design stance:
//! - A single authoritative store with read-then-conditional-write
//!   updates; no in-process locking beyond the adapter's own.
//! - The in-memory adapter is the deterministic reference; a
//!   transactional backend is the production target behind the same
//!   traits.

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

mod error;
pub mod memory;
mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use traits::{
    DepartmentStore, EntityStore, IssueStore, NotificationStore, RegionStore, UserStore,
};
