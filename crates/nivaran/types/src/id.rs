//! Identifier newtypes for every persisted entity.
//!
//! Ids are opaque strings (uuid v4 when generated locally) so that a
//! backing store may substitute its own key scheme without touching the
//! domain layer.

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Generate a fresh random id.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a region
    RegionId
);
entity_id!(
    /// Unique identifier for a department within a region
    DepartmentId
);
entity_id!(
    /// Unique identifier for a user (citizen or admin)
    UserId
);
entity_id!(
    /// Unique identifier for a civic issue
    IssueId
);
entity_id!(
    /// Unique identifier for a notification row
    NotificationId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(IssueId::generate(), IssueId::generate());
    }

    #[test]
    fn id_display_round_trips() {
        let id = RegionId::new("r-1");
        assert_eq!(id.to_string(), "r-1");
        assert_eq!(id.as_str(), "r-1");
    }
}
