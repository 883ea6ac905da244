//! Integer identifiers for persisted entities.
//!
//! Every table uses an autoincrement primary key. Wrapping them keeps a
//! `GradeId` from being passed where a `BranchId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::DomainError;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $entity:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
            ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw key.
            pub fn get(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        /// Parses a path segment. Only positive integers are valid keys.
        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().parse::<i64>() {
                    Ok(v) if v > 0 => Ok(Self(v)),
                    _ => Err(DomainError::InvalidId {
                        entity: $entity,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

entity_id!(
    /// Identifier of a tuition center location.
    BranchId,
    "branch"
);
entity_id!(CourseId, "course");
entity_id!(GradeId, "grade");
entity_id!(GradeFeeId, "grade fee");
entity_id!(UserId, "user");
entity_id!(
    /// Identifier of the student profile row, distinct from the user id.
    StudentDetailsId,
    "student"
);
entity_id!(SlotId, "slot");
entity_id!(PaymentId, "payment");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_ids() {
        let id: GradeId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn rejects_zero_negative_and_garbage() {
        for raw in ["0", "-3", "abc", ""] {
            let err = raw.parse::<StudentDetailsId>().unwrap_err();
            assert!(matches!(err, DomainError::InvalidId { entity: "student", .. }));
        }
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&BranchId::new(7)).unwrap();
        assert_eq!(json, "7");
    }
}
