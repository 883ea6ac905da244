//! Error types for the tuition center service.

use crate::domain::{Day, Role, SlotId, UserId};

/// Domain-level errors (business rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Amount cannot be negative")]
    NegativeAmount,

    #[error("Invalid {entity} ID: {value}")]
    InvalidId { entity: &'static str, value: String },

    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Unknown {entity} IDs: {}", join_ids(.ids))]
    UnknownReferences { entity: &'static str, ids: Vec<i64> },

    #[error("User {user} not found or not a {role}")]
    RoleMismatch { user: UserId, role: Role },

    #[error("Slot {0} is fully booked")]
    SlotFull(SlotId),

    #[error("Maximum slots reached for {0}")]
    DayFull(Day),

    #[error("Student has no grades")]
    NoGrades,

    #[error("Fee total exceeds the supported range")]
    AmountOverflow,

    #[error("Validation error: {0}")]
    ValidationError(String),
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Transaction error: {0}")]
    Transaction(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::RoleMismatch { .. } | DomainError::NoGrades => {
                AppError::NotFound(err.to_string())
            }
            DomainError::ValidationError(msg) => AppError::BadRequest(msg),
            e => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Transaction(e) => AppError::Internal(e),
            RepoError::Conflict(e) => AppError::Conflict(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_references_lists_ids() {
        let err = DomainError::UnknownReferences {
            entity: "branch",
            ids: vec![3, 7],
        };
        assert_eq!(err.to_string(), "Unknown branch IDs: 3, 7");
    }

    #[test]
    fn role_mismatch_maps_to_not_found() {
        let err: AppError = RepoError::Domain(DomainError::RoleMismatch {
            user: UserId::new(4),
            role: Role::Student,
        })
        .into();
        assert!(matches!(err, AppError::NotFound(msg) if msg.contains("not a student")));
    }

    #[test]
    fn conflict_survives_mapping() {
        let err: AppError = RepoError::Conflict("duplicate".into()).into();
        assert!(matches!(err, AppError::Conflict(_)));
    }
}
