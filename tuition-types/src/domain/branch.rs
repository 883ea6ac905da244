//! Branch domain model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::ids::BranchId;
use super::money::CurrencyCode;
use crate::error::DomainError;

/// Lifecycle flag shared by branches, courses and grades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Active => "Active",
            RecordStatus::Inactive => "Inactive",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(RecordStatus::Active),
            "inactive" => Ok(RecordStatus::Inactive),
            _ => Err(DomainError::ValidationError(format!("Invalid status: {s}"))),
        }
    }
}

/// A physical tuition center location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Branch {
    pub id: BranchId,
    #[schema(example = "Colombo")]
    pub branch_name: String,
    /// Every fee at this branch is denominated in this currency
    pub currency: CurrencyCode,
    pub status: RecordStatus,
}

/// One-time admission fee configured for a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdmissionFee {
    pub branch_id: BranchId,
    /// Amount in the branch currency's smallest unit
    #[schema(example = 100000)]
    pub admission_fee: i64,
}
