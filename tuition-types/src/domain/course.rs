//! Course catalog: courses, their grade levels and branch-specific fees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::branch::RecordStatus;
use super::ids::{BranchId, CourseId, GradeFeeId, GradeId};

/// A course offered by the center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Course {
    pub id: CourseId,
    /// Unique short code
    #[schema(example = "MATH")]
    pub course_code: String,
    #[schema(example = "Mathematics")]
    pub name: String,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
}

/// A grade level within a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Grade {
    pub id: GradeId,
    #[schema(example = "Grade 6")]
    pub grade_name: String,
    pub course_id: CourseId,
    pub status: RecordStatus,
}

/// Monthly fee of a grade at one branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GradeFee {
    pub id: GradeFeeId,
    pub grade_id: GradeId,
    pub branch_id: BranchId,
    /// Amount in the branch currency's smallest unit
    #[schema(example = 250000)]
    pub fee: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
