//! Branch, course, grade and grade fee DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Branch, BranchId, Course, CourseId, CurrencyCode, Grade, GradeFee, GradeFeeId, GradeId,
    RecordStatus,
};

// ─────────────────────────────────────────────────────────────────────────────
// Branch DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a branch.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateBranchRequest {
    #[schema(example = "Colombo")]
    pub branch_name: String,
    #[schema(value_type = String, example = "LKR")]
    pub currency: CurrencyCode,
    /// Defaults to `Active`
    #[serde(default)]
    pub status: Option<RecordStatus>,
}

/// Partial branch update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateBranchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub currency: Option<CurrencyCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RecordStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetAdmissionFeeRequest {
    #[schema(example = 100000)]
    pub admission_fee: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Course & grade DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Fee of a new grade at one branch.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewGradeFee {
    pub branch_id: BranchId,
    #[schema(example = 250000)]
    pub fee: i64,
}

/// A grade created together with its course (or appended to one).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewGrade {
    #[schema(example = "Grade 6")]
    pub grade_name: String,
    #[serde(default)]
    pub status: Option<RecordStatus>,
    #[serde(default, alias = "gradeFees")]
    pub grade_fees: Vec<NewGradeFee>,
}

/// Request to create a course with optional nested grades and fees.
///
/// When the course code already exists the existing course is reused and
/// the grades are appended to it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    #[schema(example = "MATH")]
    pub course_code: String,
    #[schema(example = "Mathematics")]
    pub name: String,
    #[serde(default)]
    pub status: Option<RecordStatus>,
    #[serde(default)]
    pub grades: Vec<NewGrade>,
}

/// Change to one fee of a grade. Without an `id` a new fee is created and
/// both `branch_id` and `fee` are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct GradeFeeChange {
    #[serde(default)]
    pub id: Option<GradeFeeId>,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    #[serde(default)]
    pub fee: Option<i64>,
}

/// Change to an existing grade of a course.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GradeChange {
    pub id: GradeId,
    #[serde(default)]
    pub grade_name: Option<String>,
    #[serde(default)]
    pub status: Option<RecordStatus>,
    #[serde(default, alias = "gradeFees")]
    pub grade_fees: Vec<GradeFeeChange>,
}

/// Partial course update with nested grade changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateCourseRequest {
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<RecordStatus>,
    #[serde(default)]
    pub grades: Vec<GradeChange>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseSearchQuery {
    /// Substring of the course code or name
    #[serde(default)]
    pub query: Option<String>,
}

/// Grade fee with the branch it applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GradeFeeDetail {
    #[serde(flatten)]
    pub fee: GradeFee,
    pub branch: Option<Branch>,
}

/// Grade with its fees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GradeDetail {
    #[serde(flatten)]
    pub grade: Grade,
    pub grade_fees: Vec<GradeFeeDetail>,
}

/// Course with grades -> grade fees -> branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub grades: Vec<GradeDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateGradeRequest {
    pub course_id: CourseId,
    #[schema(example = "Grade 6")]
    pub grade_name: String,
    #[serde(default)]
    pub status: Option<RecordStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateGradeRequest {
    #[serde(default)]
    pub course_id: Option<CourseId>,
    #[serde(default)]
    pub grade_name: Option<String>,
    #[serde(default)]
    pub status: Option<RecordStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateGradesRequest {
    #[serde(default)]
    pub grades: Vec<NewGrade>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateGradesRequest {
    #[serde(default)]
    pub grades: Vec<GradeChange>,
}

/// Grade with the name of its course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GradeWithCourse {
    #[serde(flatten)]
    pub grade: Grade,
    pub course_name: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Grade fee DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateGradeFeeRequest {
    pub grade_id: GradeId,
    pub branch_id: BranchId,
    #[schema(example = 250000)]
    pub fee: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateGradeFeeRequest {
    #[serde(default)]
    pub fee: Option<i64>,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
}

/// Grade fee with grade and branch summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GradeFeeView {
    #[serde(flatten)]
    pub fee: GradeFee,
    pub grade_name: String,
    pub branch_name: String,
    #[schema(value_type = String)]
    pub currency: CurrencyCode,
}

/// Outcome of deleting a grade fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GradeFeeDeleted {
    pub id: GradeFeeId,
    /// True when this was the grade's last fee and the grade was removed too
    pub grade_deleted: bool,
}
