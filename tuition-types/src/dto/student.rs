//! User and student DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Branch, BranchId, CourseId, GradeId, Role, Slot, SlotId, StudentDetails, StudentDetailsId,
    User, UserId, UserStatus,
};

// ─────────────────────────────────────────────────────────────────────────────
// User DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "Nimal")]
    pub first_name: String,
    #[schema(example = "Perera")]
    pub last_name: String,
    #[serde(default)]
    pub gender: Option<String>,
    pub username: String,
    /// Plain text; only a salted digest is stored
    pub password: String,
    pub email: String,
    #[schema(example = "0771234567")]
    pub phn_num: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    /// Defaults to `student`
    #[serde(default)]
    pub role: Option<Role>,
    /// Defaults to `active`
    #[serde(default)]
    pub status: Option<UserStatus>,
}

/// Partial user update; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phn_num: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.gender.is_none()
            && self.username.is_none()
            && self.password.is_none()
            && self.email.is_none()
            && self.phn_num.is_none()
            && self.address.is_none()
            && self.date_of_birth.is_none()
            && self.role.is_none()
            && self.status.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserListQuery {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub status: Option<UserStatus>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Student DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Completes a student registration in one step.
///
/// Creates the user (always role `student`, status `active`), the student
/// details, grade assignments, slot bookings and branch memberships.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FinalizeRegistrationRequest {
    #[serde(flatten)]
    pub user: CreateUserRequest,
    #[schema(example = "ST-0042")]
    pub student_no: String,
    #[serde(default)]
    pub ice_contact: Option<String>,
    #[serde(default)]
    pub salutation: Option<String>,
    #[serde(default)]
    pub grade_ids: Vec<GradeId>,
    #[serde(default)]
    pub slot_ids: Vec<SlotId>,
    #[serde(default)]
    pub branch_ids: Vec<BranchId>,
}

/// Partial student update. Non-empty `grade_ids`/`slot_ids` replace the
/// current assignments; empty lists leave them untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateStudentRequest {
    #[serde(default)]
    pub user: UpdateUserRequest,
    #[serde(default)]
    pub student_no: Option<String>,
    #[serde(default)]
    pub ice_contact: Option<String>,
    #[serde(default)]
    pub salutation: Option<String>,
    #[serde(default)]
    pub grade_ids: Vec<GradeId>,
    #[serde(default)]
    pub slot_ids: Vec<SlotId>,
}

/// A grade a student is enrolled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StudentGrade {
    pub grade_id: GradeId,
    pub grade_name: String,
    pub course_id: CourseId,
    pub course_name: String,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignGradeRequest {
    #[serde(alias = "gradeId")]
    pub grade_id: GradeId,
}

/// Everything known about one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StudentProfile {
    pub user: User,
    pub details: StudentDetails,
    pub grades: Vec<StudentGrade>,
    pub branches: Vec<Branch>,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PhotoUploaded {
    #[schema(example = "/uploads/students/student-3-1720000000000.png")]
    pub photo_url: String,
}

/// Student row in listings and searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StudentSummary {
    pub student_details_id: StudentDetailsId,
    pub user_id: UserId,
    pub student_no: String,
    pub photo_url: String,
    pub branch_name: Option<String>,
    pub full_name: String,
    pub email: String,
    pub phn_num: String,
    pub status: UserStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct StudentSearchQuery {
    #[serde(default)]
    pub student_no: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
