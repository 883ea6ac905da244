//! Student port: users, registration and enrollment.

use crate::domain::{Branch, GradeId, Slot, StudentDetails, User, UserId};
use crate::dto::{
    CreateUserRequest, FinalizeRegistrationRequest, StudentGrade, StudentProfile, StudentSummary,
    UpdateStudentRequest, UpdateUserRequest, UserListQuery,
};
use crate::error::RepoError;

#[async_trait::async_trait]
pub trait StudentRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────────

    /// Username, email and phone number must be unique (`Conflict` otherwise).
    async fn create_user(&self, req: CreateUserRequest) -> Result<User, RepoError>;

    async fn list_users(&self, filter: UserListQuery) -> Result<Vec<User>, RepoError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepoError>;

    async fn update_user(&self, id: UserId, req: UpdateUserRequest) -> Result<User, RepoError>;

    async fn delete_user(&self, id: UserId) -> Result<(), RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Students (MUST be atomic)
    // ─────────────────────────────────────────────────────────────────────────────

    async fn finalize_registration(
        &self,
        req: FinalizeRegistrationRequest,
    ) -> Result<StudentProfile, RepoError>;

    async fn student_profile(&self, user: UserId) -> Result<Option<StudentProfile>, RepoError>;

    async fn update_student(
        &self,
        user: UserId,
        req: UpdateStudentRequest,
    ) -> Result<StudentProfile, RepoError>;

    /// Hard-deletes payments, enrollments, bookings, details and the user.
    async fn delete_student(&self, user: UserId) -> Result<(), RepoError>;

    async fn set_student_photo(
        &self,
        user: UserId,
        photo_url: &str,
    ) -> Result<StudentDetails, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Enrollment
    // ─────────────────────────────────────────────────────────────────────────────

    async fn student_branches(&self, user: UserId) -> Result<Vec<Branch>, RepoError>;

    async fn student_slots(&self, user: UserId) -> Result<Vec<Slot>, RepoError>;

    async fn assign_grade(&self, user: UserId, grade: GradeId) -> Result<StudentGrade, RepoError>;

    async fn student_grades(&self, user: UserId) -> Result<Vec<StudentGrade>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Listings
    // ─────────────────────────────────────────────────────────────────────────────

    /// Ordered by student number.
    async fn list_students(&self) -> Result<Vec<StudentSummary>, RepoError>;

    /// Substring match on student number and/or first or last name.
    async fn search_students(
        &self,
        student_no: Option<&str>,
        name: Option<&str>,
    ) -> Result<Vec<StudentSummary>, RepoError>;
}
