//! Catalog port: branches, courses, grades and grade fees.

use crate::domain::{
    AdmissionFee, Branch, BranchId, Course, CourseId, Grade, GradeFee, GradeFeeId, GradeId,
};
use crate::dto::{
    CourseDetail, CreateBranchRequest, CreateCourseRequest, CreateGradeFeeRequest,
    CreateGradeRequest, GradeChange, GradeDetail, GradeFeeDeleted, GradeFeeView, GradeWithCourse,
    NewGrade, UpdateBranchRequest, UpdateCourseRequest, UpdateGradeFeeRequest, UpdateGradeRequest,
};
use crate::error::RepoError;

/// Catalog persistence.
///
/// Every operation that writes more than one row MUST run in a single
/// database transaction and leave no partial state on error.
#[async_trait::async_trait]
pub trait CatalogRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Branches
    // ─────────────────────────────────────────────────────────────────────────────

    async fn create_branch(&self, req: CreateBranchRequest) -> Result<Branch, RepoError>;

    async fn list_branches(&self) -> Result<Vec<Branch>, RepoError>;

    async fn get_branch(&self, id: BranchId) -> Result<Option<Branch>, RepoError>;

    async fn update_branch(
        &self,
        id: BranchId,
        req: UpdateBranchRequest,
    ) -> Result<Branch, RepoError>;

    /// Fails with `Conflict` while grade fees still reference the branch.
    async fn delete_branch(&self, id: BranchId) -> Result<(), RepoError>;

    async fn get_admission_fee(&self, branch: BranchId)
    -> Result<Option<AdmissionFee>, RepoError>;

    async fn set_admission_fee(
        &self,
        branch: BranchId,
        fee: i64,
    ) -> Result<AdmissionFee, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Courses
    // ─────────────────────────────────────────────────────────────────────────────

    /// Creates the course (or reuses the one with the same code) and its
    /// nested grades and fees.
    async fn create_course(&self, req: CreateCourseRequest) -> Result<CourseDetail, RepoError>;

    /// Newest first.
    async fn list_courses(&self) -> Result<Vec<CourseDetail>, RepoError>;

    async fn get_course(&self, id: CourseId) -> Result<Option<CourseDetail>, RepoError>;

    async fn search_courses(&self, term: &str) -> Result<Vec<Course>, RepoError>;

    async fn update_course(
        &self,
        id: CourseId,
        req: UpdateCourseRequest,
    ) -> Result<CourseDetail, RepoError>;

    /// Removes the course with its grades and their fees.
    async fn delete_course(&self, id: CourseId) -> Result<(), RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Grades
    // ─────────────────────────────────────────────────────────────────────────────

    async fn create_grade(&self, req: CreateGradeRequest) -> Result<Grade, RepoError>;

    async fn list_grades(&self) -> Result<Vec<GradeWithCourse>, RepoError>;

    async fn get_grade(&self, id: GradeId) -> Result<Option<GradeWithCourse>, RepoError>;

    async fn update_grade(&self, id: GradeId, req: UpdateGradeRequest)
    -> Result<Grade, RepoError>;

    async fn delete_grade(&self, id: GradeId) -> Result<(), RepoError>;

    async fn grades_of_course(&self, course: CourseId) -> Result<Vec<Grade>, RepoError>;

    /// Every referenced branch must exist.
    async fn create_grades_for_course(
        &self,
        course: CourseId,
        grades: Vec<NewGrade>,
    ) -> Result<Vec<GradeDetail>, RepoError>;

    /// Every grade must belong to the course.
    async fn update_grades_for_course(
        &self,
        course: CourseId,
        grades: Vec<GradeChange>,
    ) -> Result<Vec<GradeDetail>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Grade fees
    // ─────────────────────────────────────────────────────────────────────────────

    async fn create_grade_fee(&self, req: CreateGradeFeeRequest) -> Result<GradeFee, RepoError>;

    async fn list_grade_fees(&self) -> Result<Vec<GradeFeeView>, RepoError>;

    async fn get_grade_fee(&self, id: GradeFeeId) -> Result<Option<GradeFeeView>, RepoError>;

    async fn update_grade_fee(
        &self,
        id: GradeFeeId,
        req: UpdateGradeFeeRequest,
    ) -> Result<GradeFee, RepoError>;

    /// Deletes a fee, and its grade when no fee remains. With `course`, the
    /// fee must belong to a grade of that course.
    async fn delete_grade_fee(
        &self,
        id: GradeFeeId,
        course: Option<CourseId>,
    ) -> Result<GradeFeeDeleted, RepoError>;
}
