//! Branches, courses, grades and grade fees.

use tuition_types::{
    AdmissionFee, AppError, Branch, BranchId, Course, CourseDetail, CourseId,
    CreateBranchRequest, CreateCourseRequest, CreateGradeFeeRequest, CreateGradeRequest, Grade,
    GradeChange, GradeDetail, GradeFee, GradeFeeDeleted, GradeFeeId, GradeFeeView, GradeId,
    GradeWithCourse, NewGrade, Repository, SetAdmissionFeeRequest, UpdateBranchRequest,
    UpdateCourseRequest, UpdateGradeFeeRequest, UpdateGradeRequest,
};

use super::{TuitionService, missing, not_found};

impl<R: Repository> TuitionService<R> {
    // ─────────────────────────────────────────────────────────────────────────────
    // Branches
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn create_branch(&self, req: CreateBranchRequest) -> Result<Branch, AppError> {
        if req.branch_name.trim().is_empty() {
            return Err(AppError::BadRequest("Branch name cannot be empty".into()));
        }
        self.repo.create_branch(req).await.map_err(Into::into)
    }

    pub async fn list_branches(&self) -> Result<Vec<Branch>, AppError> {
        self.repo.list_branches().await.map_err(Into::into)
    }

    pub async fn get_branch(&self, id: BranchId) -> Result<Branch, AppError> {
        self.repo
            .get_branch(id)
            .await?
            .ok_or_else(|| not_found(format!("Branch {id}")))
    }

    pub async fn update_branch(
        &self,
        id: BranchId,
        req: UpdateBranchRequest,
    ) -> Result<Branch, AppError> {
        self.repo.update_branch(id, req).await.map_err(Into::into)
    }

    pub async fn delete_branch(&self, id: BranchId) -> Result<(), AppError> {
        self.repo.delete_branch(id).await?;
        tracing::info!(branch_id = %id, "branch deleted");
        Ok(())
    }

    pub async fn admission_fee(&self, branch: BranchId) -> Result<AdmissionFee, AppError> {
        self.get_branch(branch).await?;
        self.repo
            .get_admission_fee(branch)
            .await?
            .ok_or_else(|| not_found(format!("Admission fee for branch {branch}")))
    }

    pub async fn set_admission_fee(
        &self,
        branch: BranchId,
        req: SetAdmissionFeeRequest,
    ) -> Result<AdmissionFee, AppError> {
        if req.admission_fee < 0 {
            return Err(AppError::BadRequest("Admission fee cannot be negative".into()));
        }
        self.repo
            .set_admission_fee(branch, req.admission_fee)
            .await
            .map_err(missing(format!("Branch {branch}")))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Courses
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn create_course(&self, req: CreateCourseRequest) -> Result<CourseDetail, AppError> {
        if req.course_code.trim().is_empty() || req.name.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Course code and name are required".into(),
            ));
        }
        let detail = self.repo.create_course(req).await?;
        tracing::info!(course_id = %detail.course.id, grades = detail.grades.len(), "course saved");
        Ok(detail)
    }

    pub async fn list_courses(&self) -> Result<Vec<CourseDetail>, AppError> {
        self.repo.list_courses().await.map_err(Into::into)
    }

    pub async fn get_course(&self, id: CourseId) -> Result<CourseDetail, AppError> {
        self.repo
            .get_course(id)
            .await?
            .ok_or_else(|| not_found(format!("Course {id}")))
    }

    pub async fn search_courses(&self, query: Option<&str>) -> Result<Vec<Course>, AppError> {
        let term = query.map(str::trim).unwrap_or_default();
        if term.is_empty() {
            return Err(AppError::BadRequest("Search query is required".into()));
        }
        self.repo.search_courses(term).await.map_err(Into::into)
    }

    pub async fn update_course(
        &self,
        id: CourseId,
        req: UpdateCourseRequest,
    ) -> Result<CourseDetail, AppError> {
        self.repo.update_course(id, req).await.map_err(Into::into)
    }

    pub async fn delete_course(&self, id: CourseId) -> Result<(), AppError> {
        self.repo.delete_course(id).await?;
        tracing::info!(course_id = %id, "course deleted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Grades
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn create_grade(&self, req: CreateGradeRequest) -> Result<Grade, AppError> {
        let course = req.course_id;
        self.repo
            .create_grade(req)
            .await
            .map_err(missing(format!("Course {course}")))
    }

    pub async fn list_grades(&self) -> Result<Vec<GradeWithCourse>, AppError> {
        self.repo.list_grades().await.map_err(Into::into)
    }

    pub async fn get_grade(&self, id: GradeId) -> Result<GradeWithCourse, AppError> {
        self.repo
            .get_grade(id)
            .await?
            .ok_or_else(|| not_found(format!("Grade {id}")))
    }

    pub async fn update_grade(
        &self,
        id: GradeId,
        req: UpdateGradeRequest,
    ) -> Result<Grade, AppError> {
        self.repo.update_grade(id, req).await.map_err(Into::into)
    }

    pub async fn delete_grade(&self, id: GradeId) -> Result<(), AppError> {
        self.repo.delete_grade(id).await.map_err(Into::into)
    }

    pub async fn grades_of_course(&self, course: CourseId) -> Result<Vec<Grade>, AppError> {
        self.repo
            .grades_of_course(course)
            .await
            .map_err(missing(format!("Course {course}")))
    }

    pub async fn create_grades_for_course(
        &self,
        course: CourseId,
        grades: Vec<NewGrade>,
    ) -> Result<Vec<GradeDetail>, AppError> {
        if grades.is_empty() {
            return Err(AppError::BadRequest("At least one grade is required".into()));
        }
        self.repo
            .create_grades_for_course(course, grades)
            .await
            .map_err(Into::into)
    }

    pub async fn update_grades_for_course(
        &self,
        course: CourseId,
        grades: Vec<GradeChange>,
    ) -> Result<Vec<GradeDetail>, AppError> {
        if grades.is_empty() {
            return Err(AppError::BadRequest("At least one grade is required".into()));
        }
        self.repo
            .update_grades_for_course(course, grades)
            .await
            .map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Grade fees
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn create_grade_fee(&self, req: CreateGradeFeeRequest) -> Result<GradeFee, AppError> {
        self.repo.create_grade_fee(req).await.map_err(Into::into)
    }

    pub async fn list_grade_fees(&self) -> Result<Vec<GradeFeeView>, AppError> {
        self.repo.list_grade_fees().await.map_err(Into::into)
    }

    pub async fn get_grade_fee(&self, id: GradeFeeId) -> Result<GradeFeeView, AppError> {
        self.repo
            .get_grade_fee(id)
            .await?
            .ok_or_else(|| not_found(format!("Grade fee {id}")))
    }

    pub async fn update_grade_fee(
        &self,
        id: GradeFeeId,
        req: UpdateGradeFeeRequest,
    ) -> Result<GradeFee, AppError> {
        if req.fee.is_none() && req.branch_id.is_none() {
            return Err(AppError::BadRequest("Nothing to update".into()));
        }
        self.repo.update_grade_fee(id, req).await.map_err(Into::into)
    }

    /// Deletes a fee; scoped to `course` when given.
    pub async fn delete_grade_fee(
        &self,
        id: GradeFeeId,
        course: Option<CourseId>,
    ) -> Result<GradeFeeDeleted, AppError> {
        let deleted = self
            .repo
            .delete_grade_fee(id, course)
            .await
            .map_err(missing(format!("Grade fee {id}")))?;
        if deleted.grade_deleted {
            tracing::info!(grade_fee_id = %id, "grade removed with its last fee");
        }
        Ok(deleted)
    }
}
