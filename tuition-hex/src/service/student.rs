//! Users, student registration and enrollment.

use tuition_types::{
    AppError, Branch, CreateUserRequest, FinalizeRegistrationRequest, GradeId, Repository, Slot,
    StudentDetails, StudentGrade, StudentProfile, StudentSearchQuery, StudentSummary,
    UpdateStudentRequest, UpdateUserRequest, User, UserId, UserListQuery,
};

use super::{TuitionService, missing, non_blank, not_found};

impl<R: Repository> TuitionService<R> {
    // ─────────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn create_user(&self, req: CreateUserRequest) -> Result<User, AppError> {
        if req.password.trim().is_empty() {
            return Err(AppError::BadRequest("Password is required".into()));
        }
        let user = self.repo.create_user(req).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    pub async fn list_users(&self, filter: UserListQuery) -> Result<Vec<User>, AppError> {
        self.repo.list_users(filter).await.map_err(Into::into)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, AppError> {
        self.repo
            .get_user(id)
            .await?
            .ok_or_else(|| not_found(format!("User {id}")))
    }

    pub async fn update_user(&self, id: UserId, req: UpdateUserRequest) -> Result<User, AppError> {
        if req.is_empty() {
            return Err(AppError::BadRequest("Nothing to update".into()));
        }
        self.repo
            .update_user(id, req)
            .await
            .map_err(missing(format!("User {id}")))
    }

    pub async fn delete_user(&self, id: UserId) -> Result<(), AppError> {
        self.repo
            .delete_user(id)
            .await
            .map_err(missing(format!("User {id}")))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Students
    // ─────────────────────────────────────────────────────────────────────────────

    /// Registers a student with grades, slots and branches in one step.
    pub async fn finalize_registration(
        &self,
        req: FinalizeRegistrationRequest,
    ) -> Result<StudentProfile, AppError> {
        if req.student_no.trim().is_empty() {
            return Err(AppError::BadRequest("Student number is required".into()));
        }
        self.repo
            .finalize_registration(req)
            .await
            .map_err(Into::into)
    }

    pub async fn student_profile(&self, user: UserId) -> Result<StudentProfile, AppError> {
        self.repo
            .student_profile(user)
            .await?
            .ok_or_else(|| not_found(format!("Student {user}")))
    }

    pub async fn update_student(
        &self,
        user: UserId,
        req: UpdateStudentRequest,
    ) -> Result<StudentProfile, AppError> {
        self.repo
            .update_student(user, req)
            .await
            .map_err(missing(format!("Student {user}")))
    }

    pub async fn delete_student(&self, user: UserId) -> Result<(), AppError> {
        self.repo
            .delete_student(user)
            .await
            .map_err(missing(format!("Student {user}")))?;
        tracing::info!(user_id = %user, "student removed");
        Ok(())
    }

    pub async fn set_student_photo(
        &self,
        user: UserId,
        photo_url: &str,
    ) -> Result<StudentDetails, AppError> {
        self.repo
            .set_student_photo(user, photo_url)
            .await
            .map_err(missing(format!("Student {user}")))
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Enrollment
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn student_branches(&self, user: UserId) -> Result<Vec<Branch>, AppError> {
        self.repo.student_branches(user).await.map_err(Into::into)
    }

    pub async fn student_slots(&self, user: UserId) -> Result<Vec<Slot>, AppError> {
        self.repo.student_slots(user).await.map_err(Into::into)
    }

    pub async fn assign_grade(
        &self,
        user: UserId,
        grade: GradeId,
    ) -> Result<StudentGrade, AppError> {
        self.repo
            .assign_grade(user, grade)
            .await
            .map_err(missing(format!("Student {user}")))
    }

    pub async fn student_grades(&self, user: UserId) -> Result<Vec<StudentGrade>, AppError> {
        self.get_user(user).await?;
        self.repo.student_grades(user).await.map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Listings
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn list_students(&self) -> Result<Vec<StudentSummary>, AppError> {
        self.repo.list_students().await.map_err(Into::into)
    }

    /// Needs a student number or a name.
    pub async fn search_students(
        &self,
        query: StudentSearchQuery,
    ) -> Result<Vec<StudentSummary>, AppError> {
        let student_no = non_blank(query.student_no.as_deref());
        let name = non_blank(query.name.as_deref());
        if student_no.is_none() && name.is_none() {
            return Err(AppError::BadRequest(
                "Provide a student number or a name to search".into(),
            ));
        }
        self.repo
            .search_students(student_no, name)
            .await
            .map_err(Into::into)
    }
}
