//! Branch, course, grade and grade fee handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use tuition_types::{
    BranchId, CourseId, CourseSearchQuery, CreateBranchRequest, CreateCourseRequest,
    CreateGradeFeeRequest, CreateGradeRequest, CreateGradesRequest, GradeFeeId, GradeId,
    Repository, SetAdmissionFeeRequest, UpdateBranchRequest, UpdateCourseRequest,
    UpdateGradeFeeRequest, UpdateGradeRequest, UpdateGradesRequest,
};

use super::{AppState, parse_id};
use crate::inbound::ApiError;

// ─────────────────────────────────────────────────────────────────────────────
// Branches
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn create_branch<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateBranchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let branch = state.service.create_branch(req).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

#[tracing::instrument(skip(state))]
pub async fn list_branches<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.list_branches().await?))
}

#[tracing::instrument(skip(state), fields(branch_id = %id))]
pub async fn get_branch<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: BranchId = parse_id(&id)?;
    Ok(Json(state.service.get_branch(id).await?))
}

#[tracing::instrument(skip(state), fields(branch_id = %id))]
pub async fn update_branch<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateBranchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id: BranchId = parse_id(&id)?;
    Ok(Json(state.service.update_branch(id, req).await?))
}

#[tracing::instrument(skip(state), fields(branch_id = %id))]
pub async fn delete_branch<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: BranchId = parse_id(&id)?;
    state.service.delete_branch(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state), fields(branch_id = %id))]
pub async fn get_admission_fee<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: BranchId = parse_id(&id)?;
    Ok(Json(state.service.admission_fee(id).await?))
}

#[tracing::instrument(skip(state), fields(branch_id = %id))]
pub async fn set_admission_fee<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<SetAdmissionFeeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id: BranchId = parse_id(&id)?;
    Ok(Json(state.service.set_admission_fee(id, req).await?))
}

// ─────────────────────────────────────────────────────────────────────────────
// Courses
// ─────────────────────────────────────────────────────────────────────────────

/// Creates a course with optional nested grades and fees.
#[tracing::instrument(skip(state, req), fields(course_code = %req.course_code))]
pub async fn create_course<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let course = state.service.create_course(req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

#[tracing::instrument(skip(state))]
pub async fn list_courses<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.list_courses().await?))
}

#[tracing::instrument(skip(state), fields(course_id = %id))]
pub async fn get_course<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: CourseId = parse_id(&id)?;
    Ok(Json(state.service.get_course(id).await?))
}

#[tracing::instrument(skip(state))]
pub async fn search_courses<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<CourseSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.search_courses(query.query.as_deref()).await?))
}

#[tracing::instrument(skip(state, req), fields(course_id = %id))]
pub async fn update_course<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCourseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id: CourseId = parse_id(&id)?;
    Ok(Json(state.service.update_course(id, req).await?))
}

#[tracing::instrument(skip(state), fields(course_id = %id))]
pub async fn delete_course<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: CourseId = parse_id(&id)?;
    state.service.delete_course(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes a grade fee after checking it belongs to the course.
#[tracing::instrument(skip(state))]
pub async fn delete_course_grade_fee<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path((course_id, fee_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let course: CourseId = parse_id(&course_id)?;
    let fee: GradeFeeId = parse_id(&fee_id)?;
    Ok(Json(state.service.delete_grade_fee(fee, Some(course)).await?))
}

/// Grades offered by a course.
#[tracing::instrument(skip(state), fields(course_id = %id))]
pub async fn grades_of_course<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: CourseId = parse_id(&id)?;
    Ok(Json(state.service.grades_of_course(id).await?))
}

// ─────────────────────────────────────────────────────────────────────────────
// Grades
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn create_grade<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateGradeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let grade = state.service.create_grade(req).await?;
    Ok((StatusCode::CREATED, Json(grade)))
}

#[tracing::instrument(skip(state))]
pub async fn list_grades<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.list_grades().await?))
}

#[tracing::instrument(skip(state), fields(grade_id = %id))]
pub async fn get_grade<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: GradeId = parse_id(&id)?;
    Ok(Json(state.service.get_grade(id).await?))
}

#[tracing::instrument(skip(state), fields(grade_id = %id))]
pub async fn update_grade<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateGradeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id: GradeId = parse_id(&id)?;
    Ok(Json(state.service.update_grade(id, req).await?))
}

#[tracing::instrument(skip(state), fields(grade_id = %id))]
pub async fn delete_grade<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: GradeId = parse_id(&id)?;
    state.service.delete_grade(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Bulk-creates grades (with fees) under a course.
#[tracing::instrument(skip(state, req), fields(course_id = %id))]
pub async fn create_grades_for_course<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<CreateGradesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id: CourseId = parse_id(&id)?;
    let grades = state.service.create_grades_for_course(id, req.grades).await?;
    Ok((StatusCode::CREATED, Json(grades)))
}

#[tracing::instrument(skip(state, req), fields(course_id = %id))]
pub async fn update_grades_for_course<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateGradesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id: CourseId = parse_id(&id)?;
    Ok(Json(
        state.service.update_grades_for_course(id, req.grades).await?,
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Grade fees
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn create_grade_fee<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateGradeFeeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let fee = state.service.create_grade_fee(req).await?;
    Ok((StatusCode::CREATED, Json(fee)))
}

#[tracing::instrument(skip(state))]
pub async fn list_grade_fees<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.list_grade_fees().await?))
}

#[tracing::instrument(skip(state), fields(grade_fee_id = %id))]
pub async fn get_grade_fee<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: GradeFeeId = parse_id(&id)?;
    Ok(Json(state.service.get_grade_fee(id).await?))
}

#[tracing::instrument(skip(state), fields(grade_fee_id = %id))]
pub async fn update_grade_fee<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateGradeFeeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id: GradeFeeId = parse_id(&id)?;
    Ok(Json(state.service.update_grade_fee(id, req).await?))
}

#[tracing::instrument(skip(state), fields(grade_fee_id = %id))]
pub async fn delete_grade_fee<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: GradeFeeId = parse_id(&id)?;
    Ok(Json(state.service.delete_grade_fee(id, None).await?))
}
