//! User, student registration and enrollment handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use tuition_types::{
    AppError, AssignGradeRequest, CreateUserRequest, FinalizeRegistrationRequest, PhotoUploaded,
    Repository, StudentSearchQuery, UpdateStudentRequest, UpdateUserRequest, UserId,
    UserListQuery,
};

use super::{AppState, parse_id};
use crate::inbound::ApiError;
use crate::inbound::uploads;

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, req), fields(username = %req.username))]
pub async fn create_user<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.service.create_user(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[tracing::instrument(skip(state))]
pub async fn list_users<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Query(filter): Query<UserListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.list_users(filter).await?))
}

#[tracing::instrument(skip(state), fields(user_id = %id))]
pub async fn get_user<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: UserId = parse_id(&id)?;
    Ok(Json(state.service.get_user(id).await?))
}

#[tracing::instrument(skip(state, req), fields(user_id = %id))]
pub async fn update_user<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id: UserId = parse_id(&id)?;
    Ok(Json(state.service.update_user(id, req).await?))
}

#[tracing::instrument(skip(state), fields(user_id = %id))]
pub async fn delete_user<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: UserId = parse_id(&id)?;
    state.service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ─────────────────────────────────────────────────────────────────────────────
// Students
// ─────────────────────────────────────────────────────────────────────────────

/// Registers a student with grades, slots and branches in one go.
#[tracing::instrument(skip(state, req), fields(student_no = %req.student_no))]
pub async fn finalize_registration<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<FinalizeRegistrationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state.service.finalize_registration(req).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[tracing::instrument(skip(state), fields(user_id = %id))]
pub async fn student_profile<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: UserId = parse_id(&id)?;
    Ok(Json(state.service.student_profile(id).await?))
}

#[tracing::instrument(skip(state, req), fields(user_id = %id))]
pub async fn update_student<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStudentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id: UserId = parse_id(&id)?;
    Ok(Json(state.service.update_student(id, req).await?))
}

#[tracing::instrument(skip(state), fields(user_id = %id))]
pub async fn delete_student<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: UserId = parse_id(&id)?;
    state.service.delete_student(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Stores the multipart `photo` field and points the student at it.
///
/// The file is removed again if the profile update fails.
#[tracing::instrument(skip(state, multipart), fields(user_id = %id))]
pub async fn upload_photo<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let user: UserId = parse_id(&id)?;
    // Unknown students are rejected before anything touches the disk.
    state.service.student_profile(user).await?;

    let mut photo = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("photo") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Unreadable photo: {e}")))?;
        photo = Some((file_name, bytes));
        break;
    }
    let (file_name, bytes) =
        photo.ok_or_else(|| AppError::BadRequest("Missing 'photo' file field".into()))?;

    let (photo_url, path) =
        uploads::store_photo(&state.upload_dir, user, &file_name, &bytes).await?;

    if let Err(err) = state.service.set_student_photo(user, &photo_url).await {
        if let Err(io) = tokio::fs::remove_file(&path).await {
            tracing::warn!(error = %io, path = %path.display(), "orphaned photo left on disk");
        }
        return Err(err.into());
    }

    tracing::info!(%photo_url, "student photo updated");
    Ok(Json(PhotoUploaded { photo_url }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Enrollment
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state), fields(user_id = %id))]
pub async fn student_branches<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: UserId = parse_id(&id)?;
    Ok(Json(state.service.student_branches(id).await?))
}

#[tracing::instrument(skip(state), fields(user_id = %id))]
pub async fn student_slots<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: UserId = parse_id(&id)?;
    Ok(Json(state.service.student_slots(id).await?))
}

#[tracing::instrument(skip(state), fields(user_id = %id))]
pub async fn assign_grade<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<AssignGradeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id: UserId = parse_id(&id)?;
    let grade = state.service.assign_grade(id, req.grade_id).await?;
    Ok((StatusCode::CREATED, Json(grade)))
}

#[tracing::instrument(skip(state), fields(user_id = %id))]
pub async fn student_grades<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: UserId = parse_id(&id)?;
    Ok(Json(state.service.student_grades(id).await?))
}

#[tracing::instrument(skip(state))]
pub async fn list_students<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.list_students().await?))
}

#[tracing::instrument(skip(state))]
pub async fn search_students<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<StudentSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.search_students(query).await?))
}
