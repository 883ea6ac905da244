//! Slot booking, schedule management and master data handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use tuition_types::{
    AvailableSlotsQuery, CreateScheduleRequest, Repository, ScheduleListQuery,
    ScheduleSearchQuery, SlotId, TimeSlotQuery, UpdateScheduleRequest, UserId,
};

use super::{AppState, parse_id};
use crate::inbound::ApiError;

#[tracing::instrument(skip(state))]
pub async fn available_slots<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.available_slots(query).await?))
}

#[tracing::instrument(skip(state))]
pub async fn book_slot<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path((student_id, slot_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let student: UserId = parse_id(&student_id)?;
    let slot: SlotId = parse_id(&slot_id)?;
    let booking = state.service.book_slot(student, slot).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Schedule
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state, req), fields(teacher_id = %req.teacher_id))]
pub async fn create_schedule<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateScheduleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state.service.create_schedule(req).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

#[tracing::instrument(skip(state))]
pub async fn list_schedule<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<ScheduleListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.list_schedule(query).await?))
}

#[tracing::instrument(skip(state), fields(slot_id = %id))]
pub async fn get_schedule<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: SlotId = parse_id(&id)?;
    Ok(Json(state.service.get_schedule(id).await?))
}

#[tracing::instrument(skip(state, req), fields(slot_id = %id))]
pub async fn update_schedule<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateScheduleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let id: SlotId = parse_id(&id)?;
    Ok(Json(state.service.update_schedule(id, req).await?))
}

#[tracing::instrument(skip(state), fields(slot_id = %id))]
pub async fn delete_schedule<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: SlotId = parse_id(&id)?;
    state.service.delete_schedule(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state))]
pub async fn search_schedule<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<ScheduleSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.search_schedule(query).await?))
}

// ─────────────────────────────────────────────────────────────────────────────
// Master data
// ─────────────────────────────────────────────────────────────────────────────

pub async fn master_courses<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.master_courses().await?))
}

pub async fn master_grades<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.master_grades().await?))
}

pub async fn slot_days<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.slot_days().await?))
}

/// `?type=start|end|both`, defaulting to both.
pub async fn time_points<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<TimeSlotQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = query.kind.unwrap_or_default();
    Ok(Json(state.service.time_points(kind).await?))
}

pub async fn lecturers<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.lecturers().await?))
}
