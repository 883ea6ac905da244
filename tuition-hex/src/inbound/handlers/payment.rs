//! Fee quote, payment recording and payment listing handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use tuition_types::{
    CreatePaymentRequest, FilterStatusQuery, HistoryQuery, LatestPaymentQuery, NameQuery,
    PaymentFilter, PaymentListQuery, PaymentStatus, Repository, SearchMainQuery,
    StudentDetailsId,
};

use super::{AppState, parse_id};
use crate::inbound::ApiError;

// ─────────────────────────────────────────────────────────────────────────────
// Per-student fees
// ─────────────────────────────────────────────────────────────────────────────

/// Fee quote for the due and upcoming months.
#[tracing::instrument(skip(state), fields(student_details_id = %id))]
pub async fn fee_quote<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: StudentDetailsId = parse_id(&id)?;
    Ok(Json(state.service.fee_quote(id).await?))
}

/// Records a payment of the quoted total. The body may only carry a date.
#[tracing::instrument(skip(state), fields(student_details_id = %id))]
pub async fn create_payment<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    body: Option<Json<CreatePaymentRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let id: StudentDetailsId = parse_id(&id)?;
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let created = state.service.create_payment(id, req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[tracing::instrument(skip(state), fields(student_details_id = %id))]
pub async fn next_month_fee<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: StudentDetailsId = parse_id(&id)?;
    Ok(Json(state.service.next_month_fee(id).await?))
}

/// Month-by-month paid/due/upcoming ledger.
#[tracing::instrument(skip(state), fields(student_details_id = %id))]
pub async fn pending_ledger<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id: StudentDetailsId = parse_id(&id)?;
    Ok(Json(state.service.pending_ledger(id).await?))
}

#[tracing::instrument(skip(state), fields(student_details_id = %id))]
pub async fn payment_history<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let id: StudentDetailsId = parse_id(&id)?;
    Ok(Json(state.service.payment_history(id, query).await?))
}

// ─────────────────────────────────────────────────────────────────────────────
// Searches
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn history_by_name<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<NameQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.history_by_name(query).await?))
}

#[tracing::instrument(skip(state))]
pub async fn latest_by_name<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<LatestPaymentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.latest_by_name(query).await?))
}

#[tracing::instrument(skip(state))]
pub async fn filter_by_state<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<FilterStatusQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.filter_by_state(query).await?))
}

#[tracing::instrument(skip(state))]
pub async fn search_main<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<SearchMainQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.search_main(query).await?))
}

// ─────────────────────────────────────────────────────────────────────────────
// Listings
// ─────────────────────────────────────────────────────────────────────────────

pub async fn all_payments<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state.service.list_payments(PaymentFilter::default()).await?,
    ))
}

pub async fn pending_payments<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = PaymentFilter {
        status: Some(PaymentStatus::Pending),
        ..Default::default()
    };
    Ok(Json(state.service.list_payments(filter).await?))
}

pub async fn paid_payments<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = PaymentFilter {
        status: Some(PaymentStatus::Paid),
        ..Default::default()
    };
    Ok(Json(state.service.list_payments(filter).await?))
}

/// Stored payments filtered by `state` and `status` (`All` disables a filter).
#[tracing::instrument(skip(state))]
pub async fn filtered_payments<R: Repository>(
    State(state): State<Arc<AppState<R>>>,
    Query(query): Query<PaymentListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.filtered_payments(query).await?))
}
