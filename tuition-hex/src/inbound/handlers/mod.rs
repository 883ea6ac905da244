//! HTTP request handlers.

use std::path::PathBuf;
use std::str::FromStr;

use axum::{Json, response::IntoResponse};

use tuition_types::{DomainError, Repository};

use super::ApiError;
use crate::TuitionService;

pub mod catalog;
pub mod payment;
pub mod schedule;
pub mod student;

/// Application state shared across handlers.
pub struct AppState<R: Repository> {
    pub service: TuitionService<R>,
    /// Root directory for uploaded files, served under `/uploads`.
    pub upload_dir: PathBuf,
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// Parses a path segment into a typed id, 400 for anything but a positive
/// integer.
pub(crate) fn parse_id<T>(raw: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(ApiError::from)
}
