//! # Tuition Hex
//!
//! Application service layer and HTTP adapter for the tuition center service.
//!
//! ## Architecture
//!
//! - `service/` - Application service (catalog, students, schedule, payments)
//! - `inbound/` - HTTP adapter (Axum server, photo uploads)
//! - `openapi` - OpenAPI document served at `/api-docs/openapi.json`
//!
//! The service is generic over `R: Repository`, allowing
//! different repository implementations to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use service::TuitionService;
