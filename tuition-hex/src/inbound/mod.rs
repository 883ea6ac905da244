//! HTTP Inbound Adapter
//!
//! Axum-based HTTP server that drives the application layer.

mod error;
mod handlers;
mod server;
pub mod uploads;

pub use error::ApiError;
pub use handlers::AppState;
pub use server::HttpServer;
