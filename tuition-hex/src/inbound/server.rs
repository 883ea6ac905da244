//! HTTP Server configuration and startup.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use tuition_types::Repository;

use super::handlers::{self, AppState, catalog, payment, schedule, student};
use super::uploads::MAX_PHOTO_BYTES;
use crate::TuitionService;
use crate::openapi::ApiDoc;

/// Room for multipart framing around the largest accepted photo.
const PHOTO_BODY_LIMIT: usize = MAX_PHOTO_BYTES + 64 * 1024;

/// HTTP Server for the tuition center API.
pub struct HttpServer<R: Repository> {
    state: Arc<AppState<R>>,
    cors_origin: Option<HeaderValue>,
}

impl<R: Repository> HttpServer<R> {
    /// Creates a server storing uploads below `upload_dir`. CORS allows any
    /// origin until [`HttpServer::with_cors_origin`] narrows it.
    pub fn new(service: TuitionService<R>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            state: Arc::new(AppState {
                service,
                upload_dir: upload_dir.into(),
            }),
            cors_origin: None,
        }
    }

    /// Restricts CORS to a single origin.
    pub fn with_cors_origin(mut self, origin: &str) -> anyhow::Result<Self> {
        self.cors_origin = Some(origin.parse()?);
        Ok(self)
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        let cors = CorsLayer::new()
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::CONTENT_TYPE]);
        let cors = match &self.cors_origin {
            Some(origin) => cors.allow_origin(origin.clone()),
            None => cors.allow_origin(Any),
        };

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api-docs/openapi.json", get(openapi_json))
            .merge(Self::catalog_routes())
            .merge(Self::student_routes())
            .merge(Self::schedule_routes())
            .merge(Self::payment_routes())
            .nest_service("/uploads", ServeDir::new(&self.state.upload_dir))
            .layer(metrics)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    fn catalog_routes() -> Router<Arc<AppState<R>>> {
        Router::new()
            .route(
                "/api/branch",
                post(catalog::create_branch::<R>).get(catalog::list_branches::<R>),
            )
            .route("/api/branches", get(catalog::list_branches::<R>))
            .route(
                "/api/branch/{id}",
                get(catalog::get_branch::<R>)
                    .put(catalog::update_branch::<R>)
                    .patch(catalog::update_branch::<R>)
                    .delete(catalog::delete_branch::<R>),
            )
            .route(
                "/api/branch/{id}/admission-fee",
                get(catalog::get_admission_fee::<R>).put(catalog::set_admission_fee::<R>),
            )
            .route(
                "/api/course",
                post(catalog::create_course::<R>).get(catalog::list_courses::<R>),
            )
            .route("/api/course/search", get(catalog::search_courses::<R>))
            .route(
                "/api/course/{id}",
                get(catalog::get_course::<R>)
                    .put(catalog::update_course::<R>)
                    .patch(catalog::update_course::<R>)
                    .delete(catalog::delete_course::<R>),
            )
            .route(
                "/api/course/{id}/grade-fee/{fee_id}",
                delete(catalog::delete_course_grade_fee::<R>),
            )
            .route(
                "/api/grade",
                post(catalog::create_grade::<R>).get(catalog::list_grades::<R>),
            )
            .route(
                "/api/grade/{id}",
                get(catalog::get_grade::<R>)
                    .put(catalog::update_grade::<R>)
                    .patch(catalog::update_grade::<R>)
                    .delete(catalog::delete_grade::<R>),
            )
            .route(
                "/api/grade/course/{id}",
                post(catalog::create_grades_for_course::<R>)
                    .patch(catalog::update_grades_for_course::<R>),
            )
            .route(
                "/api/grade-fee",
                post(catalog::create_grade_fee::<R>).get(catalog::list_grade_fees::<R>),
            )
            .route(
                "/api/grade-fee/{id}",
                get(catalog::get_grade_fee::<R>)
                    .put(catalog::update_grade_fee::<R>)
                    .patch(catalog::update_grade_fee::<R>)
                    .delete(catalog::delete_grade_fee::<R>),
            )
    }

    fn student_routes() -> Router<Arc<AppState<R>>> {
        Router::new()
            .route(
                "/api/users",
                post(student::create_user::<R>).get(student::list_users::<R>),
            )
            .route(
                "/api/users/{id}",
                get(student::get_user::<R>)
                    .put(student::update_user::<R>)
                    .patch(student::update_user::<R>)
                    .delete(student::delete_user::<R>),
            )
            .route("/api/students", get(student::list_students::<R>))
            .route(
                "/api/students/finalize",
                post(student::finalize_registration::<R>),
            )
            .route(
                "/api/students/{id}",
                delete(student::delete_student::<R>).patch(student::update_student::<R>),
            )
            .route(
                "/api/students/{id}/profile",
                get(student::student_profile::<R>),
            )
            .route(
                "/api/students/{id}/photo",
                post(student::upload_photo::<R>)
                    .patch(student::upload_photo::<R>)
                    .layer(DefaultBodyLimit::max(PHOTO_BODY_LIMIT)),
            )
            .route(
                "/api/students/{id}/branches",
                get(student::student_branches::<R>),
            )
            .route("/api/students/{id}/slots", get(student::student_slots::<R>))
            .route("/api/student/search", get(student::search_students::<R>))
            .route("/api/courses", get(catalog::list_courses::<R>))
            .route(
                "/api/courses/course/{id}/grades",
                get(catalog::grades_of_course::<R>),
            )
            .route("/api/courses/{id}/grade", post(student::assign_grade::<R>))
            .route(
                "/api/courses/student/{id}/grades",
                get(student::student_grades::<R>),
            )
    }

    fn schedule_routes() -> Router<Arc<AppState<R>>> {
        Router::new()
            .route("/api/slots/available", get(schedule::available_slots::<R>))
            .route(
                "/api/slots/{id}/book/{slot_id}",
                post(schedule::book_slot::<R>),
            )
            .route(
                "/api/schedule",
                post(schedule::create_schedule::<R>).get(schedule::list_schedule::<R>),
            )
            .route("/api/schedule/search", get(schedule::search_schedule::<R>))
            .route(
                "/api/schedule/{id}",
                get(schedule::get_schedule::<R>)
                    .patch(schedule::update_schedule::<R>)
                    .delete(schedule::delete_schedule::<R>),
            )
            .route("/api/master/courses", get(schedule::master_courses::<R>))
            .route("/api/master/grades", get(schedule::master_grades::<R>))
            .route("/api/master/days", get(schedule::slot_days::<R>))
            .route("/api/master/timeslots", get(schedule::time_points::<R>))
            .route("/api/master/lecturers", get(schedule::lecturers::<R>))
    }

    fn payment_routes() -> Router<Arc<AppState<R>>> {
        Router::new()
            .route(
                "/api/payment/{id}",
                get(payment::fee_quote::<R>).post(payment::create_payment::<R>),
            )
            .route("/api/fees/{id}", get(payment::next_month_fee::<R>))
            .route(
                "/api/payments/{id}/calculate",
                get(payment::pending_ledger::<R>),
            )
            .route(
                "/api/payment-history/search",
                get(payment::history_by_name::<R>),
            )
            .route(
                "/api/payment-history/{id}",
                get(payment::payment_history::<R>),
            )
            .route("/api/payments/search", get(payment::latest_by_name::<R>))
            .route(
                "/api/filterstatus/search",
                get(payment::filter_by_state::<R>),
            )
            .route("/api/searchmain", get(payment::search_main::<R>))
            .route("/api/payments", get(payment::all_payments::<R>))
            .route("/api/pending-payments", get(payment::pending_payments::<R>))
            .route("/api/paid-payments", get(payment::paid_payments::<R>))
            .route("/api/allpayments", get(payment::filtered_payments::<R>))
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
