//! # Tuition Client SDK
//!
//! A typed Rust client for the tuition center API.

use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

use tuition_types::{
    AvailableSlot, Booking, Branch, BranchId, CourseDetail, CourseId, CreateBranchRequest,
    CreateCourseRequest, CreatePaymentRequest, CreateScheduleRequest, CreateScheduleResult,
    FinalizeRegistrationRequest, GradeId, NextMonthFee, PaymentCreated, PaymentHistory,
    PaymentRecord, PhotoUploaded, SchedulePage, SearchRow, SlotId, StudentDetailsId,
    StudentFeeQuote, StudentLedger, StudentProfile, StudentSummary, UserId,
};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Which stored payments to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentListing {
    All,
    Pending,
    Paid,
}

impl PaymentListing {
    fn path(self) -> &'static str {
        match self {
            PaymentListing::All => "/api/payments",
            PaymentListing::Pending => "/api/pending-payments",
            PaymentListing::Paid => "/api/paid-payments",
        }
    }
}

/// Tuition center API client.
pub struct TuitionClient {
    base_url: String,
    http: Client,
}

impl TuitionClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    // ── Catalog ─────────────────────────────────────────────────────────────

    pub async fn create_branch(&self, req: &CreateBranchRequest) -> Result<Branch, ClientError> {
        self.send(self.request(Method::POST, "/api/branch").json(req))
            .await
    }

    pub async fn list_branches(&self) -> Result<Vec<Branch>, ClientError> {
        self.get("/api/branches").await
    }

    pub async fn create_course(
        &self,
        req: &CreateCourseRequest,
    ) -> Result<CourseDetail, ClientError> {
        self.send(self.request(Method::POST, "/api/course").json(req))
            .await
    }

    pub async fn list_courses(&self) -> Result<Vec<CourseDetail>, ClientError> {
        self.get("/api/course").await
    }

    // ── Students ────────────────────────────────────────────────────────────

    /// Registers a student with grades, slots and branches.
    pub async fn register_student(
        &self,
        req: &FinalizeRegistrationRequest,
    ) -> Result<StudentProfile, ClientError> {
        self.send(self.request(Method::POST, "/api/students/finalize").json(req))
            .await
    }

    pub async fn student_profile(&self, user: UserId) -> Result<StudentProfile, ClientError> {
        self.get(&format!("/api/students/{user}/profile")).await
    }

    pub async fn list_students(&self) -> Result<Vec<StudentSummary>, ClientError> {
        self.get("/api/students").await
    }

    pub async fn search_students(
        &self,
        student_no: Option<&str>,
        name: Option<&str>,
    ) -> Result<Vec<StudentSummary>, ClientError> {
        let mut query = Vec::new();
        if let Some(no) = student_no {
            query.push(("student_no", no));
        }
        if let Some(name) = name {
            query.push(("name", name));
        }
        self.send(self.request(Method::GET, "/api/student/search").query(&query))
            .await
    }

    /// Uploads a student photo. The file name decides the accepted type.
    pub async fn upload_photo(
        &self,
        user: UserId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<PhotoUploaded, ClientError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("photo", part);
        self.send(
            self.request(Method::POST, &format!("/api/students/{user}/photo"))
                .multipart(form),
        )
        .await
    }

    /// Reads a photo from disk and uploads it.
    pub async fn upload_photo_file(
        &self,
        user: UserId,
        path: &std::path::Path,
    ) -> Result<PhotoUploaded, ClientError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        self.upload_photo(user, file_name, bytes).await
    }

    // ── Schedule ────────────────────────────────────────────────────────────

    pub async fn create_schedule(
        &self,
        req: &CreateScheduleRequest,
    ) -> Result<CreateScheduleResult, ClientError> {
        self.send(self.request(Method::POST, "/api/schedule").json(req))
            .await
    }

    pub async fn list_schedule(&self, page: u32, limit: u32) -> Result<SchedulePage, ClientError> {
        self.send(
            self.request(Method::GET, "/api/schedule")
                .query(&[("page", page), ("limit", limit)]),
        )
        .await
    }

    pub async fn available_slots(
        &self,
        branch: BranchId,
        course: CourseId,
        grade: GradeId,
    ) -> Result<Vec<AvailableSlot>, ClientError> {
        self.send(self.request(Method::GET, "/api/slots/available").query(&[
            ("branch_id", branch.get()),
            ("course_id", course.get()),
            ("grade_id", grade.get()),
        ]))
        .await
    }

    pub async fn book_slot(&self, student: UserId, slot: SlotId) -> Result<Booking, ClientError> {
        self.send(self.request(Method::POST, &format!("/api/slots/{student}/book/{slot}")))
            .await
    }

    // ── Payments ────────────────────────────────────────────────────────────

    pub async fn fee_quote(&self, student: StudentDetailsId) -> Result<StudentFeeQuote, ClientError> {
        self.get(&format!("/api/payment/{student}")).await
    }

    pub async fn next_month_fee(
        &self,
        student: StudentDetailsId,
    ) -> Result<NextMonthFee, ClientError> {
        self.get(&format!("/api/fees/{student}")).await
    }

    /// Records a payment of the quoted total, dated `payment_date` or today.
    pub async fn pay(
        &self,
        student: StudentDetailsId,
        payment_date: Option<NaiveDate>,
    ) -> Result<PaymentCreated, ClientError> {
        let req = CreatePaymentRequest { payment_date };
        self.send(
            self.request(Method::POST, &format!("/api/payment/{student}"))
                .json(&req),
        )
        .await
    }

    pub async fn pending_ledger(
        &self,
        student: StudentDetailsId,
    ) -> Result<StudentLedger, ClientError> {
        self.get(&format!("/api/payments/{student}/calculate")).await
    }

    /// Paid and generated pending history, optionally `paid` or `pending` only.
    pub async fn payment_history(
        &self,
        student: StudentDetailsId,
        status: Option<&str>,
    ) -> Result<PaymentHistory, ClientError> {
        let mut req = self.request(Method::GET, &format!("/api/payment-history/{student}"));
        if let Some(status) = status {
            req = req.query(&[("status", status)]);
        }
        self.send(req).await
    }

    pub async fn list_payments(
        &self,
        listing: PaymentListing,
    ) -> Result<Vec<PaymentRecord>, ClientError> {
        self.get(listing.path()).await
    }

    pub async fn search_main(
        &self,
        state: Option<&str>,
        status: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<SearchRow>, ClientError> {
        let query: Vec<(&str, &str)> = [("state", state), ("status", status), ("search", search)]
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect();
        self.send(self.request(Method::GET, "/api/searchmain").query(&query))
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.request(Method::GET, path)).await
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = TuitionClient::new("http://localhost:5000");
        assert_eq!(client.base_url, "http://localhost:5000");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = TuitionClient::new("http://localhost:5000/");
        assert_eq!(client.base_url, "http://localhost:5000");
    }

    #[test]
    fn test_listing_paths() {
        assert_eq!(PaymentListing::Pending.path(), "/api/pending-payments");
        assert_eq!(PaymentListing::Paid.path(), "/api/paid-payments");
    }
}
