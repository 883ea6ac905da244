//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use tuition_types::billing::{
    FeeLine, FeeQuote, LatestState, LedgerMonth, MonthStatus, NextMonthFee, PendingLedger,
};
use tuition_types::domain::{
    AdmissionFee, Booking, Branch, BranchId, Course, CourseId, CurrencyCode, Day, Grade,
    GradeFee, GradeFeeId, GradeId, Payment, PaymentId, PaymentStatus, RecordStatus, Role, Slot,
    SlotId, StudentDetails, StudentDetailsId, User, UserId, UserStatus,
};
use tuition_types::dto::*;
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog
// ─────────────────────────────────────────────────────────────────────────────

/// Create a branch
#[utoipa::path(
    post,
    path = "/api/branch",
    tag = "catalog",
    request_body = CreateBranchRequest,
    responses(
        (status = 201, description = "Branch created", body = Branch),
        (status = 400, description = "Invalid request")
    )
)]
async fn create_branch() {}

/// List branches
#[utoipa::path(
    get,
    path = "/api/branches",
    tag = "catalog",
    responses((status = 200, description = "All branches", body = Vec<Branch>))
)]
async fn list_branches() {}

/// Delete a branch
#[utoipa::path(
    delete,
    path = "/api/branch/{id}",
    tag = "catalog",
    params(("id" = BranchId, Path, description = "Branch ID")),
    responses(
        (status = 204, description = "Branch deleted"),
        (status = 404, description = "Branch not found"),
        (status = 409, description = "Branch still referenced by grade fees")
    )
)]
async fn delete_branch() {}

/// Set the admission fee of a branch
#[utoipa::path(
    put,
    path = "/api/branch/{id}/admission-fee",
    tag = "catalog",
    params(("id" = BranchId, Path, description = "Branch ID")),
    request_body = SetAdmissionFeeRequest,
    responses(
        (status = 200, description = "Admission fee stored", body = AdmissionFee),
        (status = 404, description = "Branch not found")
    )
)]
async fn set_admission_fee() {}

/// Create a course with nested grades and fees
#[utoipa::path(
    post,
    path = "/api/course",
    tag = "catalog",
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created (or extended)", body = CourseDetail),
        (status = 400, description = "Unknown branch or invalid fee")
    )
)]
async fn create_course() {}

/// Get a course with grades and fees
#[utoipa::path(
    get,
    path = "/api/course/{id}",
    tag = "catalog",
    params(("id" = CourseId, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course details", body = CourseDetail),
        (status = 404, description = "Course not found")
    )
)]
async fn get_course() {}

/// Update a course and its grades
#[utoipa::path(
    patch,
    path = "/api/course/{id}",
    tag = "catalog",
    params(("id" = CourseId, Path, description = "Course ID")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Course updated", body = CourseDetail),
        (status = 409, description = "Course code taken")
    )
)]
async fn update_course() {}

/// Search courses by code or name
#[utoipa::path(
    get,
    path = "/api/course/search",
    tag = "catalog",
    params(("query" = String, Query, description = "Substring of code or name")),
    responses((status = 200, description = "Matching courses", body = Vec<Course>))
)]
async fn search_courses() {}

/// Bulk-create grades for a course
#[utoipa::path(
    post,
    path = "/api/grade/course/{id}",
    tag = "catalog",
    params(("id" = CourseId, Path, description = "Course ID")),
    request_body = CreateGradesRequest,
    responses(
        (status = 201, description = "Grades created", body = Vec<GradeDetail>),
        (status = 400, description = "Unknown branch IDs")
    )
)]
async fn create_grades_for_course() {}

/// Create a grade fee
#[utoipa::path(
    post,
    path = "/api/grade-fee",
    tag = "catalog",
    request_body = CreateGradeFeeRequest,
    responses(
        (status = 201, description = "Grade fee created", body = GradeFee),
        (status = 400, description = "Grade or branch not found")
    )
)]
async fn create_grade_fee() {}

/// Delete a grade fee
#[utoipa::path(
    delete,
    path = "/api/grade-fee/{id}",
    tag = "catalog",
    params(("id" = GradeFeeId, Path, description = "Grade fee ID")),
    responses(
        (status = 200, description = "Grade fee deleted", body = GradeFeeDeleted),
        (status = 404, description = "Grade fee not found")
    )
)]
async fn delete_grade_fee() {}

// ─────────────────────────────────────────────────────────────────────────────
// Students
// ─────────────────────────────────────────────────────────────────────────────

/// Create a user
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "students",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 409, description = "Username, email or phone taken")
    )
)]
async fn create_user() {}

/// Register a student
#[utoipa::path(
    post,
    path = "/api/students/finalize",
    tag = "students",
    request_body = FinalizeRegistrationRequest,
    responses(
        (status = 201, description = "Student registered", body = StudentProfile),
        (status = 400, description = "Unknown grade, slot or branch, or slot full"),
        (status = 409, description = "Duplicate user")
    )
)]
async fn finalize_registration() {}

/// Student profile
#[utoipa::path(
    get,
    path = "/api/students/{id}/profile",
    tag = "students",
    params(("id" = UserId, Path, description = "User ID of the student")),
    responses(
        (status = 200, description = "Profile", body = StudentProfile),
        (status = 404, description = "Student not found")
    )
)]
async fn student_profile() {}

/// Upload a student photo (multipart field `photo`)
#[utoipa::path(
    post,
    path = "/api/students/{id}/photo",
    tag = "students",
    params(("id" = UserId, Path, description = "User ID of the student")),
    responses(
        (status = 200, description = "Photo stored", body = PhotoUploaded),
        (status = 400, description = "Missing file, wrong type or too large")
    )
)]
async fn upload_photo() {}

/// Search students by number or name
#[utoipa::path(
    get,
    path = "/api/student/search",
    tag = "students",
    params(
        ("student_no" = Option<String>, Query, description = "Student number substring"),
        ("name" = Option<String>, Query, description = "First or last name substring")
    ),
    responses(
        (status = 200, description = "Matching students", body = Vec<StudentSummary>),
        (status = 400, description = "No filter given")
    )
)]
async fn search_students() {}

// ─────────────────────────────────────────────────────────────────────────────
// Schedule
// ─────────────────────────────────────────────────────────────────────────────

/// Slots with free seats
#[utoipa::path(
    get,
    path = "/api/slots/available",
    tag = "schedule",
    params(
        ("branch_id" = BranchId, Query, description = "Branch ID"),
        ("course_id" = CourseId, Query, description = "Course ID"),
        ("grade_id" = GradeId, Query, description = "Grade ID")
    ),
    responses(
        (status = 200, description = "Available slots", body = Vec<AvailableSlot>),
        (status = 400, description = "Missing query parameter")
    )
)]
async fn available_slots() {}

/// Book a slot for a student
#[utoipa::path(
    post,
    path = "/api/slots/{id}/book/{slot_id}",
    tag = "schedule",
    params(
        ("id" = UserId, Path, description = "User ID of the student"),
        ("slot_id" = SlotId, Path, description = "Slot ID")
    ),
    responses(
        (status = 201, description = "Booked", body = Booking),
        (status = 400, description = "Slot full or unknown"),
        (status = 409, description = "Already booked")
    )
)]
async fn book_slot() {}

/// Create teacher slots on several days
#[utoipa::path(
    post,
    path = "/api/schedule",
    tag = "schedule",
    request_body = CreateScheduleRequest,
    responses(
        (status = 201, description = "Slots created", body = CreateScheduleResult),
        (status = 400, description = "Day full or invalid times"),
        (status = 404, description = "Teacher not found")
    )
)]
async fn create_schedule() {}

/// Paginated schedule
#[utoipa::path(
    get,
    path = "/api/schedule",
    tag = "schedule",
    params(
        ("page" = Option<u32>, Query, description = "Page, from 1"),
        ("limit" = Option<u32>, Query, description = "Page size, default 30"),
        ("course_id" = Option<CourseId>, Query, description = "Course filter")
    ),
    responses((status = 200, description = "Schedule page", body = SchedulePage))
)]
async fn list_schedule() {}

/// Distinct slot times
#[utoipa::path(
    get,
    path = "/api/master/timeslots",
    tag = "schedule",
    params(("type" = Option<TimeKind>, Query, description = "start, end or both")),
    responses((status = 200, description = "Time points", body = Vec<TimePoint>))
)]
async fn time_points() {}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

/// Fee quote for the due and upcoming months
#[utoipa::path(
    get,
    path = "/api/payment/{id}",
    tag = "payments",
    params(("id" = StudentDetailsId, Path, description = "Student details ID")),
    responses(
        (status = 200, description = "Quote", body = StudentFeeQuote),
        (status = 404, description = "Student not found or has no grades")
    )
)]
async fn fee_quote() {}

/// Record a payment of the quoted total
#[utoipa::path(
    post,
    path = "/api/payment/{id}",
    tag = "payments",
    params(("id" = StudentDetailsId, Path, description = "Student details ID")),
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = PaymentCreated),
        (status = 404, description = "Student not found or has no grades")
    )
)]
async fn create_payment() {}

/// Fee for the next unpaid month
#[utoipa::path(
    get,
    path = "/api/fees/{id}",
    tag = "payments",
    params(("id" = StudentDetailsId, Path, description = "Student details ID")),
    responses((status = 200, description = "Next month fee", body = NextMonthFee))
)]
async fn next_month_fee() {}

/// Pending months ledger
#[utoipa::path(
    get,
    path = "/api/payments/{id}/calculate",
    tag = "payments",
    params(("id" = StudentDetailsId, Path, description = "Student details ID")),
    responses((status = 200, description = "Ledger", body = StudentLedger))
)]
async fn pending_ledger() {}

/// Paid and pending history
#[utoipa::path(
    get,
    path = "/api/payment-history/{id}",
    tag = "payments",
    params(
        ("id" = StudentDetailsId, Path, description = "Student details ID"),
        ("status" = Option<String>, Query, description = "paid or pending")
    ),
    responses(
        (status = 200, description = "History", body = PaymentHistory),
        (status = 400, description = "Unknown status")
    )
)]
async fn payment_history() {}

/// Latest derived state per student
#[utoipa::path(
    get,
    path = "/api/filterstatus/search",
    tag = "payments",
    params(
        ("status" = Option<String>, Query, description = "Paid, Pending or All"),
        ("name" = Option<String>, Query, description = "Name substring")
    ),
    responses((status = 200, description = "States", body = Vec<StudentState>))
)]
async fn filter_by_state() {}

/// Stored and generated payments
#[utoipa::path(
    get,
    path = "/api/searchmain",
    tag = "payments",
    params(
        ("state" = Option<String>, Query, description = "Student state or All"),
        ("status" = Option<String>, Query, description = "Payment status or All"),
        ("search" = Option<String>, Query, description = "Name, date or amount substring")
    ),
    responses((status = 200, description = "Rows", body = Vec<SearchRow>))
)]
async fn search_main() {}

/// Stored payments filtered by state and status
#[utoipa::path(
    get,
    path = "/api/allpayments",
    tag = "payments",
    params(
        ("state" = Option<String>, Query, description = "Student state or All"),
        ("status" = Option<String>, Query, description = "Payment status or All")
    ),
    responses((status = 200, description = "Payments", body = Vec<PaymentRecord>))
)]
async fn filtered_payments() {}

/// OpenAPI documentation for the tuition center API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tuition Center Administration API",
        version = "1.0.0",
        description = "Branches, courses, grades and fees, student enrollment, slot scheduling and payment tracking.\n\nMonetary values are integers in the smallest unit of the branch currency. Monthly fees fall due on the 10th.",
        license(name = "MIT"),
    ),
    paths(
        health,
        create_branch,
        list_branches,
        delete_branch,
        set_admission_fee,
        create_course,
        get_course,
        update_course,
        search_courses,
        create_grades_for_course,
        create_grade_fee,
        delete_grade_fee,
        create_user,
        finalize_registration,
        student_profile,
        upload_photo,
        search_students,
        available_slots,
        book_slot,
        create_schedule,
        list_schedule,
        time_points,
        fee_quote,
        create_payment,
        next_month_fee,
        pending_ledger,
        payment_history,
        filter_by_state,
        search_main,
        filtered_payments,
    ),
    components(
        schemas(
            Branch,
            AdmissionFee,
            Course,
            Grade,
            GradeFee,
            CurrencyCode,
            RecordStatus,
            Role,
            UserStatus,
            User,
            StudentDetails,
            Slot,
            Booking,
            Day,
            Payment,
            PaymentStatus,
            BranchId,
            CourseId,
            GradeId,
            GradeFeeId,
            UserId,
            StudentDetailsId,
            SlotId,
            PaymentId,
            CreateBranchRequest,
            UpdateBranchRequest,
            SetAdmissionFeeRequest,
            CreateCourseRequest,
            UpdateCourseRequest,
            CourseDetail,
            GradeDetail,
            GradeFeeDetail,
            GradeWithCourse,
            CreateGradeFeeRequest,
            GradeFeeView,
            GradeFeeDeleted,
            CreateUserRequest,
            UpdateUserRequest,
            FinalizeRegistrationRequest,
            UpdateStudentRequest,
            StudentProfile,
            StudentGrade,
            StudentSummary,
            PhotoUploaded,
            AvailableSlot,
            CreateScheduleRequest,
            CreateScheduleResult,
            ScheduleEntry,
            SchedulePage,
            TimePoint,
            Lecturer,
            FeeLine,
            FeeQuote,
            NextMonthFee,
            MonthStatus,
            LedgerMonth,
            PendingLedger,
            LatestState,
            StudentFeeQuote,
            StudentLedger,
            PaymentCreated,
            PaymentHistory,
            HistoryEntry,
            StudentState,
            PaymentRecord,
            SearchRow,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Branches, courses, grades and grade fees"),
        (name = "students", description = "Users, registration and enrollment"),
        (name = "schedule", description = "Slots, booking and master data"),
        (name = "payments", description = "Fee quotes, payments and pending months"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_payment_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/payment/{id}"));
        assert!(doc.paths.paths.contains_key("/api/searchmain"));
    }
}
