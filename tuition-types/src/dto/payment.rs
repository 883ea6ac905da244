//! Payment, fee and history DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::billing::{FeeLine, FeeQuote, LatestState, PendingLedger};
use crate::domain::{
    Branch, Payment, PaymentId, PaymentStatus, StudentDetailsId, UserId, UserStatus,
};

/// Query value meaning "no filter" in listing endpoints.
pub const ALL_FILTER: &str = "All";

// ─────────────────────────────────────────────────────────────────────────────
// Billing snapshot (repository -> service)
// ─────────────────────────────────────────────────────────────────────────────

/// Raw billing inputs for one student as loaded from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingProfile {
    pub student_details_id: StudentDetailsId,
    pub user_id: UserId,
    pub full_name: String,
    pub status: UserStatus,
    /// Primary branch (first membership)
    pub branch: Option<Branch>,
    /// One line per enrolled grade, oldest assignment first
    pub fee_lines: Vec<FeeLine>,
    pub payments: Vec<Payment>,
    pub enrolled_on: Option<NaiveDate>,
    /// Admission fee configured for the branch, if any
    pub admission_fee: Option<i64>,
}

impl BillingProfile {
    /// Most recently assigned grade.
    pub fn latest_line(&self) -> Option<&FeeLine> {
        self.fee_lines.last()
    }

    pub fn branch_name(&self) -> Option<String> {
        self.branch.as_ref().map(|b| b.branch_name.clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fee DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to record a payment for the due month. The amount is always the
/// computed total, never supplied by the client.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    /// Defaults to today
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentCreated {
    pub payment: Payment,
    pub quote: FeeQuote,
}

/// Fee quote labelled with the student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StudentFeeQuote {
    pub student_details_id: StudentDetailsId,
    pub full_name: String,
    #[serde(flatten)]
    pub quote: FeeQuote,
}

/// Pending ledger labelled with the student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StudentLedger {
    pub student_details_id: StudentDetailsId,
    #[serde(flatten)]
    pub ledger: PendingLedger,
}

// ─────────────────────────────────────────────────────────────────────────────
// History DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct HistoryQuery {
    /// `paid` or `pending`, case-insensitive
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub branch: Option<String>,
    pub payment: i64,
    pub status: PaymentStatus,
}

/// Paid history plus generated pending months for one student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentHistory {
    pub student_details_id: StudentDetailsId,
    pub name: String,
    pub course: Option<String>,
    pub grade: Option<String>,
    pub paid_history: Vec<HistoryEntry>,
    pub pending_history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct NameQuery {
    #[serde(default)]
    pub name: Option<String>,
    /// Narrows the search to one student
    #[serde(default)]
    pub student_details_id: Option<StudentDetailsId>,
}

/// Stored payments of one student found by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StudentPayments {
    pub student_details_id: StudentDetailsId,
    pub name: String,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LatestPaymentQuery {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Most recent stored payment of a student found by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StudentLatestPayment {
    pub student_details_id: StudentDetailsId,
    pub name: String,
    pub latest_payment: Option<HistoryEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct FilterStatusQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Latest derived payment state of a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StudentState {
    pub student_details_id: StudentDetailsId,
    pub name: String,
    pub latest_payment: Option<LatestState>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Listing DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Filters applied to stored payments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentFilter {
    pub status: Option<PaymentStatus>,
    pub state: Option<UserStatus>,
    /// Substring of first name, last name, payment date or amount
    pub search: Option<String>,
}

/// Stored payment joined with its student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub student_details_id: StudentDetailsId,
    pub payment_date: NaiveDate,
    pub status: PaymentStatus,
    pub amount: i64,
    pub full_name: String,
    pub branch_name: Option<String>,
    pub state: UserStatus,
}

/// `state` and `status` accept `All` to disable the filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PaymentListQuery {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SearchMainQuery {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

/// Row of the combined search: a stored payment or a generated pending month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchRow {
    /// Payment id, or `pending-<student>-<YYYY-MM>` for generated rows
    pub id: String,
    pub student_details_id: StudentDetailsId,
    pub payment_date: NaiveDate,
    pub status: PaymentStatus,
    pub amount: i64,
    pub full_name: String,
    pub branch_name: Option<String>,
    pub state: UserStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_name: Option<String>,
}

impl From<PaymentRecord> for SearchRow {
    fn from(p: PaymentRecord) -> Self {
        Self {
            id: p.id.to_string(),
            student_details_id: p.student_details_id,
            payment_date: p.payment_date,
            status: p.status,
            amount: p.amount,
            full_name: p.full_name,
            branch_name: p.branch_name,
            state: p.state,
            course_name: None,
            grade_name: None,
        }
    }
}
