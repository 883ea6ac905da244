//! Payment port.

use chrono::NaiveDate;

use crate::domain::{Payment, PaymentStatus, StudentDetailsId};
use crate::dto::{BillingProfile, PaymentFilter, PaymentRecord, StudentSummary};
use crate::error::RepoError;

#[async_trait::async_trait]
pub trait PaymentRepository: Send + Sync + 'static {
    /// Loads everything needed to bill a student, `None` if unknown.
    async fn billing_profile(
        &self,
        student: StudentDetailsId,
    ) -> Result<Option<BillingProfile>, RepoError>;

    async fn record_payment(
        &self,
        student: StudentDetailsId,
        payment_date: NaiveDate,
        status: PaymentStatus,
        amount: i64,
    ) -> Result<Payment, RepoError>;

    /// Newest payment date first.
    async fn payments_of(&self, student: StudentDetailsId) -> Result<Vec<Payment>, RepoError>;

    /// Newest payment of the student, optionally restricted to a status.
    async fn latest_payment(
        &self,
        student: StudentDetailsId,
        status: Option<PaymentStatus>,
    ) -> Result<Option<Payment>, RepoError>;

    async fn list_payments(&self, filter: PaymentFilter) -> Result<Vec<PaymentRecord>, RepoError>;

    /// Students whose first or last name contains `name` (all when `None`).
    async fn students_by_name(
        &self,
        name: Option<&str>,
        student: Option<StudentDetailsId>,
    ) -> Result<Vec<StudentSummary>, RepoError>;
}
