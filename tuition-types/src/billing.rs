//! Fee computation and pending-month reconstruction.
//!
//! Nothing here touches storage or the wall clock. The caller gathers a
//! [`BillingAccount`] (fee lines, payments, enrollment date, admission fee)
//! and passes in "today"; every figure is derived from that snapshot. No
//! calendar of obligations is ever persisted: a month is owed when no Paid
//! payment falls inside it and its due date has passed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use utoipa::ToSchema;

use crate::domain::{CourseId, GradeId, Payment, PaymentStatus, YearMonth};
use crate::error::DomainError;

/// Day of the month by which the monthly fee must be paid.
pub const DUE_DAY: u32 = 10;

/// Day used to date generated pending entries (the first overdue day).
pub const PENDING_ENTRY_DAY: u32 = DUE_DAY + 1;

/// Admission fee charged when a branch has none configured.
pub const DEFAULT_ADMISSION_FEE: i64 = 100_000;

/// Label reported as the last paid month for students who never paid.
pub const NEVER_PAID: &str = "Never";

/// A month is overdue once `today` is past its due day.
pub fn is_overdue(month: YearMonth, today: NaiveDate) -> bool {
    today > month.day(DUE_DAY)
}

// ─────────────────────────────────────────────────────────────────────────────
// Inputs
// ─────────────────────────────────────────────────────────────────────────────

/// One grade the student is enrolled in, priced at the student's branch.
///
/// A grade without a fee row at that branch carries a fee of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeeLine {
    pub grade_id: GradeId,
    pub grade_name: String,
    pub course_id: CourseId,
    pub course_name: String,
    #[schema(example = 250000)]
    pub fee: i64,
}

/// Everything billing needs to know about one student.
#[derive(Debug, Clone, Default)]
pub struct BillingAccount {
    pub fee_lines: Vec<FeeLine>,
    /// All stored payments of the student, any status
    pub payments: Vec<Payment>,
    /// Earliest grade assignment
    pub enrolled_on: Option<NaiveDate>,
    /// Admission fee of the student's branch (or the configured default)
    pub admission_fee: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Outputs
// ─────────────────────────────────────────────────────────────────────────────

/// Per-month fee breakdown: grade name -> course name -> fee.
pub type MonthBreakdown = BTreeMap<String, BTreeMap<String, i64>>;

/// What the student owes for the next unpaid month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FeeQuote {
    /// Month after the latest paid month, or the current month if never paid
    #[schema(value_type = String, example = "2025-07")]
    pub due_month: YearMonth,
    #[schema(value_type = String, example = "2025-08")]
    pub upcoming_month: YearMonth,
    /// `month -> grade -> course -> fee` for the due and upcoming months
    #[schema(value_type = Object)]
    pub breakdown: BTreeMap<YearMonth, MonthBreakdown>,
    pub monthly_fee: i64,
    /// Course fees charged now (zero when the due month is already paid)
    pub total_course_fees: i64,
    /// Admission fee charged now (zero once any payment is Paid)
    pub admission_fee: i64,
    pub total_fees: i64,
    #[schema(value_type = Vec<String>)]
    pub paid_months: Vec<YearMonth>,
    #[schema(value_type = Option<String>)]
    pub last_paid_month: Option<YearMonth>,
}

/// Reduced quote for the next month only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NextMonthFee {
    #[schema(value_type = String, example = "2025-07")]
    pub month: YearMonth,
    #[schema(example = "July 2025")]
    pub month_label: String,
    /// `July 2025`, or `Never`
    pub last_paid_month: String,
    pub fee_lines: Vec<FeeLine>,
    pub total_course_fees: i64,
    pub admission_fee: i64,
    pub total_fees: i64,
}

/// Status of one month in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum MonthStatus {
    Paid,
    Due,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LedgerMonth {
    #[schema(value_type = String, example = "2025-07")]
    pub month: YearMonth,
    /// e.g. `Jul 2025`
    pub label: String,
    pub status: MonthStatus,
}

/// Month-by-month paid/due picture from enrollment to the current month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PendingLedger {
    pub months: Vec<LedgerMonth>,
    pub pending_months: u32,
    pub monthly_fee: i64,
    pub pending_amount: i64,
    pub admission_fee: i64,
    pub total_due: i64,
    /// `July 2025`, or `Never`
    pub last_paid_month: String,
    /// Label of the month after the current one
    pub upcoming_month: String,
}

/// A month that is overdue and unpaid, synthesized for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PendingEntry {
    #[schema(value_type = String, example = "2025-06")]
    pub month: YearMonth,
    /// Dated the first overdue day of the month
    pub date: NaiveDate,
    pub amount: i64,
}

/// Latest payment state of a student for status filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LatestState {
    pub paydate: NaiveDate,
    pub amount: i64,
    pub status: PaymentStatus,
}

// ─────────────────────────────────────────────────────────────────────────────
// Computation
// ─────────────────────────────────────────────────────────────────────────────

impl BillingAccount {
    /// Sum of the fees of every enrolled grade.
    pub fn monthly_fee(&self) -> Result<i64, DomainError> {
        self.fee_lines
            .iter()
            .try_fold(0i64, |total, l| checked_add(total, l.fee))
    }

    fn paid(&self) -> impl Iterator<Item = &Payment> {
        self.payments.iter().filter(|p| p.is_paid())
    }

    /// Months covered by at least one Paid payment.
    pub fn paid_months(&self) -> BTreeSet<YearMonth> {
        self.paid()
            .map(|p| YearMonth::of(p.payment_date))
            .collect()
    }

    pub fn last_paid_month(&self) -> Option<YearMonth> {
        self.paid_months().last().copied()
    }

    pub fn has_paid(&self) -> bool {
        self.paid().next().is_some()
    }

    /// Admission fee still owed: only before the first Paid payment.
    pub fn admission_due(&self) -> i64 {
        if self.has_paid() { 0 } else { self.admission_fee }
    }

    /// The month the next payment is for.
    pub fn due_month(&self, today: NaiveDate) -> YearMonth {
        self.last_paid_month()
            .map(|m| m.next())
            .unwrap_or_else(|| YearMonth::of(today))
    }

    fn breakdown(&self) -> Result<MonthBreakdown, DomainError> {
        let mut by_grade = MonthBreakdown::new();
        for line in &self.fee_lines {
            let fee = by_grade
                .entry(line.grade_name.clone())
                .or_default()
                .entry(line.course_name.clone())
                .or_default();
            *fee = checked_add(*fee, line.fee)?;
        }
        Ok(by_grade)
    }

    /// Computes what is owed for the due month.
    ///
    /// Fails with [`DomainError::NoGrades`] when the student is not enrolled
    /// in any grade.
    pub fn quote(&self, today: NaiveDate) -> Result<FeeQuote, DomainError> {
        if self.fee_lines.is_empty() {
            return Err(DomainError::NoGrades);
        }

        let paid_months = self.paid_months();
        let due_month = self.due_month(today);
        let upcoming_month = due_month.next();
        let monthly_fee = self.monthly_fee()?;

        let month_breakdown = self.breakdown()?;
        let breakdown = [due_month, upcoming_month]
            .into_iter()
            .map(|m| (m, month_breakdown.clone()))
            .collect();

        let total_course_fees = if paid_months.contains(&due_month) {
            0
        } else {
            monthly_fee
        };
        let admission_fee = self.admission_due();

        Ok(FeeQuote {
            due_month,
            upcoming_month,
            breakdown,
            monthly_fee,
            total_course_fees,
            admission_fee,
            total_fees: checked_add(total_course_fees, admission_fee)?,
            last_paid_month: paid_months.last().copied(),
            paid_months: paid_months.into_iter().collect(),
        })
    }

    pub fn next_month_fee(&self, today: NaiveDate) -> Result<NextMonthFee, DomainError> {
        let quote = self.quote(today)?;
        Ok(NextMonthFee {
            month: quote.due_month,
            month_label: quote.due_month.label(),
            last_paid_month: last_paid_label(quote.last_paid_month),
            fee_lines: self.fee_lines.clone(),
            total_course_fees: quote.total_course_fees,
            admission_fee: quote.admission_fee,
            total_fees: quote.total_fees,
        })
    }

    /// First month the ledger covers: enrollment or first payment, whichever
    /// is earlier; the current month when neither is known.
    fn ledger_start(&self, today: NaiveDate) -> YearMonth {
        let enrolled = self.enrolled_on.map(YearMonth::of);
        let first_paid = self.paid_months().first().copied();
        match (enrolled, first_paid) {
            (Some(a), Some(b)) => a.min(b),
            (Some(m), None) | (None, Some(m)) => m,
            (None, None) => YearMonth::of(today),
        }
    }

    pub fn ledger(&self, today: NaiveDate) -> Result<PendingLedger, DomainError> {
        let paid_months = self.paid_months();
        let current = YearMonth::of(today);

        let months: Vec<LedgerMonth> = self
            .ledger_start(today)
            .through(current)
            .map(|month| {
                let status = if paid_months.contains(&month) {
                    MonthStatus::Paid
                } else if is_overdue(month, today) {
                    MonthStatus::Due
                } else {
                    MonthStatus::Upcoming
                };
                LedgerMonth {
                    month,
                    label: month.short_label(),
                    status,
                }
            })
            .collect();

        let pending_months = months
            .iter()
            .filter(|m| m.status == MonthStatus::Due)
            .count() as u32;
        let monthly_fee = self.monthly_fee()?;
        let pending_amount = monthly_fee
            .checked_mul(i64::from(pending_months))
            .ok_or(DomainError::AmountOverflow)?;
        let admission_fee = self.admission_due();

        Ok(PendingLedger {
            months,
            pending_months,
            monthly_fee,
            pending_amount,
            admission_fee,
            total_due: checked_add(pending_amount, admission_fee)?,
            last_paid_month: last_paid_label(paid_months.last().copied()),
            upcoming_month: current.next().label(),
        })
    }

    /// Overdue unpaid months after the latest payment (or since enrollment
    /// when never paid), up to the current month.
    pub fn pending_entries(&self, today: NaiveDate) -> Result<Vec<PendingEntry>, DomainError> {
        let paid_months = self.paid_months();
        let start = match paid_months.last() {
            Some(last) => last.next(),
            None => match self.enrolled_on {
                Some(date) => YearMonth::of(date),
                None => return Ok(Vec::new()),
            },
        };
        let monthly_fee = self.monthly_fee()?;

        Ok(start
            .through(YearMonth::of(today))
            .filter(|m| !paid_months.contains(m) && is_overdue(*m, today))
            .map(|month| PendingEntry {
                month,
                date: month.day(PENDING_ENTRY_DAY),
                amount: monthly_fee,
            })
            .collect())
    }
}

fn checked_add(a: i64, b: i64) -> Result<i64, DomainError> {
    a.checked_add(b).ok_or(DomainError::AmountOverflow)
}

fn last_paid_label(month: Option<YearMonth>) -> String {
    month
        .map(|m| m.label())
        .unwrap_or_else(|| NEVER_PAID.to_string())
}

/// Latest state of a student given their newest Paid and newest stored
/// Pending payment.
///
/// A Paid payment whose month is before the current month is reported as
/// pending for the current month. With a status filter, only a state with
/// that status is returned.
pub fn latest_state(
    latest_paid: Option<&Payment>,
    latest_pending: Option<&Payment>,
    filter: Option<PaymentStatus>,
    today: NaiveDate,
) -> Option<LatestState> {
    let current = YearMonth::of(today);

    let from_paid = |p: &Payment| {
        if YearMonth::of(p.payment_date) < current {
            LatestState {
                paydate: current.first_day(),
                amount: p.amount,
                status: PaymentStatus::Pending,
            }
        } else {
            LatestState {
                paydate: p.payment_date,
                amount: p.amount,
                status: PaymentStatus::Paid,
            }
        }
    };
    let from_pending = |p: &Payment| LatestState {
        paydate: p.payment_date,
        amount: p.amount,
        status: PaymentStatus::Pending,
    };

    let state = match filter {
        Some(PaymentStatus::Paid) => latest_paid.map(|p| LatestState {
            paydate: p.payment_date,
            amount: p.amount,
            status: PaymentStatus::Paid,
        }),
        Some(PaymentStatus::Pending) => latest_pending
            .map(from_pending)
            .or_else(|| latest_paid.map(from_paid)),
        None => match (latest_paid, latest_pending) {
            (Some(paid), Some(pending)) if paid.created_at >= pending.created_at => {
                Some(from_paid(paid))
            }
            (_, Some(pending)) => Some(from_pending(pending)),
            (Some(paid), None) => Some(from_paid(paid)),
            (None, None) => None,
        },
    };

    match filter {
        Some(wanted) => state.filter(|s| s.status == wanted),
        None => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PaymentId, StudentDetailsId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    fn line(grade: &str, course: &str, fee: i64) -> FeeLine {
        FeeLine {
            grade_id: GradeId::new(1),
            grade_name: grade.into(),
            course_id: CourseId::new(1),
            course_name: course.into(),
            fee,
        }
    }

    fn payment(id: i64, on: NaiveDate, status: PaymentStatus, amount: i64) -> Payment {
        let at = on.and_hms_opt(9, 0, 0).unwrap().and_utc();
        Payment {
            id: PaymentId::new(id),
            student_details_id: StudentDetailsId::new(1),
            payment_date: on,
            status,
            amount,
            created_at: at,
            updated_at: at,
        }
    }

    fn account(payments: Vec<Payment>) -> BillingAccount {
        BillingAccount {
            fee_lines: vec![line("Grade 6", "Maths", 3000), line("Grade 6", "Science", 2000)],
            payments,
            enrolled_on: Some(date(2025, 3, 4)),
            admission_fee: 1000,
        }
    }

    #[test]
    fn monthly_fee_sums_all_grades() {
        assert_eq!(account(vec![]).monthly_fee().unwrap(), 5000);
    }

    #[test]
    fn quote_for_new_student_charges_admission_and_current_month() {
        let quote = account(vec![]).quote(date(2025, 7, 5)).unwrap();
        assert_eq!(quote.due_month, month(2025, 7));
        assert_eq!(quote.upcoming_month, month(2025, 8));
        assert_eq!(quote.total_course_fees, 5000);
        assert_eq!(quote.admission_fee, 1000);
        assert_eq!(quote.total_fees, 6000);
        assert!(quote.last_paid_month.is_none());
        assert_eq!(quote.breakdown[&month(2025, 7)]["Grade 6"]["Science"], 2000);
    }

    #[test]
    fn quote_after_payment_moves_to_following_month() {
        let acct = account(vec![payment(1, date(2025, 6, 3), PaymentStatus::Paid, 6000)]);
        let quote = acct.quote(date(2025, 7, 20)).unwrap();
        assert_eq!(quote.due_month, month(2025, 7));
        assert_eq!(quote.admission_fee, 0);
        assert_eq!(quote.total_fees, 5000);
        assert_eq!(quote.paid_months, vec![month(2025, 6)]);
    }

    #[test]
    fn quote_tracks_year_boundaries() {
        let acct = account(vec![payment(1, date(2024, 12, 2), PaymentStatus::Paid, 5000)]);
        let quote = acct.quote(date(2025, 1, 3)).unwrap();
        assert_eq!(quote.due_month, month(2025, 1));
        assert_eq!(quote.upcoming_month, month(2025, 2));
    }

    #[test]
    fn pending_payments_do_not_count_as_paid() {
        let acct = account(vec![payment(1, date(2025, 6, 3), PaymentStatus::Pending, 5000)]);
        assert!(!acct.has_paid());
        assert_eq!(acct.admission_due(), 1000);
    }

    #[test]
    fn quote_without_grades_fails() {
        let acct = BillingAccount::default();
        assert!(matches!(
            acct.quote(date(2025, 7, 1)),
            Err(DomainError::NoGrades)
        ));
    }

    #[test]
    fn ungraded_fee_contributes_zero() {
        let mut acct = account(vec![]);
        acct.fee_lines = vec![line("Grade 7", "Art", 0)];
        let quote = acct.quote(date(2025, 7, 1)).unwrap();
        assert_eq!(quote.total_course_fees, 0);
        assert_eq!(quote.total_fees, 1000);
    }

    #[test]
    fn next_month_fee_reports_labels() {
        let acct = account(vec![payment(1, date(2025, 5, 9), PaymentStatus::Paid, 6000)]);
        let next = acct.next_month_fee(date(2025, 7, 1)).unwrap();
        assert_eq!(next.month_label, "June 2025");
        assert_eq!(next.last_paid_month, "May 2025");
        assert_eq!(next.total_fees, 5000);

        let fresh = account(vec![]).next_month_fee(date(2025, 7, 1)).unwrap();
        assert_eq!(fresh.last_paid_month, NEVER_PAID);
    }

    #[test]
    fn ledger_marks_paid_due_and_upcoming() {
        let acct = account(vec![
            payment(1, date(2025, 3, 5), PaymentStatus::Paid, 6000),
            payment(2, date(2025, 5, 8), PaymentStatus::Paid, 5000),
        ]);
        let ledger = acct.ledger(date(2025, 7, 9)).unwrap();

        let statuses: Vec<(String, MonthStatus)> = ledger
            .months
            .iter()
            .map(|m| (m.label.clone(), m.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("Mar 2025".to_string(), MonthStatus::Paid),
                ("Apr 2025".to_string(), MonthStatus::Due),
                ("May 2025".to_string(), MonthStatus::Paid),
                ("Jun 2025".to_string(), MonthStatus::Due),
                ("Jul 2025".to_string(), MonthStatus::Upcoming),
            ]
        );
        assert_eq!(ledger.pending_months, 2);
        assert_eq!(ledger.pending_amount, 10000);
        assert_eq!(ledger.admission_fee, 0);
        assert_eq!(ledger.total_due, 10000);
        assert_eq!(ledger.last_paid_month, "May 2025");
        assert_eq!(ledger.upcoming_month, "August 2025");
    }

    #[test]
    fn current_month_becomes_due_after_the_tenth() {
        let acct = account(vec![]);
        let before = acct.ledger(date(2025, 3, 10)).unwrap();
        assert_eq!(before.months.len(), 1);
        assert_eq!(before.months[0].status, MonthStatus::Upcoming);

        let after = acct.ledger(date(2025, 3, 11)).unwrap();
        assert_eq!(after.months[0].status, MonthStatus::Due);
        assert_eq!(after.total_due, 5000 + 1000);
        assert_eq!(after.last_paid_month, NEVER_PAID);
    }

    #[test]
    fn ledger_spans_years() {
        let mut acct = account(vec![]);
        acct.enrolled_on = Some(date(2024, 11, 20));
        let ledger = acct.ledger(date(2025, 2, 1)).unwrap();
        assert_eq!(ledger.months.len(), 4);
        assert_eq!(ledger.pending_months, 3);
    }

    #[test]
    fn ledger_starts_at_earlier_payment() {
        let mut acct = account(vec![payment(1, date(2025, 1, 2), PaymentStatus::Paid, 6000)]);
        acct.enrolled_on = Some(date(2025, 2, 1));
        let ledger = acct.ledger(date(2025, 2, 5)).unwrap();
        assert_eq!(ledger.months[0].month, month(2025, 1));
    }

    #[test]
    fn ledger_without_history_covers_current_month() {
        let mut acct = account(vec![]);
        acct.enrolled_on = None;
        let ledger = acct.ledger(date(2025, 9, 1)).unwrap();
        assert_eq!(ledger.months.len(), 1);
        assert_eq!(ledger.months[0].month, month(2025, 9));
    }

    #[test]
    fn pending_entries_after_last_payment() {
        let acct = account(vec![payment(1, date(2025, 4, 2), PaymentStatus::Paid, 6000)]);
        let entries = acct.pending_entries(date(2025, 7, 11)).unwrap();
        let dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            vec![date(2025, 5, 11), date(2025, 6, 11), date(2025, 7, 11)]
        );
        assert!(entries.iter().all(|e| e.amount == 5000));
    }

    #[test]
    fn pending_entries_skip_current_month_before_due_day() {
        let acct = account(vec![payment(1, date(2025, 6, 2), PaymentStatus::Paid, 6000)]);
        assert!(acct.pending_entries(date(2025, 7, 10)).unwrap().is_empty());
    }

    #[test]
    fn pending_entries_from_enrollment_when_never_paid() {
        let acct = account(vec![]);
        let entries = acct.pending_entries(date(2025, 4, 20)).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].month, month(2025, 3));

        let mut unenrolled = account(vec![]);
        unenrolled.enrolled_on = None;
        assert!(unenrolled.pending_entries(date(2025, 4, 20)).unwrap().is_empty());
    }

    #[test]
    fn oversized_fees_fail_instead_of_wrapping() {
        let huge = i64::MAX / 2 + 1;
        let mut acct = account(vec![]);
        acct.fee_lines = vec![line("Grade 6", "Maths", huge)];
        acct.admission_fee = huge;

        assert!(matches!(
            acct.quote(date(2025, 7, 1)),
            Err(DomainError::AmountOverflow)
        ));
        assert!(matches!(
            acct.ledger(date(2025, 7, 20)),
            Err(DomainError::AmountOverflow)
        ));
    }

    #[test]
    fn summed_grade_fees_overflow() {
        let mut acct = account(vec![]);
        acct.fee_lines = vec![
            line("Grade 6", "Maths", i64::MAX),
            line("Grade 7", "Maths", 1),
        ];
        assert!(matches!(acct.monthly_fee(), Err(DomainError::AmountOverflow)));
        assert!(acct.pending_entries(date(2025, 7, 20)).is_err());
    }

    #[test]
    fn pending_amount_overflow_is_reported() {
        let mut acct = account(vec![]);
        acct.fee_lines = vec![line("Grade 6", "Maths", i64::MAX / 2)];
        acct.admission_fee = 0;
        acct.enrolled_on = Some(date(2025, 1, 4));
        assert!(matches!(
            acct.ledger(date(2025, 7, 20)),
            Err(DomainError::AmountOverflow)
        ));
    }

    #[test]
    fn latest_state_reports_stale_payment_as_pending() {
        let paid = payment(1, date(2025, 5, 3), PaymentStatus::Paid, 5000);
        let state = latest_state(Some(&paid), None, None, date(2025, 7, 2)).unwrap();
        assert_eq!(state.status, PaymentStatus::Pending);
        assert_eq!(state.paydate, date(2025, 7, 1));
        assert_eq!(state.amount, 5000);
    }

    #[test]
    fn latest_state_current_payment_is_paid() {
        let paid = payment(1, date(2025, 7, 1), PaymentStatus::Paid, 5000);
        let state = latest_state(Some(&paid), None, None, date(2025, 7, 20)).unwrap();
        assert_eq!(state.status, PaymentStatus::Paid);
        assert_eq!(state.paydate, date(2025, 7, 1));
    }

    #[test]
    fn latest_state_prefers_newer_stored_pending() {
        let paid = payment(1, date(2025, 7, 1), PaymentStatus::Paid, 5000);
        let pending = payment(2, date(2025, 7, 5), PaymentStatus::Pending, 4000);
        let state = latest_state(Some(&paid), Some(&pending), None, date(2025, 7, 20)).unwrap();
        assert_eq!(state.status, PaymentStatus::Pending);
        assert_eq!(state.amount, 4000);
    }

    #[test]
    fn latest_state_filters() {
        let paid = payment(1, date(2025, 7, 1), PaymentStatus::Paid, 5000);
        let today = date(2025, 7, 20);
        assert!(latest_state(Some(&paid), None, Some(PaymentStatus::Pending), today).is_none());
        assert_eq!(
            latest_state(Some(&paid), None, Some(PaymentStatus::Paid), today)
                .unwrap()
                .status,
            PaymentStatus::Paid
        );
        assert!(latest_state(None, None, None, today).is_none());
    }
}
