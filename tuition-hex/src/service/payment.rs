//! Fee quotes, payment recording and pending-payment reconstruction.

use std::collections::HashSet;

use tuition_types::billing::latest_state;
use tuition_types::{
    AppError, BillingAccount, BillingProfile, CreatePaymentRequest, FilterStatusQuery,
    HistoryEntry, HistoryQuery, LatestPaymentQuery, NameQuery, NextMonthFee, PaymentCreated,
    PaymentFilter, PaymentHistory, PaymentListQuery, PaymentRecord, PaymentStatus, Repository,
    SearchMainQuery, SearchRow, StudentDetailsId, StudentFeeQuote, StudentLatestPayment,
    StudentLedger, StudentPayments, StudentState, UserStatus,
};

use super::{TuitionService, non_blank, not_found, parse_filter};

impl<R: Repository> TuitionService<R> {
    /// Loads a student's billing snapshot, `NotFound` for unknown students.
    async fn billing(
        &self,
        student: StudentDetailsId,
    ) -> Result<(BillingProfile, BillingAccount), AppError> {
        let profile = self
            .repo
            .billing_profile(student)
            .await?
            .ok_or_else(|| not_found(format!("Student {student}")))?;
        let account = self.account_of(&profile);
        Ok((profile, account))
    }

    fn account_of(&self, profile: &BillingProfile) -> BillingAccount {
        BillingAccount {
            fee_lines: profile.fee_lines.clone(),
            payments: profile.payments.clone(),
            enrolled_on: profile.enrolled_on,
            admission_fee: profile
                .admission_fee
                .unwrap_or(self.default_admission_fee),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Fees
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn fee_quote(&self, student: StudentDetailsId) -> Result<StudentFeeQuote, AppError> {
        let (profile, account) = self.billing(student).await?;
        let quote = account.quote(self.today())?;
        Ok(StudentFeeQuote {
            student_details_id: student,
            full_name: profile.full_name,
            quote,
        })
    }

    pub async fn next_month_fee(&self, student: StudentDetailsId) -> Result<NextMonthFee, AppError> {
        let (_, account) = self.billing(student).await?;
        account.next_month_fee(self.today()).map_err(Into::into)
    }

    /// Records a Paid payment of the computed total for the due month.
    pub async fn create_payment(
        &self,
        student: StudentDetailsId,
        req: CreatePaymentRequest,
    ) -> Result<PaymentCreated, AppError> {
        let today = self.today();
        let (_, account) = self.billing(student).await?;
        let quote = account.quote(today)?;

        let payment = self
            .repo
            .record_payment(
                student,
                req.payment_date.unwrap_or(today),
                PaymentStatus::Paid,
                quote.total_fees,
            )
            .await?;

        tracing::info!(
            student_details_id = %student,
            due_month = %quote.due_month,
            total = quote.total_fees,
            "monthly fee paid"
        );
        Ok(PaymentCreated { payment, quote })
    }

    pub async fn pending_ledger(&self, student: StudentDetailsId) -> Result<StudentLedger, AppError> {
        let (_, account) = self.billing(student).await?;
        Ok(StudentLedger {
            student_details_id: student,
            ledger: account.ledger(self.today())?,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // History
    // ─────────────────────────────────────────────────────────────────────────────

    /// Paid entries plus one generated pending entry per overdue unpaid month.
    pub async fn payment_history(
        &self,
        student: StudentDetailsId,
        query: HistoryQuery,
    ) -> Result<PaymentHistory, AppError> {
        let filter: Option<PaymentStatus> = parse_filter(query.status.as_deref())?;
        let (profile, account) = self.billing(student).await?;
        let branch = profile.branch_name();

        let paid_history = if filter != Some(PaymentStatus::Pending) {
            let mut paid: Vec<_> = account
                .payments
                .iter()
                .filter(|p| p.is_paid())
                .map(|p| HistoryEntry {
                    date: p.payment_date,
                    branch: branch.clone(),
                    payment: p.amount,
                    status: PaymentStatus::Paid,
                })
                .collect();
            paid.sort_by(|a, b| b.date.cmp(&a.date));
            paid
        } else {
            Vec::new()
        };

        let pending_history = if filter != Some(PaymentStatus::Paid) {
            account
                .pending_entries(self.today())?
                .into_iter()
                .map(|e| HistoryEntry {
                    date: e.date,
                    branch: branch.clone(),
                    payment: e.amount,
                    status: PaymentStatus::Pending,
                })
                .collect()
        } else {
            Vec::new()
        };

        let latest = profile.latest_line();
        Ok(PaymentHistory {
            student_details_id: student,
            name: profile.full_name.clone(),
            course: latest.map(|l| l.course_name.clone()),
            grade: latest.map(|l| l.grade_name.clone()),
            paid_history,
            pending_history,
        })
    }

    /// Stored payments of every student matching the name.
    pub async fn history_by_name(&self, query: NameQuery) -> Result<Vec<StudentPayments>, AppError> {
        let students = self
            .repo
            .students_by_name(non_blank(query.name.as_deref()), query.student_details_id)
            .await?;

        let mut out = Vec::with_capacity(students.len());
        for student in students {
            let history = self
                .repo
                .payments_of(student.student_details_id)
                .await?
                .into_iter()
                .map(|p| HistoryEntry {
                    date: p.payment_date,
                    branch: student.branch_name.clone(),
                    payment: p.amount,
                    status: p.status,
                })
                .collect();
            out.push(StudentPayments {
                student_details_id: student.student_details_id,
                name: student.full_name,
                history,
            });
        }
        Ok(out)
    }

    /// Newest stored payment per matching student, optionally of one status.
    pub async fn latest_by_name(
        &self,
        query: LatestPaymentQuery,
    ) -> Result<Vec<StudentLatestPayment>, AppError> {
        let status: Option<PaymentStatus> = parse_filter(query.status.as_deref())?;
        let students = self
            .repo
            .students_by_name(non_blank(query.name.as_deref()), None)
            .await?;

        let mut out = Vec::with_capacity(students.len());
        for student in students {
            let latest = self
                .repo
                .latest_payment(student.student_details_id, status)
                .await?;
            out.push(StudentLatestPayment {
                student_details_id: student.student_details_id,
                name: student.full_name,
                latest_payment: latest.map(|p| HistoryEntry {
                    date: p.payment_date,
                    branch: student.branch_name.clone(),
                    payment: p.amount,
                    status: p.status,
                }),
            });
        }
        Ok(out)
    }

    /// Derived latest state per student; with a status filter, students in
    /// another state are dropped.
    pub async fn filter_by_state(
        &self,
        query: FilterStatusQuery,
    ) -> Result<Vec<StudentState>, AppError> {
        let status: Option<PaymentStatus> = parse_filter(query.status.as_deref())?;
        let today = self.today();
        let students = self
            .repo
            .students_by_name(non_blank(query.name.as_deref()), None)
            .await?;

        let mut out = Vec::new();
        for student in students {
            let sid = student.student_details_id;
            let paid = self
                .repo
                .latest_payment(sid, Some(PaymentStatus::Paid))
                .await?;
            let pending = self
                .repo
                .latest_payment(sid, Some(PaymentStatus::Pending))
                .await?;

            let state = latest_state(paid.as_ref(), pending.as_ref(), status, today);
            if status.is_some() && state.is_none() {
                continue;
            }
            out.push(StudentState {
                student_details_id: sid,
                name: student.full_name,
                latest_payment: state,
            });
        }
        Ok(out)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Listings
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn list_payments(&self, filter: PaymentFilter) -> Result<Vec<PaymentRecord>, AppError> {
        self.repo.list_payments(filter).await.map_err(Into::into)
    }

    /// Stored payments filtered by student state and payment status (`All`
    /// disables either filter).
    pub async fn filtered_payments(
        &self,
        query: PaymentListQuery,
    ) -> Result<Vec<PaymentRecord>, AppError> {
        let filter = PaymentFilter {
            status: parse_filter(query.status.as_deref())?,
            state: parse_filter(query.state.as_deref())?,
            search: None,
        };
        self.list_payments(filter).await
    }

    /// Stored payments plus generated pending months of active students.
    pub async fn search_main(&self, query: SearchMainQuery) -> Result<Vec<SearchRow>, AppError> {
        let status: Option<PaymentStatus> = parse_filter(query.status.as_deref())?;
        let state: Option<UserStatus> = parse_filter(query.state.as_deref())?;
        let today = self.today();

        let stored = self
            .repo
            .list_payments(PaymentFilter {
                status: None,
                state,
                search: non_blank(query.search.as_deref()).map(str::to_string),
            })
            .await?;

        let mut seen = HashSet::new();
        let students: Vec<_> = stored
            .iter()
            .filter(|r| r.state == UserStatus::Active)
            .map(|r| r.student_details_id)
            .filter(|sid| seen.insert(*sid))
            .collect();

        let mut rows: Vec<SearchRow> = stored.into_iter().map(SearchRow::from).collect();

        for sid in students {
            let Some(profile) = self.repo.billing_profile(sid).await? else {
                continue;
            };
            let account = self.account_of(&profile);
            let latest = profile.latest_line();
            for entry in account.pending_entries(today)? {
                rows.push(SearchRow {
                    id: format!("pending-{sid}-{}", entry.month),
                    student_details_id: sid,
                    payment_date: entry.date,
                    status: PaymentStatus::Pending,
                    amount: entry.amount,
                    full_name: profile.full_name.clone(),
                    branch_name: profile.branch_name(),
                    state: profile.status,
                    course_name: latest.map(|l| l.course_name.clone()),
                    grade_name: latest.map(|l| l.grade_name.clone()),
                });
            }
        }

        if let Some(wanted) = status {
            rows.retain(|r| r.status == wanted);
        }
        Ok(rows)
    }
}
