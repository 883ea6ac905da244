//! TuitionService tests against an in-memory SQLite store.

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{Datelike, Months, NaiveDate, Utc};

    use tuition_repo::SqliteRepo;
    use tuition_types::{
        AppError, AvailableSlotsQuery, BranchId, CreateBranchRequest, CreateCourseRequest,
        CreateGradeFeeRequest, CreatePaymentRequest, CreateScheduleRequest, CreateUserRequest,
        CurrencyCode, FilterStatusQuery, FinalizeRegistrationRequest, FixedClock, GradeId,
        HistoryQuery, MonthStatus, NewGrade, NewGradeFee, PaymentRepository, PaymentStatus, Role,
        SearchMainQuery, SetAdmissionFeeRequest, StudentDetailsId, StudentSearchQuery, YearMonth,
    };

    use crate::TuitionService;

    const FEE: i64 = 2500;
    const ADMISSION: i64 = 5000;

    /// The 5th of the current month: the current month is not yet overdue.
    fn today() -> NaiveDate {
        let now = Utc::now().date_naive();
        NaiveDate::from_ymd_opt(now.year(), now.month(), 5).unwrap()
    }

    fn months_ago(n: u32) -> NaiveDate {
        today().checked_sub_months(Months::new(n)).unwrap()
    }

    async fn service() -> TuitionService<SqliteRepo> {
        let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
        TuitionService::new(repo).with_clock(FixedClock(today()))
    }

    fn user(tag: &str, role: Role) -> CreateUserRequest {
        CreateUserRequest {
            first_name: format!("First{tag}"),
            last_name: format!("Last{tag}"),
            gender: None,
            username: format!("user{tag}"),
            password: "secret".to_string(),
            email: format!("{tag}@example.com"),
            phn_num: format!("077{tag}"),
            address: None,
            date_of_birth: None,
            role: Some(role),
            status: None,
        }
    }

    /// Branch with an admission fee and one course/grade priced at `FEE`.
    async fn catalog(svc: &TuitionService<SqliteRepo>) -> (BranchId, GradeId) {
        let branch = svc
            .create_branch(CreateBranchRequest {
                branch_name: "Kandy".to_string(),
                currency: CurrencyCode::parse("LKR").unwrap(),
                status: None,
            })
            .await
            .unwrap()
            .id;
        svc.set_admission_fee(
            branch,
            SetAdmissionFeeRequest {
                admission_fee: ADMISSION,
            },
        )
        .await
        .unwrap();

        let course = svc
            .create_course(CreateCourseRequest {
                course_code: "MATH".to_string(),
                name: "Mathematics".to_string(),
                status: None,
                grades: vec![NewGrade {
                    grade_name: "Grade 7".to_string(),
                    status: None,
                    grade_fees: vec![NewGradeFee {
                        branch_id: branch,
                        fee: FEE,
                    }],
                }],
            })
            .await
            .unwrap();
        (branch, course.grades[0].grade.id)
    }

    async fn enrolled_student(
        svc: &TuitionService<SqliteRepo>,
        tag: &str,
        branch: BranchId,
        grades: Vec<GradeId>,
    ) -> StudentDetailsId {
        svc.finalize_registration(FinalizeRegistrationRequest {
            user: user(tag, Role::Student),
            student_no: format!("ST-{tag}"),
            ice_contact: None,
            salutation: None,
            grade_ids: grades,
            slot_ids: vec![],
            branch_ids: vec![branch],
        })
        .await
        .unwrap()
        .details
        .id
    }

    /// Student who paid two months ago and nothing since.
    async fn lapsed_student(svc: &TuitionService<SqliteRepo>) -> StudentDetailsId {
        let (branch, grade) = catalog(svc).await;
        let sid = enrolled_student(svc, "1", branch, vec![grade]).await;
        svc.create_payment(
            sid,
            CreatePaymentRequest {
                payment_date: Some(months_ago(2)),
            },
        )
        .await
        .unwrap();
        sid
    }

    // ── Fee quotes ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_new_student_quote_includes_admission() {
        let svc = service().await;
        let (branch, grade) = catalog(&svc).await;
        let sid = enrolled_student(&svc, "1", branch, vec![grade]).await;

        let quote = svc.fee_quote(sid).await.unwrap();

        assert_eq!(quote.full_name, "First1 Last1");
        assert_eq!(quote.quote.due_month, YearMonth::of(today()));
        assert_eq!(quote.quote.total_course_fees, FEE);
        assert_eq!(quote.quote.admission_fee, ADMISSION);
        assert_eq!(quote.quote.total_fees, FEE + ADMISSION);
        assert!(quote.quote.paid_months.is_empty());
    }

    #[tokio::test]
    async fn test_payment_amount_is_derived_and_advances_due_month() {
        let svc = service().await;
        let (branch, grade) = catalog(&svc).await;
        let sid = enrolled_student(&svc, "1", branch, vec![grade]).await;

        let created = svc
            .create_payment(sid, CreatePaymentRequest::default())
            .await
            .unwrap();
        assert_eq!(created.payment.amount, FEE + ADMISSION);
        assert_eq!(created.payment.status, PaymentStatus::Paid);
        assert_eq!(created.payment.payment_date, today());

        let next = svc.fee_quote(sid).await.unwrap();
        assert_eq!(next.quote.due_month, YearMonth::of(today()).next());
        assert_eq!(next.quote.admission_fee, 0);
        assert_eq!(next.quote.total_fees, FEE);
    }

    #[tokio::test]
    async fn test_branch_without_admission_fee_uses_default() {
        let svc = service().await.with_default_admission_fee(777);
        let branch = svc
            .create_branch(CreateBranchRequest {
                branch_name: "Galle".to_string(),
                currency: CurrencyCode::parse("LKR").unwrap(),
                status: None,
            })
            .await
            .unwrap()
            .id;
        let (_, grade) = catalog(&svc).await;
        let sid = enrolled_student(&svc, "1", branch, vec![grade]).await;

        let quote = svc.fee_quote(sid).await.unwrap();

        // No fee row for this branch: the grade contributes nothing.
        assert_eq!(quote.quote.monthly_fee, 0);
        assert_eq!(quote.quote.admission_fee, 777);
    }

    #[tokio::test]
    async fn test_fee_total_overflow_is_bad_request() {
        let svc = service().await.with_default_admission_fee(i64::MAX);
        let branch = svc
            .create_branch(CreateBranchRequest {
                branch_name: "Galle".to_string(),
                currency: CurrencyCode::parse("LKR").unwrap(),
                status: None,
            })
            .await
            .unwrap()
            .id;
        let (_, grade) = catalog(&svc).await;
        svc.create_grade_fee(CreateGradeFeeRequest {
            grade_id: grade,
            branch_id: branch,
            fee: FEE,
        })
        .await
        .unwrap();
        let sid = enrolled_student(&svc, "1", branch, vec![grade]).await;

        let quote = svc.fee_quote(sid).await;
        assert!(matches!(quote, Err(AppError::BadRequest(msg)) if msg.contains("supported range")));

        let paid = svc.create_payment(sid, CreatePaymentRequest::default()).await;
        assert!(matches!(paid, Err(AppError::BadRequest(_))));
        assert!(svc.repo().payments_of(sid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quote_without_grades_is_not_found() {
        let svc = service().await;
        let (branch, _) = catalog(&svc).await;
        let sid = enrolled_student(&svc, "1", branch, vec![]).await;

        let result = svc.fee_quote(sid).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = svc.create_payment(sid, CreatePaymentRequest::default()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_student_is_not_found() {
        let svc = service().await;

        let result = svc.pending_ledger(StudentDetailsId::new(99)).await;

        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg.contains("99")));
    }

    #[tokio::test]
    async fn test_next_month_fee_reports_last_paid_label() {
        let svc = service().await;
        let sid = lapsed_student(&svc).await;

        let fee = svc.next_month_fee(sid).await.unwrap();

        assert_eq!(fee.month, YearMonth::of(months_ago(1)));
        assert_eq!(fee.last_paid_month, YearMonth::of(months_ago(2)).label());
        assert_eq!(fee.total_fees, FEE);
    }

    // ── Pending reconstruction ──────────────────────────────────────────────

    #[tokio::test]
    async fn test_ledger_marks_paid_due_and_upcoming() {
        let svc = service().await;
        let sid = lapsed_student(&svc).await;

        let ledger = svc.pending_ledger(sid).await.unwrap().ledger;

        let statuses: Vec<_> = ledger.months.iter().map(|m| m.status).collect();
        assert_eq!(
            statuses,
            vec![MonthStatus::Paid, MonthStatus::Due, MonthStatus::Upcoming]
        );
        assert_eq!(ledger.pending_months, 1);
        assert_eq!(ledger.pending_amount, FEE);
        assert_eq!(ledger.admission_fee, 0);
        assert_eq!(ledger.total_due, FEE);
    }

    #[tokio::test]
    async fn test_history_generates_pending_after_last_payment() {
        let svc = service().await;
        let sid = lapsed_student(&svc).await;

        let history = svc
            .payment_history(sid, HistoryQuery::default())
            .await
            .unwrap();

        assert_eq!(history.course.as_deref(), Some("Mathematics"));
        assert_eq!(history.paid_history.len(), 1);
        assert_eq!(history.paid_history[0].date, months_ago(2));
        assert_eq!(history.pending_history.len(), 1);
        assert_eq!(
            history.pending_history[0].date,
            YearMonth::of(months_ago(1)).day(11)
        );
        assert_eq!(history.pending_history[0].branch.as_deref(), Some("Kandy"));
    }

    #[tokio::test]
    async fn test_history_status_filter() {
        let svc = service().await;
        let sid = lapsed_student(&svc).await;

        let paid_only = svc
            .payment_history(
                sid,
                HistoryQuery {
                    status: Some("paid".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(paid_only.paid_history.len(), 1);
        assert!(paid_only.pending_history.is_empty());

        let bogus = svc
            .payment_history(
                sid,
                HistoryQuery {
                    status: Some("overdue".to_string()),
                },
            )
            .await;
        assert!(matches!(bogus, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_search_main_adds_generated_rows() {
        let svc = service().await;
        let sid = lapsed_student(&svc).await;

        let rows = svc.search_main(SearchMainQuery::default()).await.unwrap();
        assert_eq!(rows.len(), 2);

        let pending = svc
            .search_main(SearchMainQuery {
                status: Some("Pending".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(
            pending[0].id,
            format!("pending-{sid}-{}", YearMonth::of(months_ago(1)))
        );
        assert_eq!(pending[0].amount, FEE);
        assert_eq!(pending[0].grade_name.as_deref(), Some("Grade 7"));
    }

    #[tokio::test]
    async fn test_filter_by_state_reports_stale_payment_as_pending() {
        let svc = service().await;
        lapsed_student(&svc).await;

        let all = svc
            .filter_by_state(FilterStatusQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        let state = all[0].latest_payment.as_ref().unwrap();
        assert_eq!(state.status, PaymentStatus::Pending);
        assert_eq!(state.paydate, YearMonth::of(today()).first_day());

        let paid = svc
            .filter_by_state(FilterStatusQuery {
                status: Some("Paid".to_string()),
                name: None,
            })
            .await
            .unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(
            paid[0].latest_payment.as_ref().unwrap().paydate,
            months_ago(2)
        );
    }

    // ── Validation ──────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_student_search_needs_a_filter() {
        let svc = service().await;

        let result = svc
            .search_students(StudentSearchQuery {
                student_no: Some("  ".to_string()),
                name: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_available_slots_requires_all_ids() {
        let svc = service().await;

        let result = svc
            .available_slots(AvailableSlotsQuery {
                branch_id: Some(BranchId::new(1)),
                course_id: None,
                grade_id: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_schedule_rejects_inverted_times() {
        let svc = service().await;
        let (branch, grade) = catalog(&svc).await;
        let teacher = svc.create_user(user("t", Role::Teacher)).await.unwrap();
        let course = svc.get_grade(grade).await.unwrap().grade.course_id;

        let result = svc
            .create_schedule(CreateScheduleRequest {
                teacher_id: teacher.id,
                branch_id: branch,
                course_id: course,
                grade_id: grade,
                days: vec![tuition_types::Day::Monday],
                start_time: chrono::NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                end_time: chrono::NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_deleting_last_fee_removes_grade() {
        let svc = service().await;
        let (_, grade) = catalog(&svc).await;
        let fees = svc.list_grade_fees().await.unwrap();

        let deleted = svc.delete_grade_fee(fees[0].fee.id, None).await.unwrap();

        assert!(deleted.grade_deleted);
        assert!(matches!(
            svc.get_grade(grade).await,
            Err(AppError::NotFound(_))
        ));
    }
}
