//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use tuition_types::{
        BranchId, CatalogRepository, CourseId, CreateBranchRequest, CreateCourseRequest,
        CreateGradeFeeRequest, CreateScheduleRequest, CreateUserRequest, CurrencyCode, Day,
        DomainError, FinalizeRegistrationRequest, GradeChange, GradeFeeChange, GradeId, NewGrade,
        NewGradeFee, PaymentFilter, PaymentRepository, PaymentStatus, RepoError, Role,
        ScheduleRepository, ScheduleSearchQuery, SlotId, StudentRepository, UpdateCourseRequest,
        UpdateStudentRequest, UpdateUserRequest, UserId, UserListQuery, UserStatus,
    };

    use crate::SqliteRepo;
    use crate::security::verify_password;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
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
            date_of_birth: NaiveDate::from_ymd_opt(2010, 5, 1),
            role: Some(role),
            status: None,
        }
    }

    async fn branch(repo: &SqliteRepo, name: &str) -> BranchId {
        repo.create_branch(CreateBranchRequest {
            branch_name: name.to_string(),
            currency: CurrencyCode::parse("LKR").unwrap(),
            status: None,
        })
        .await
        .unwrap()
        .id
    }

    /// Creates a course with one grade priced at `fee` in `branch`.
    async fn course_with_grade(
        repo: &SqliteRepo,
        code: &str,
        branch: BranchId,
        fee: i64,
    ) -> (CourseId, GradeId) {
        let detail = repo
            .create_course(CreateCourseRequest {
                course_code: code.to_string(),
                name: format!("Course {code}"),
                status: None,
                grades: vec![NewGrade {
                    grade_name: "Grade 6".to_string(),
                    status: None,
                    grade_fees: vec![NewGradeFee {
                        branch_id: branch,
                        fee,
                    }],
                }],
            })
            .await
            .unwrap();
        (detail.course.id, detail.grades[0].grade.id)
    }

    fn registration(
        tag: &str,
        grades: Vec<GradeId>,
        slots: Vec<SlotId>,
        branches: Vec<BranchId>,
    ) -> FinalizeRegistrationRequest {
        FinalizeRegistrationRequest {
            user: user(tag, Role::Student),
            student_no: format!("ST-{tag}"),
            ice_contact: None,
            salutation: None,
            grade_ids: grades,
            slot_ids: slots,
            branch_ids: branches,
        }
    }

    fn schedule(
        teacher: UserId,
        branch: BranchId,
        course: CourseId,
        grade: GradeId,
        days: Vec<Day>,
    ) -> CreateScheduleRequest {
        CreateScheduleRequest {
            teacher_id: teacher,
            branch_id: branch,
            course_id: course,
            grade_id: grade,
            days,
            start_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        }
    }

    // ── Catalog ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_branch_defaults_to_active() {
        let repo = setup_repo().await;
        let id = branch(&repo, "Colombo").await;

        let fetched = repo.get_branch(id).await.unwrap().unwrap();

        assert_eq!(fetched.branch_name, "Colombo");
        assert_eq!(fetched.status, tuition_types::RecordStatus::Active);
        assert_eq!(fetched.currency.as_str(), "LKR");
    }

    #[tokio::test]
    async fn test_delete_branch_with_fees_is_conflict() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Kandy").await;
        course_with_grade(&repo, "MATH", b, 2500).await;

        let result = repo.delete_branch(b).await;

        assert!(matches!(result, Err(RepoError::Conflict(msg)) if msg.contains("grade fees")));
        assert!(repo.get_branch(b).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_admission_fee_upsert() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Galle").await;

        assert!(repo.get_admission_fee(b).await.unwrap().is_none());
        repo.set_admission_fee(b, 5000).await.unwrap();
        repo.set_admission_fee(b, 7500).await.unwrap();

        let fee = repo.get_admission_fee(b).await.unwrap().unwrap();
        assert_eq!(fee.admission_fee, 7500);

        let missing = repo.set_admission_fee(BranchId::new(99), 10).await;
        assert!(matches!(missing, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_create_course_with_unknown_branch_rolls_back() {
        let repo = setup_repo().await;

        let result = repo
            .create_course(CreateCourseRequest {
                course_code: "SCI".to_string(),
                name: "Science".to_string(),
                status: None,
                grades: vec![NewGrade {
                    grade_name: "Grade 7".to_string(),
                    status: None,
                    grade_fees: vec![NewGradeFee {
                        branch_id: BranchId::new(42),
                        fee: 100,
                    }],
                }],
            })
            .await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::UnknownReferences { ids, .. })) if ids == vec![42]
        ));
        assert!(repo.list_courses().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_existing_course_code_appends_grades() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let (first, _) = course_with_grade(&repo, "ENG", b, 1000).await;
        let (second, _) = course_with_grade(&repo, "ENG", b, 1200).await;

        assert_eq!(first, second);
        let detail = repo.get_course(first).await.unwrap().unwrap();
        assert_eq!(detail.grades.len(), 2);
        assert_eq!(detail.grades[1].grade_fees[0].fee.fee, 1200);
        assert_eq!(
            detail.grades[0].grade_fees[0].branch.as_ref().unwrap().branch_name,
            "Colombo"
        );
    }

    #[tokio::test]
    async fn test_update_grades_rejects_foreign_grade() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let (course_a, _) = course_with_grade(&repo, "A", b, 100).await;
        let (_, grade_b) = course_with_grade(&repo, "B", b, 100).await;

        let result = repo
            .update_grades_for_course(
                course_a,
                vec![GradeChange {
                    id: grade_b,
                    grade_name: Some("Moved".to_string()),
                    status: None,
                    grade_fees: vec![],
                }],
            )
            .await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::UnknownReferences { ids, .. })) if ids == vec![grade_b.get()]
        ));
    }

    #[tokio::test]
    async fn test_update_course_rejects_foreign_fee_and_rolls_back() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let (course_a, grade_a) = course_with_grade(&repo, "A", b, 100).await;
        let (course_b, _) = course_with_grade(&repo, "B", b, 200).await;
        let foreign_fee = repo.get_course(course_b).await.unwrap().unwrap().grades[0].grade_fees[0]
            .fee
            .id;

        let result = repo
            .update_course(
                course_a,
                UpdateCourseRequest {
                    name: Some("Renamed".to_string()),
                    grades: vec![GradeChange {
                        id: grade_a,
                        grade_name: None,
                        status: None,
                        grade_fees: vec![GradeFeeChange {
                            id: Some(foreign_fee),
                            branch_id: None,
                            fee: Some(300),
                        }],
                    }],
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::ValidationError(msg))) if msg.contains("does not belong to grade")
        ));
        let course = repo.get_course(course_a).await.unwrap().unwrap();
        assert_eq!(course.course.name, "Course A");
    }

    #[tokio::test]
    async fn test_update_course_code_clash_is_conflict() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let (course_a, _) = course_with_grade(&repo, "A", b, 100).await;
        course_with_grade(&repo, "B", b, 100).await;

        let result = repo
            .update_course(
                course_a,
                UpdateCourseRequest {
                    course_code: Some("B".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_course_appends_new_fee() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let other = branch(&repo, "Kandy").await;
        let (course, grade) = course_with_grade(&repo, "A", b, 100).await;

        let detail = repo
            .update_course(
                course,
                UpdateCourseRequest {
                    grades: vec![GradeChange {
                        id: grade,
                        grade_name: Some("Grade 7".to_string()),
                        status: None,
                        grade_fees: vec![GradeFeeChange {
                            id: None,
                            branch_id: Some(other),
                            fee: Some(150),
                        }],
                    }],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(detail.grades[0].grade.grade_name, "Grade 7");
        assert_eq!(detail.grades[0].grade_fees.len(), 2);
        assert_eq!(detail.grades[0].grade_fees[1].fee.fee, 150);
    }

    #[tokio::test]
    async fn test_update_grades_rejects_unknown_fee_branch() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let (course, grade) = course_with_grade(&repo, "A", b, 100).await;

        let result = repo
            .update_grades_for_course(
                course,
                vec![GradeChange {
                    id: grade,
                    grade_name: None,
                    status: None,
                    grade_fees: vec![GradeFeeChange {
                        id: None,
                        branch_id: Some(BranchId::new(99)),
                        fee: Some(10),
                    }],
                }],
            )
            .await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::UnknownReferences { ids, .. })) if ids == vec![99]
        ));
    }

    #[tokio::test]
    async fn test_deleting_last_fee_removes_grade() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let other = branch(&repo, "Kandy").await;
        let (course, grade) = course_with_grade(&repo, "HIST", b, 900).await;
        let extra = repo
            .create_grade_fee(CreateGradeFeeRequest {
                grade_id: grade,
                branch_id: other,
                fee: 950,
            })
            .await
            .unwrap();

        let first = repo.delete_grade_fee(extra.id, Some(course)).await.unwrap();
        assert!(!first.grade_deleted);

        let remaining = repo.list_grade_fees().await.unwrap();
        assert_eq!(remaining.len(), 1);
        let last = repo.delete_grade_fee(remaining[0].fee.id, None).await.unwrap();
        assert!(last.grade_deleted);
        assert!(repo.get_grade(grade).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_grade_fee_requires_grade_and_branch() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;

        let result = repo
            .create_grade_fee(CreateGradeFeeRequest {
                grade_id: GradeId::new(7),
                branch_id: b,
                fee: 10,
            })
            .await;

        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::ValidationError(msg))) if msg.contains("grade exists: false")
        ));
    }

    #[tokio::test]
    async fn test_search_courses_by_code_or_name() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        course_with_grade(&repo, "MATH-01", b, 100).await;
        course_with_grade(&repo, "ART-01", b, 100).await;

        let found = repo.search_courses("math").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].course_code, "MATH-01");
    }

    // ── Users & students ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_duplicate_username_is_conflict() {
        let repo = setup_repo().await;
        repo.create_user(user("1", Role::Teacher)).await.unwrap();

        let mut dup = user("2", Role::Teacher);
        dup.username = "user1".to_string();
        let result = repo.create_user(dup).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_passwords_are_stored_as_argon2() {
        let repo = setup_repo().await;
        let created = repo.create_user(user("1", Role::Teacher)).await.unwrap();

        let stored: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
            .bind(created.id.get())
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert!(stored.starts_with("$argon2id$"));
        assert!(verify_password("secret", &stored));

        repo.update_user(
            created.id,
            UpdateUserRequest {
                password: Some("changed".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let updated: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE id = ?")
            .bind(created.id.get())
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert!(verify_password("changed", &updated));
        assert!(!verify_password("secret", &updated));
    }

    #[tokio::test]
    async fn test_list_users_filters_by_role() {
        let repo = setup_repo().await;
        repo.create_user(user("1", Role::Teacher)).await.unwrap();
        repo.create_user(user("2", Role::Admin)).await.unwrap();

        let teachers = repo
            .list_users(UserListQuery {
                role: Some(Role::Teacher),
                status: Some(UserStatus::Active),
            })
            .await
            .unwrap();

        assert_eq!(teachers.len(), 1);
        assert_eq!(teachers[0].username, "user1");
    }

    #[tokio::test]
    async fn test_finalize_registration_builds_profile() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let (_, grade) = course_with_grade(&repo, "MATH", b, 2500).await;

        let profile = repo
            .finalize_registration(registration("10", vec![grade], vec![], vec![b, b]))
            .await
            .unwrap();

        assert_eq!(profile.user.role, Role::Student);
        assert_eq!(profile.details.student_no, "ST-10");
        assert_eq!(profile.details.photo_url, "/default-avatar.png");
        assert_eq!(profile.grades.len(), 1);
        assert_eq!(profile.branches.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_student_no_is_conflict() {
        let repo = setup_repo().await;
        repo.finalize_registration(registration("14", vec![], vec![], vec![]))
            .await
            .unwrap();

        let mut dup = registration("15", vec![], vec![], vec![]);
        dup.student_no = "ST-14".to_string();
        let result = repo.finalize_registration(dup).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
        let users = repo.list_users(UserListQuery::default()).await.unwrap();
        assert_eq!(users.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_registration_leaves_no_user() {
        let repo = setup_repo().await;

        let result = repo
            .finalize_registration(registration("11", vec![GradeId::new(5)], vec![], vec![]))
            .await;

        assert!(result.is_err());
        assert!(repo.list_users(UserListQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_student_replaces_grades() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let (_, g1) = course_with_grade(&repo, "A", b, 100).await;
        let (_, g2) = course_with_grade(&repo, "B", b, 200).await;
        let profile = repo
            .finalize_registration(registration("12", vec![g1], vec![], vec![b]))
            .await
            .unwrap();

        let updated = repo
            .update_student(
                profile.user.id,
                UpdateStudentRequest {
                    student_no: Some("ST-99".to_string()),
                    grade_ids: vec![g2],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.details.student_no, "ST-99");
        assert_eq!(updated.grades.len(), 1);
        assert_eq!(updated.grades[0].grade_id, g2);
    }

    #[tokio::test]
    async fn test_update_student_keeps_enrollment_date_of_kept_grades() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let (_, g1) = course_with_grade(&repo, "A", b, 100).await;
        let (_, g2) = course_with_grade(&repo, "B", b, 200).await;
        let profile = repo
            .finalize_registration(registration("16", vec![g1], vec![], vec![b]))
            .await
            .unwrap();
        let enrolled = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
            .and_utc();
        sqlx::query("UPDATE user_grade SET created_at = ? WHERE user_id = ?")
            .bind(enrolled)
            .bind(profile.user.id.get())
            .execute(repo.pool())
            .await
            .unwrap();

        repo.update_student(
            profile.user.id,
            UpdateStudentRequest {
                grade_ids: vec![g1, g2],
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let billing = repo
            .billing_profile(profile.details.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(billing.fee_lines.len(), 2);
        assert_eq!(billing.enrolled_on, Some(enrolled.date_naive()));
    }

    #[tokio::test]
    async fn test_delete_student_removes_payments() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let (_, grade) = course_with_grade(&repo, "A", b, 100).await;
        let profile = repo
            .finalize_registration(registration("13", vec![grade], vec![], vec![b]))
            .await
            .unwrap();
        let sid = profile.details.id;
        let paid_on = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        repo.record_payment(sid, paid_on, PaymentStatus::Paid, 100)
            .await
            .unwrap();

        repo.delete_student(profile.user.id).await.unwrap();

        assert!(repo.get_user(profile.user.id).await.unwrap().is_none());
        assert!(repo.payments_of(sid).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_students_by_name() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        repo.finalize_registration(registration("20", vec![], vec![], vec![b]))
            .await
            .unwrap();
        repo.finalize_registration(registration("21", vec![], vec![], vec![]))
            .await
            .unwrap();

        let found = repo.search_students(None, Some("first20")).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].branch_name.as_deref(), Some("Colombo"));

        let by_no = repo.search_students(Some("ST-2"), None).await.unwrap();
        assert_eq!(by_no.len(), 2);
    }

    // ── Slots & schedule ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_slot_capacity_is_enforced() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let (course, grade) = course_with_grade(&repo, "A", b, 100).await;
        let teacher = repo.create_user(user("T", Role::Teacher)).await.unwrap();
        let created = repo
            .create_schedule(schedule(teacher.id, b, course, grade, vec![Day::Monday]))
            .await
            .unwrap();
        let slot = created.created[0].id;

        for i in 0..10 {
            repo.finalize_registration(registration(&format!("S{i}"), vec![], vec![slot], vec![]))
                .await
                .unwrap();
        }
        assert!(repo.available_slots(b, course, grade).await.unwrap().is_empty());

        let overflow = repo
            .finalize_registration(registration("S10", vec![], vec![slot], vec![]))
            .await;
        assert!(matches!(
            overflow,
            Err(RepoError::Domain(DomainError::SlotFull(id))) if id == slot
        ));
    }

    #[tokio::test]
    async fn test_book_slot_requires_student() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let (course, grade) = course_with_grade(&repo, "A", b, 100).await;
        let teacher = repo.create_user(user("T", Role::Teacher)).await.unwrap();
        let slot = repo
            .create_schedule(schedule(teacher.id, b, course, grade, vec![Day::Friday]))
            .await
            .unwrap()
            .created[0]
            .id;

        let result = repo.book_slot(teacher.id, slot).await;
        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::RoleMismatch { role: Role::Student, .. }))
        ));

        let student = repo
            .finalize_registration(registration("30", vec![], vec![], vec![]))
            .await
            .unwrap();
        repo.book_slot(student.user.id, slot).await.unwrap();
        let again = repo.book_slot(student.user.id, slot).await;
        assert!(matches!(again, Err(RepoError::Conflict(_))));

        let open = repo.available_slots(b, course, grade).await.unwrap();
        assert_eq!(open[0].booked, 1);
        assert_eq!(open[0].remaining, 9);
    }

    #[tokio::test]
    async fn test_create_schedule_skips_identical_slots() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let (course, grade) = course_with_grade(&repo, "A", b, 100).await;
        let teacher = repo.create_user(user("T", Role::Teacher)).await.unwrap();

        repo.create_schedule(schedule(teacher.id, b, course, grade, vec![Day::Monday]))
            .await
            .unwrap();
        let second = repo
            .create_schedule(schedule(
                teacher.id,
                b,
                course,
                grade,
                vec![Day::Monday, Day::Saturday],
            ))
            .await
            .unwrap();

        assert_eq!(second.skipped, vec![Day::Monday]);
        assert_eq!(second.created.len(), 1);
        assert_eq!(second.created[0].day, Day::Saturday);
        assert_eq!(repo.slot_days().await.unwrap(), vec![Day::Saturday, Day::Monday]);
    }

    #[tokio::test]
    async fn test_create_schedule_rejects_full_day() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let (course, grade) = course_with_grade(&repo, "A", b, 100).await;

        for i in 0..10 {
            let teacher = repo
                .create_user(user(&format!("T{i}"), Role::Teacher))
                .await
                .unwrap();
            repo.create_schedule(schedule(teacher.id, b, course, grade, vec![Day::Sunday]))
                .await
                .unwrap();
        }
        let late = repo.create_user(user("T10", Role::Teacher)).await.unwrap();

        let result = repo
            .create_schedule(schedule(late.id, b, course, grade, vec![Day::Sunday]))
            .await;
        assert!(matches!(
            result,
            Err(RepoError::Domain(DomainError::DayFull(Day::Sunday)))
        ));
    }

    #[tokio::test]
    async fn test_list_schedule_paginates() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let (course, grade) = course_with_grade(&repo, "A", b, 100).await;
        let teacher = repo.create_user(user("T", Role::Teacher)).await.unwrap();
        repo.create_schedule(schedule(
            teacher.id,
            b,
            course,
            grade,
            vec![Day::Monday, Day::Tuesday, Day::Saturday],
        ))
        .await
        .unwrap();

        let page = repo.list_schedule(1, 2, None).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].day, Day::Saturday);
        assert_eq!(page.items[0].teacher_name.as_deref(), Some("FirstT LastT"));

        let found = repo
            .search_schedule(ScheduleSearchQuery {
                lecturer_name: Some("firstt".to_string()),
                day: Some(Day::Tuesday),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    // ── Payments ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_billing_profile_prices_at_primary_branch() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let other = branch(&repo, "Kandy").await;
        let (_, g1) = course_with_grade(&repo, "A", b, 2000).await;
        let (_, g2) = course_with_grade(&repo, "B", other, 3000).await;
        repo.set_admission_fee(b, 5000).await.unwrap();

        let profile = repo
            .finalize_registration(registration("40", vec![g1, g2], vec![], vec![b]))
            .await
            .unwrap();
        let billing = repo
            .billing_profile(profile.details.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(billing.fee_lines.len(), 2);
        assert_eq!(billing.fee_lines[0].fee, 2000);
        assert_eq!(billing.fee_lines[1].fee, 0);
        assert_eq!(billing.admission_fee, Some(5000));
        assert_eq!(billing.branch_name().as_deref(), Some("Colombo"));
        assert!(billing.enrolled_on.is_some());
    }

    #[tokio::test]
    async fn test_list_payments_filters() {
        let repo = setup_repo().await;
        let b = branch(&repo, "Colombo").await;
        let profile = repo
            .finalize_registration(registration("50", vec![], vec![], vec![b]))
            .await
            .unwrap();
        let sid = profile.details.id;
        let jan = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let feb = NaiveDate::from_ymd_opt(2024, 2, 11).unwrap();
        repo.record_payment(sid, jan, PaymentStatus::Paid, 100)
            .await
            .unwrap();
        repo.record_payment(sid, feb, PaymentStatus::Pending, 100)
            .await
            .unwrap();

        let paid = repo
            .list_payments(PaymentFilter {
                status: Some(PaymentStatus::Paid),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].branch_name.as_deref(), Some("Colombo"));

        let searched = repo
            .list_payments(PaymentFilter {
                search: Some("2024-02".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].status, PaymentStatus::Pending);

        let latest = repo.latest_payment(sid, None).await.unwrap().unwrap();
        assert_eq!(Some(latest.payment_date), NaiveDate::from_ymd_opt(2024, 2, 11));
        let latest_paid = repo
            .latest_payment(sid, Some(PaymentStatus::Paid))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(Some(latest_paid.payment_date), NaiveDate::from_ymd_opt(2024, 1, 5));
    }

    #[tokio::test]
    async fn test_students_by_name() {
        let repo = setup_repo().await;
        let profile = repo
            .finalize_registration(registration("60", vec![], vec![], vec![]))
            .await
            .unwrap();

        let all = repo.students_by_name(None, None).await.unwrap();
        assert_eq!(all.len(), 1);

        let none = repo
            .students_by_name(Some("nobody"), None)
            .await
            .unwrap();
        assert!(none.is_empty());

        let exact = repo
            .students_by_name(Some("First60 Last60"), Some(profile.details.id))
            .await
            .unwrap();
        assert_eq!(exact[0].full_name, "First60 Last60");
    }

    #[tokio::test]
    async fn test_payment_requires_a_date() {
        let repo = setup_repo().await;
        let profile = repo
            .finalize_registration(registration("50", vec![], vec![], vec![]))
            .await
            .unwrap();

        let result = sqlx::query(
            "INSERT INTO payment (student_details_id, payment_date, status, amount, created_at, updated_at) \
             VALUES (?, NULL, 'Pending', 100, '2024-01-01', '2024-01-01')",
        )
        .bind(profile.details.id.get())
        .execute(repo.pool())
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_record_payment_unknown_student() {
        let repo = setup_repo().await;

        let result = repo
            .record_payment(
                tuition_types::StudentDetailsId::new(9),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                PaymentStatus::Paid,
                10,
            )
            .await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }
}
