//! Slot booking, teacher schedules and master data.

use async_trait::async_trait;
use chrono::{NaiveTime, Utc};
use sqlx::SqliteConnection;

use tuition_types::domain::{MAX_SLOTS_PER_DAY, SLOT_CAPACITY};
use tuition_types::{
    AvailableSlot, Booking, BranchId, Course, CourseId, CreateScheduleRequest,
    CreateScheduleResult, Day, DomainError, GradeId, GradeWithCourse, Lecturer, RepoError, Role,
    ScheduleEntry, SchedulePage, ScheduleRepository, ScheduleSearchQuery, Slot, SlotId,
    UpdateScheduleRequest, UserId,
};

use super::catalog::exists;
use super::student::{book_into, user_with_role};
use super::{DAY_ORDER, SqliteRepo, db_err, like, non_blank, tx_err, write_err};
use crate::types::{DbCourse, DbGradeWithCourse, DbLecturer, DbScheduleEntry, DbSlot, DbSlotLoad};

const SLOT_COLUMNS: &str =
    "s.id, s.branch_id, s.course_id, s.grade_id, s.day, s.st_time, s.end_time, s.created_at";

/// Student bookings of slot `s`.
const BOOKED: &str = "(SELECT COUNT(*) FROM user_slot us JOIN users u ON u.id = us.user_id \
     WHERE us.slot_id = s.id AND u.role = 'student')";

/// First teacher assigned to slot `s`.
const TEACHER_OF_SLOT: &str = "(SELECT us.user_id FROM user_slot us JOIN users tu ON tu.id = us.user_id \
     WHERE us.slot_id = s.id AND tu.role = 'teacher' ORDER BY us.id LIMIT 1)";

fn schedule_select() -> String {
    format!(
        "SELECT s.id AS slot_id, s.day, s.st_time, s.end_time, \
         s.branch_id, b.branch_name, s.course_id, c.name AS course_name, s.grade_id, g.grade_name, \
         t.id AS teacher_id, t.first_name AS teacher_first_name, t.last_name AS teacher_last_name, \
         {BOOKED} AS student_count \
         FROM slot s \
         JOIN branch b ON b.id = s.branch_id \
         JOIN course c ON c.id = s.course_id \
         JOIN grade g ON g.id = s.grade_id \
         LEFT JOIN users t ON t.id = {TEACHER_OF_SLOT}"
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Connection-level helpers
// ─────────────────────────────────────────────────────────────────────────────

async fn schedule_entry(
    conn: &mut SqliteConnection,
    slot: SlotId,
) -> Result<Option<ScheduleEntry>, RepoError> {
    let row: Option<DbScheduleEntry> =
        sqlx::query_as(&format!("{} WHERE s.id = ?", schedule_select()))
            .bind(slot.get())
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err)?;
    row.map(DbScheduleEntry::into_domain).transpose()
}

async fn fetch_slot(conn: &mut SqliteConnection, slot: SlotId) -> Result<Option<Slot>, RepoError> {
    let row: Option<DbSlot> = sqlx::query_as(&format!("SELECT {SLOT_COLUMNS} FROM slot s WHERE s.id = ?"))
        .bind(slot.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;
    row.map(DbSlot::into_domain).transpose()
}

/// Branch, course and grade must exist and the grade must belong to the course.
async fn check_placement(
    conn: &mut SqliteConnection,
    branch: BranchId,
    course: CourseId,
    grade: GradeId,
) -> Result<(), RepoError> {
    for (table, entity, id) in [
        ("branch", "branch", branch.get()),
        ("course", "course", course.get()),
        ("grade", "grade", grade.get()),
    ] {
        if !exists(conn, table, id).await? {
            return Err(DomainError::UnknownReferences {
                entity,
                ids: vec![id],
            }
            .into());
        }
    }

    let owner: i64 = sqlx::query_scalar("SELECT course_id FROM grade WHERE id = ?")
        .bind(grade.get())
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err)?;
    if owner != course.get() {
        return Err(DomainError::ValidationError(format!(
            "Grade {grade} does not belong to course {course}"
        ))
        .into());
    }
    Ok(())
}

fn check_times(start: NaiveTime, end: NaiveTime) -> Result<(), RepoError> {
    if start >= end {
        return Err(DomainError::ValidationError("Start time must be before end time".into()).into());
    }
    Ok(())
}

async fn ensure_teacher_grade(
    conn: &mut SqliteConnection,
    teacher: UserId,
    grade: GradeId,
) -> Result<(), RepoError> {
    sqlx::query("INSERT OR IGNORE INTO user_grade (user_id, grade_id, created_at) VALUES (?, ?, ?)")
        .bind(teacher.get())
        .bind(grade.get())
        .bind(Utc::now())
        .execute(&mut *conn)
        .await
        .map_err(write_err)?;
    Ok(())
}

async fn assign_teacher(
    conn: &mut SqliteConnection,
    teacher: UserId,
    slot: SlotId,
) -> Result<(), RepoError> {
    sqlx::query("INSERT OR IGNORE INTO user_slot (user_id, slot_id) VALUES (?, ?)")
        .bind(teacher.get())
        .bind(slot.get())
        .execute(&mut *conn)
        .await
        .map_err(write_err)?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl ScheduleRepository for SqliteRepo {
    async fn available_slots(
        &self,
        branch: BranchId,
        course: CourseId,
        grade: GradeId,
    ) -> Result<Vec<AvailableSlot>, RepoError> {
        let rows: Vec<DbSlotLoad> = sqlx::query_as(&format!(
            "SELECT {SLOT_COLUMNS}, {BOOKED} AS booked FROM slot s \
             WHERE s.branch_id = ? AND s.course_id = ? AND s.grade_id = ? AND {BOOKED} < ? \
             ORDER BY {DAY_ORDER}, s.st_time"
        ))
        .bind(branch.get())
        .bind(course.get())
        .bind(grade.get())
        .bind(SLOT_CAPACITY)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter()
            .map(|row| {
                Ok(AvailableSlot {
                    slot: row.slot.into_domain()?,
                    booked: row.booked,
                    remaining: SLOT_CAPACITY - row.booked,
                })
            })
            .collect()
    }

    async fn book_slot(&self, student: UserId, slot: SlotId) -> Result<Booking, RepoError> {
        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        user_with_role(&mut db_tx, student, Role::Student).await?;
        let id = book_into(&mut db_tx, student, slot).await?;

        db_tx.commit().await.map_err(tx_err)?;
        tracing::info!(user_id = %student, slot_id = %slot, "slot booked");
        Ok(Booking {
            id,
            user_id: student,
            slot_id: slot,
        })
    }

    async fn create_schedule(
        &self,
        req: CreateScheduleRequest,
    ) -> Result<CreateScheduleResult, RepoError> {
        check_times(req.start_time, req.end_time)?;
        if req.days.is_empty() {
            return Err(DomainError::ValidationError("At least one day is required".into()).into());
        }
        let now = Utc::now();

        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        user_with_role(&mut db_tx, req.teacher_id, Role::Teacher).await?;
        check_placement(&mut db_tx, req.branch_id, req.course_id, req.grade_id).await?;
        ensure_teacher_grade(&mut db_tx, req.teacher_id, req.grade_id).await?;

        let mut days = req.days.clone();
        days.sort_by_key(Day::rank);
        days.dedup();

        let mut created = Vec::new();
        let mut skipped = Vec::new();
        for day in days {
            let duplicate: bool = sqlx::query_scalar(
                r#"SELECT EXISTS(
                       SELECT 1 FROM slot s JOIN user_slot us ON us.slot_id = s.id
                       WHERE us.user_id = ? AND s.branch_id = ? AND s.course_id = ?
                         AND s.grade_id = ? AND s.day = ? AND s.st_time = ? AND s.end_time = ?)"#,
            )
            .bind(req.teacher_id.get())
            .bind(req.branch_id.get())
            .bind(req.course_id.get())
            .bind(req.grade_id.get())
            .bind(day.as_str())
            .bind(req.start_time)
            .bind(req.end_time)
            .fetch_one(&mut *db_tx)
            .await
            .map_err(db_err)?;
            if duplicate {
                skipped.push(day);
                continue;
            }

            let on_day: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM slot WHERE branch_id = ? AND day = ?")
                    .bind(req.branch_id.get())
                    .bind(day.as_str())
                    .fetch_one(&mut *db_tx)
                    .await
                    .map_err(db_err)?;
            if on_day >= MAX_SLOTS_PER_DAY {
                return Err(DomainError::DayFull(day).into());
            }

            let id = sqlx::query(
                r#"INSERT INTO slot (branch_id, course_id, grade_id, day, st_time, end_time, created_at)
                   VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(req.branch_id.get())
            .bind(req.course_id.get())
            .bind(req.grade_id.get())
            .bind(day.as_str())
            .bind(req.start_time)
            .bind(req.end_time)
            .bind(now)
            .execute(&mut *db_tx)
            .await
            .map_err(write_err)?
            .last_insert_rowid();
            let slot_id = SlotId::new(id);

            assign_teacher(&mut db_tx, req.teacher_id, slot_id).await?;

            created.push(Slot {
                id: slot_id,
                branch_id: req.branch_id,
                course_id: req.course_id,
                grade_id: req.grade_id,
                day,
                st_time: req.start_time,
                end_time: req.end_time,
                created_at: now,
            });
        }

        db_tx.commit().await.map_err(tx_err)?;
        tracing::info!(
            teacher_id = %req.teacher_id,
            created = created.len(),
            skipped = skipped.len(),
            "schedule created"
        );
        Ok(CreateScheduleResult { created, skipped })
    }

    async fn list_schedule(
        &self,
        page: u32,
        limit: u32,
        course: Option<CourseId>,
    ) -> Result<SchedulePage, RepoError> {
        let page = page.max(1);
        let limit = limit.max(1);
        let course = course.map(|c| c.get());
        let mut conn = self.pool.acquire().await.map_err(db_err)?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM slot WHERE (?1 IS NULL OR course_id = ?1)")
                .bind(course)
                .fetch_one(&mut *conn)
                .await
                .map_err(db_err)?;

        let rows: Vec<DbScheduleEntry> = sqlx::query_as(&format!(
            "{} WHERE (?1 IS NULL OR s.course_id = ?1) \
             ORDER BY {DAY_ORDER}, s.st_time, s.id LIMIT ?2 OFFSET ?3",
            schedule_select()
        ))
        .bind(course)
        .bind(i64::from(limit))
        .bind(i64::from(page - 1) * i64::from(limit))
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err)?;

        let items = rows
            .into_iter()
            .map(DbScheduleEntry::into_domain)
            .collect::<Result<Vec<_>, _>>()?;
        let total_pages = u32::try_from((total + i64::from(limit) - 1) / i64::from(limit))
            .unwrap_or(u32::MAX);

        Ok(SchedulePage {
            items,
            page,
            limit,
            total,
            total_pages,
        })
    }

    async fn get_schedule(&self, slot: SlotId) -> Result<Option<ScheduleEntry>, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        schedule_entry(&mut conn, slot).await
    }

    async fn update_schedule(
        &self,
        slot: SlotId,
        req: UpdateScheduleRequest,
    ) -> Result<ScheduleEntry, RepoError> {
        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        let current = fetch_slot(&mut db_tx, slot)
            .await?
            .ok_or(RepoError::NotFound)?;

        let branch = req.branch_id.unwrap_or(current.branch_id);
        let course = req.course_id.unwrap_or(current.course_id);
        let grade = req.grade_id.unwrap_or(current.grade_id);
        let start = req.start_time.unwrap_or(current.st_time);
        let end = req.end_time.unwrap_or(current.end_time);
        check_times(start, end)?;
        check_placement(&mut db_tx, branch, course, grade).await?;

        sqlx::query(
            r#"UPDATE slot
               SET branch_id = ?, course_id = ?, grade_id = ?, day = ?, st_time = ?, end_time = ?
               WHERE id = ?"#,
        )
        .bind(branch.get())
        .bind(course.get())
        .bind(grade.get())
        .bind(req.day.unwrap_or(current.day).as_str())
        .bind(start)
        .bind(end)
        .bind(slot.get())
        .execute(&mut *db_tx)
        .await
        .map_err(write_err)?;

        let teacher = match req.teacher_id {
            Some(teacher) => {
                user_with_role(&mut db_tx, teacher, Role::Teacher).await?;
                sqlx::query(
                    r#"DELETE FROM user_slot
                       WHERE slot_id = ? AND user_id IN (SELECT id FROM users WHERE role = 'teacher')"#,
                )
                .bind(slot.get())
                .execute(&mut *db_tx)
                .await
                .map_err(write_err)?;
                assign_teacher(&mut db_tx, teacher, slot).await?;
                Some(teacher)
            }
            None => schedule_entry(&mut db_tx, slot)
                .await?
                .and_then(|entry| entry.teacher_id),
        };
        if let Some(teacher) = teacher {
            ensure_teacher_grade(&mut db_tx, teacher, grade).await?;
        }

        let entry = schedule_entry(&mut db_tx, slot)
            .await?
            .ok_or(RepoError::NotFound)?;
        db_tx.commit().await.map_err(tx_err)?;
        Ok(entry)
    }

    async fn delete_schedule(&self, slot: SlotId) -> Result<(), RepoError> {
        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        if !exists(&mut db_tx, "slot", slot.get()).await? {
            return Err(RepoError::NotFound);
        }

        sqlx::query("DELETE FROM user_slot WHERE slot_id = ?")
            .bind(slot.get())
            .execute(&mut *db_tx)
            .await
            .map_err(write_err)?;
        sqlx::query("DELETE FROM slot WHERE id = ?")
            .bind(slot.get())
            .execute(&mut *db_tx)
            .await
            .map_err(write_err)?;

        db_tx.commit().await.map_err(tx_err)?;
        Ok(())
    }

    async fn search_schedule(
        &self,
        query: ScheduleSearchQuery,
    ) -> Result<Vec<ScheduleEntry>, RepoError> {
        let lecturer = non_blank(query.lecturer_name.as_deref()).map(like);
        let course = non_blank(query.course.as_deref()).map(like);
        let grade = non_blank(query.grade.as_deref()).map(like);

        let rows: Vec<DbScheduleEntry> = sqlx::query_as(&format!(
            "{} WHERE (?1 IS NULL OR t.first_name LIKE ?1 OR t.last_name LIKE ?1 \
                       OR (t.first_name || ' ' || t.last_name) LIKE ?1) \
               AND (?2 IS NULL OR c.name LIKE ?2 OR c.course_code LIKE ?2) \
               AND (?3 IS NULL OR g.grade_name LIKE ?3) \
               AND (?4 IS NULL OR s.day = ?4) \
             ORDER BY {DAY_ORDER}, s.st_time, s.id",
            schedule_select()
        ))
        .bind(lecturer)
        .bind(course)
        .bind(grade)
        .bind(query.day.map(|d| d.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbScheduleEntry::into_domain).collect()
    }

    // ── Master data ─────────────────────────────────────────────────────────

    async fn master_courses(&self) -> Result<Vec<Course>, RepoError> {
        let rows: Vec<DbCourse> = sqlx::query_as(
            "SELECT id, course_code, name, status, created_at FROM course ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbCourse::into_domain).collect()
    }

    async fn master_grades(&self) -> Result<Vec<GradeWithCourse>, RepoError> {
        let rows: Vec<DbGradeWithCourse> = sqlx::query_as(
            r#"SELECT g.id, g.grade_name, g.course_id, g.status, c.name AS course_name
               FROM grade g JOIN course c ON c.id = g.course_id
               ORDER BY c.name, g.grade_name"#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbGradeWithCourse::into_domain).collect()
    }

    async fn slot_days(&self) -> Result<Vec<Day>, RepoError> {
        let raw: Vec<String> = sqlx::query_scalar("SELECT DISTINCT day FROM slot")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        let mut days = raw
            .iter()
            .map(|d| d.parse::<Day>())
            .collect::<Result<Vec<_>, _>>()?;
        days.sort_by_key(Day::rank);
        Ok(days)
    }

    async fn slot_times(&self) -> Result<Vec<(NaiveTime, NaiveTime)>, RepoError> {
        sqlx::query_as("SELECT DISTINCT st_time, end_time FROM slot ORDER BY st_time, end_time")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)
    }

    async fn lecturers(&self) -> Result<Vec<Lecturer>, RepoError> {
        let rows: Vec<DbLecturer> = sqlx::query_as(
            "SELECT id, first_name, last_name FROM users WHERE role = 'teacher' \
             ORDER BY first_name, last_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows.into_iter().map(DbLecturer::into_domain).collect())
    }
}
