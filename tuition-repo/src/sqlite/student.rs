//! User, student registration and enrollment persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use tuition_types::domain::SLOT_CAPACITY;
use tuition_types::{
    Branch, BranchId, CreateUserRequest, DomainError, FinalizeRegistrationRequest, GradeId,
    RepoError, Role, Slot, SlotId, StudentDetails, StudentGrade, StudentProfile,
    StudentRepository, StudentSummary, UpdateStudentRequest, UpdateUserRequest, User, UserId,
    UserListQuery, UserStatus,
};

use super::catalog::{exists, missing_ids};
use super::{
    DAY_ORDER, PRIMARY_BRANCH_NAME, SqliteRepo, db_err, like, non_blank, require_name, tx_err,
    write_err,
};
use crate::security::hash_password;
use crate::types::{DbBranch, DbSlot, DbStudentDetails, DbStudentGrade, DbStudentSummary, DbUser};

const USER_COLUMNS: &str = "SELECT id, first_name, last_name, gender, username, email, phn_num, \
     address, date_of_birth, role, status, created_at, updated_at FROM users";
const DETAILS_COLUMNS: &str =
    "SELECT id, user_id, student_no, photo_url, ice_contact, salutation FROM student_details";
const STUDENT_GRADES: &str = "SELECT g.id AS grade_id, g.grade_name, c.id AS course_id, \
     c.name AS course_name, ug.created_at AS assigned_at \
     FROM user_grade ug JOIN grade g ON g.id = ug.grade_id JOIN course c ON c.id = g.course_id";

/// Student summary rows; callers append `WHERE`/`ORDER BY`.
pub(super) fn student_summary_select() -> String {
    format!(
        "SELECT sd.id AS student_details_id, u.id AS user_id, sd.student_no, sd.photo_url, \
         {PRIMARY_BRANCH_NAME} AS branch_name, u.first_name, u.last_name, u.email, u.phn_num, \
         u.status FROM student_details sd JOIN users u ON u.id = sd.user_id"
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Connection-level helpers
// ─────────────────────────────────────────────────────────────────────────────

pub(super) async fn fetch_user(
    conn: &mut SqliteConnection,
    id: UserId,
) -> Result<Option<User>, RepoError> {
    let row: Option<DbUser> = sqlx::query_as(&format!("{USER_COLUMNS} WHERE id = ?"))
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;
    row.map(DbUser::into_domain).transpose()
}

/// The user, if it exists and has the given role.
pub(super) async fn user_with_role(
    conn: &mut SqliteConnection,
    id: UserId,
    role: Role,
) -> Result<User, RepoError> {
    match fetch_user(conn, id).await? {
        Some(user) if user.role == role => Ok(user),
        _ => Err(DomainError::RoleMismatch { user: id, role }.into()),
    }
}

async fn insert_user(
    conn: &mut SqliteConnection,
    req: &CreateUserRequest,
    role: Role,
    status: UserStatus,
    now: DateTime<Utc>,
) -> Result<UserId, RepoError> {
    require_name(&req.first_name, "First name")?;
    require_name(&req.last_name, "Last name")?;
    require_name(&req.username, "Username")?;
    require_name(&req.email, "Email")?;
    require_name(&req.phn_num, "Phone number")?;
    require_name(&req.password, "Password")?;
    let password_hash = hash_password(&req.password)?;

    let id = sqlx::query(
        r#"INSERT INTO users (first_name, last_name, gender, username, password_hash, email,
                              phn_num, address, date_of_birth, role, status, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(req.first_name.trim())
    .bind(req.last_name.trim())
    .bind(req.gender.as_deref())
    .bind(req.username.trim())
    .bind(password_hash)
    .bind(req.email.trim())
    .bind(req.phn_num.trim())
    .bind(req.address.as_deref())
    .bind(req.date_of_birth)
    .bind(role.as_str())
    .bind(status.as_str())
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(write_err)?
    .last_insert_rowid();

    Ok(UserId::new(id))
}

async fn update_user_row(
    conn: &mut SqliteConnection,
    id: UserId,
    req: &UpdateUserRequest,
    now: DateTime<Utc>,
) -> Result<(), RepoError> {
    for (value, what) in [
        (&req.first_name, "First name"),
        (&req.last_name, "Last name"),
        (&req.username, "Username"),
        (&req.email, "Email"),
        (&req.phn_num, "Phone number"),
        (&req.password, "Password"),
    ] {
        if let Some(value) = value {
            require_name(value, what)?;
        }
    }
    let password_hash = req.password.as_deref().map(hash_password).transpose()?;

    let result = sqlx::query(
        r#"UPDATE users
           SET first_name = COALESCE(?, first_name),
               last_name = COALESCE(?, last_name),
               gender = COALESCE(?, gender),
               username = COALESCE(?, username),
               password_hash = COALESCE(?, password_hash),
               email = COALESCE(?, email),
               phn_num = COALESCE(?, phn_num),
               address = COALESCE(?, address),
               date_of_birth = COALESCE(?, date_of_birth),
               role = COALESCE(?, role),
               status = COALESCE(?, status),
               updated_at = ?
           WHERE id = ?"#,
    )
    .bind(req.first_name.as_deref().map(str::trim))
    .bind(req.last_name.as_deref().map(str::trim))
    .bind(req.gender.as_deref())
    .bind(req.username.as_deref().map(str::trim))
    .bind(password_hash)
    .bind(req.email.as_deref().map(str::trim))
    .bind(req.phn_num.as_deref().map(str::trim))
    .bind(req.address.as_deref())
    .bind(req.date_of_birth)
    .bind(req.role.map(|r| r.as_str()))
    .bind(req.status.map(|s| s.as_str()))
    .bind(now)
    .bind(id.get())
    .execute(&mut *conn)
    .await
    .map_err(write_err)?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound);
    }
    Ok(())
}

async fn fetch_details(
    conn: &mut SqliteConnection,
    user: UserId,
) -> Result<Option<StudentDetails>, RepoError> {
    let row: Option<DbStudentDetails> =
        sqlx::query_as(&format!("{DETAILS_COLUMNS} WHERE user_id = ?"))
            .bind(user.get())
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err)?;
    Ok(row.map(DbStudentDetails::into_domain))
}

async fn grades_of(
    conn: &mut SqliteConnection,
    user: UserId,
) -> Result<Vec<StudentGrade>, RepoError> {
    let rows: Vec<DbStudentGrade> = sqlx::query_as(&format!(
        "{STUDENT_GRADES} WHERE ug.user_id = ? ORDER BY ug.created_at, ug.id"
    ))
    .bind(user.get())
    .fetch_all(&mut *conn)
    .await
    .map_err(db_err)?;
    Ok(rows.into_iter().map(DbStudentGrade::into_domain).collect())
}

async fn branches_of(conn: &mut SqliteConnection, user: UserId) -> Result<Vec<Branch>, RepoError> {
    let rows: Vec<DbBranch> = sqlx::query_as(
        r#"SELECT b.id, b.branch_name, b.currency, b.status
           FROM user_branch ub JOIN branch b ON b.id = ub.branch_id
           WHERE ub.user_id = ?
           ORDER BY ub.id"#,
    )
    .bind(user.get())
    .fetch_all(&mut *conn)
    .await
    .map_err(db_err)?;
    rows.into_iter().map(DbBranch::into_domain).collect()
}

async fn slots_of(conn: &mut SqliteConnection, user: UserId) -> Result<Vec<Slot>, RepoError> {
    let rows: Vec<DbSlot> = sqlx::query_as(&format!(
        "SELECT s.id, s.branch_id, s.course_id, s.grade_id, s.day, s.st_time, s.end_time, s.created_at \
         FROM user_slot us JOIN slot s ON s.id = us.slot_id \
         WHERE us.user_id = ? ORDER BY {DAY_ORDER}, s.st_time"
    ))
    .bind(user.get())
    .fetch_all(&mut *conn)
    .await
    .map_err(db_err)?;
    rows.into_iter().map(DbSlot::into_domain).collect()
}

async fn profile(
    conn: &mut SqliteConnection,
    user_id: UserId,
) -> Result<Option<StudentProfile>, RepoError> {
    let Some(user) = fetch_user(conn, user_id).await? else {
        return Ok(None);
    };
    let Some(details) = fetch_details(conn, user_id).await? else {
        return Ok(None);
    };
    Ok(Some(StudentProfile {
        user,
        details,
        grades: grades_of(conn, user_id).await?,
        branches: branches_of(conn, user_id).await?,
        slots: slots_of(conn, user_id).await?,
    }))
}

/// Number of students (not teachers) booked into a slot.
pub(super) async fn student_bookings(
    conn: &mut SqliteConnection,
    slot: SlotId,
) -> Result<i64, RepoError> {
    sqlx::query_scalar(
        r#"SELECT COUNT(*) FROM user_slot us JOIN users u ON u.id = us.user_id
           WHERE us.slot_id = ? AND u.role = 'student'"#,
    )
    .bind(slot.get())
    .fetch_one(&mut *conn)
    .await
    .map_err(db_err)
}

/// Books a user into a slot unless it already holds `SLOT_CAPACITY` students.
pub(super) async fn book_into(
    conn: &mut SqliteConnection,
    user: UserId,
    slot: SlotId,
) -> Result<i64, RepoError> {
    if !exists(conn, "slot", slot.get()).await? {
        return Err(DomainError::UnknownReferences {
            entity: "slot",
            ids: vec![slot.get()],
        }
        .into());
    }
    if student_bookings(conn, slot).await? >= SLOT_CAPACITY {
        return Err(DomainError::SlotFull(slot).into());
    }

    let id = sqlx::query("INSERT INTO user_slot (user_id, slot_id) VALUES (?, ?)")
        .bind(user.get())
        .bind(slot.get())
        .execute(&mut *conn)
        .await
        .map_err(write_err)?
        .last_insert_rowid();
    Ok(id)
}

async fn enroll_grades(
    conn: &mut SqliteConnection,
    user: UserId,
    grades: &[GradeId],
    now: DateTime<Utc>,
) -> Result<(), RepoError> {
    let ids: Vec<i64> = grades.iter().map(GradeId::get).collect();
    let missing = missing_ids(conn, "grade", &ids).await?;
    if !missing.is_empty() {
        return Err(DomainError::UnknownReferences {
            entity: "grade",
            ids: missing,
        }
        .into());
    }
    for grade in grades {
        sqlx::query("INSERT OR IGNORE INTO user_grade (user_id, grade_id, created_at) VALUES (?, ?, ?)")
            .bind(user.get())
            .bind(grade.get())
            .bind(now)
            .execute(&mut *conn)
            .await
            .map_err(write_err)?;
    }
    Ok(())
}

async fn join_branches(
    conn: &mut SqliteConnection,
    user: UserId,
    branches: &[BranchId],
) -> Result<(), RepoError> {
    let ids: Vec<i64> = branches.iter().map(BranchId::get).collect();
    let missing = missing_ids(conn, "branch", &ids).await?;
    if !missing.is_empty() {
        return Err(DomainError::UnknownReferences {
            entity: "branch",
            ids: missing,
        }
        .into());
    }
    for branch in branches {
        sqlx::query("INSERT OR IGNORE INTO user_branch (user_id, branch_id) VALUES (?, ?)")
            .bind(user.get())
            .bind(branch.get())
            .execute(&mut *conn)
            .await
            .map_err(write_err)?;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl StudentRepository for SqliteRepo {
    // ── Users ───────────────────────────────────────────────────────────────

    async fn create_user(&self, req: CreateUserRequest) -> Result<User, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        let id = insert_user(
            &mut conn,
            &req,
            req.role.unwrap_or_default(),
            req.status.unwrap_or_default(),
            Utc::now(),
        )
        .await?;
        fetch_user(&mut conn, id).await?.ok_or(RepoError::NotFound)
    }

    async fn list_users(&self, filter: UserListQuery) -> Result<Vec<User>, RepoError> {
        let role = filter.role.map(|r| r.as_str());
        let status = filter.status.map(|s| s.as_str());
        let rows: Vec<DbUser> = sqlx::query_as(&format!(
            "{USER_COLUMNS} WHERE (?1 IS NULL OR role = ?1) AND (?2 IS NULL OR status = ?2) ORDER BY id"
        ))
        .bind(role)
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbUser::into_domain).collect()
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        fetch_user(&mut conn, id).await
    }

    async fn update_user(&self, id: UserId, req: UpdateUserRequest) -> Result<User, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        update_user_row(&mut conn, id, &req, Utc::now()).await?;
        fetch_user(&mut conn, id).await?.ok_or(RepoError::NotFound)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(write_err)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    // ── Students ────────────────────────────────────────────────────────────

    async fn finalize_registration(
        &self,
        req: FinalizeRegistrationRequest,
    ) -> Result<StudentProfile, RepoError> {
        require_name(&req.student_no, "Student number")?;
        let now = Utc::now();

        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        let user = insert_user(&mut db_tx, &req.user, Role::Student, UserStatus::Active, now).await?;

        sqlx::query(
            r#"INSERT INTO student_details (user_id, student_no, photo_url, ice_contact, salutation)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(user.get())
        .bind(req.student_no.trim())
        .bind(StudentDetails::DEFAULT_PHOTO)
        .bind(req.ice_contact.as_deref())
        .bind(req.salutation.as_deref())
        .execute(&mut *db_tx)
        .await
        .map_err(write_err)?;

        enroll_grades(&mut db_tx, user, &req.grade_ids, now).await?;
        for slot in &req.slot_ids {
            book_into(&mut db_tx, user, *slot).await?;
        }
        join_branches(&mut db_tx, user, &req.branch_ids).await?;

        let profile = profile(&mut db_tx, user).await?.ok_or(RepoError::NotFound)?;

        db_tx.commit().await.map_err(tx_err)?;
        tracing::info!(user_id = %user, student_no = %profile.details.student_no, "student registered");
        Ok(profile)
    }

    async fn student_profile(&self, user: UserId) -> Result<Option<StudentProfile>, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        profile(&mut conn, user).await
    }

    async fn update_student(
        &self,
        user: UserId,
        req: UpdateStudentRequest,
    ) -> Result<StudentProfile, RepoError> {
        let now = Utc::now();
        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        if fetch_details(&mut db_tx, user).await?.is_none() {
            return Err(RepoError::NotFound);
        }

        if !req.user.is_empty() {
            update_user_row(&mut db_tx, user, &req.user, now).await?;
        }

        if let Some(no) = &req.student_no {
            require_name(no, "Student number")?;
        }
        sqlx::query(
            r#"UPDATE student_details
               SET student_no = COALESCE(?, student_no),
                   ice_contact = COALESCE(?, ice_contact),
                   salutation = COALESCE(?, salutation)
               WHERE user_id = ?"#,
        )
        .bind(req.student_no.as_deref().map(str::trim))
        .bind(req.ice_contact.as_deref())
        .bind(req.salutation.as_deref())
        .bind(user.get())
        .execute(&mut *db_tx)
        .await
        .map_err(write_err)?;

        if !req.grade_ids.is_empty() {
            // Grades that stay assigned keep their original enrollment date.
            let placeholders = vec!["?"; req.grade_ids.len()].join(", ");
            let sql = format!(
                "DELETE FROM user_grade WHERE user_id = ? AND grade_id NOT IN ({placeholders})"
            );
            let mut query = sqlx::query(&sql).bind(user.get());
            for grade in &req.grade_ids {
                query = query.bind(grade.get());
            }
            query.execute(&mut *db_tx).await.map_err(write_err)?;
            enroll_grades(&mut db_tx, user, &req.grade_ids, now).await?;
        }

        if !req.slot_ids.is_empty() {
            sqlx::query("DELETE FROM user_slot WHERE user_id = ?")
                .bind(user.get())
                .execute(&mut *db_tx)
                .await
                .map_err(write_err)?;
            for slot in &req.slot_ids {
                book_into(&mut db_tx, user, *slot).await?;
            }
        }

        let profile = profile(&mut db_tx, user).await?.ok_or(RepoError::NotFound)?;
        db_tx.commit().await.map_err(tx_err)?;
        Ok(profile)
    }

    async fn delete_student(&self, user: UserId) -> Result<(), RepoError> {
        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        if !exists(&mut db_tx, "users", user.get()).await? {
            return Err(RepoError::NotFound);
        }

        for sql in [
            "DELETE FROM payment WHERE student_details_id IN (SELECT id FROM student_details WHERE user_id = ?)",
            "DELETE FROM user_grade WHERE user_id = ?",
            "DELETE FROM user_slot WHERE user_id = ?",
            "DELETE FROM user_branch WHERE user_id = ?",
            "DELETE FROM student_details WHERE user_id = ?",
            "DELETE FROM users WHERE id = ?",
        ] {
            sqlx::query(sql)
                .bind(user.get())
                .execute(&mut *db_tx)
                .await
                .map_err(write_err)?;
        }

        db_tx.commit().await.map_err(tx_err)?;
        tracing::info!(user_id = %user, "student deleted");
        Ok(())
    }

    async fn set_student_photo(
        &self,
        user: UserId,
        photo_url: &str,
    ) -> Result<StudentDetails, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        let result = sqlx::query("UPDATE student_details SET photo_url = ? WHERE user_id = ?")
            .bind(photo_url)
            .bind(user.get())
            .execute(&mut *conn)
            .await
            .map_err(write_err)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        fetch_details(&mut conn, user).await?.ok_or(RepoError::NotFound)
    }

    // ── Enrollment ──────────────────────────────────────────────────────────

    async fn student_branches(&self, user: UserId) -> Result<Vec<Branch>, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        branches_of(&mut conn, user).await
    }

    async fn student_slots(&self, user: UserId) -> Result<Vec<Slot>, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        slots_of(&mut conn, user).await
    }

    async fn assign_grade(&self, user: UserId, grade: GradeId) -> Result<StudentGrade, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;

        if fetch_user(&mut conn, user).await?.is_none() {
            return Err(RepoError::NotFound);
        }
        if !exists(&mut conn, "grade", grade.get()).await? {
            return Err(DomainError::UnknownReferences {
                entity: "grade",
                ids: vec![grade.get()],
            }
            .into());
        }

        sqlx::query("INSERT INTO user_grade (user_id, grade_id, created_at) VALUES (?, ?, ?)")
            .bind(user.get())
            .bind(grade.get())
            .bind(Utc::now())
            .execute(&mut *conn)
            .await
            .map_err(write_err)?;

        let row: DbStudentGrade = sqlx::query_as(&format!(
            "{STUDENT_GRADES} WHERE ug.user_id = ? AND ug.grade_id = ?"
        ))
        .bind(user.get())
        .bind(grade.get())
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err)?;
        Ok(row.into_domain())
    }

    async fn student_grades(&self, user: UserId) -> Result<Vec<StudentGrade>, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        grades_of(&mut conn, user).await
    }

    // ── Listings ────────────────────────────────────────────────────────────

    async fn list_students(&self) -> Result<Vec<StudentSummary>, RepoError> {
        let rows: Vec<DbStudentSummary> =
            sqlx::query_as(&format!("{} ORDER BY sd.student_no", student_summary_select()))
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;

        rows.into_iter().map(DbStudentSummary::into_domain).collect()
    }

    async fn search_students(
        &self,
        student_no: Option<&str>,
        name: Option<&str>,
    ) -> Result<Vec<StudentSummary>, RepoError> {
        let student_no = non_blank(student_no).map(like);
        let name = non_blank(name).map(like);

        let rows: Vec<DbStudentSummary> = sqlx::query_as(&format!(
            "{} WHERE (?1 IS NULL OR sd.student_no LIKE ?1) \
             AND (?2 IS NULL OR u.first_name LIKE ?2 OR u.last_name LIKE ?2 \
                  OR (u.first_name || ' ' || u.last_name) LIKE ?2) \
             ORDER BY sd.student_no",
            student_summary_select()
        ))
        .bind(student_no)
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbStudentSummary::into_domain).collect()
    }
}
