//! Catalog persistence: branches, admission fees, courses, grades, grade fees.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use tuition_types::{
    AdmissionFee, Branch, BranchId, CatalogRepository, Course, CourseDetail, CourseId,
    CreateBranchRequest, CreateCourseRequest, CreateGradeFeeRequest, CreateGradeRequest,
    DomainError, Grade, GradeChange, GradeDetail, GradeFee, GradeFeeDeleted, GradeFeeId,
    GradeFeeView, GradeId, GradeWithCourse, NewGrade, RepoError, UpdateBranchRequest,
    UpdateCourseRequest, UpdateGradeFeeRequest, UpdateGradeRequest,
};
use tuition_types::domain::ensure_non_negative;

use super::{SqliteRepo, db_err, like, require_name, tx_err, write_err};
use crate::types::{
    DbBranch, DbCourse, DbGrade, DbGradeFee, DbGradeFeeBranch, DbGradeFeeView, DbGradeWithCourse,
};

const BRANCH_COLUMNS: &str = "SELECT id, branch_name, currency, status FROM branch";
const COURSE_COLUMNS: &str = "SELECT id, course_code, name, status, created_at FROM course";
const GRADE_COLUMNS: &str = "SELECT id, grade_name, course_id, status FROM grade";
const GRADE_WITH_COURSE: &str = "SELECT g.id, g.grade_name, g.course_id, g.status, c.name AS course_name \
     FROM grade g JOIN course c ON c.id = g.course_id";
const FEE_COLUMNS: &str =
    "SELECT id, grade_id, branch_id, fee, created_at, updated_at FROM grade_fee";
const FEE_VIEW: &str = "SELECT gf.id, gf.grade_id, gf.branch_id, gf.fee, gf.created_at, gf.updated_at, \
     g.grade_name, b.branch_name, b.currency \
     FROM grade_fee gf JOIN grade g ON g.id = gf.grade_id JOIN branch b ON b.id = gf.branch_id";

// ─────────────────────────────────────────────────────────────────────────────
// Connection-level helpers (usable inside and outside transactions)
// ─────────────────────────────────────────────────────────────────────────────

pub(super) async fn exists(conn: &mut SqliteConnection, table: &str, id: i64) -> Result<bool, RepoError> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?)");
    sqlx::query_scalar::<_, bool>(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err)
}

/// Ids from `ids` with no row in `table`, deduplicated, in input order.
pub(crate) async fn missing_ids(
    conn: &mut SqliteConnection,
    table: &str,
    ids: &[i64],
) -> Result<Vec<i64>, RepoError> {
    let mut missing = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for &id in ids {
        if seen.insert(id) && !exists(conn, table, id).await? {
            missing.push(id);
        }
    }
    Ok(missing)
}

async fn fetch_course(
    conn: &mut SqliteConnection,
    id: CourseId,
) -> Result<Option<Course>, RepoError> {
    let row: Option<DbCourse> = sqlx::query_as(&format!("{COURSE_COLUMNS} WHERE id = ?"))
        .bind(id.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;
    row.map(DbCourse::into_domain).transpose()
}

/// Grades of a course with their fees and branches, optionally restricted
/// to a set of grade ids.
async fn grade_details(
    conn: &mut SqliteConnection,
    course: CourseId,
    only: Option<&[i64]>,
) -> Result<Vec<GradeDetail>, RepoError> {
    let grades: Vec<DbGrade> = sqlx::query_as(&format!(
        "{GRADE_COLUMNS} WHERE course_id = ? ORDER BY id"
    ))
    .bind(course.get())
    .fetch_all(&mut *conn)
    .await
    .map_err(db_err)?;

    let fees: Vec<DbGradeFeeBranch> = sqlx::query_as(
        r#"SELECT gf.id, gf.grade_id, gf.branch_id, gf.fee, gf.created_at, gf.updated_at,
                  b.branch_name, b.currency, b.status AS branch_status
           FROM grade_fee gf
           JOIN grade g ON g.id = gf.grade_id
           LEFT JOIN branch b ON b.id = gf.branch_id
           WHERE g.course_id = ?
           ORDER BY gf.id"#,
    )
    .bind(course.get())
    .fetch_all(&mut *conn)
    .await
    .map_err(db_err)?;

    let mut fees: Vec<_> = fees
        .into_iter()
        .map(DbGradeFeeBranch::into_domain)
        .collect::<Result<_, _>>()?;

    grades
        .into_iter()
        .filter(|g| only.is_none_or(|ids| ids.contains(&g.id)))
        .map(|g| {
            let grade = g.into_domain()?;
            let (own, rest): (Vec<_>, Vec<_>) = fees
                .drain(..)
                .partition(|f| f.fee.grade_id == grade.id);
            fees = rest;
            Ok(GradeDetail {
                grade,
                grade_fees: own,
            })
        })
        .collect()
}

async fn course_detail(
    conn: &mut SqliteConnection,
    id: CourseId,
) -> Result<Option<CourseDetail>, RepoError> {
    let Some(course) = fetch_course(conn, id).await? else {
        return Ok(None);
    };
    let grades = grade_details(conn, id, None).await?;
    Ok(Some(CourseDetail { course, grades }))
}

/// Inserts grades with their fees under a course. Branches must already be
/// validated by the caller.
async fn insert_grades(
    conn: &mut SqliteConnection,
    course: CourseId,
    grades: &[NewGrade],
    now: DateTime<Utc>,
) -> Result<Vec<i64>, RepoError> {
    let mut created = Vec::with_capacity(grades.len());
    for grade in grades {
        require_name(&grade.grade_name, "Grade name")?;
        let grade_id = sqlx::query("INSERT INTO grade (grade_name, course_id, status) VALUES (?, ?, ?)")
            .bind(grade.grade_name.trim())
            .bind(course.get())
            .bind(grade.status.unwrap_or_default().as_str())
            .execute(&mut *conn)
            .await
            .map_err(write_err)?
            .last_insert_rowid();

        for fee in &grade.grade_fees {
            ensure_non_negative(fee.fee)?;
            sqlx::query(
                r#"INSERT INTO grade_fee (grade_id, branch_id, fee, created_at, updated_at)
                   VALUES (?, ?, ?, ?, ?)"#,
            )
            .bind(grade_id)
            .bind(fee.branch_id.get())
            .bind(fee.fee)
            .bind(now)
            .bind(now)
            .execute(&mut *conn)
            .await
            .map_err(write_err)?;
        }
        created.push(grade_id);
    }
    Ok(created)
}

/// Applies one nested grade change; the grade must belong to `course`.
async fn apply_grade_change(
    conn: &mut SqliteConnection,
    course: CourseId,
    change: &GradeChange,
    now: DateTime<Utc>,
) -> Result<(), RepoError> {
    let owner: Option<i64> = sqlx::query_scalar("SELECT course_id FROM grade WHERE id = ?")
        .bind(change.id.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;
    if owner != Some(course.get()) {
        return Err(DomainError::ValidationError(format!(
            "Grade {} is not associated with course {course}",
            change.id
        ))
        .into());
    }

    if let Some(name) = &change.grade_name {
        require_name(name, "Grade name")?;
    }
    sqlx::query(
        "UPDATE grade SET grade_name = COALESCE(?, grade_name), status = COALESCE(?, status) WHERE id = ?",
    )
    .bind(change.grade_name.as_deref().map(str::trim))
    .bind(change.status.map(|s| s.as_str()))
    .bind(change.id.get())
    .execute(&mut *conn)
    .await
    .map_err(write_err)?;

    let branch_ids: Vec<i64> = change
        .grade_fees
        .iter()
        .filter_map(|f| f.branch_id.map(|b| b.get()))
        .collect();
    let missing = missing_ids(conn, "branch", &branch_ids).await?;
    if !missing.is_empty() {
        return Err(DomainError::UnknownReferences {
            entity: "branch",
            ids: missing,
        }
        .into());
    }

    for fee in &change.grade_fees {
        if let Some(amount) = fee.fee {
            ensure_non_negative(amount)?;
        }
        match fee.id {
            Some(fee_id) => {
                let fee_grade: Option<i64> =
                    sqlx::query_scalar("SELECT grade_id FROM grade_fee WHERE id = ?")
                        .bind(fee_id.get())
                        .fetch_optional(&mut *conn)
                        .await
                        .map_err(db_err)?;
                if fee_grade != Some(change.id.get()) {
                    return Err(DomainError::ValidationError(format!(
                        "Grade fee {fee_id} does not belong to grade {}",
                        change.id
                    ))
                    .into());
                }
                sqlx::query(
                    r#"UPDATE grade_fee
                       SET fee = COALESCE(?, fee), branch_id = COALESCE(?, branch_id), updated_at = ?
                       WHERE id = ?"#,
                )
                .bind(fee.fee)
                .bind(fee.branch_id.map(|b| b.get()))
                .bind(now)
                .bind(fee_id.get())
                .execute(&mut *conn)
                .await
                .map_err(write_err)?;
            }
            None => {
                let (Some(branch_id), Some(amount)) = (fee.branch_id, fee.fee) else {
                    return Err(DomainError::ValidationError(
                        "A new grade fee needs both branch_id and fee".into(),
                    )
                    .into());
                };
                sqlx::query(
                    r#"INSERT INTO grade_fee (grade_id, branch_id, fee, created_at, updated_at)
                       VALUES (?, ?, ?, ?, ?)"#,
                )
                .bind(change.id.get())
                .bind(branch_id.get())
                .bind(amount)
                .bind(now)
                .bind(now)
                .execute(&mut *conn)
                .await
                .map_err(write_err)?;
            }
        }
    }
    Ok(())
}

fn fee_branch_ids(grades: &[NewGrade]) -> Vec<i64> {
    grades
        .iter()
        .flat_map(|g| g.grade_fees.iter().map(|f| f.branch_id.get()))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl CatalogRepository for SqliteRepo {
    // ── Branches ────────────────────────────────────────────────────────────

    async fn create_branch(&self, req: CreateBranchRequest) -> Result<Branch, RepoError> {
        require_name(&req.branch_name, "Branch name")?;
        let status = req.status.unwrap_or_default();

        let id = sqlx::query("INSERT INTO branch (branch_name, currency, status) VALUES (?, ?, ?)")
            .bind(req.branch_name.trim())
            .bind(req.currency.as_str())
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(write_err)?
            .last_insert_rowid();

        Ok(Branch {
            id: BranchId::new(id),
            branch_name: req.branch_name.trim().to_string(),
            currency: req.currency,
            status,
        })
    }

    async fn list_branches(&self) -> Result<Vec<Branch>, RepoError> {
        let rows: Vec<DbBranch> = sqlx::query_as(&format!("{BRANCH_COLUMNS} ORDER BY branch_name"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(DbBranch::into_domain).collect()
    }

    async fn get_branch(&self, id: BranchId) -> Result<Option<Branch>, RepoError> {
        let row: Option<DbBranch> = sqlx::query_as(&format!("{BRANCH_COLUMNS} WHERE id = ?"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.map(DbBranch::into_domain).transpose()
    }

    async fn update_branch(
        &self,
        id: BranchId,
        req: UpdateBranchRequest,
    ) -> Result<Branch, RepoError> {
        if let Some(name) = &req.branch_name {
            require_name(name, "Branch name")?;
        }

        let result = sqlx::query(
            r#"UPDATE branch
               SET branch_name = COALESCE(?, branch_name),
                   currency = COALESCE(?, currency),
                   status = COALESCE(?, status)
               WHERE id = ?"#,
        )
        .bind(req.branch_name.as_deref().map(str::trim))
        .bind(req.currency.as_ref().map(|c| c.as_str()))
        .bind(req.status.map(|s| s.as_str()))
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }
        self.get_branch(id).await?.ok_or(RepoError::NotFound)
    }

    async fn delete_branch(&self, id: BranchId) -> Result<(), RepoError> {
        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        let fee_ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM grade_fee WHERE branch_id = ? ORDER BY id")
                .bind(id.get())
                .fetch_all(&mut *db_tx)
                .await
                .map_err(db_err)?;
        if !fee_ids.is_empty() {
            let listed = fee_ids
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(RepoError::Conflict(format!(
                "Branch {id} is referenced by grade fees: {listed}"
            )));
        }

        let result = sqlx::query("DELETE FROM branch WHERE id = ?")
            .bind(id.get())
            .execute(&mut *db_tx)
            .await
            .map_err(write_err)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        db_tx.commit().await.map_err(tx_err)?;
        Ok(())
    }

    async fn get_admission_fee(
        &self,
        branch: BranchId,
    ) -> Result<Option<AdmissionFee>, RepoError> {
        let fee: Option<i64> =
            sqlx::query_scalar("SELECT admission_fee FROM admission WHERE branch_id = ?")
                .bind(branch.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        Ok(fee.map(|admission_fee| AdmissionFee {
            branch_id: branch,
            admission_fee,
        }))
    }

    async fn set_admission_fee(
        &self,
        branch: BranchId,
        fee: i64,
    ) -> Result<AdmissionFee, RepoError> {
        ensure_non_negative(fee)?;
        if self.get_branch(branch).await?.is_none() {
            return Err(RepoError::NotFound);
        }

        sqlx::query(
            r#"INSERT INTO admission (branch_id, admission_fee) VALUES (?, ?)
               ON CONFLICT(branch_id) DO UPDATE SET admission_fee = excluded.admission_fee"#,
        )
        .bind(branch.get())
        .bind(fee)
        .execute(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(AdmissionFee {
            branch_id: branch,
            admission_fee: fee,
        })
    }

    // ── Courses ─────────────────────────────────────────────────────────────

    async fn create_course(&self, req: CreateCourseRequest) -> Result<CourseDetail, RepoError> {
        require_name(&req.course_code, "Course code")?;
        require_name(&req.name, "Course name")?;
        let now = Utc::now();

        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        let missing = missing_ids(&mut db_tx, "branch", &fee_branch_ids(&req.grades)).await?;
        if !missing.is_empty() {
            return Err(DomainError::UnknownReferences {
                entity: "branch",
                ids: missing,
            }
            .into());
        }

        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM course WHERE course_code = ?")
            .bind(req.course_code.trim())
            .fetch_optional(&mut *db_tx)
            .await
            .map_err(db_err)?;

        let course_id = match existing {
            Some(id) => {
                tracing::debug!(course_id = id, "course code exists, appending grades");
                id
            }
            None => sqlx::query(
                "INSERT INTO course (course_code, name, status, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(req.course_code.trim())
            .bind(req.name.trim())
            .bind(req.status.unwrap_or_default().as_str())
            .bind(now)
            .execute(&mut *db_tx)
            .await
            .map_err(write_err)?
            .last_insert_rowid(),
        };
        let course_id = CourseId::new(course_id);

        insert_grades(&mut db_tx, course_id, &req.grades, now).await?;
        let detail = course_detail(&mut db_tx, course_id)
            .await?
            .ok_or(RepoError::NotFound)?;

        db_tx.commit().await.map_err(tx_err)?;
        Ok(detail)
    }

    async fn list_courses(&self) -> Result<Vec<CourseDetail>, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;

        let rows: Vec<DbCourse> =
            sqlx::query_as(&format!("{COURSE_COLUMNS} ORDER BY created_at DESC, id DESC"))
                .fetch_all(&mut *conn)
                .await
                .map_err(db_err)?;

        let mut courses = Vec::with_capacity(rows.len());
        for row in rows {
            let course = row.into_domain()?;
            let grades = grade_details(&mut conn, course.id, None).await?;
            courses.push(CourseDetail { course, grades });
        }
        Ok(courses)
    }

    async fn get_course(&self, id: CourseId) -> Result<Option<CourseDetail>, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        course_detail(&mut conn, id).await
    }

    async fn search_courses(&self, term: &str) -> Result<Vec<Course>, RepoError> {
        let pattern = like(term);
        let rows: Vec<DbCourse> = sqlx::query_as(&format!(
            "{COURSE_COLUMNS} WHERE course_code LIKE ? OR name LIKE ? ORDER BY name"
        ))
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbCourse::into_domain).collect()
    }

    async fn update_course(
        &self,
        id: CourseId,
        req: UpdateCourseRequest,
    ) -> Result<CourseDetail, RepoError> {
        let now = Utc::now();
        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        let course = fetch_course(&mut db_tx, id)
            .await?
            .ok_or(RepoError::NotFound)?;

        if let Some(code) = &req.course_code {
            require_name(code, "Course code")?;
            if code.trim() != course.course_code {
                let taken: bool = sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM course WHERE course_code = ? AND id <> ?)",
                )
                .bind(code.trim())
                .bind(id.get())
                .fetch_one(&mut *db_tx)
                .await
                .map_err(db_err)?;
                if taken {
                    return Err(RepoError::Conflict("Course code already exists".into()));
                }
            }
        }
        if let Some(name) = &req.name {
            require_name(name, "Course name")?;
        }

        sqlx::query(
            r#"UPDATE course
               SET course_code = COALESCE(?, course_code),
                   name = COALESCE(?, name),
                   status = COALESCE(?, status)
               WHERE id = ?"#,
        )
        .bind(req.course_code.as_deref().map(str::trim))
        .bind(req.name.as_deref().map(str::trim))
        .bind(req.status.map(|s| s.as_str()))
        .bind(id.get())
        .execute(&mut *db_tx)
        .await
        .map_err(write_err)?;

        for change in &req.grades {
            apply_grade_change(&mut db_tx, id, change, now).await?;
        }

        let detail = course_detail(&mut db_tx, id)
            .await?
            .ok_or(RepoError::NotFound)?;
        db_tx.commit().await.map_err(tx_err)?;
        Ok(detail)
    }

    async fn delete_course(&self, id: CourseId) -> Result<(), RepoError> {
        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        if !exists(&mut db_tx, "course", id.get()).await? {
            return Err(RepoError::NotFound);
        }

        sqlx::query(
            "DELETE FROM grade_fee WHERE grade_id IN (SELECT id FROM grade WHERE course_id = ?)",
        )
        .bind(id.get())
        .execute(&mut *db_tx)
        .await
        .map_err(write_err)?;

        sqlx::query("DELETE FROM grade WHERE course_id = ?")
            .bind(id.get())
            .execute(&mut *db_tx)
            .await
            .map_err(write_err)?;

        sqlx::query("DELETE FROM course WHERE id = ?")
            .bind(id.get())
            .execute(&mut *db_tx)
            .await
            .map_err(write_err)?;

        db_tx.commit().await.map_err(tx_err)?;
        Ok(())
    }

    // ── Grades ──────────────────────────────────────────────────────────────

    async fn create_grade(&self, req: CreateGradeRequest) -> Result<Grade, RepoError> {
        require_name(&req.grade_name, "Grade name")?;
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        if !exists(&mut conn, "course", req.course_id.get()).await? {
            return Err(RepoError::NotFound);
        }

        let status = req.status.unwrap_or_default();
        let id = sqlx::query("INSERT INTO grade (grade_name, course_id, status) VALUES (?, ?, ?)")
            .bind(req.grade_name.trim())
            .bind(req.course_id.get())
            .bind(status.as_str())
            .execute(&mut *conn)
            .await
            .map_err(write_err)?
            .last_insert_rowid();

        Ok(Grade {
            id: GradeId::new(id),
            grade_name: req.grade_name.trim().to_string(),
            course_id: req.course_id,
            status,
        })
    }

    async fn list_grades(&self) -> Result<Vec<GradeWithCourse>, RepoError> {
        let rows: Vec<DbGradeWithCourse> =
            sqlx::query_as(&format!("{GRADE_WITH_COURSE} ORDER BY c.name, g.grade_name"))
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;

        rows.into_iter().map(DbGradeWithCourse::into_domain).collect()
    }

    async fn get_grade(&self, id: GradeId) -> Result<Option<GradeWithCourse>, RepoError> {
        let row: Option<DbGradeWithCourse> =
            sqlx::query_as(&format!("{GRADE_WITH_COURSE} WHERE g.id = ?"))
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        row.map(DbGradeWithCourse::into_domain).transpose()
    }

    async fn update_grade(
        &self,
        id: GradeId,
        req: UpdateGradeRequest,
    ) -> Result<Grade, RepoError> {
        if let Some(name) = &req.grade_name {
            require_name(name, "Grade name")?;
        }
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        if let Some(course) = req.course_id {
            if !exists(&mut conn, "course", course.get()).await? {
                return Err(DomainError::UnknownReferences {
                    entity: "course",
                    ids: vec![course.get()],
                }
                .into());
            }
        }

        let result = sqlx::query(
            r#"UPDATE grade
               SET grade_name = COALESCE(?, grade_name),
                   course_id = COALESCE(?, course_id),
                   status = COALESCE(?, status)
               WHERE id = ?"#,
        )
        .bind(req.grade_name.as_deref().map(str::trim))
        .bind(req.course_id.map(|c| c.get()))
        .bind(req.status.map(|s| s.as_str()))
        .bind(id.get())
        .execute(&mut *conn)
        .await
        .map_err(write_err)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        let row: DbGrade = sqlx::query_as(&format!("{GRADE_COLUMNS} WHERE id = ?"))
            .bind(id.get())
            .fetch_one(&mut *conn)
            .await
            .map_err(db_err)?;
        row.into_domain()
    }

    async fn delete_grade(&self, id: GradeId) -> Result<(), RepoError> {
        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        sqlx::query("DELETE FROM grade_fee WHERE grade_id = ?")
            .bind(id.get())
            .execute(&mut *db_tx)
            .await
            .map_err(write_err)?;

        let result = sqlx::query("DELETE FROM grade WHERE id = ?")
            .bind(id.get())
            .execute(&mut *db_tx)
            .await
            .map_err(write_err)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        db_tx.commit().await.map_err(tx_err)?;
        Ok(())
    }

    async fn grades_of_course(&self, course: CourseId) -> Result<Vec<Grade>, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        if !exists(&mut conn, "course", course.get()).await? {
            return Err(RepoError::NotFound);
        }

        let rows: Vec<DbGrade> =
            sqlx::query_as(&format!("{GRADE_COLUMNS} WHERE course_id = ? ORDER BY id"))
                .bind(course.get())
                .fetch_all(&mut *conn)
                .await
                .map_err(db_err)?;

        rows.into_iter().map(DbGrade::into_domain).collect()
    }

    async fn create_grades_for_course(
        &self,
        course: CourseId,
        grades: Vec<NewGrade>,
    ) -> Result<Vec<GradeDetail>, RepoError> {
        let now = Utc::now();
        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        if !exists(&mut db_tx, "course", course.get()).await? {
            return Err(RepoError::NotFound);
        }
        let missing = missing_ids(&mut db_tx, "branch", &fee_branch_ids(&grades)).await?;
        if !missing.is_empty() {
            return Err(DomainError::UnknownReferences {
                entity: "branch",
                ids: missing,
            }
            .into());
        }

        let created = insert_grades(&mut db_tx, course, &grades, now).await?;
        let details = grade_details(&mut db_tx, course, Some(&created)).await?;

        db_tx.commit().await.map_err(tx_err)?;
        Ok(details)
    }

    async fn update_grades_for_course(
        &self,
        course: CourseId,
        grades: Vec<GradeChange>,
    ) -> Result<Vec<GradeDetail>, RepoError> {
        let now = Utc::now();
        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        if !exists(&mut db_tx, "course", course.get()).await? {
            return Err(RepoError::NotFound);
        }

        let mut invalid = Vec::new();
        for change in &grades {
            let owner: Option<i64> = sqlx::query_scalar("SELECT course_id FROM grade WHERE id = ?")
                .bind(change.id.get())
                .fetch_optional(&mut *db_tx)
                .await
                .map_err(db_err)?;
            if owner != Some(course.get()) {
                invalid.push(change.id.get());
            }
        }
        if !invalid.is_empty() {
            return Err(DomainError::UnknownReferences {
                entity: "course grade",
                ids: invalid,
            }
            .into());
        }

        for change in &grades {
            apply_grade_change(&mut db_tx, course, change, now).await?;
        }

        let ids: Vec<i64> = grades.iter().map(|g| g.id.get()).collect();
        let details = grade_details(&mut db_tx, course, Some(&ids)).await?;

        db_tx.commit().await.map_err(tx_err)?;
        Ok(details)
    }

    // ── Grade fees ──────────────────────────────────────────────────────────

    async fn create_grade_fee(&self, req: CreateGradeFeeRequest) -> Result<GradeFee, RepoError> {
        ensure_non_negative(req.fee)?;
        let mut conn = self.pool.acquire().await.map_err(db_err)?;

        let grade_exists = exists(&mut conn, "grade", req.grade_id.get()).await?;
        let branch_exists = exists(&mut conn, "branch", req.branch_id.get()).await?;
        if !grade_exists || !branch_exists {
            return Err(DomainError::ValidationError(format!(
                "Grade or branch not found (grade exists: {grade_exists}, branch exists: {branch_exists})"
            ))
            .into());
        }

        let now = Utc::now();
        let id = sqlx::query(
            r#"INSERT INTO grade_fee (grade_id, branch_id, fee, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(req.grade_id.get())
        .bind(req.branch_id.get())
        .bind(req.fee)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(write_err)?
        .last_insert_rowid();

        Ok(GradeFee {
            id: GradeFeeId::new(id),
            grade_id: req.grade_id,
            branch_id: req.branch_id,
            fee: req.fee,
            created_at: now,
            updated_at: now,
        })
    }

    async fn list_grade_fees(&self) -> Result<Vec<GradeFeeView>, RepoError> {
        let rows: Vec<DbGradeFeeView> = sqlx::query_as(&format!("{FEE_VIEW} ORDER BY gf.id"))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(DbGradeFeeView::into_domain).collect()
    }

    async fn get_grade_fee(&self, id: GradeFeeId) -> Result<Option<GradeFeeView>, RepoError> {
        let row: Option<DbGradeFeeView> = sqlx::query_as(&format!("{FEE_VIEW} WHERE gf.id = ?"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.map(DbGradeFeeView::into_domain).transpose()
    }

    async fn update_grade_fee(
        &self,
        id: GradeFeeId,
        req: UpdateGradeFeeRequest,
    ) -> Result<GradeFee, RepoError> {
        if let Some(fee) = req.fee {
            ensure_non_negative(fee)?;
        }
        let mut conn = self.pool.acquire().await.map_err(db_err)?;

        if let Some(branch) = req.branch_id {
            if !exists(&mut conn, "branch", branch.get()).await? {
                return Err(DomainError::UnknownReferences {
                    entity: "branch",
                    ids: vec![branch.get()],
                }
                .into());
            }
        }

        let result = sqlx::query(
            r#"UPDATE grade_fee
               SET fee = COALESCE(?, fee), branch_id = COALESCE(?, branch_id), updated_at = ?
               WHERE id = ?"#,
        )
        .bind(req.fee)
        .bind(req.branch_id.map(|b| b.get()))
        .bind(Utc::now())
        .bind(id.get())
        .execute(&mut *conn)
        .await
        .map_err(write_err)?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        let row: DbGradeFee = sqlx::query_as(&format!("{FEE_COLUMNS} WHERE id = ?"))
            .bind(id.get())
            .fetch_one(&mut *conn)
            .await
            .map_err(db_err)?;
        Ok(row.into_domain())
    }

    async fn delete_grade_fee(
        &self,
        id: GradeFeeId,
        course: Option<CourseId>,
    ) -> Result<GradeFeeDeleted, RepoError> {
        let mut db_tx = self.pool.begin().await.map_err(tx_err)?;

        let owner: Option<(i64, i64)> = sqlx::query_as(
            "SELECT gf.grade_id, g.course_id FROM grade_fee gf JOIN grade g ON g.id = gf.grade_id WHERE gf.id = ?",
        )
        .bind(id.get())
        .fetch_optional(&mut *db_tx)
        .await
        .map_err(db_err)?;
        let Some((grade_id, course_id)) = owner else {
            return Err(RepoError::NotFound);
        };
        if let Some(course) = course {
            if course.get() != course_id {
                return Err(DomainError::ValidationError(format!(
                    "Grade fee {id} does not belong to course {course}"
                ))
                .into());
            }
        }

        sqlx::query("DELETE FROM grade_fee WHERE id = ?")
            .bind(id.get())
            .execute(&mut *db_tx)
            .await
            .map_err(write_err)?;

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM grade_fee WHERE grade_id = ?")
            .bind(grade_id)
            .fetch_one(&mut *db_tx)
            .await
            .map_err(db_err)?;

        let grade_deleted = remaining == 0;
        if grade_deleted {
            sqlx::query("DELETE FROM grade WHERE id = ?")
                .bind(grade_id)
                .execute(&mut *db_tx)
                .await
                .map_err(write_err)?;
            tracing::info!(grade_id, "last fee removed, grade deleted");
        }

        db_tx.commit().await.map_err(tx_err)?;
        Ok(GradeFeeDeleted { id, grade_deleted })
    }
}
