//! Payment persistence and billing snapshots.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::SqliteConnection;

use tuition_types::{
    BillingProfile, Payment, PaymentFilter, PaymentId, PaymentRecord, PaymentRepository,
    PaymentStatus, RepoError, StudentDetailsId, StudentSummary, UserId,
};

use super::catalog::exists;
use super::student::student_summary_select;
use super::{PRIMARY_BRANCH_NAME, SqliteRepo, db_err, like, non_blank, write_err};
use crate::types::{DbBranch, DbFeeLine, DbPayment, DbPaymentRecord, DbStudentSummary};

const PAYMENT_COLUMNS: &str =
    "SELECT id, student_details_id, payment_date, status, amount, created_at, updated_at FROM payment";

async fn payments_of(
    conn: &mut SqliteConnection,
    student: StudentDetailsId,
) -> Result<Vec<Payment>, RepoError> {
    let rows: Vec<DbPayment> = sqlx::query_as(&format!(
        "{PAYMENT_COLUMNS} WHERE student_details_id = ? \
         ORDER BY payment_date DESC, created_at DESC, id DESC"
    ))
    .bind(student.get())
    .fetch_all(&mut *conn)
    .await
    .map_err(db_err)?;
    rows.into_iter().map(DbPayment::into_domain).collect()
}

#[async_trait]
impl PaymentRepository for SqliteRepo {
    async fn billing_profile(
        &self,
        student: StudentDetailsId,
    ) -> Result<Option<BillingProfile>, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;

        let head: Option<(i64, String, String, String)> = sqlx::query_as(
            r#"SELECT u.id, u.first_name, u.last_name, u.status
               FROM student_details sd JOIN users u ON u.id = sd.user_id
               WHERE sd.id = ?"#,
        )
        .bind(student.get())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;
        let Some((user_id, first_name, last_name, status)) = head else {
            return Ok(None);
        };

        let branch: Option<DbBranch> = sqlx::query_as(
            r#"SELECT b.id, b.branch_name, b.currency, b.status
               FROM user_branch ub JOIN branch b ON b.id = ub.branch_id
               WHERE ub.user_id = ?
               ORDER BY ub.id LIMIT 1"#,
        )
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;
        let branch = branch.map(DbBranch::into_domain).transpose()?;
        let branch_id = branch.as_ref().map(|b| b.id.get());

        let lines: Vec<DbFeeLine> = sqlx::query_as(
            r#"SELECT g.id AS grade_id, g.grade_name, c.id AS course_id, c.name AS course_name,
                      (SELECT gf.fee FROM grade_fee gf
                       WHERE gf.grade_id = g.id AND gf.branch_id = ?
                       ORDER BY gf.id LIMIT 1) AS fee,
                      ug.created_at AS assigned_at
               FROM user_grade ug
               JOIN grade g ON g.id = ug.grade_id
               JOIN course c ON c.id = g.course_id
               WHERE ug.user_id = ?
               ORDER BY ug.created_at, ug.id"#,
        )
        .bind(branch_id)
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err)?;
        let enrolled_on = lines.iter().map(|l| l.assigned_at.date_naive()).min();

        let admission_fee: Option<i64> = match branch_id {
            Some(id) => sqlx::query_scalar("SELECT admission_fee FROM admission WHERE branch_id = ?")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await
                .map_err(db_err)?,
            None => None,
        };

        let payments = payments_of(&mut conn, student).await?;

        Ok(Some(BillingProfile {
            student_details_id: student,
            user_id: UserId::new(user_id),
            full_name: format!("{first_name} {last_name}"),
            status: status.parse()?,
            branch,
            fee_lines: lines.into_iter().map(DbFeeLine::into_domain).collect(),
            payments,
            enrolled_on,
            admission_fee,
        }))
    }

    async fn record_payment(
        &self,
        student: StudentDetailsId,
        payment_date: NaiveDate,
        status: PaymentStatus,
        amount: i64,
    ) -> Result<Payment, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        if !exists(&mut conn, "student_details", student.get()).await? {
            return Err(RepoError::NotFound);
        }

        let now = Utc::now();
        let id = sqlx::query(
            r#"INSERT INTO payment (student_details_id, payment_date, status, amount, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(student.get())
        .bind(payment_date)
        .bind(status.as_str())
        .bind(amount)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await
        .map_err(write_err)?
        .last_insert_rowid();

        tracing::info!(
            student_details_id = %student,
            payment_id = id,
            amount,
            status = status.as_str(),
            "payment recorded"
        );

        Ok(Payment {
            id: PaymentId::new(id),
            student_details_id: student,
            payment_date,
            status,
            amount,
            created_at: now,
            updated_at: now,
        })
    }

    async fn payments_of(&self, student: StudentDetailsId) -> Result<Vec<Payment>, RepoError> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        payments_of(&mut conn, student).await
    }

    async fn latest_payment(
        &self,
        student: StudentDetailsId,
        status: Option<PaymentStatus>,
    ) -> Result<Option<Payment>, RepoError> {
        let row: Option<DbPayment> = sqlx::query_as(&format!(
            "{PAYMENT_COLUMNS} WHERE student_details_id = ?1 AND (?2 IS NULL OR status = ?2) \
             ORDER BY payment_date DESC, created_at DESC, id DESC LIMIT 1"
        ))
        .bind(student.get())
        .bind(status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(DbPayment::into_domain).transpose()
    }

    async fn list_payments(&self, filter: PaymentFilter) -> Result<Vec<PaymentRecord>, RepoError> {
        let search = non_blank(filter.search.as_deref()).map(like);

        let rows: Vec<DbPaymentRecord> = sqlx::query_as(&format!(
            "SELECT p.id, p.student_details_id, p.payment_date, p.status, p.amount, \
                    u.first_name, u.last_name, {PRIMARY_BRANCH_NAME} AS branch_name, u.status AS state \
             FROM payment p \
             JOIN student_details sd ON sd.id = p.student_details_id \
             JOIN users u ON u.id = sd.user_id \
             WHERE (?1 IS NULL OR p.status = ?1) \
               AND (?2 IS NULL OR u.status = ?2) \
               AND (?3 IS NULL OR u.first_name LIKE ?3 OR u.last_name LIKE ?3 \
                    OR (u.first_name || ' ' || u.last_name) LIKE ?3 \
                    OR p.payment_date LIKE ?3 OR CAST(p.amount AS TEXT) LIKE ?3) \
             ORDER BY p.payment_date DESC, p.id DESC"
        ))
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.state.map(|s| s.as_str()))
        .bind(search)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbPaymentRecord::into_domain).collect()
    }

    async fn students_by_name(
        &self,
        name: Option<&str>,
        student: Option<StudentDetailsId>,
    ) -> Result<Vec<StudentSummary>, RepoError> {
        let name = non_blank(name).map(like);

        let rows: Vec<DbStudentSummary> = sqlx::query_as(&format!(
            "{} WHERE (?1 IS NULL OR u.first_name LIKE ?1 OR u.last_name LIKE ?1 \
                       OR (u.first_name || ' ' || u.last_name) LIKE ?1) \
               AND (?2 IS NULL OR sd.id = ?2) \
             ORDER BY u.first_name, u.last_name, sd.id",
            student_summary_select()
        ))
        .bind(name)
        .bind(student.map(|s| s.get()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(DbStudentSummary::into_domain).collect()
    }
}
