//! Database row types and their conversion into domain types.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::FromRow;

use tuition_types::{
    Branch, BranchId, Course, CourseId, CurrencyCode, FeeLine, Grade, GradeFee, GradeFeeId,
    GradeFeeDetail, GradeFeeView, GradeId, GradeWithCourse, Lecturer, Payment, PaymentId, PaymentRecord,
    RepoError, ScheduleEntry, Slot, SlotId, StudentDetails, StudentDetailsId, StudentGrade,
    StudentSummary, User, UserId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Catalog rows
// ─────────────────────────────────────────────────────────────────────────────

#[derive(FromRow)]
pub struct DbBranch {
    pub id: i64,
    pub branch_name: String,
    pub currency: String,
    pub status: String,
}

impl DbBranch {
    pub fn into_domain(self) -> Result<Branch, RepoError> {
        Ok(Branch {
            id: BranchId::new(self.id),
            branch_name: self.branch_name,
            currency: CurrencyCode::parse(&self.currency)?,
            status: self.status.parse()?,
        })
    }
}

#[derive(FromRow)]
pub struct DbCourse {
    pub id: i64,
    pub course_code: String,
    pub name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl DbCourse {
    pub fn into_domain(self) -> Result<Course, RepoError> {
        Ok(Course {
            id: CourseId::new(self.id),
            course_code: self.course_code,
            name: self.name,
            status: self.status.parse()?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
pub struct DbGrade {
    pub id: i64,
    pub grade_name: String,
    pub course_id: i64,
    pub status: String,
}

impl DbGrade {
    pub fn into_domain(self) -> Result<Grade, RepoError> {
        Ok(Grade {
            id: GradeId::new(self.id),
            grade_name: self.grade_name,
            course_id: CourseId::new(self.course_id),
            status: self.status.parse()?,
        })
    }
}

/// Grade joined with its course name.
#[derive(FromRow)]
pub struct DbGradeWithCourse {
    #[sqlx(flatten)]
    pub grade: DbGrade,
    pub course_name: String,
}

impl DbGradeWithCourse {
    pub fn into_domain(self) -> Result<GradeWithCourse, RepoError> {
        Ok(GradeWithCourse {
            grade: self.grade.into_domain()?,
            course_name: self.course_name,
        })
    }
}

#[derive(FromRow)]
pub struct DbGradeFee {
    pub id: i64,
    pub grade_id: i64,
    pub branch_id: i64,
    pub fee: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbGradeFee {
    pub fn into_domain(self) -> GradeFee {
        GradeFee {
            id: GradeFeeId::new(self.id),
            grade_id: GradeId::new(self.grade_id),
            branch_id: BranchId::new(self.branch_id),
            fee: self.fee,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Grade fee joined with grade and branch names.
#[derive(FromRow)]
pub struct DbGradeFeeView {
    #[sqlx(flatten)]
    pub fee: DbGradeFee,
    pub grade_name: String,
    pub branch_name: String,
    pub currency: String,
}

impl DbGradeFeeView {
    pub fn into_domain(self) -> Result<GradeFeeView, RepoError> {
        Ok(GradeFeeView {
            fee: self.fee.into_domain(),
            grade_name: self.grade_name,
            branch_name: self.branch_name,
            currency: CurrencyCode::parse(&self.currency)?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User & student rows
// ─────────────────────────────────────────────────────────────────────────────

#[derive(FromRow)]
pub struct DbUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub username: String,
    pub email: String,
    pub phn_num: String,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbUser {
    pub fn into_domain(self) -> Result<User, RepoError> {
        Ok(User {
            id: UserId::new(self.id),
            first_name: self.first_name,
            last_name: self.last_name,
            gender: self.gender,
            username: self.username,
            email: self.email,
            phn_num: self.phn_num,
            address: self.address,
            date_of_birth: self.date_of_birth,
            role: self.role.parse()?,
            status: self.status.parse()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
pub struct DbStudentDetails {
    pub id: i64,
    pub user_id: i64,
    pub student_no: String,
    pub photo_url: String,
    pub ice_contact: Option<String>,
    pub salutation: Option<String>,
}

impl DbStudentDetails {
    pub fn into_domain(self) -> StudentDetails {
        StudentDetails {
            id: StudentDetailsId::new(self.id),
            user_id: UserId::new(self.user_id),
            student_no: self.student_no,
            photo_url: self.photo_url,
            ice_contact: self.ice_contact,
            salutation: self.salutation,
        }
    }
}

#[derive(FromRow)]
pub struct DbStudentGrade {
    pub grade_id: i64,
    pub grade_name: String,
    pub course_id: i64,
    pub course_name: String,
    pub assigned_at: DateTime<Utc>,
}

impl DbStudentGrade {
    pub fn into_domain(self) -> StudentGrade {
        StudentGrade {
            grade_id: GradeId::new(self.grade_id),
            grade_name: self.grade_name,
            course_id: CourseId::new(self.course_id),
            course_name: self.course_name,
            assigned_at: self.assigned_at,
        }
    }
}

#[derive(FromRow)]
pub struct DbStudentSummary {
    pub student_details_id: i64,
    pub user_id: i64,
    pub student_no: String,
    pub photo_url: String,
    pub branch_name: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phn_num: String,
    pub status: String,
}

impl DbStudentSummary {
    pub fn into_domain(self) -> Result<StudentSummary, RepoError> {
        Ok(StudentSummary {
            student_details_id: StudentDetailsId::new(self.student_details_id),
            user_id: UserId::new(self.user_id),
            student_no: self.student_no,
            photo_url: self.photo_url,
            branch_name: self.branch_name,
            full_name: format!("{} {}", self.first_name, self.last_name),
            email: self.email,
            phn_num: self.phn_num,
            status: self.status.parse()?,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Slot rows
// ─────────────────────────────────────────────────────────────────────────────

#[derive(FromRow)]
pub struct DbSlot {
    pub id: i64,
    pub branch_id: i64,
    pub course_id: i64,
    pub grade_id: i64,
    pub day: String,
    pub st_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

impl DbSlot {
    pub fn into_domain(self) -> Result<Slot, RepoError> {
        Ok(Slot {
            id: SlotId::new(self.id),
            branch_id: BranchId::new(self.branch_id),
            course_id: CourseId::new(self.course_id),
            grade_id: GradeId::new(self.grade_id),
            day: self.day.parse()?,
            st_time: self.st_time,
            end_time: self.end_time,
            created_at: self.created_at,
        })
    }
}

/// Slot with its current number of student bookings.
#[derive(FromRow)]
pub struct DbSlotLoad {
    #[sqlx(flatten)]
    pub slot: DbSlot,
    pub booked: i64,
}

#[derive(FromRow)]
pub struct DbScheduleEntry {
    pub slot_id: i64,
    pub day: String,
    pub st_time: NaiveTime,
    pub end_time: NaiveTime,
    pub branch_id: i64,
    pub branch_name: String,
    pub course_id: i64,
    pub course_name: String,
    pub grade_id: i64,
    pub grade_name: String,
    pub teacher_id: Option<i64>,
    pub teacher_first_name: Option<String>,
    pub teacher_last_name: Option<String>,
    pub student_count: i64,
}

impl DbScheduleEntry {
    pub fn into_domain(self) -> Result<ScheduleEntry, RepoError> {
        let teacher_name = match (self.teacher_first_name, self.teacher_last_name) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            _ => None,
        };
        Ok(ScheduleEntry {
            slot_id: SlotId::new(self.slot_id),
            day: self.day.parse()?,
            st_time: self.st_time,
            end_time: self.end_time,
            branch_id: BranchId::new(self.branch_id),
            branch_name: self.branch_name,
            course_id: CourseId::new(self.course_id),
            course_name: self.course_name,
            grade_id: GradeId::new(self.grade_id),
            grade_name: self.grade_name,
            teacher_id: self.teacher_id.map(UserId::new),
            teacher_name,
            student_count: self.student_count,
        })
    }
}

#[derive(FromRow)]
pub struct DbLecturer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl DbLecturer {
    pub fn into_domain(self) -> Lecturer {
        Lecturer {
            id: UserId::new(self.id),
            full_name: format!("{} {}", self.first_name, self.last_name),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment rows
// ─────────────────────────────────────────────────────────────────────────────

#[derive(FromRow)]
pub struct DbPayment {
    pub id: i64,
    pub student_details_id: i64,
    pub payment_date: NaiveDate,
    pub status: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbPayment {
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        Ok(Payment {
            id: PaymentId::new(self.id),
            student_details_id: StudentDetailsId::new(self.student_details_id),
            payment_date: self.payment_date,
            status: self.status.parse()?,
            amount: self.amount,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Payment joined with the student's name, primary branch and state.
#[derive(FromRow)]
pub struct DbPaymentRecord {
    pub id: i64,
    pub student_details_id: i64,
    pub payment_date: NaiveDate,
    pub status: String,
    pub amount: i64,
    pub first_name: String,
    pub last_name: String,
    pub branch_name: Option<String>,
    pub state: String,
}

impl DbPaymentRecord {
    pub fn into_domain(self) -> Result<PaymentRecord, RepoError> {
        Ok(PaymentRecord {
            id: PaymentId::new(self.id),
            student_details_id: StudentDetailsId::new(self.student_details_id),
            payment_date: self.payment_date,
            status: self.status.parse()?,
            amount: self.amount,
            full_name: format!("{} {}", self.first_name, self.last_name),
            branch_name: self.branch_name,
            state: self.state.parse()?,
        })
    }
}

/// Enrolled grade priced at the student's branch (fee is NULL when the
/// branch has no fee row for the grade).
#[derive(FromRow)]
pub struct DbFeeLine {
    pub grade_id: i64,
    pub grade_name: String,
    pub course_id: i64,
    pub course_name: String,
    pub fee: Option<i64>,
    pub assigned_at: DateTime<Utc>,
}

impl DbFeeLine {
    pub fn into_domain(self) -> FeeLine {
        FeeLine {
            grade_id: GradeId::new(self.grade_id),
            grade_name: self.grade_name,
            course_id: CourseId::new(self.course_id),
            course_name: self.course_name,
            fee: self.fee.unwrap_or(0),
        }
    }
}

/// Grade fee left-joined with its branch, for nested course listings.
#[derive(FromRow)]
pub struct DbGradeFeeBranch {
    #[sqlx(flatten)]
    pub fee: DbGradeFee,
    pub branch_name: Option<String>,
    pub currency: Option<String>,
    pub branch_status: Option<String>,
}

impl DbGradeFeeBranch {
    pub fn into_domain(self) -> Result<GradeFeeDetail, RepoError> {
        let branch = match (self.branch_name, self.currency, self.branch_status) {
            (Some(branch_name), Some(currency), Some(status)) => Some(
                DbBranch {
                    id: self.fee.branch_id,
                    branch_name,
                    currency,
                    status,
                }
                .into_domain()?,
            ),
            _ => None,
        };
        Ok(GradeFeeDetail {
            fee: self.fee.into_domain(),
            branch,
        })
    }
}
