//! Schedule port: slots, bookings and master data.

use chrono::NaiveTime;

use crate::domain::{BranchId, Booking, Course, CourseId, Day, GradeId, SlotId, UserId};
use crate::dto::{
    AvailableSlot, CreateScheduleRequest, CreateScheduleResult, GradeWithCourse, Lecturer,
    ScheduleEntry, SchedulePage, ScheduleSearchQuery, UpdateScheduleRequest,
};
use crate::error::RepoError;

#[async_trait::async_trait]
pub trait ScheduleRepository: Send + Sync + 'static {
    /// Slots of the course+grade at the branch with fewer than
    /// `SLOT_CAPACITY` student bookings.
    async fn available_slots(
        &self,
        branch: BranchId,
        course: CourseId,
        grade: GradeId,
    ) -> Result<Vec<AvailableSlot>, RepoError>;

    /// Books a student into a slot, enforcing capacity.
    async fn book_slot(&self, student: UserId, slot: SlotId) -> Result<Booking, RepoError>;

    async fn create_schedule(
        &self,
        req: CreateScheduleRequest,
    ) -> Result<CreateScheduleResult, RepoError>;

    /// Ordered by day (Saturday first) then start time. `page` is 1-based.
    async fn list_schedule(
        &self,
        page: u32,
        limit: u32,
        course: Option<CourseId>,
    ) -> Result<SchedulePage, RepoError>;

    async fn get_schedule(&self, slot: SlotId) -> Result<Option<ScheduleEntry>, RepoError>;

    async fn update_schedule(
        &self,
        slot: SlotId,
        req: UpdateScheduleRequest,
    ) -> Result<ScheduleEntry, RepoError>;

    async fn delete_schedule(&self, slot: SlotId) -> Result<(), RepoError>;

    async fn search_schedule(
        &self,
        query: ScheduleSearchQuery,
    ) -> Result<Vec<ScheduleEntry>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Master data
    // ─────────────────────────────────────────────────────────────────────────────

    async fn master_courses(&self) -> Result<Vec<Course>, RepoError>;

    async fn master_grades(&self) -> Result<Vec<GradeWithCourse>, RepoError>;

    /// Distinct days that have at least one slot.
    async fn slot_days(&self) -> Result<Vec<Day>, RepoError>;

    /// Distinct (start, end) pairs of all slots.
    async fn slot_times(&self) -> Result<Vec<(NaiveTime, NaiveTime)>, RepoError>;

    /// Teachers ordered by full name.
    async fn lecturers(&self) -> Result<Vec<Lecturer>, RepoError>;
}
