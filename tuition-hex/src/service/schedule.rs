//! Slot booking, teacher schedules and master data.

use std::collections::BTreeSet;

use tuition_types::{
    AppError, AvailableSlot, AvailableSlotsQuery, Booking, Course, CreateScheduleRequest,
    CreateScheduleResult, DEFAULT_PAGE_LIMIT, Day, GradeWithCourse, Lecturer, Repository,
    ScheduleEntry, ScheduleListQuery, SchedulePage, ScheduleSearchQuery, SlotId, TimeKind,
    TimePoint, UpdateScheduleRequest, UserId,
};

use super::{TuitionService, missing, not_found};

impl<R: Repository> TuitionService<R> {
    // ─────────────────────────────────────────────────────────────────────────────
    // Slots
    // ─────────────────────────────────────────────────────────────────────────────

    /// Open slots for a branch, course and grade; all three are required.
    pub async fn available_slots(
        &self,
        query: AvailableSlotsQuery,
    ) -> Result<Vec<AvailableSlot>, AppError> {
        let (Some(branch), Some(course), Some(grade)) =
            (query.branch_id, query.course_id, query.grade_id)
        else {
            return Err(AppError::BadRequest(
                "branchId, courseId and gradeId are required".into(),
            ));
        };
        self.repo
            .available_slots(branch, course, grade)
            .await
            .map_err(Into::into)
    }

    pub async fn book_slot(&self, student: UserId, slot: SlotId) -> Result<Booking, AppError> {
        self.repo.book_slot(student, slot).await.map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Schedule
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn create_schedule(
        &self,
        req: CreateScheduleRequest,
    ) -> Result<CreateScheduleResult, AppError> {
        if req.days.is_empty() {
            return Err(AppError::BadRequest("At least one day is required".into()));
        }
        if req.start_time >= req.end_time {
            return Err(AppError::BadRequest(
                "Start time must be before end time".into(),
            ));
        }
        self.repo.create_schedule(req).await.map_err(Into::into)
    }

    pub async fn list_schedule(&self, query: ScheduleListQuery) -> Result<SchedulePage, AppError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1);
        self.repo
            .list_schedule(page, limit, query.course_id)
            .await
            .map_err(Into::into)
    }

    pub async fn get_schedule(&self, slot: SlotId) -> Result<ScheduleEntry, AppError> {
        self.repo
            .get_schedule(slot)
            .await?
            .ok_or_else(|| not_found(format!("Schedule {slot}")))
    }

    pub async fn update_schedule(
        &self,
        slot: SlotId,
        req: UpdateScheduleRequest,
    ) -> Result<ScheduleEntry, AppError> {
        self.repo
            .update_schedule(slot, req)
            .await
            .map_err(missing(format!("Schedule {slot}")))
    }

    pub async fn delete_schedule(&self, slot: SlotId) -> Result<(), AppError> {
        self.repo
            .delete_schedule(slot)
            .await
            .map_err(missing(format!("Schedule {slot}")))
    }

    pub async fn search_schedule(
        &self,
        query: ScheduleSearchQuery,
    ) -> Result<Vec<ScheduleEntry>, AppError> {
        self.repo.search_schedule(query).await.map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Master data
    // ─────────────────────────────────────────────────────────────────────────────

    pub async fn master_courses(&self) -> Result<Vec<Course>, AppError> {
        self.repo.master_courses().await.map_err(Into::into)
    }

    pub async fn master_grades(&self) -> Result<Vec<GradeWithCourse>, AppError> {
        self.repo.master_grades().await.map_err(Into::into)
    }

    pub async fn slot_days(&self) -> Result<Vec<Day>, AppError> {
        self.repo.slot_days().await.map_err(Into::into)
    }

    /// Distinct start and/or end times of all slots, earliest first.
    pub async fn time_points(&self, kind: TimeKind) -> Result<Vec<TimePoint>, AppError> {
        let pairs = self.repo.slot_times().await?;
        let times: BTreeSet<_> = pairs
            .into_iter()
            .flat_map(|(start, end)| match kind {
                TimeKind::Start => vec![start],
                TimeKind::End => vec![end],
                TimeKind::Both => vec![start, end],
            })
            .collect();
        Ok(times.into_iter().map(TimePoint::new).collect())
    }

    pub async fn lecturers(&self) -> Result<Vec<Lecturer>, AppError> {
        self.repo.lecturers().await.map_err(Into::into)
    }
}
