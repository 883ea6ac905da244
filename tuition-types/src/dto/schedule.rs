//! Slot booking and schedule DTOs.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{BranchId, CourseId, Day, GradeId, Slot, SlotId, UserId};

/// Default page size of the schedule listing.
pub const DEFAULT_PAGE_LIMIT: u32 = 30;

// ─────────────────────────────────────────────────────────────────────────────
// Slot DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// All three filters are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AvailableSlotsQuery {
    #[serde(default, alias = "branchId")]
    pub branch_id: Option<BranchId>,
    #[serde(default, alias = "courseId")]
    pub course_id: Option<CourseId>,
    #[serde(default, alias = "gradeId")]
    pub grade_id: Option<GradeId>,
}

/// Slot that still has room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AvailableSlot {
    #[serde(flatten)]
    pub slot: Slot,
    /// Students currently booked
    pub booked: i64,
    pub remaining: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Schedule DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Creates one slot per requested day for a teacher.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateScheduleRequest {
    #[serde(alias = "user_id")]
    pub teacher_id: UserId,
    pub branch_id: BranchId,
    pub course_id: CourseId,
    pub grade_id: GradeId,
    pub days: Vec<Day>,
    #[schema(value_type = String, example = "15:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "17:00:00")]
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreateScheduleResult {
    pub created: Vec<Slot>,
    /// Days where the teacher already had an identical slot
    pub skipped: Vec<Day>,
}

/// Slot joined with branch, course, grade and teacher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScheduleEntry {
    pub slot_id: SlotId,
    pub day: Day,
    #[schema(value_type = String)]
    pub st_time: NaiveTime,
    #[schema(value_type = String)]
    pub end_time: NaiveTime,
    pub branch_id: BranchId,
    pub branch_name: String,
    pub course_id: CourseId,
    pub course_name: String,
    pub grade_id: GradeId,
    pub grade_name: String,
    pub teacher_id: Option<UserId>,
    pub teacher_name: Option<String>,
    pub student_count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ScheduleListQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub course_id: Option<CourseId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SchedulePage {
    pub items: Vec<ScheduleEntry>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: u32,
}

/// Partial schedule update. A new teacher replaces the current assignment.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateScheduleRequest {
    #[serde(default, alias = "user_id")]
    pub teacher_id: Option<UserId>,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
    #[serde(default)]
    pub course_id: Option<CourseId>,
    #[serde(default)]
    pub grade_id: Option<GradeId>,
    #[serde(default)]
    pub day: Option<Day>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
}

/// Substring filters over the joined schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ScheduleSearchQuery {
    #[serde(default)]
    pub lecturer_name: Option<String>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub day: Option<Day>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Master data
// ─────────────────────────────────────────────────────────────────────────────

/// Which slot boundaries the time-point listing returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeKind {
    Start,
    End,
    #[default]
    Both,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TimeSlotQuery {
    #[serde(default, rename = "type")]
    pub kind: Option<TimeKind>,
}

/// A distinct slot boundary with a 12-hour label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimePoint {
    #[schema(value_type = String, example = "15:00:00")]
    pub time: NaiveTime,
    #[schema(example = "3:00 PM")]
    pub label: String,
}

impl TimePoint {
    pub fn new(time: NaiveTime) -> Self {
        Self {
            time,
            label: time.format("%-I:%M %p").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Lecturer {
    pub id: UserId,
    pub full_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_point_label_is_twelve_hour() {
        let t = NaiveTime::from_hms_opt(15, 5, 0).unwrap();
        assert_eq!(TimePoint::new(t).label, "3:05 PM");
        let m = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(TimePoint::new(m).label, "9:00 AM");
    }

    #[test]
    fn schedule_request_accepts_user_id() {
        let req: CreateScheduleRequest = serde_json::from_str(
            r#"{"user_id":4,"branch_id":1,"course_id":2,"grade_id":3,
                "days":["Monday","Saturday"],"start_time":"15:00:00","end_time":"17:00:00"}"#,
        )
        .unwrap();
        assert_eq!(req.teacher_id, UserId::new(4));
        assert_eq!(req.days, vec![Day::Monday, Day::Saturday]);
    }
}
