//! Weekly time slots and bookings.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{BranchId, CourseId, GradeId, SlotId, UserId};
use super::period::Day;

/// Maximum number of students booked into one slot.
pub const SLOT_CAPACITY: i64 = 10;

/// Maximum number of slots a branch runs on the same day.
pub const MAX_SLOTS_PER_DAY: i64 = 10;

/// A recurring weekly block for a course and grade at a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Slot {
    pub id: SlotId,
    pub branch_id: BranchId,
    pub course_id: CourseId,
    pub grade_id: GradeId,
    pub day: Day,
    #[schema(value_type = String, example = "15:00:00")]
    pub st_time: NaiveTime,
    #[schema(value_type = String, example = "17:00:00")]
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

/// Assignment of a user (student or teacher) to a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: i64,
    pub user_id: UserId,
    pub slot_id: SlotId,
}
