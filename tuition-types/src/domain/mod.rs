//! Domain models for the tuition center.

mod ids;
pub mod branch;
pub mod course;
pub mod money;
pub mod payment;
pub mod period;
pub mod slot;
pub mod user;

pub use branch::{AdmissionFee, Branch, RecordStatus};
pub use course::{Course, Grade, GradeFee};
pub use ids::{
    BranchId, CourseId, GradeFeeId, GradeId, PaymentId, SlotId, StudentDetailsId, UserId,
};
pub use money::{CurrencyCode, ensure_non_negative};
pub use payment::{Payment, PaymentStatus};
pub use period::{Day, YearMonth};
pub use slot::{Booking, MAX_SLOTS_PER_DAY, SLOT_CAPACITY, Slot};
pub use user::{Role, StudentDetails, User, UserStatus};
