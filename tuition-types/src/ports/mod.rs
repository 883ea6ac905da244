//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod catalog;
mod clock;
mod payment;
mod schedule;
mod student;

pub use catalog::CatalogRepository;
pub use clock::{Clock, FixedClock, SystemClock};
pub use payment::PaymentRepository;
pub use schedule::ScheduleRepository;
pub use student::StudentRepository;

/// Everything the HTTP adapter needs from storage.
pub trait Repository:
    CatalogRepository + StudentRepository + ScheduleRepository + PaymentRepository
{
}

impl<T> Repository for T where
    T: CatalogRepository + StudentRepository + ScheduleRepository + PaymentRepository
{
}
