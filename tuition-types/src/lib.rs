//! # Tuition Types
//!
//! Domain types and port traits for the tuition center administration service.
//! This crate has ZERO external IO dependencies - only data structures,
//! billing rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Branch, Course, Grade, User, Slot, Payment)
//! - `billing` - Fee computation and pending-month reconstruction
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod billing;
pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use billing::{
    BillingAccount, FeeLine, FeeQuote, LatestState, LedgerMonth, MonthStatus, NextMonthFee,
    PendingEntry, PendingLedger,
};
pub use domain::{
    AdmissionFee, Booking, Branch, BranchId, Course, CourseId, CurrencyCode, Day, Grade,
    GradeFee, GradeFeeId, GradeId, Payment, PaymentId, PaymentStatus, RecordStatus, Role, Slot,
    SlotId, StudentDetails, StudentDetailsId, User, UserId, UserStatus, YearMonth,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::{
    CatalogRepository, Clock, FixedClock, PaymentRepository, Repository, ScheduleRepository,
    StudentRepository, SystemClock,
};
