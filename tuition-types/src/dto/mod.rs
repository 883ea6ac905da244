//! Data Transfer Objects (DTOs) for requests and responses.

mod catalog;
mod payment;
mod schedule;
mod student;

pub use catalog::*;
pub use payment::*;
pub use schedule::*;
pub use student::*;
