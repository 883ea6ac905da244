//! Tuition Application Service
//!
//! Orchestrates domain operations through the repository ports.
//! Contains NO infrastructure logic - pure business orchestration.

mod catalog;
mod payment;
mod schedule;
mod student;

use std::str::FromStr;

use chrono::NaiveDate;

use tuition_types::billing::DEFAULT_ADMISSION_FEE;
use tuition_types::{ALL_FILTER, AppError, Clock, DomainError, RepoError, Repository, SystemClock};

/// Application service for the tuition center.
///
/// Generic over `R: Repository` - the adapter is injected at compile time.
/// "Today" comes from the injected [`Clock`] so fee figures are reproducible
/// in tests.
pub struct TuitionService<R: Repository> {
    repo: R,
    clock: Box<dyn Clock>,
    default_admission_fee: i64,
}

impl<R: Repository> TuitionService<R> {
    /// Creates a service using the system clock and the stock admission fee.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            clock: Box::new(SystemClock),
            default_admission_fee: DEFAULT_ADMISSION_FEE,
        }
    }

    /// Replaces the source of "today".
    pub fn with_clock(mut self, clock: impl Clock) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Admission fee charged to students whose branch has none configured.
    pub fn with_default_admission_fee(mut self, fee: i64) -> Self {
        self.default_admission_fee = fee;
        self
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}

/// Parses an optional listing filter. Absent, blank and `All` mean no filter.
pub(crate) fn parse_filter<T>(raw: Option<&str>) -> Result<Option<T>, AppError>
where
    T: FromStr<Err = DomainError>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.eq_ignore_ascii_case(ALL_FILTER) => Ok(None),
        Some(v) => v.parse().map(Some).map_err(AppError::from),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn not_found(what: impl std::fmt::Display) -> AppError {
    AppError::NotFound(format!("{what} not found"))
}

/// Maps a repository `NotFound` to a message naming `what`.
fn missing(what: impl std::fmt::Display) -> impl FnOnce(RepoError) -> AppError {
    move |e| match e {
        RepoError::NotFound => not_found(what),
        e => e.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuition_types::{PaymentStatus, UserStatus};

    #[test]
    fn all_and_blank_disable_filter() {
        assert_eq!(parse_filter::<PaymentStatus>(None).unwrap(), None);
        assert_eq!(parse_filter::<PaymentStatus>(Some(" ")).unwrap(), None);
        assert_eq!(parse_filter::<UserStatus>(Some("all")).unwrap(), None);
    }

    #[test]
    fn filter_values_are_case_insensitive() {
        assert_eq!(
            parse_filter::<PaymentStatus>(Some("PAID")).unwrap(),
            Some(PaymentStatus::Paid)
        );
        assert_eq!(
            parse_filter::<UserStatus>(Some("Inactive")).unwrap(),
            Some(UserStatus::Inactive)
        );
    }

    #[test]
    fn unknown_status_is_bad_request() {
        let err = parse_filter::<PaymentStatus>(Some("overdue")).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("'paid' or 'pending'")));
    }
}
