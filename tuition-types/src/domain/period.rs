//! Calendar buckets used by billing and scheduling.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::DomainError;

// ─────────────────────────────────────────────────────────────────────────────
// YearMonth
// ─────────────────────────────────────────────────────────────────────────────

/// A calendar month qualified by its year.
///
/// Internally the first day of the month. Serialized as `YYYY-MM`, which
/// also makes it usable as a JSON object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(NaiveDate);

impl YearMonth {
    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self(date - Days::new(u64::from(date.day0())))
    }

    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    /// The given day of this month, clamped to the first when out of range.
    pub fn day(&self, day: u32) -> NaiveDate {
        self.0.with_day(day).unwrap_or(self.0)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + Months::new(1))
    }

    pub fn prev(&self) -> Self {
        Self(self.0 - Months::new(1))
    }

    /// Every month from `self` through `end`, inclusive. Empty when `end` is earlier.
    pub fn through(self, end: YearMonth) -> impl Iterator<Item = YearMonth> {
        std::iter::successors(Some(self), |m| Some(m.next())).take_while(move |m| *m <= end)
    }

    /// Long label, e.g. `July 2025`.
    pub fn label(&self) -> String {
        self.0.format("%B %Y").to_string()
    }

    /// Short label, e.g. `Jul 2025`.
    pub fn short_label(&self) -> String {
        self.0.format("%b %Y").to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m"))
    }
}

impl FromStr for YearMonth {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| DomainError::ValidationError(format!("Invalid month: {s}")))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Day
// ─────────────────────────────────────────────────────────────────────────────

/// Day of the week a slot runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// Week order used in listings: the school week starts on Saturday.
    pub const WEEK: [Day; 7] = [
        Day::Saturday,
        Day::Sunday,
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }

    /// Position in [`Day::WEEK`].
    pub fn rank(&self) -> usize {
        Self::WEEK.iter().position(|d| d == self).unwrap_or(0)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Day {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::WEEK
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::ValidationError(format!("Invalid day: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_of_any_day_is_first() {
        let m = YearMonth::of(date(2025, 7, 23));
        assert_eq!(m.first_day(), date(2025, 7, 1));
        assert_eq!(m.to_string(), "2025-07");
    }

    #[test]
    fn next_rolls_over_year() {
        let dec = YearMonth::new(2024, 12).unwrap();
        assert_eq!(dec.next(), YearMonth::new(2025, 1).unwrap());
        assert_eq!(dec.next().prev(), dec);
    }

    #[test]
    fn through_is_inclusive_and_year_aware() {
        let start = YearMonth::new(2024, 11).unwrap();
        let end = YearMonth::new(2025, 2).unwrap();
        let months: Vec<String> = start.through(end).map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
        assert_eq!(end.through(start).count(), 0);
    }

    #[test]
    fn labels() {
        let m = YearMonth::new(2025, 7).unwrap();
        assert_eq!(m.label(), "July 2025");
        assert_eq!(m.short_label(), "Jul 2025");
        assert_eq!(m.day(11), date(2025, 7, 11));
    }

    #[test]
    fn parse_round_trips_through_json() {
        let m: YearMonth = serde_json::from_str("\"2025-03\"").unwrap();
        assert_eq!(m, YearMonth::new(2025, 3).unwrap());
        assert!("2025-13".parse::<YearMonth>().is_err());
    }

    #[test]
    fn day_parse_is_case_insensitive() {
        assert_eq!("saturday".parse::<Day>().unwrap(), Day::Saturday);
        assert!("Funday".parse::<Day>().is_err());
    }

    #[test]
    fn week_starts_on_saturday() {
        assert_eq!(Day::Saturday.rank(), 0);
        assert_eq!(Day::Friday.rank(), 6);
    }
}
