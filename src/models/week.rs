//! ISO 8601 week keys
//!
//! Weekly report sections and call-log folders are keyed by ISO week number
//! together with its ISO week-numbering year.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An ISO week (`2025-W40`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IsoWeek {
    /// ISO week-numbering year
    pub year: i32,
    /// Week number, 1..=53
    pub week: u32,
}

impl IsoWeek {
    /// Create a week key; returns None for a week the year does not have
    pub fn new(year: i32, week: u32) -> Option<Self> {
        NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).map(|_| Self { year, week })
    }

    /// The ISO week containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// The week containing today (local time)
    pub fn current() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }

    /// Monday of this week
    pub fn start_date(&self) -> NaiveDate {
        NaiveDate::from_isoywd_opt(self.year, self.week, Weekday::Mon)
            .unwrap_or(NaiveDate::MIN)
    }

    /// Sunday of this week
    pub fn end_date(&self) -> NaiveDate {
        self.start_date() + Duration::days(6)
    }

    /// Check if a date falls within this week
    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::from_date(date) == *self
    }

    /// The following week
    pub fn next(&self) -> Self {
        Self::from_date(self.start_date() + Duration::days(7))
    }

    /// The preceding week
    pub fn prev(&self) -> Self {
        Self::from_date(self.start_date() - Duration::days(7))
    }

    /// Parse "2025-W40" or "2025-40"
    pub fn parse(s: &str) -> Option<Self> {
        let (year, week) = s.trim().split_once('-')?;
        let week = week.trim_start_matches(['W', 'w']);
        Self::new(year.parse().ok()?, week.parse().ok()?)
    }

    /// Human label used for bucket headers: "Week 40, 2025 (Sep 29 - Oct 05)"
    pub fn label(&self) -> String {
        format!(
            "{} ({} - {})",
            self,
            self.start_date().format("%b %d"),
            self.end_date().format("%b %d")
        )
    }
}

impl fmt::Display for IsoWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Week {}, {}", self.week, self.year)
    }
}
