//! Week and quarter arithmetic.
//!
//! The dashboard is driven by a week selector: a [`Week`] is always the Monday
//! that starts it, so any date inside the week maps to the same key.

use crate::error::{DashError, Result};
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Years a week, quarter or month may name. Arithmetic a few steps past
/// either end stays inside chrono's range.
pub const YEARS: RangeInclusive<i32> = 1..=9999;

// ---------------------------------------------------------------------------
// Week
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Week(NaiveDate);

impl Week {
    /// The week (Monday-based) that contains `date`.
    pub fn containing(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_monday() as i64;
        Week(date - Duration::days(offset))
    }

    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn start(self) -> NaiveDate {
        self.0
    }

    /// Sunday of this week.
    pub fn end(self) -> NaiveDate {
        self.0 + Duration::days(6)
    }

    pub fn next(self) -> Self {
        Week(self.0 + Duration::days(7))
    }

    pub fn prev(self) -> Self {
        Week(self.0 - Duration::days(7))
    }

    /// ISO week number, e.g. `2025-W02`.
    pub fn iso(self) -> String {
        let iw = self.0.iso_week();
        format!("{}-W{:02}", iw.year(), iw.week())
    }

    /// Human label shown above the weekly forms.
    pub fn label(self) -> String {
        format!("Week of {}", self.0.format("%b %-d, %Y"))
    }

    /// Parse `YYYY-MM-DD` (any day of the week) or ISO `YYYY-Www`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some((year, week)) = s.split_once("-W").or_else(|| s.split_once("-w")) {
            let year: i32 = year
                .parse()
                .map_err(|_| DashError::InvalidWeek(s.to_string()))?;
            let week: u32 = week
                .parse()
                .map_err(|_| DashError::InvalidWeek(s.to_string()))?;
            if !YEARS.contains(&year) {
                return Err(DashError::InvalidWeek(s.to_string()));
            }
            return NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
                .map(Week)
                .ok_or_else(|| DashError::InvalidWeek(s.to_string()));
        }
        let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| DashError::InvalidWeek(s.to_string()))?;
        if !YEARS.contains(&date.year()) {
            return Err(DashError::InvalidWeek(s.to_string()));
        }
        Ok(Self::containing(date))
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl std::str::FromStr for Week {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self> {
        Week::parse(s)
    }
}

impl TryFrom<String> for Week {
    type Error = DashError;

    fn try_from(s: String) -> Result<Self> {
        Week::parse(&s)
    }
}

impl From<Week> for String {
    fn from(w: Week) -> String {
        w.to_string()
    }
}

// ---------------------------------------------------------------------------
// Quarter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quarter {
    year: i32,
    q: u32,
}

impl Quarter {
    pub fn new(year: i32, q: u32) -> Result<Self> {
        if !(1..=4).contains(&q) || !YEARS.contains(&year) {
            return Err(DashError::InvalidQuarter(format!("{year}-Q{q}")));
        }
        Ok(Quarter { year, q })
    }

    pub fn year(self) -> i32 {
        self.year
    }

    /// Quarter number, 1..=4.
    pub fn q(self) -> u32 {
        self.q
    }

    pub fn containing(date: NaiveDate) -> Self {
        Quarter {
            year: date.year(),
            q: (date.month() - 1) / 3 + 1,
        }
    }

    pub fn current() -> Self {
        Self::containing(Local::now().date_naive())
    }

    pub fn start(self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, (self.q - 1) * 3 + 1, 1)
            .ok_or_else(|| DashError::InvalidQuarter(self.to_string()))
    }

    pub fn end(self) -> Result<NaiveDate> {
        self.next()
            .start()?
            .pred_opt()
            .ok_or_else(|| DashError::InvalidQuarter(self.to_string()))
    }

    pub fn next(self) -> Self {
        if self.q == 4 {
            Quarter {
                year: self.year + 1,
                q: 1,
            }
        } else {
            Quarter {
                year: self.year,
                q: self.q + 1,
            }
        }
    }

    pub fn prev(self) -> Self {
        if self.q == 1 {
            Quarter {
                year: self.year - 1,
                q: 4,
            }
        } else {
            Quarter {
                year: self.year,
                q: self.q - 1,
            }
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let upper = trimmed.to_ascii_uppercase();
        let (year, q) = upper
            .split_once("-Q")
            .ok_or_else(|| DashError::InvalidQuarter(trimmed.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| DashError::InvalidQuarter(trimmed.to_string()))?;
        let q: u32 = q
            .parse()
            .map_err(|_| DashError::InvalidQuarter(trimmed.to_string()))?;
        Quarter::new(year, q)
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Q{}", self.year, self.q)
    }
}

impl std::str::FromStr for Quarter {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self> {
        Quarter::parse(s)
    }
}

impl TryFrom<String> for Quarter {
    type Error = DashError;

    fn try_from(s: String) -> Result<Self> {
        Quarter::parse(&s)
    }
}

impl From<Quarter> for String {
    fn from(q: Quarter) -> String {
        q.to_string()
    }
}
