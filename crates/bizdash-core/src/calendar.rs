//! Month-grid view of association events.

use crate::error::{DashError, Result};
use crate::record::AssociationEvent;
use crate::week::{Week, YEARS};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    if !YEARS.contains(&year) {
        return Err(DashError::InvalidMonth { year, month });
    }
    let first =
        NaiveDate::from_ymd_opt(year, month, 1).ok_or(DashError::InvalidMonth { year, month })?;
    let (ny, nm) = next_month(year, month);
    let next_first =
        NaiveDate::from_ymd_opt(ny, nm, 1).ok_or(DashError::InvalidMonth { year, month })?;
    Ok((first, next_first - Duration::days(1)))
}

pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

pub fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Parse `YYYY-MM`.
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let invalid = || DashError::invalid("month", format!("'{s}' is not YYYY-MM"));
    let (y, m) = s.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let month: u32 = m.parse().map_err(|_| invalid())?;
    month_bounds(year, month)?;
    Ok((year, month))
}

fn month_key(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub events: Vec<AssociationEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub title: String,
    pub prev: String,
    pub next: String,
    /// Monday-first rows of seven days, padded with neighbouring months.
    pub weeks: Vec<Vec<CalendarDay>>,
    pub event_count: usize,
}

impl MonthGrid {
    pub fn build(
        year: i32,
        month: u32,
        events: &[AssociationEvent],
        today: NaiveDate,
    ) -> Result<Self> {
        let (first, last) = month_bounds(year, month)?;
        let grid_start = Week::containing(first).start();
        let grid_end = Week::containing(last).end();

        let mut sorted: Vec<&AssociationEvent> = events
            .iter()
            .filter(|e| e.event_date <= grid_end && e.last_day() >= grid_start)
            .collect();
        sorted.sort_by(|a, b| a.event_date.cmp(&b.event_date).then(a.title.cmp(&b.title)));

        let mut weeks = Vec::new();
        let mut row = Vec::with_capacity(7);
        let mut day = grid_start;
        while day <= grid_end {
            row.push(CalendarDay {
                date: day,
                in_month: day.month() == month && day.year() == year,
                is_today: day == today,
                events: sorted
                    .iter()
                    .filter(|e| e.covers(day))
                    .map(|e| (*e).clone())
                    .collect(),
            });
            if row.len() == 7 {
                weeks.push(std::mem::take(&mut row));
            }
            day += Duration::days(1);
        }

        let event_count = sorted
            .iter()
            .filter(|e| e.event_date <= last && e.last_day() >= first)
            .count();
        let (py, pm) = prev_month(year, month);
        let (ny, nm) = next_month(year, month);
        Ok(Self {
            year,
            month,
            title: first.format("%B %Y").to_string(),
            prev: month_key(py, pm),
            next: month_key(ny, nm),
            weeks,
            event_count,
        })
    }
}

/// The next `n` events still running on or after `today`, soonest first.
pub fn upcoming(events: &[AssociationEvent], today: NaiveDate, n: usize) -> Vec<AssociationEvent> {
    let mut out: Vec<AssociationEvent> = events
        .iter()
        .filter(|e| e.last_day() >= today)
        .cloned()
        .collect();
    out.sort_by(|a, b| a.event_date.cmp(&b.event_date).then(a.title.cmp(&b.title)));
    out.truncate(n);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(title: &str, start: NaiveDate, end: Option<NaiveDate>) -> AssociationEvent {
        let mut e = AssociationEvent::new(title, start);
        e.end_date = end;
        e
    }

    #[test]
    fn bounds_handle_leap_years() {
        assert_eq!(
            month_bounds(2024, 2).unwrap(),
            (date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(
            month_bounds(2025, 12).unwrap(),
            (date(2025, 12, 1), date(2025, 12, 31))
        );
        assert!(matches!(
            month_bounds(2025, 13),
            Err(DashError::InvalidMonth { .. })
        ));
        assert!(month_bounds(2025, 0).is_err());
    }

    #[test]
    fn month_navigation_wraps() {
        assert_eq!(next_month(2024, 12), (2025, 1));
        assert_eq!(prev_month(2025, 1), (2024, 12));
        assert_eq!(next_month(2025, 6), (2025, 7));
    }

    #[test]
    fn parse_month_validates() {
        assert_eq!(parse_month("2025-03").unwrap(), (2025, 3));
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("March").is_err());
    }

    #[test]
    fn month_years_outside_range_are_rejected() {
        assert!(matches!(
            month_bounds(262_142, 12),
            Err(DashError::InvalidMonth { .. })
        ));
        assert!(month_bounds(0, 1).is_err());
        assert!(month_bounds(i32::MAX, 12).is_err());
        assert!(parse_month("10000-01").is_err());
        assert!(MonthGrid::build(-262_143, 1, &[], date(2025, 1, 1)).is_err());
    }

    #[test]
    fn grid_at_last_supported_month() {
        let grid = MonthGrid::build(9999, 12, &[], date(2025, 1, 1)).unwrap();
        assert_eq!(grid.next, "10000-01");
        assert_eq!(grid.weeks.last().unwrap()[6].date, date(10000, 1, 2));
    }

    #[test]
    fn grid_pads_to_full_weeks() {
        // March 2025 starts on a Saturday and ends on a Monday.
        let grid = MonthGrid::build(2025, 3, &[], date(2025, 3, 5)).unwrap();
        assert_eq!(grid.title, "March 2025");
        assert_eq!(grid.prev, "2025-02");
        assert_eq!(grid.next, "2025-04");
        assert_eq!(grid.weeks.len(), 6);
        assert!(grid.weeks.iter().all(|w| w.len() == 7));
        assert_eq!(grid.weeks[0][0].date, date(2025, 2, 24));
        assert!(!grid.weeks[0][0].in_month);
        assert_eq!(grid.weeks[5][6].date, date(2025, 4, 6));
        let today: Vec<_> = grid
            .weeks
            .iter()
            .flatten()
            .filter(|d| d.is_today)
            .collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].date, date(2025, 3, 5));
    }

    #[test]
    fn multi_day_events_span_cells() {
        let events = vec![
            event("Expo", date(2025, 3, 10), Some(date(2025, 3, 12))),
            event("Mixer", date(2025, 3, 11), None),
            event("April lunch", date(2025, 4, 20), None),
        ];
        let grid = MonthGrid::build(2025, 3, &events, date(2025, 1, 1)).unwrap();
        let day = |d: u32| {
            grid.weeks
                .iter()
                .flatten()
                .find(|c| c.date == date(2025, 3, d))
                .unwrap()
        };
        assert_eq!(day(10).events.len(), 1);
        let titles: Vec<_> = day(11).events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Expo", "Mixer"]);
        assert_eq!(day(12).events.len(), 1);
        assert!(day(13).events.is_empty());
        assert_eq!(grid.event_count, 2);
    }

    #[test]
    fn events_from_prior_month_show_in_padding() {
        let events = vec![event("Feb summit", date(2025, 2, 25), None)];
        let grid = MonthGrid::build(2025, 3, &events, date(2025, 1, 1)).unwrap();
        assert_eq!(grid.weeks[0][1].events.len(), 1);
        assert_eq!(grid.event_count, 0);
    }

    #[test]
    fn upcoming_includes_running_events() {
        let events = vec![
            event("Past", date(2025, 1, 1), None),
            event("Running", date(2025, 2, 27), Some(date(2025, 3, 2))),
            event("Later", date(2025, 4, 1), None),
            event("Soon", date(2025, 3, 5), None),
        ];
        let next = upcoming(&events, date(2025, 3, 1), 2);
        let titles: Vec<_> = next.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Running", "Soon"]);
    }
}
