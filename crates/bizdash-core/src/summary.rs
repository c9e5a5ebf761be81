//! Small aggregations shown in the tab headers.

use crate::parse::{parse_attendees, parse_money, parse_scorecard, parse_todos};
use crate::record::{Association, Issue, Level10Meeting, Rock, Target};
use crate::types::{IssueStatus, Priority, RockStatus, TargetStage};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `part / whole` as a percentage with one decimal; 0 when `whole` is 0.
pub fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    ((part as f64 / whole as f64) * 1000.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Level 10
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetingSummary {
    pub attendees: usize,
    pub scorecard_metrics: usize,
    pub scorecard_on_track: usize,
    pub scorecard_on_track_pct: f64,
    pub todos_total: usize,
    pub todos_done: usize,
    pub todos_done_pct: f64,
    pub rating: Option<u8>,
}

impl MeetingSummary {
    pub fn of(meeting: &Level10Meeting) -> Self {
        let scorecard = parse_scorecard(&meeting.scorecard);
        // Metrics without numbers cannot be judged and stay out of the ratio.
        let judged = scorecard.iter().filter(|e| e.on_track.is_some()).count();
        let on_track = scorecard
            .iter()
            .filter(|e| e.on_track == Some(true))
            .count();
        let todos = parse_todos(&meeting.todos);
        let done = todos.iter().filter(|t| t.done).count();
        Self {
            attendees: parse_attendees(&meeting.attendees).len(),
            scorecard_metrics: scorecard.len(),
            scorecard_on_track: on_track,
            scorecard_on_track_pct: percent(on_track, judged),
            todos_total: todos.len(),
            todos_done: done,
            todos_done_pct: percent(done, todos.len()),
            rating: meeting.rating,
        }
    }
}

/// Mean rating over meetings that have one, two decimals.
pub fn average_rating(meetings: &[Level10Meeting]) -> Option<f64> {
    let rated: Vec<f64> = meetings
        .iter()
        .filter_map(|m| m.rating.map(f64::from))
        .collect();
    if rated.is_empty() {
        return None;
    }
    Some(round2(rated.iter().sum::<f64>() / rated.len() as f64))
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub open: usize,
    pub solved: usize,
    pub open_by_priority: BTreeMap<String, usize>,
}

impl IssueSummary {
    pub fn of(issues: &[Issue]) -> Self {
        let mut open_by_priority: BTreeMap<String, usize> = Priority::all()
            .iter()
            .map(|p| (p.as_str().to_string(), 0))
            .collect();
        let mut open = 0;
        let mut solved = 0;
        for issue in issues {
            match issue.status {
                IssueStatus::Open => {
                    open += 1;
                    *open_by_priority
                        .entry(issue.priority.as_str().to_string())
                        .or_default() += 1;
                }
                IssueStatus::Solved => solved += 1,
            }
        }
        Self {
            open,
            solved,
            open_by_priority,
        }
    }
}

/// Open issues first, then by priority, then oldest first.
pub fn prioritize(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        let open_a = a.status != IssueStatus::Open;
        let open_b = b.status != IssueStatus::Open;
        open_a
            .cmp(&open_b)
            .then(a.priority.cmp(&b.priority))
            .then(a.created_at.cmp(&b.created_at))
    });
}

// ---------------------------------------------------------------------------
// Rocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerRocks {
    pub total: usize,
    pub done: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RockSummary {
    pub total: usize,
    pub on_track: usize,
    pub off_track: usize,
    pub done: usize,
    pub completion_pct: f64,
    pub by_owner: BTreeMap<String, OwnerRocks>,
}

impl RockSummary {
    pub fn of(rocks: &[Rock]) -> Self {
        let mut on_track = 0;
        let mut off_track = 0;
        let mut done = 0;
        let mut by_owner: BTreeMap<String, OwnerRocks> = BTreeMap::new();
        for rock in rocks {
            match rock.status {
                RockStatus::OnTrack => on_track += 1,
                RockStatus::OffTrack => off_track += 1,
                RockStatus::Done => done += 1,
            }
            let owner = if rock.owner.trim().is_empty() {
                "unassigned".to_string()
            } else {
                rock.owner.trim().to_string()
            };
            let entry = by_owner.entry(owner).or_default();
            entry.total += 1;
            if rock.status == RockStatus::Done {
                entry.done += 1;
            }
        }
        Self {
            total: rocks.len(),
            on_track,
            off_track,
            done,
            completion_pct: percent(done, rocks.len()),
            by_owner,
        }
    }
}

// ---------------------------------------------------------------------------
// Associations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Renewal {
    pub id: Option<String>,
    pub name: String,
    pub renewal_date: NaiveDate,
    pub days_until: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationSummary {
    pub memberships: usize,
    pub total_annual_dues: f64,
    /// Memberships whose dues field could not be read as an amount.
    pub unpriced: usize,
    pub renewals_due: Vec<Renewal>,
}

impl AssociationSummary {
    /// Renewals within `window_days` of `today` (overdue ones included),
    /// soonest first.
    pub fn of(associations: &[Association], today: NaiveDate, window_days: i64) -> Self {
        let mut total = 0.0;
        let mut unpriced = 0;
        for a in associations {
            match parse_money(&a.annual_dues) {
                Some(v) => total += v,
                None if a.annual_dues.trim().is_empty() => {}
                None => unpriced += 1,
            }
        }
        let horizon = Duration::try_days(window_days)
            .and_then(|d| today.checked_add_signed(d))
            .unwrap_or(if window_days < 0 {
                NaiveDate::MIN
            } else {
                NaiveDate::MAX
            });
        let mut renewals_due: Vec<Renewal> = associations
            .iter()
            .filter_map(|a| {
                let date = a.renewal_date?;
                (date <= horizon).then(|| Renewal {
                    id: a.id.clone(),
                    name: a.name.clone(),
                    renewal_date: date,
                    days_until: (date - today).num_days(),
                })
            })
            .collect();
        renewals_due.sort_by_key(|r| r.renewal_date);
        Self {
            memberships: associations.len(),
            total_annual_dues: round2(total),
            unpriced,
            renewals_due,
        }
    }
}

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub total: usize,
    pub by_stage: BTreeMap<String, usize>,
    /// Estimated value of targets not yet won or lost.
    pub open_value: f64,
    pub won_value: f64,
    /// `won / (won + lost)`; 0 with no closed targets.
    pub win_rate_pct: f64,
}

impl PipelineSummary {
    pub fn of(targets: &[Target]) -> Self {
        let mut by_stage: BTreeMap<String, usize> = TargetStage::all()
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        let mut open_value = 0.0;
        let mut won_value = 0.0;
        let mut won = 0;
        let mut lost = 0;
        for t in targets {
            *by_stage.entry(t.stage.as_str().to_string()).or_default() += 1;
            let value = parse_money(&t.estimated_value).unwrap_or(0.0);
            match t.stage {
                TargetStage::Won => {
                    won += 1;
                    won_value += value;
                }
                TargetStage::Lost => lost += 1,
                _ => open_value += value,
            }
        }
        Self {
            total: targets.len(),
            by_stage,
            open_value: round2(open_value),
            won_value: round2(won_value),
            win_rate_pct: percent(won, won + lost),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::week::{Quarter, Week};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn percent_rounds_and_handles_zero() {
        assert_eq!(percent(1, 3), 33.3);
        assert_eq!(percent(2, 3), 66.7);
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(4, 4), 100.0);
    }

    #[test]
    fn meeting_summary_counts() {
        let mut m = Level10Meeting::new(Week::parse("2025-01-06").unwrap());
        m.attendees = "Ana, Ben, Carla".into();
        m.scorecard = "Calls: 50 / 40\nDemos: 2 / 5\nNPS".into();
        m.todos = "[x] a\n[ ] b\n[x] c\n[ ] d".into();
        m.rating = Some(9);
        let s = MeetingSummary::of(&m);
        assert_eq!(s.attendees, 3);
        assert_eq!(s.scorecard_metrics, 3);
        assert_eq!(s.scorecard_on_track, 1);
        assert_eq!(s.scorecard_on_track_pct, 50.0);
        assert_eq!(s.todos_total, 4);
        assert_eq!(s.todos_done, 2);
        assert_eq!(s.todos_done_pct, 50.0);
        assert_eq!(s.rating, Some(9));
    }

    #[test]
    fn average_rating_skips_unrated() {
        let w = Week::parse("2025-01-06").unwrap();
        let mut a = Level10Meeting::new(w);
        a.rating = Some(8);
        let mut b = Level10Meeting::new(w.next());
        b.rating = Some(9);
        let c = Level10Meeting::new(w.next().next());
        assert_eq!(average_rating(&[a, b, c]), Some(8.5));
        assert_eq!(average_rating(&[]), None);
    }

    #[test]
    fn issue_summary_and_ordering() {
        let mut low = Issue::new("low", Priority::Low);
        let high = Issue::new("high", Priority::High);
        let mut solved = Issue::new("solved", Priority::High);
        solved.solve().unwrap();
        low.created_at = None;
        let mut list = vec![solved.clone(), low.clone(), high.clone()];
        prioritize(&mut list);
        let titles: Vec<_> = list.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "low", "solved"]);

        let s = IssueSummary::of(&list);
        assert_eq!(s.open, 2);
        assert_eq!(s.solved, 1);
        assert_eq!(s.open_by_priority["high"], 1);
        assert_eq!(s.open_by_priority["medium"], 0);
        assert_eq!(s.open_by_priority["low"], 1);
    }

    #[test]
    fn rock_summary_by_owner() {
        let q = Quarter::parse("2025-Q1").unwrap();
        let mut a = Rock::new(q, "a", "Kim");
        a.status = RockStatus::Done;
        let b = Rock::new(q, "b", "Kim");
        let mut c = Rock::new(q, "c", "");
        c.status = RockStatus::OffTrack;
        let s = RockSummary::of(&[a, b, c]);
        assert_eq!(s.total, 3);
        assert_eq!(s.done, 1);
        assert_eq!(s.on_track, 1);
        assert_eq!(s.off_track, 1);
        assert_eq!(s.completion_pct, 33.3);
        assert_eq!(s.by_owner["Kim"], OwnerRocks { total: 2, done: 1 });
        assert_eq!(s.by_owner["unassigned"].total, 1);
    }

    #[test]
    fn association_dues_and_renewals() {
        let today = date(2025, 5, 1);
        let mut a = Association::new("Chamber");
        a.annual_dues = "$1,200".into();
        a.renewal_date = Some(date(2025, 5, 20));
        let mut b = Association::new("Trade group");
        b.annual_dues = "850".into();
        b.renewal_date = Some(date(2025, 12, 1));
        let mut c = Association::new("Rotary");
        c.annual_dues = "varies".into();
        c.renewal_date = Some(date(2025, 4, 15));
        let s = AssociationSummary::of(&[a, b, c], today, 60);
        assert_eq!(s.memberships, 3);
        assert_eq!(s.total_annual_dues, 2050.0);
        assert_eq!(s.unpriced, 1);
        let names: Vec<_> = s.renewals_due.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Rotary", "Chamber"]);
        assert_eq!(s.renewals_due[0].days_until, -16);
        assert_eq!(s.renewals_due[1].days_until, 19);
    }

    #[test]
    fn huge_renewal_window_flags_everything() {
        let today = date(2025, 1, 1);
        let mut far = Association::new("Guild");
        far.renewal_date = Some(date(9999, 6, 1));
        let s = AssociationSummary::of(std::slice::from_ref(&far), today, 100_000_000);
        assert_eq!(s.renewals_due.len(), 1);
        let s = AssociationSummary::of(&[far], today, i64::MAX);
        assert_eq!(s.renewals_due.len(), 1);
        let s = AssociationSummary::of(&[], today, i64::MIN);
        assert!(s.renewals_due.is_empty());
    }

    #[test]
    fn pipeline_summary() {
        let mut a = Target::new("Acme");
        a.estimated_value = "$50k".into();
        a.stage = TargetStage::Proposal;
        let mut b = Target::new("Globex");
        b.estimated_value = "20000".into();
        b.stage = TargetStage::Won;
        let mut c = Target::new("Initech");
        c.estimated_value = "$10k".into();
        c.stage = TargetStage::Lost;
        let mut d = Target::new("Umbrella");
        d.stage = TargetStage::Won;
        let s = PipelineSummary::of(&[a, b, c, d]);
        assert_eq!(s.total, 4);
        assert_eq!(s.by_stage["won"], 2);
        assert_eq!(s.by_stage["prospect"], 0);
        assert_eq!(s.open_value, 50_000.0);
        assert_eq!(s.won_value, 20_000.0);
        assert_eq!(s.win_rate_pct, 66.7);
    }
}
