use crate::error::{DashError, Result};
use crate::types::{EnablementSection, IssueStatus, Priority, RockStatus, Table, TargetStage};
use crate::week::{Quarter, Week};
use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A typed row of one backend table.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + 'static {
    const TABLE: Table;

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    /// Reject records the form should never have submitted.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Stamp modification time before a write. Tables without timestamps ignore it.
    fn touch(&mut self, _now: DateTime<Utc>) {}
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DashError::invalid(field, "must not be empty"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Level10Meeting
// ---------------------------------------------------------------------------

/// One weekly Level 10 meeting. Free-text sections are stored exactly as
/// typed and parsed on read (see [`crate::parse`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level10Meeting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub week_start: Week,
    #[serde(default)]
    pub attendees: String,
    #[serde(default)]
    pub segue: String,
    #[serde(default)]
    pub scorecard: String,
    #[serde(default)]
    pub rock_review: String,
    #[serde(default)]
    pub headlines: String,
    #[serde(default)]
    pub todos: String,
    #[serde(default)]
    pub ids_notes: String,
    #[serde(default)]
    pub conclusion: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Level10Meeting {
    /// Empty template shown for a week nobody has filled in yet.
    pub fn new(week: Week) -> Self {
        Self {
            id: None,
            week_start: week,
            attendees: String::new(),
            segue: String::new(),
            scorecard: String::new(),
            rock_review: String::new(),
            headlines: String::new(),
            todos: String::new(),
            ids_notes: String::new(),
            conclusion: String::new(),
            rating: None,
            updated_at: None,
        }
    }
}

impl Record for Level10Meeting {
    const TABLE: Table = Table::Level10Meetings;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        if let Some(r) = self.rating {
            if !(1..=10).contains(&r) {
                return Err(DashError::invalid("rating", "must be between 1 and 10"));
            }
        }
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

// ---------------------------------------------------------------------------
// YearlyGoals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyGoals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub year: i32,
    #[serde(default)]
    pub revenue_target: String,
    #[serde(default)]
    pub profit_target: String,
    #[serde(default)]
    pub measurables: String,
    #[serde(default)]
    pub goals: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl YearlyGoals {
    pub fn new(year: i32) -> Self {
        Self {
            id: None,
            year,
            revenue_target: String::new(),
            profit_target: String::new(),
            measurables: String::new(),
            goals: String::new(),
            updated_at: None,
        }
    }
}

impl Record for YearlyGoals {
    const TABLE: Table = Table::VtoGoals;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        if !(2000..=2100).contains(&self.year) {
            return Err(DashError::invalid("year", "must be between 2000 and 2100"));
        }
        Ok(())
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

// ---------------------------------------------------------------------------
// Issue
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: IssueStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Always serialized so a reopened issue clears it on update.
    #[serde(default)]
    pub solved_at: Option<DateTime<Utc>>,
}

impl Issue {
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
            owner: String::new(),
            priority,
            status: IssueStatus::Open,
            created_at: Some(Utc::now()),
            solved_at: None,
        }
    }

    pub fn solve(&mut self) -> Result<()> {
        if self.status == IssueStatus::Solved {
            return Err(DashError::invalid("status", "issue is already solved"));
        }
        self.status = IssueStatus::Solved;
        self.solved_at = Some(Utc::now());
        Ok(())
    }
}

impl Record for Issue {
    const TABLE: Table = Table::Issues;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        require("title", &self.title)
    }

    fn touch(&mut self, _now: DateTime<Utc>) {
        if self.status == IssueStatus::Open {
            self.solved_at = None;
        }
    }
}

// ---------------------------------------------------------------------------
// Rock
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub quarter: Quarter,
    pub title: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub status: RockStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Rock {
    pub fn new(quarter: Quarter, title: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id: None,
            quarter,
            title: title.into(),
            owner: owner.into(),
            status: RockStatus::OnTrack,
            due_date: quarter.end().ok(),
            notes: String::new(),
            updated_at: None,
        }
    }
}

impl Record for Rock {
    const TABLE: Table = Table::Rocks;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        require("title", &self.title)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

// ---------------------------------------------------------------------------
// EnablementEntry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnablementEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub section: EnablementSection,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl EnablementEntry {
    pub fn new(section: EnablementSection) -> Self {
        Self {
            id: None,
            section,
            body: String::new(),
            updated_at: None,
        }
    }
}

impl Record for EnablementEntry {
    const TABLE: Table = Table::SalesEnablement;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

// ---------------------------------------------------------------------------
// Association
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub membership_level: String,
    #[serde(default)]
    pub annual_dues: String,
    #[serde(default)]
    pub renewal_date: Option<NaiveDate>,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub notes: String,
}

impl Association {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            membership_level: String::new(),
            annual_dues: String::new(),
            renewal_date: None,
            contact: String::new(),
            website: String::new(),
            notes: String::new(),
        }
    }
}

impl Record for Association {
    const TABLE: Table = Table::Associations;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        require("name", &self.name)
    }
}

// ---------------------------------------------------------------------------
// AssociationEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub association_id: Option<String>,
    pub title: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub notes: String,
}

impl AssociationEvent {
    pub fn new(title: impl Into<String>, event_date: NaiveDate) -> Self {
        Self {
            id: None,
            association_id: None,
            title: title.into(),
            event_date,
            end_date: None,
            location: String::new(),
            notes: String::new(),
        }
    }

    /// Last day the event occupies; single-day events end where they start.
    pub fn last_day(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.event_date).max(self.event_date)
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.event_date && date <= self.last_day()
    }
}

impl Record for AssociationEvent {
    const TABLE: Table = Table::AssociationEvents;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        require("title", &self.title)?;
        if let Some(end) = self.end_date {
            if end < self.event_date {
                return Err(DashError::invalid(
                    "end_date",
                    "must not be before event_date",
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Target
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub company: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub stage: TargetStage,
    #[serde(default)]
    pub estimated_value: String,
    #[serde(default)]
    pub next_step: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Target {
    pub fn new(company: impl Into<String>) -> Self {
        Self {
            id: None,
            company: company.into(),
            contact_name: String::new(),
            industry: String::new(),
            stage: TargetStage::Prospect,
            estimated_value: String::new(),
            next_step: String::new(),
            notes: String::new(),
            updated_at: None,
        }
    }
}

impl Record for Target {
    const TABLE: Table = Table::SalesTargets;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn validate(&self) -> Result<()> {
        require("company", &self.company)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meeting_rating_bounds() {
        let mut m = Level10Meeting::new(Week::parse("2025-01-06").unwrap());
        assert!(m.validate().is_ok());
        m.rating = Some(11);
        assert!(m.validate().is_err());
        m.rating = Some(0);
        assert!(m.validate().is_err());
        m.rating = Some(8);
        assert!(m.validate().is_ok());
    }

    #[test]
    fn meeting_deserializes_partial_row() {
        let m: Level10Meeting =
            serde_json::from_str(r#"{"id":"abc","week_start":"2025-01-08","segue":"hi"}"#)
                .unwrap();
        assert_eq!(m.id.as_deref(), Some("abc"));
        assert_eq!(m.week_start.to_string(), "2025-01-06");
        assert_eq!(m.segue, "hi");
        assert!(m.todos.is_empty());
    }

    #[test]
    fn new_record_serializes_without_id() {
        let issue = Issue::new("Pricing page is stale", Priority::High);
        let v = serde_json::to_value(&issue).unwrap();
        assert!(v.get("id").is_none());
        assert_eq!(v["priority"], "high");
        assert_eq!(v["status"], "open");
    }

    #[test]
    fn empty_issue_title_rejected() {
        let issue = Issue::new("   ", Priority::Low);
        assert!(matches!(issue.validate(), Err(DashError::Invalid { .. })));
    }

    #[test]
    fn solving_issue_stamps_time() {
        let mut issue = Issue::new("CRM duplicates", Priority::Medium);
        issue.solve().unwrap();
        assert_eq!(issue.status, IssueStatus::Solved);
        assert!(issue.solved_at.is_some());
    }

    #[test]
    fn solving_twice_is_rejected() {
        let mut issue = Issue::new("CRM duplicates", Priority::Medium);
        issue.solve().unwrap();
        let stamped = issue.solved_at;
        assert!(matches!(issue.solve(), Err(DashError::Invalid { .. })));
        assert_eq!(issue.solved_at, stamped);
    }

    #[test]
    fn reopened_issue_drops_solved_at() {
        let mut issue = Issue::new("CRM duplicates", Priority::Medium);
        issue.solve().unwrap();
        issue.status = IssueStatus::Open;
        issue.touch(Utc::now());
        assert!(issue.solved_at.is_none());
        let row = serde_json::to_value(&issue).unwrap();
        assert!(row["solved_at"].is_null());
        assert!(row.as_object().unwrap().contains_key("solved_at"));
    }

    #[test]
    fn rock_defaults_due_date_to_quarter_end() {
        let q = Quarter::parse("2025-Q2").unwrap();
        let rock = Rock::new(q, "Launch referral program", "Sam");
        assert_eq!(rock.due_date, NaiveDate::from_ymd_opt(2025, 6, 30));
        assert_eq!(serde_json::to_value(&rock).unwrap()["quarter"], "2025-Q2");
    }

    #[test]
    fn event_span() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let mut ev = AssociationEvent::new("Spring expo", start);
        assert!(ev.covers(start));
        assert!(!ev.covers(start.succ_opt().unwrap()));
        ev.end_date = NaiveDate::from_ymd_opt(2025, 3, 12);
        assert!(ev.covers(NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()));
        assert!(ev.validate().is_ok());
        ev.end_date = NaiveDate::from_ymd_opt(2025, 3, 9);
        assert!(ev.validate().is_err());
    }
}
