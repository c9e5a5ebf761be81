use crate::error::{DashError, Result};
use crate::record::{
    AssociationEvent, EnablementEntry, Issue, Level10Meeting, Record, Rock, YearlyGoals,
};
use crate::store::{Query, Store};
use crate::summary::prioritize;
use crate::types::{EnablementSection, IssueStatus};
use crate::week::{Quarter, Week};
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use std::sync::Arc;

/// Typed access to the store: rows in, records out.
#[derive(Clone)]
pub struct Repository {
    store: Arc<dyn Store>,
}

impl Repository {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    fn decode<T: Record>(row: Value) -> Result<T> {
        serde_json::from_value(row).map_err(|e| {
            DashError::MalformedRow(format!("{}: {e}", T::TABLE.as_str()))
        })
    }

    // -----------------------------------------------------------------------
    // Generic CRUD
    // -----------------------------------------------------------------------

    pub fn list<T: Record>(&self, query: &Query) -> Result<Vec<T>> {
        self.store
            .select(T::TABLE, query)?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    pub fn find_one<T: Record>(&self, query: &Query) -> Result<Option<T>> {
        let q = query.clone().limit(1);
        self.list::<T>(&q).map(|mut v| v.pop())
    }

    pub fn get<T: Record>(&self, id: &str) -> Result<T> {
        self.find_one::<T>(&Query::all().eq("id", id))?
            .ok_or_else(|| DashError::not_found(T::TABLE.as_str(), id))
    }

    /// Insert when the record has no id yet, update otherwise. Returns the
    /// record as the backend stored it.
    pub fn save<T: Record>(&self, mut record: T) -> Result<T> {
        record.validate()?;
        record.touch(Utc::now());
        let mut row = serde_json::to_value(&record)?;
        let saved = match record.id() {
            Some(id) => {
                let id = id.to_string();
                if let Value::Object(obj) = &mut row {
                    obj.remove("id");
                }
                tracing::info!(table = T::TABLE.as_str(), %id, "updating record");
                self.store.update(T::TABLE, &id, row)?
            }
            None => {
                tracing::info!(table = T::TABLE.as_str(), "inserting record");
                self.store.insert(T::TABLE, row)?
            }
        };
        Self::decode(saved)
    }

    pub fn delete<T: Record>(&self, id: &str) -> Result<()> {
        tracing::info!(table = T::TABLE.as_str(), id, "deleting record");
        self.store.delete(T::TABLE, id)
    }

    // -----------------------------------------------------------------------
    // Tab helpers
    // -----------------------------------------------------------------------

    pub fn meeting_for_week(&self, week: Week) -> Result<Option<Level10Meeting>> {
        self.find_one(&Query::all().eq("week_start", week))
    }

    /// Upsert keyed by week: an incoming meeting without an id adopts the id
    /// of the week's existing row so a week never holds two meetings.
    pub fn save_meeting(&self, mut meeting: Level10Meeting) -> Result<Level10Meeting> {
        if meeting.id.is_none() {
            if let Some(existing) = self.meeting_for_week(meeting.week_start)? {
                meeting.id = existing.id;
            }
        }
        self.save(meeting)
    }

    pub fn all_meetings(&self) -> Result<Vec<Level10Meeting>> {
        self.list(&Query::all().order_by("week_start", true))
    }

    pub fn goals_for_year(&self, year: i32) -> Result<Option<YearlyGoals>> {
        self.find_one(&Query::all().eq("year", year))
    }

    pub fn save_goals(&self, mut goals: YearlyGoals) -> Result<YearlyGoals> {
        if goals.id.is_none() {
            if let Some(existing) = self.goals_for_year(goals.year)? {
                goals.id = existing.id;
            }
        }
        self.save(goals)
    }

    pub fn prioritized_issues(&self, status: Option<IssueStatus>) -> Result<Vec<Issue>> {
        let q = match status {
            Some(s) => Query::all().eq("status", s),
            None => Query::all(),
        };
        let mut issues: Vec<Issue> = self.list(&q)?;
        prioritize(&mut issues);
        Ok(issues)
    }

    pub fn rocks_for_quarter(&self, quarter: Quarter) -> Result<Vec<Rock>> {
        self.list(&Query::all().eq("quarter", quarter).order_by("title", false))
    }

    pub fn enablement_section(&self, section: EnablementSection) -> Result<EnablementEntry> {
        Ok(self
            .find_one(&Query::all().eq("section", section))?
            .unwrap_or_else(|| EnablementEntry::new(section)))
    }

    pub fn save_enablement(&self, section: EnablementSection, body: String) -> Result<EnablementEntry> {
        let mut entry = self.enablement_section(section)?;
        entry.body = body;
        self.save(entry)
    }

    /// Events overlapping `[from, to]`. Events that started before `from`
    /// but are still running are fetched by widening the start filter and
    /// trimming here, since the backend only filters single columns.
    pub fn events_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<AssociationEvent>> {
        let widened = from - chrono::Duration::days(31);
        let q = Query::all()
            .gte("event_date", widened)
            .lte("event_date", to)
            .order_by("event_date", false);
        Ok(self
            .list::<AssociationEvent>(&q)?
            .into_iter()
            .filter(|e| e.last_day() >= from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Association, Target};
    use crate::store::MemoryStore;
    use crate::types::{Priority, TargetStage};

    fn repo() -> Repository {
        Repository::new(Arc::new(MemoryStore::new()))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn save_inserts_then_updates() {
        let repo = repo();
        let saved = repo.save(Target::new("Acme")).unwrap();
        let id = saved.id.clone().unwrap();
        assert!(saved.updated_at.is_some());

        let mut changed = saved.clone();
        changed.stage = TargetStage::Meeting;
        repo.save(changed).unwrap();

        let all: Vec<Target> = repo.list(&Query::all()).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].stage, TargetStage::Meeting);
        assert_eq!(repo.get::<Target>(&id).unwrap().company, "Acme");
    }

    #[test]
    fn save_validates_first() {
        let repo = repo();
        let err = repo.save(Association::new("")).unwrap_err();
        assert!(matches!(err, DashError::Invalid { .. }));
        assert!(repo.list::<Association>(&Query::all()).unwrap().is_empty());
    }

    #[test]
    fn get_missing_is_not_found() {
        let err = repo().get::<Issue>("nope").unwrap_err();
        assert!(matches!(err, DashError::NotFound { .. }));
    }

    #[test]
    fn meeting_upsert_is_keyed_by_week() {
        let repo = repo();
        let week = Week::parse("2025-01-06").unwrap();
        let mut m = Level10Meeting::new(week);
        m.segue = "first".into();
        repo.save_meeting(m).unwrap();

        let mut again = Level10Meeting::new(week);
        again.segue = "second".into();
        repo.save_meeting(again).unwrap();

        assert_eq!(repo.all_meetings().unwrap().len(), 1);
        let stored = repo.meeting_for_week(week).unwrap().unwrap();
        assert_eq!(stored.segue, "second");
        assert!(repo.meeting_for_week(week.next()).unwrap().is_none());
    }

    #[test]
    fn goals_upsert_is_keyed_by_year() {
        let repo = repo();
        repo.save_goals(YearlyGoals::new(2025)).unwrap();
        let mut g = YearlyGoals::new(2025);
        g.goals = "- Grow ARR".into();
        repo.save_goals(g).unwrap();
        let stored = repo.goals_for_year(2025).unwrap().unwrap();
        assert_eq!(stored.goals, "- Grow ARR");
        assert!(repo.goals_for_year(2024).unwrap().is_none());
    }

    #[test]
    fn issues_come_back_prioritized() {
        let repo = repo();
        repo.save(Issue::new("low", Priority::Low)).unwrap();
        repo.save(Issue::new("high", Priority::High)).unwrap();
        let mut solved = Issue::new("done", Priority::High);
        solved.solve().unwrap();
        repo.save(solved).unwrap();

        let all = repo.prioritized_issues(None).unwrap();
        let titles: Vec<_> = all.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["high", "low", "done"]);
        let open = repo.prioritized_issues(Some(IssueStatus::Open)).unwrap();
        assert_eq!(open.len(), 2);
    }

    #[test]
    fn reopening_issue_clears_solved_at() {
        let repo = repo();
        let mut issue = repo.save(Issue::new("stale quotes", Priority::Medium)).unwrap();
        issue.solve().unwrap();
        let solved = repo.save(issue).unwrap();
        assert!(solved.solved_at.is_some());

        let mut reopened = solved.clone();
        reopened.status = IssueStatus::Open;
        repo.save(reopened).unwrap();
        let stored: Issue = repo.get(solved.id.as_deref().unwrap()).unwrap();
        assert_eq!(stored.status, IssueStatus::Open);
        assert!(stored.solved_at.is_none());
    }

    #[test]
    fn rocks_filtered_by_quarter() {
        let repo = repo();
        let q1 = Quarter::parse("2025-Q1").unwrap();
        repo.save(Rock::new(q1, "B rock", "Kim")).unwrap();
        repo.save(Rock::new(q1, "A rock", "Lee")).unwrap();
        repo.save(Rock::new(q1.next(), "Other", "Kim")).unwrap();
        let rocks = repo.rocks_for_quarter(q1).unwrap();
        let titles: Vec<_> = rocks.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A rock", "B rock"]);
    }

    #[test]
    fn enablement_section_defaults_then_persists() {
        let repo = repo();
        let empty = repo.enablement_section(EnablementSection::Tips).unwrap();
        assert!(empty.id.is_none());
        assert!(empty.body.is_empty());
        repo.save_enablement(EnablementSection::Tips, "- Listen more".into())
            .unwrap();
        repo.save_enablement(EnablementSection::Tips, "- Listen more\n- Ask why".into())
            .unwrap();
        let all: Vec<EnablementEntry> = repo.list(&Query::all()).unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].body.contains("Ask why"));
    }

    #[test]
    fn events_between_includes_running_events() {
        let repo = repo();
        let mut running = AssociationEvent::new("Conference", date(2025, 2, 27));
        running.end_date = Some(date(2025, 3, 2));
        repo.save(running).unwrap();
        repo.save(AssociationEvent::new("Old", date(2025, 2, 10)))
            .unwrap();
        repo.save(AssociationEvent::new("Mixer", date(2025, 3, 15)))
            .unwrap();
        repo.save(AssociationEvent::new("April", date(2025, 4, 2)))
            .unwrap();
        let events = repo
            .events_between(date(2025, 3, 1), date(2025, 3, 31))
            .unwrap();
        let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Conference", "Mixer"]);
    }
}
