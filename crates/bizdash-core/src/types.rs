use crate::error::DashError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Tab
// ---------------------------------------------------------------------------

/// A dashboard tab. Each tab owns one backend table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Level10,
    Vto,
    Issues,
    Rocks,
    Enablement,
    Associations,
    Events,
    Targets,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[
            Tab::Level10,
            Tab::Vto,
            Tab::Issues,
            Tab::Rocks,
            Tab::Enablement,
            Tab::Associations,
            Tab::Events,
            Tab::Targets,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Level10 => "level10",
            Tab::Vto => "vto",
            Tab::Issues => "issues",
            Tab::Rocks => "rocks",
            Tab::Enablement => "enablement",
            Tab::Associations => "associations",
            Tab::Events => "events",
            Tab::Targets => "targets",
        }
    }

}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tab {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DashError::UnknownVariant {
                kind: "tab",
                value: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Level10Meetings,
    VtoGoals,
    Issues,
    Rocks,
    SalesEnablement,
    Associations,
    AssociationEvents,
    SalesTargets,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Level10Meetings => "level10_meetings",
            Table::VtoGoals => "vto_goals",
            Table::Issues => "issues",
            Table::Rocks => "rocks",
            Table::SalesEnablement => "sales_enablement",
            Table::Associations => "associations",
            Table::AssociationEvents => "association_events",
            Table::SalesTargets => "sales_targets",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Issue priority. Ordering puts `High` first so a plain sort yields the
/// prioritized list.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn all() -> &'static [Priority] {
        &[Priority::High, Priority::Medium, Priority::Low]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "h" | "1" => Ok(Priority::High),
            "medium" | "med" | "m" | "2" => Ok(Priority::Medium),
            "low" | "l" | "3" => Ok(Priority::Low),
            _ => Err(DashError::UnknownVariant {
                kind: "priority",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// IssueStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    #[default]
    Open,
    Solved,
}

impl IssueStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::Solved => "solved",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IssueStatus {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(IssueStatus::Open),
            "solved" => Ok(IssueStatus::Solved),
            _ => Err(DashError::UnknownVariant {
                kind: "issue status",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// RockStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RockStatus {
    #[default]
    OnTrack,
    OffTrack,
    Done,
}

impl RockStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RockStatus::OnTrack => "on_track",
            RockStatus::OffTrack => "off_track",
            RockStatus::Done => "done",
        }
    }
}

impl fmt::Display for RockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EnablementSection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnablementSection {
    PresentationGuidelines,
    ObjectionHandling,
    Tips,
}

impl EnablementSection {
    pub fn all() -> &'static [EnablementSection] {
        &[
            EnablementSection::PresentationGuidelines,
            EnablementSection::ObjectionHandling,
            EnablementSection::Tips,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EnablementSection::PresentationGuidelines => "presentation_guidelines",
            EnablementSection::ObjectionHandling => "objection_handling",
            EnablementSection::Tips => "tips",
        }
    }
}

impl fmt::Display for EnablementSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EnablementSection {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EnablementSection::all()
            .iter()
            .copied()
            .find(|sec| sec.as_str() == s)
            .ok_or_else(|| DashError::UnknownVariant {
                kind: "enablement section",
                value: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// TargetStage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStage {
    #[default]
    Prospect,
    Contacted,
    Meeting,
    Proposal,
    Won,
    Lost,
}

impl TargetStage {
    pub fn all() -> &'static [TargetStage] {
        &[
            TargetStage::Prospect,
            TargetStage::Contacted,
            TargetStage::Meeting,
            TargetStage::Proposal,
            TargetStage::Won,
            TargetStage::Lost,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TargetStage::Prospect => "prospect",
            TargetStage::Contacted => "contacted",
            TargetStage::Meeting => "meeting",
            TargetStage::Proposal => "proposal",
            TargetStage::Won => "won",
            TargetStage::Lost => "lost",
        }
    }

    /// Won and lost targets are out of the active pipeline.
    pub fn is_closed(self) -> bool {
        matches!(self, TargetStage::Won | TargetStage::Lost)
    }
}

impl fmt::Display for TargetStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TargetStage {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TargetStage::all()
            .iter()
            .copied()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| DashError::UnknownVariant {
                kind: "target stage",
                value: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_round_trips_through_str() {
        for tab in Tab::all() {
            assert_eq!(tab.as_str().parse::<Tab>().unwrap(), *tab);
        }
    }

    #[test]
    fn priority_sorts_high_first() {
        let mut p = vec![Priority::Low, Priority::High, Priority::Medium];
        p.sort();
        assert_eq!(p, vec![Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn priority_accepts_shorthand() {
        assert_eq!("H".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("2".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn rock_status_serializes_snake_case() {
        let json = serde_json::to_string(&RockStatus::OffTrack).unwrap();
        assert_eq!(json, "\"off_track\"");
    }

    #[test]
    fn closed_stages() {
        assert!(TargetStage::Won.is_closed());
        assert!(TargetStage::Lost.is_closed());
        assert!(!TargetStage::Proposal.is_closed());
    }
}
