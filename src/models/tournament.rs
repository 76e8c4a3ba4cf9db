//! Tournament header, lifecycle status, and the bracket document aggregate.

use crate::models::error::ValidationError;
use crate::models::game::{GameMatch, MatchId};
use crate::models::team::TeamRef;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Supported bracket formats.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    #[default]
    DoubleElimination,
    /// Two round-robin groups followed by a five-match final stage.
    GroupStage,
}

impl TournamentFormat {
    /// Fewest teams `initialize` accepts.
    pub fn min_teams(self) -> usize {
        match self {
            TournamentFormat::DoubleElimination => 4,
            TournamentFormat::GroupStage => 6,
        }
    }

    /// Status of a freshly created or reset document.
    pub fn initial_status(self) -> TournamentStatus {
        match self {
            TournamentFormat::DoubleElimination => TournamentStatus::Pending,
            TournamentFormat::GroupStage => TournamentStatus::Registration,
        }
    }

    /// Status right after `initialize`.
    pub fn started_status(self) -> TournamentStatus {
        match self {
            TournamentFormat::DoubleElimination => TournamentStatus::Active,
            TournamentFormat::GroupStage => TournamentStatus::GroupStage,
        }
    }
}

impl fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TournamentFormat::DoubleElimination => write!(f, "double_elimination"),
            TournamentFormat::GroupStage => write!(f, "group_stage"),
        }
    }
}

impl std::str::FromStr for TournamentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "double_elimination" | "double-elimination" => Ok(TournamentFormat::DoubleElimination),
            "group_stage" | "group-stage" | "groups" => Ok(TournamentFormat::GroupStage),
            other => Err(format!("unknown tournament format: {other}")),
        }
    }
}

/// Coarse tournament-wide phase.
///
/// Double elimination: `Pending -> Active -> Completed`.
/// Group stage: `Registration -> GroupStage -> FinalStage -> Completed`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Pending,
    Registration,
    Active,
    GroupStage,
    FinalStage,
    Completed,
}

impl TournamentStatus {
    /// Teams have been assigned and results may be reported.
    pub fn is_started(self) -> bool {
        !matches!(self, TournamentStatus::Pending | TournamentStatus::Registration)
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TournamentStatus::Pending => "pending",
            TournamentStatus::Registration => "registration",
            TournamentStatus::Active => "active",
            TournamentStatus::GroupStage => "group_stage",
            TournamentStatus::FinalStage => "final_stage",
            TournamentStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Tournament header. `last_updated` is the only change signal pollers watch.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub status: TournamentStatus,
    pub format: TournamentFormat,
    pub start_date: Option<NaiveDate>,
    pub max_teams: usize,
    pub last_updated: DateTime<Utc>,
}

/// Which part of the bracket a round belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSection {
    Upper,
    Lower,
    FinalStage,
    GrandFinal,
}

/// A named set of matches played in the same phase.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub id: String,
    pub name: String,
    pub section: BracketSection,
    pub matches: Vec<GameMatch>,
}

/// One row of a group table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub team: TeamRef,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub points: u32,
}

impl Standing {
    pub fn new(team: TeamRef) -> Self {
        Self {
            team,
            played: 0,
            wins: 0,
            losses: 0,
            games_won: 0,
            games_lost: 0,
            points: 0,
        }
    }

    pub fn game_differential(&self) -> i64 {
        i64::from(self.games_won) - i64::from(self.games_lost)
    }
}

/// A round-robin group and its derived table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub teams: Vec<TeamRef>,
    pub matches: Vec<GameMatch>,
    pub standings: Vec<Standing>,
}

impl Group {
    pub fn is_complete(&self) -> bool {
        !self.matches.is_empty() && self.matches.iter().all(GameMatch::is_completed)
    }
}

/// Fixed parameters a bracket document is built from.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketSettings {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub max_teams: usize,
    pub best_of: u32,
    pub grand_final_best_of: u32,
}

impl Default for BracketSettings {
    fn default() -> Self {
        Self {
            name: "Tournament".to_string(),
            start_date: None,
            max_teams: 8,
            best_of: 3,
            grand_final_best_of: 5,
        }
    }
}

impl BracketSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for best_of in [self.best_of, self.grand_final_best_of] {
            if best_of == 0 || best_of % 2 == 0 {
                return Err(ValidationError::InvalidBestOf(best_of));
            }
        }
        Ok(())
    }
}

/// The aggregate root: tournament header plus every match, grouped into rounds and groups.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketDocument {
    pub tournament: Tournament,
    /// Teams in seed (input) order.
    pub teams: Vec<TeamRef>,
    pub rounds: Vec<Round>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,
}

impl BracketDocument {
    pub fn matches(&self) -> impl Iterator<Item = &GameMatch> {
        self.groups
            .iter()
            .flat_map(|g| g.matches.iter())
            .chain(self.rounds.iter().flat_map(|r| r.matches.iter()))
    }

    pub fn matches_mut(&mut self) -> impl Iterator<Item = &mut GameMatch> {
        self.groups
            .iter_mut()
            .flat_map(|g| g.matches.iter_mut())
            .chain(self.rounds.iter_mut().flat_map(|r| r.matches.iter_mut()))
    }

    pub fn get_match(&self, id: &str) -> Option<&GameMatch> {
        self.matches().find(|m| m.id == id)
    }

    pub fn get_match_mut(&mut self, id: &str) -> Option<&mut GameMatch> {
        self.matches_mut().find(|m| m.id == id)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn round(&self, id: &str) -> Option<&Round> {
        self.rounds.iter().find(|r| r.id == id)
    }

    /// Ids of every match, groups first, then rounds in play order.
    pub fn match_ids(&self) -> Vec<MatchId> {
        self.matches().map(|m| m.id.clone()).collect()
    }
}
