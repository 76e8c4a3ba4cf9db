//! Match, its two team slots, and its result status.

use crate::models::team::TeamRef;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a match, unique within a bracket document.
pub type MatchId = String;

/// One of the two team positions in a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Team1,
    Team2,
}

impl Slot {
    pub fn other(self) -> Slot {
        match self {
            Slot::Team1 => Slot::Team2,
            Slot::Team2 => Slot::Team1,
        }
    }
}

/// Result status of a single match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    /// Games recorded but not decided yet. Only used by group-stage matches.
    Ongoing,
    Completed,
}

/// A single best-of-N match between two slots.
///
/// `winner`/`loser` are derived from the scores and are only ever written by
/// [`GameMatch::record`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameMatch {
    pub id: MatchId,
    pub team1: Option<TeamRef>,
    pub team2: Option<TeamRef>,
    pub team1_score: u32,
    pub team2_score: u32,
    pub winner: Option<TeamRef>,
    pub loser: Option<TeamRef>,
    pub status: MatchStatus,
    pub best_of: u32,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub completed_time: Option<DateTime<Utc>>,
}

impl GameMatch {
    pub fn new(id: impl Into<MatchId>, best_of: u32) -> Self {
        Self {
            id: id.into(),
            team1: None,
            team2: None,
            team1_score: 0,
            team2_score: 0,
            winner: None,
            loser: None,
            status: MatchStatus::Pending,
            best_of,
            scheduled_time: None,
            completed_time: None,
        }
    }

    pub fn with_teams(mut self, team1: Option<TeamRef>, team2: Option<TeamRef>) -> Self {
        self.team1 = team1;
        self.team2 = team2;
        self
    }

    pub fn slot(&self, slot: Slot) -> Option<&TeamRef> {
        match slot {
            Slot::Team1 => self.team1.as_ref(),
            Slot::Team2 => self.team2.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut Option<TeamRef> {
        match slot {
            Slot::Team1 => &mut self.team1,
            Slot::Team2 => &mut self.team2,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Both participants are known.
    pub fn is_ready(&self) -> bool {
        self.team1.is_some() && self.team2.is_some()
    }

    /// Any games recorded. Slots of a played match are locked against propagation.
    pub fn has_games(&self) -> bool {
        self.team1_score + self.team2_score > 0
    }

    /// Store scores and the derived result.
    ///
    /// `winner` is `Some` only when the match is decided. `completed_time` is stamped whenever a
    /// decided result is recorded, except on an exact replay of the current completed result.
    pub fn record(
        &mut self,
        team1_score: u32,
        team2_score: u32,
        winner: Option<Slot>,
        undecided_status: MatchStatus,
        now: DateTime<Utc>,
    ) {
        let replay = self.is_completed()
            && (self.team1_score, self.team2_score) == (team1_score, team2_score);
        self.team1_score = team1_score;
        self.team2_score = team2_score;
        match winner {
            Some(side) => {
                if !replay {
                    self.completed_time = Some(now);
                }
                self.winner = self.slot(side).cloned();
                self.loser = self.slot(side.other()).cloned();
                self.status = MatchStatus::Completed;
            }
            None => {
                self.winner = None;
                self.loser = None;
                self.completed_time = None;
                self.status = undecided_status;
            }
        }
    }
}
