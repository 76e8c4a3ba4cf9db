//! Data structures for the bracket: teams, matches, tournament header, bracket document.

mod error;
mod game;
mod team;
mod tournament;

pub use error::{BracketError, PreconditionError, StoreError, ValidationError};
pub use game::{GameMatch, MatchId, MatchStatus, Slot};
pub use team::{parse_roster_csv, same_team, validate_roster, TeamRef};
pub use tournament::{
    BracketDocument, BracketSection, BracketSettings, Group, Round, Standing, Tournament,
    TournamentFormat, TournamentId, TournamentStatus,
};
