//! Error taxonomy for bracket operations.
//!
//! Every error is a rejected operation on an otherwise intact document: validation and
//! precondition checks run before anything is written back.

use thiserror::Error;

/// Malformed input. The caller is expected to re-prompt with corrected values.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ValidationError {
    #[error("Score must not be negative (got {0})")]
    NegativeScore(i64),

    #[error("Best-of {best_of} allows at most {max} games, got {total}")]
    TooManyGames { total: u64, max: u32, best_of: u32 },

    #[error("Best-of must be an odd number of at least 1 (got {0})")]
    InvalidBestOf(u32),

    #[error("Need at least {required} teams, got {supplied}")]
    NotEnoughTeams { required: usize, supplied: usize },

    #[error("At most {max} teams allowed, got {supplied}")]
    TooManyTeams { max: usize, supplied: usize },

    #[error("Double elimination needs a power-of-two team count (4, 8, 16), got {0}")]
    UnsupportedTeamCount(usize),

    #[error("Team id must not be blank")]
    BlankTeamId,

    #[error("Team {0} appears more than once")]
    DuplicateTeam(String),

    #[error("Roster line {line}: {reason}")]
    MalformedRoster { line: usize, reason: String },
}

/// A lifecycle transition or mutation attempted out of order.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PreconditionError {
    #[error("Tournament is already initialized; reset it first")]
    AlreadyInitialized,

    #[error("Tournament has not been initialized")]
    NotInitialized,

    #[error("Tournament is {actual}, expected {expected}")]
    WrongStage { expected: String, actual: String },

    #[error("Format {0} has no stages to advance")]
    NoStages(String),

    #[error("Group stage still has {pending} unfinished match(es)")]
    GroupStageIncomplete { pending: usize },

    #[error("Participants of match {0} are not determined yet")]
    ParticipantsUndetermined(String),

    #[error("Match {downstream} has already been played; changing {source_match} would alter its teams")]
    DownstreamLocked {
        source_match: String,
        downstream: String,
    },
}

/// Failure of the persistence collaborator, propagated unchanged.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Bracket lock poisoned")]
    Poisoned,
}

/// Anything a bracket operation can be rejected with.
#[derive(Debug, Error)]
pub enum BracketError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Match {match_id} not found")]
    NotFound { match_id: String },

    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BracketError {
    /// Short machine-readable category for API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            BracketError::Validation(_) => "validation",
            BracketError::NotFound { .. } => "not_found",
            BracketError::Precondition(_) => "precondition",
            BracketError::Store(_) => "store",
        }
    }

    pub fn not_found(match_id: impl Into<String>) -> Self {
        BracketError::NotFound {
            match_id: match_id.into(),
        }
    }
}
