//! Match result evaluation: decide a best-of-N match from its score pair.
//!
//! Pure and total over valid input. No I/O, no clock; the caller stamps times.

use crate::models::{Slot, ValidationError};

/// Decided state of a match given its scores.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verdict {
    Decided { winner: Slot },
    Undecided { games_played: u32 },
}

/// Validated scores together with their verdict.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Evaluation {
    pub team1_score: u32,
    pub team2_score: u32,
    pub verdict: Verdict,
}

impl Evaluation {
    pub fn winner(&self) -> Option<Slot> {
        match self.verdict {
            Verdict::Decided { winner } => Some(winner),
            Verdict::Undecided { .. } => None,
        }
    }
}

/// Wins needed to take a best-of-N: `ceil(N / 2)`.
pub fn required_wins(best_of: u32) -> u32 {
    best_of / 2 + best_of % 2
}

pub fn validate_best_of(best_of: u32) -> Result<(), ValidationError> {
    if best_of == 0 || best_of % 2 == 0 {
        return Err(ValidationError::InvalidBestOf(best_of));
    }
    Ok(())
}

/// Evaluate a score pair for a best-of-N match.
///
/// Scores must be non-negative and together at most `2 * required_wins - 1`. A side reaching
/// `required_wins` decides the match; anything else (ties included) is undecided, which is how a
/// completed match gets walked back to pending.
pub fn evaluate(team1_score: i64, team2_score: i64, best_of: u32) -> Result<Evaluation, ValidationError> {
    validate_best_of(best_of)?;
    for score in [team1_score, team2_score] {
        if score < 0 {
            return Err(ValidationError::NegativeScore(score));
        }
    }

    let needed = required_wins(best_of);
    // 2 * needed - 1, which for odd N is N itself.
    let max_games = best_of;
    let total = team1_score.unsigned_abs() + team2_score.unsigned_abs();
    if total > u64::from(max_games) {
        return Err(ValidationError::TooManyGames {
            total,
            max: max_games,
            best_of,
        });
    }

    // Both fit: each is at most `max_games`.
    let (s1, s2) = (team1_score as u32, team2_score as u32);
    let verdict = if s1.max(s2) >= needed {
        // Total is bounded, so only one side can reach `needed`.
        let winner = if s1 > s2 { Slot::Team1 } else { Slot::Team2 };
        Verdict::Decided { winner }
    } else {
        Verdict::Undecided {
            games_played: s1 + s2,
        }
    };

    Ok(Evaluation {
        team1_score: s1,
        team2_score: s2,
        verdict,
    })
}
