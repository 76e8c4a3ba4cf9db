//! Reporting match results: evaluate, record, re-propagate.

use crate::logic::evaluator::evaluate;
use crate::logic::propagation::propagate;
use crate::logic::topology::Topology;
use crate::models::{BracketDocument, BracketError, MatchStatus, PreconditionError};
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

/// Scores for one match as entered by an admin.
///
/// Scores are signed so that negative input reaches validation instead of failing to parse.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultReport {
    pub team1_score: i64,
    pub team2_score: i64,
    #[serde(default)]
    pub scheduled_time: Option<DateTime<Utc>>,
}

impl ResultReport {
    pub fn new(team1_score: i64, team2_score: i64) -> Self {
        Self {
            team1_score,
            team2_score,
            scheduled_time: None,
        }
    }
}

/// Record scores for `match_id` and re-derive the bracket.
///
/// Lowering a decided score walks the match back to pending. Replaying the same scores is a
/// no-op apart from `lastUpdated`. A change that would alter the teams of a match that already
/// has games recorded is rejected and the document is left untouched.
pub fn report_result(
    document: &mut BracketDocument,
    match_id: &str,
    report: &ResultReport,
    now: DateTime<Utc>,
) -> Result<(), BracketError> {
    if !document.tournament.status.is_started() {
        return Err(PreconditionError::NotInitialized.into());
    }
    let topology = Topology::of(document)?;

    let current = document
        .get_match(match_id)
        .ok_or_else(|| BracketError::not_found(match_id))?;
    let evaluation = evaluate(report.team1_score, report.team2_score, current.best_of)?;
    if !current.is_ready() {
        return Err(PreconditionError::ParticipantsUndetermined(match_id.to_string()).into());
    }
    let games_played = evaluation.team1_score + evaluation.team2_score;
    let undecided = undecided_status(document, match_id, games_played);

    let mut next = document.clone();
    let Some(m) = next.get_match_mut(match_id) else {
        return Err(BracketError::not_found(match_id));
    };
    if report.scheduled_time.is_some() {
        m.scheduled_time = report.scheduled_time;
    }
    m.record(
        evaluation.team1_score,
        evaluation.team2_score,
        evaluation.winner(),
        undecided,
        now,
    );
    let status = m.status;

    propagate(&mut next, &topology)?;
    next.tournament.last_updated = now;

    info!(
        "Result {} {}-{} ({:?}), tournament {}",
        match_id, evaluation.team1_score, evaluation.team2_score, status, next.tournament.status
    );
    *document = next;
    Ok(())
}

/// Status of a match that has games but no winner yet: group matches in play are `Ongoing`.
fn undecided_status(document: &BracketDocument, match_id: &str, games_played: u32) -> MatchStatus {
    let in_group = document
        .groups
        .iter()
        .any(|g| g.matches.iter().any(|m| m.id == match_id));
    if in_group && games_played > 0 {
        MatchStatus::Ongoing
    } else {
        MatchStatus::Pending
    }
}
