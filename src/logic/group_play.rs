//! Group stage: completion checks and the transition into the final stage.

use crate::logic::propagation::propagate;
use crate::logic::topology::Topology;
use crate::models::{
    BracketDocument, BracketError, PreconditionError, TournamentFormat, TournamentStatus,
};
use chrono::{DateTime, Utc};
use log::info;

/// Group matches that are not completed yet.
pub fn unfinished_group_matches(document: &BracketDocument) -> usize {
    document
        .groups
        .iter()
        .flat_map(|g| g.matches.iter())
        .filter(|m| !m.is_completed())
        .count()
}

/// Close the group stage and seed the final stage from the group tables.
///
/// Requires the group-stage format, status `group_stage`, and every group match completed.
/// Group winners meet in `semifinal`, runners-up in `seed2Match`, thirds in `seed3Match`.
pub fn advance_stage(document: &mut BracketDocument, now: DateTime<Utc>) -> Result<(), BracketError> {
    let format = document.tournament.format;
    if format != TournamentFormat::GroupStage {
        return Err(PreconditionError::NoStages(format.to_string()).into());
    }
    let status = document.tournament.status;
    if status != TournamentStatus::GroupStage {
        return Err(PreconditionError::WrongStage {
            expected: TournamentStatus::GroupStage.to_string(),
            actual: status.to_string(),
        }
        .into());
    }
    let pending = unfinished_group_matches(document);
    if pending > 0 {
        return Err(PreconditionError::GroupStageIncomplete { pending }.into());
    }

    let topology = Topology::of(document)?;
    let mut next = document.clone();
    next.tournament.status = TournamentStatus::FinalStage;
    propagate(&mut next, &topology)?;
    next.tournament.last_updated = now;

    info!("Tournament {} advanced to the final stage", next.tournament.id);
    *document = next;
    Ok(())
}
