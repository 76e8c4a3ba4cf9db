//! Propagation: re-derive every fed slot of the bracket from the topology.
//!
//! A full pass runs after every mutation. Slots move from empty to assigned and are locked once
//! their match has games recorded:
//! - a resolved source is copied into an unlocked slot,
//! - an unresolved source leaves the slot as it is (propagation never empties a slot),
//! - a locked slot whose source no longer resolves to the same team is a conflict.
//!
//! Sources only ever read match results, and a match whose slots can still change has no
//! results, so one pass in any order reaches the fixed point.

use crate::logic::standings::{compute_standings, placement};
use crate::logic::topology::{Outcome, SlotSource, Topology, GRAND_FINAL};
use crate::models::{
    same_team, BracketDocument, PreconditionError, TeamRef, TournamentFormat, TournamentStatus,
};
use log::debug;

/// Run one full propagation pass over `document`.
///
/// On conflict the document may be partially updated; callers run this on a working copy.
pub fn propagate(document: &mut BracketDocument, topology: &Topology) -> Result<(), PreconditionError> {
    for group in &mut document.groups {
        group.standings = compute_standings(group);
    }

    let placements_open = matches!(
        document.tournament.status,
        TournamentStatus::FinalStage | TournamentStatus::Completed
    );

    for feed in topology.feeds() {
        let resolved = resolve(document, &feed.source, placements_open);
        let Some(target) = document.get_match_mut(&feed.target) else {
            debug!("topology target {} missing from document", feed.target);
            continue;
        };

        if target.has_games() {
            if !same_team(resolved.as_ref(), target.slot(feed.slot)) {
                return Err(PreconditionError::DownstreamLocked {
                    source_match: source_id(&feed.source).to_string(),
                    downstream: target.id.clone(),
                });
            }
            continue;
        }

        if let Some(team) = resolved {
            if target.slot(feed.slot) != Some(&team) {
                debug!("{} {:?} <- {}", target.id, feed.slot, team.id);
                *target.slot_mut(feed.slot) = Some(team);
            }
        }
    }

    derive_completion(document);
    Ok(())
}

/// Team a source currently resolves to, if any.
fn resolve(document: &BracketDocument, source: &SlotSource, placements_open: bool) -> Option<TeamRef> {
    match source {
        SlotSource::Result { match_id, outcome } => {
            let m = document.get_match(match_id)?;
            if !m.is_completed() {
                return None;
            }
            match outcome {
                Outcome::Winner => m.winner.clone(),
                Outcome::Loser => m.loser.clone(),
            }
        }
        SlotSource::Placement { group, rank } => {
            if !placements_open {
                return None;
            }
            placement(document.group(group)?, *rank).cloned()
        }
    }
}

fn source_id(source: &SlotSource) -> &str {
    match source {
        SlotSource::Result { match_id, .. } => match_id.as_str(),
        SlotSource::Placement { group, .. } => group.as_str(),
    }
}

/// Completed iff the grand final is decided; a corrected grand final reopens the tournament.
fn derive_completion(document: &mut BracketDocument) {
    let decided = document
        .get_match(GRAND_FINAL)
        .is_some_and(|m| m.is_completed());
    let status = &mut document.tournament.status;
    if decided && status.is_started() {
        *status = TournamentStatus::Completed;
    } else if !decided && *status == TournamentStatus::Completed {
        *status = match document.tournament.format {
            TournamentFormat::DoubleElimination => TournamentStatus::Active,
            TournamentFormat::GroupStage => TournamentStatus::FinalStage,
        };
    }
}
