//! Setup phase: build the empty template, seed teams into it, and reset back to it.

use crate::logic::propagation::propagate;
use crate::logic::topology::{Topology, MAX_BRACKET_SIZE};
use crate::models::{
    validate_roster, BracketDocument, BracketError, BracketSettings, GameMatch, PreconditionError,
    TeamRef, Tournament, TournamentFormat, ValidationError,
};
use chrono::{DateTime, Utc};
use log::info;
use uuid::Uuid;

/// Bracket size used for a double-elimination template before any teams are known.
pub fn default_bracket_size(settings: &BracketSettings) -> usize {
    let mut size = 4;
    while size * 2 <= settings.max_teams.min(MAX_BRACKET_SIZE) {
        size *= 2;
    }
    size
}

/// An empty document: every match pending, every slot empty, status at its initial value.
pub fn new_bracket(
    format: TournamentFormat,
    settings: &BracketSettings,
    now: DateTime<Utc>,
) -> Result<BracketDocument, ValidationError> {
    settings.validate()?;
    let topology = Topology::for_format(format, default_bracket_size(settings))?;
    Ok(build_template(&topology, Uuid::new_v4(), settings, now))
}

fn build_template(
    topology: &Topology,
    id: Uuid,
    settings: &BracketSettings,
    now: DateTime<Utc>,
) -> BracketDocument {
    let format = topology.format();
    let (rounds, groups) = topology.template(settings);
    BracketDocument {
        tournament: Tournament {
            id,
            name: settings.name.clone(),
            status: format.initial_status(),
            format,
            start_date: settings.start_date,
            max_teams: settings.max_teams,
            last_updated: now,
        },
        teams: Vec::new(),
        rounds,
        groups,
    }
}

/// Seed `teams` (in input order) into a fresh bracket of `format`.
///
/// Double elimination pairs teams into the opening upper matches: 1 vs 2, 3 vs 4, and so on.
/// Group stage splits the list into two halves, each playing a single round-robin.
/// The tournament id is kept, so viewers follow the same tournament across initialize and reset.
/// Fails if the tournament has already started; reset it first.
pub fn initialize(
    document: &mut BracketDocument,
    teams: Vec<TeamRef>,
    format: TournamentFormat,
    settings: &BracketSettings,
    now: DateTime<Utc>,
) -> Result<(), BracketError> {
    if document.tournament.status.is_started() {
        return Err(PreconditionError::AlreadyInitialized.into());
    }
    settings.validate()?;
    validate_roster(&teams)?;
    let required = format.min_teams();
    if teams.len() < required {
        return Err(ValidationError::NotEnoughTeams {
            required,
            supplied: teams.len(),
        }
        .into());
    }
    if teams.len() > settings.max_teams {
        return Err(ValidationError::TooManyTeams {
            max: settings.max_teams,
            supplied: teams.len(),
        }
        .into());
    }

    let topology = Topology::for_format(format, teams.len())?;
    let mut next = build_template(&topology, document.tournament.id, settings, now);

    match &topology {
        Topology::DoubleElimination(de) => {
            for (id, pair) in de.opening_matches().iter().zip(teams.chunks_exact(2)) {
                if let Some(m) = next.get_match_mut(id) {
                    m.team1 = Some(pair[0].clone());
                    m.team2 = Some(pair[1].clone());
                }
            }
        }
        Topology::GroupStage(_) => {
            let half = teams.len().div_ceil(2);
            let (first, second) = teams.split_at(half);
            for (group, members) in next.groups.iter_mut().zip([first, second]) {
                group.teams = members.to_vec();
                group.matches = round_robin(&group.id, members, settings.best_of);
            }
        }
    }

    next.teams = teams;
    next.tournament.status = format.started_status();
    propagate(&mut next, &topology)?;

    info!(
        "Initialized {} bracket {} with {} teams",
        format,
        next.tournament.id,
        next.teams.len()
    );
    *document = next;
    Ok(())
}

/// Hard reset: same format and bracket size, all matches pending, all slots empty.
pub fn reset(document: &mut BracketDocument, settings: &BracketSettings, now: DateTime<Utc>) -> Result<(), BracketError> {
    settings.validate()?;
    let topology = match Topology::of(document) {
        Ok(topology) => topology,
        Err(_) => Topology::for_format(document.tournament.format, default_bracket_size(settings))?,
    };
    *document = build_template(&topology, document.tournament.id, settings, now);
    info!("Reset {} bracket {}", topology.format(), document.tournament.id);
    Ok(())
}

/// Single round-robin by the circle method: every pair meets once, spread over rounds.
fn round_robin(group_id: &str, teams: &[TeamRef], best_of: u32) -> Vec<GameMatch> {
    let mut order: Vec<Option<&TeamRef>> = teams.iter().map(Some).collect();
    if order.len() % 2 == 1 {
        order.push(None);
    }
    let n = order.len();
    let mut matches = Vec::with_capacity(teams.len() * teams.len().saturating_sub(1) / 2);
    for _ in 0..n.saturating_sub(1) {
        for i in 0..n / 2 {
            if let (Some(a), Some(b)) = (order[i], order[n - 1 - i]) {
                let id = format!("{}Match{}", group_id, matches.len() + 1);
                matches.push(GameMatch::new(id, best_of).with_teams(Some(a.clone()), Some(b.clone())));
            }
        }
        order[1..].rotate_right(1);
    }
    matches
}
