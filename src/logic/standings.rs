//! Group tables: derived from completed round-robin matches on every propagation pass.

use crate::models::{Group, Standing, TeamRef};
use std::cmp::Reverse;

/// Match points for a win. Best-of matches never end level, so there is no draw value.
pub const POINTS_PER_WIN: u32 = 3;

/// Compute a group's table.
///
/// Order: points, game differential, games won, then seed order within the group.
pub fn compute_standings(group: &Group) -> Vec<Standing> {
    let mut rows: Vec<(usize, Standing)> = group
        .teams
        .iter()
        .cloned()
        .map(Standing::new)
        .enumerate()
        .collect();

    for m in group.matches.iter().filter(|m| m.is_completed()) {
        let (Some(team1), Some(team2)) = (&m.team1, &m.team2) else {
            continue;
        };
        let won_by_team1 = m.winner.as_ref().is_some_and(|w| w.is(team1));
        apply(&mut rows, team1, m.team1_score, m.team2_score, won_by_team1);
        apply(&mut rows, team2, m.team2_score, m.team1_score, !won_by_team1);
    }

    rows.sort_by_key(|(seed, s)| {
        (
            Reverse(s.points),
            Reverse(s.game_differential()),
            Reverse(s.games_won),
            *seed,
        )
    });
    rows.into_iter().map(|(_, s)| s).collect()
}

fn apply(rows: &mut [(usize, Standing)], team: &TeamRef, won: u32, lost: u32, is_winner: bool) {
    let Some((_, row)) = rows.iter_mut().find(|(_, s)| s.team.is(team)) else {
        return;
    };
    row.played += 1;
    row.games_won += won;
    row.games_lost += lost;
    if is_winner {
        row.wins += 1;
        row.points += POINTS_PER_WIN;
    } else {
        row.losses += 1;
    }
}

/// Team finishing at zero-based `rank`, if the group is complete and has that many teams.
pub fn placement(group: &Group, rank: usize) -> Option<&TeamRef> {
    if !group.is_complete() {
        return None;
    }
    group.standings.get(rank).map(|s| &s.team)
}
