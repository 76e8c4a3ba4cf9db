//! Team references: the opaque identity the engine copies between match slots.

use crate::models::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;

/// A team as seen by the bracket. The engine never mutates a team, only moves references around.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

impl TeamRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            logo: None,
        }
    }

    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = Some(logo.into());
        self
    }

    /// Two references point at the same team when their ids match.
    pub fn is(&self, other: &TeamRef) -> bool {
        self.id == other.id
    }
}

/// True when both slots hold the same team, or both are empty.
pub fn same_team(a: Option<&TeamRef>, b: Option<&TeamRef>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.is(b),
        (None, None) => true,
        _ => false,
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    id: String,
    name: String,
    #[serde(default)]
    logo: Option<String>,
}

/// Parse a CSV roster (`id,name,logo` header, logo optional) into team references, in file order.
pub fn parse_roster_csv<R: Read>(reader: R) -> Result<Vec<TeamRef>, ValidationError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut teams = Vec::new();
    for (line, row) in rdr.deserialize::<RosterRow>().enumerate() {
        let row = row.map_err(|e| ValidationError::MalformedRoster {
            line: line + 2,
            reason: e.to_string(),
        })?;
        let mut team = TeamRef::new(row.id, row.name);
        team.logo = row.logo.filter(|l| !l.is_empty());
        teams.push(team);
    }
    Ok(teams)
}

/// Reject blank ids and duplicate ids. Order is left untouched.
pub fn validate_roster(teams: &[TeamRef]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for team in teams {
        if team.id.trim().is_empty() {
            return Err(ValidationError::BlankTeamId);
        }
        if !seen.insert(team.id.as_str()) {
            return Err(ValidationError::DuplicateTeam(team.id.clone()));
        }
    }
    Ok(())
}
