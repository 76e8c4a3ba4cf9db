//! Static bracket topology: which match outcome (or group placement) feeds which slot.
//!
//! The topology is fixed per format and never changes at runtime. It is rebuilt on demand from
//! the document's format and shape, so it is never stored.

use crate::models::{
    BracketDocument, BracketSection, BracketSettings, GameMatch, Group, MatchId, Round, Slot,
    TournamentFormat, ValidationError,
};

pub const GRAND_FINAL: &str = "grandFinal";
pub const UPPER_FINAL: &str = "upperFinal";
pub const LOWER_FINAL: &str = "lowerFinal";

pub const SEMIFINAL: &str = "semifinal";
pub const SEED2_MATCH: &str = "seed2Match";
pub const SEED3_MATCH: &str = "seed3Match";
pub const PLAYOFF_MATCH: &str = "playoffMatch";

pub const GROUP_IDS: [&str; 2] = ["groupA", "groupB"];

/// Largest double-elimination bracket we generate.
pub const MAX_BRACKET_SIZE: usize = 16;

/// Which result of a source match is forwarded.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Outcome {
    Winner,
    Loser,
}

/// Where a slot's team comes from.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SlotSource {
    Result { match_id: MatchId, outcome: Outcome },
    /// Zero-based finishing position in a group table.
    Placement { group: String, rank: usize },
}

impl SlotSource {
    fn winner(match_id: &str) -> Self {
        SlotSource::Result {
            match_id: match_id.to_string(),
            outcome: Outcome::Winner,
        }
    }

    fn loser(match_id: &str) -> Self {
        SlotSource::Result {
            match_id: match_id.to_string(),
            outcome: Outcome::Loser,
        }
    }

    fn placement(group: &str, rank: usize) -> Self {
        SlotSource::Placement {
            group: group.to_string(),
            rank,
        }
    }
}

/// One topology entry: `source -> (target, slot)`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Feed {
    pub source: SlotSource,
    pub target: MatchId,
    pub slot: Slot,
}

impl Feed {
    fn new(source: SlotSource, target: &str, slot: Slot) -> Self {
        Self {
            source,
            target: target.to_string(),
            slot,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct RoundLayout {
    id: String,
    name: String,
    section: BracketSection,
    matches: Vec<MatchId>,
}

/// Upper and lower brackets plus a grand final, for a power-of-two field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DoubleElimination {
    size: usize,
    upper: Vec<RoundLayout>,
    lower: Vec<RoundLayout>,
    feeds: Vec<Feed>,
}

impl DoubleElimination {
    pub fn new(size: usize) -> Result<Self, ValidationError> {
        if size < 4 || size > MAX_BRACKET_SIZE || !size.is_power_of_two() {
            return Err(ValidationError::UnsupportedTeamCount(size));
        }
        let rounds = size.trailing_zeros() as usize;
        let mut feeds = Vec::new();

        let mut upper: Vec<RoundLayout> = Vec::with_capacity(rounds);
        for r in 1..=rounds {
            let count = size >> r;
            let ids: Vec<MatchId> = if r == rounds {
                vec![UPPER_FINAL.to_string()]
            } else {
                (1..=count).map(|m| format!("upperR{r}M{m}")).collect()
            };
            if let Some(prev) = upper.last() {
                for (i, id) in ids.iter().enumerate() {
                    feeds.push(Feed::new(SlotSource::winner(&prev.matches[i * 2]), id, Slot::Team1));
                    feeds.push(Feed::new(SlotSource::winner(&prev.matches[i * 2 + 1]), id, Slot::Team2));
                }
            }
            upper.push(RoundLayout {
                id: format!("upperR{r}"),
                name: upper_round_name(count, r),
                section: BracketSection::Upper,
                matches: ids,
            });
        }

        // Lower bracket alternates: an odd round pairs teams already in the lower bracket (or the
        // first-round upper losers), an even round meets them with losers dropping from upper
        // round `i + 1`.
        let lower_rounds = 2 * (rounds - 1);
        let mut lower: Vec<RoundLayout> = Vec::with_capacity(lower_rounds);
        for i in 1..rounds {
            let count = upper[i].matches.len();

            let odd_round = 2 * i - 1;
            let odd_ids = lower_ids(odd_round, count, lower_rounds);
            for (j, id) in odd_ids.iter().enumerate() {
                let (a, b) = if i == 1 {
                    let first = &upper[0].matches;
                    (SlotSource::loser(&first[j * 2]), SlotSource::loser(&first[j * 2 + 1]))
                } else {
                    let prev = &lower[lower.len() - 1].matches;
                    (SlotSource::winner(&prev[j * 2]), SlotSource::winner(&prev[j * 2 + 1]))
                };
                feeds.push(Feed::new(a, id, Slot::Team1));
                feeds.push(Feed::new(b, id, Slot::Team2));
            }
            lower.push(RoundLayout {
                id: format!("lowerR{odd_round}"),
                name: lower_round_name(odd_round, lower_rounds),
                section: BracketSection::Lower,
                matches: odd_ids.clone(),
            });

            let even_round = 2 * i;
            let even_ids = lower_ids(even_round, count, lower_rounds);
            for (j, id) in even_ids.iter().enumerate() {
                feeds.push(Feed::new(SlotSource::winner(&odd_ids[j]), id, Slot::Team1));
                feeds.push(Feed::new(SlotSource::loser(&upper[i].matches[j]), id, Slot::Team2));
            }
            lower.push(RoundLayout {
                id: format!("lowerR{even_round}"),
                name: lower_round_name(even_round, lower_rounds),
                section: BracketSection::Lower,
                matches: even_ids,
            });
        }

        feeds.push(Feed::new(SlotSource::winner(UPPER_FINAL), GRAND_FINAL, Slot::Team1));
        feeds.push(Feed::new(SlotSource::winner(LOWER_FINAL), GRAND_FINAL, Slot::Team2));

        Ok(Self {
            size,
            upper,
            lower,
            feeds,
        })
    }

    /// Number of teams the bracket seats.
    pub fn size(&self) -> usize {
        self.size
    }

    /// First-round upper matches, in seed order.
    pub fn opening_matches(&self) -> &[MatchId] {
        &self.upper[0].matches
    }

    fn rounds(&self, settings: &BracketSettings) -> Vec<Round> {
        let mut rounds: Vec<Round> = self
            .upper
            .iter()
            .chain(self.lower.iter())
            .map(|layout| layout.to_round(settings.best_of))
            .collect();
        rounds.push(Round {
            id: GRAND_FINAL.to_string(),
            name: "Grand Final".to_string(),
            section: BracketSection::GrandFinal,
            matches: vec![GameMatch::new(GRAND_FINAL, settings.grand_final_best_of)],
        });
        rounds
    }
}

/// Two round-robin groups feeding a five-match final stage.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupStage {
    feeds: Vec<Feed>,
}

impl GroupStage {
    pub fn new() -> Self {
        let [a, b] = GROUP_IDS;
        let feeds = vec![
            Feed::new(SlotSource::placement(a, 0), SEMIFINAL, Slot::Team1),
            Feed::new(SlotSource::placement(b, 0), SEMIFINAL, Slot::Team2),
            Feed::new(SlotSource::placement(a, 1), SEED2_MATCH, Slot::Team1),
            Feed::new(SlotSource::placement(b, 1), SEED2_MATCH, Slot::Team2),
            Feed::new(SlotSource::placement(a, 2), SEED3_MATCH, Slot::Team1),
            Feed::new(SlotSource::placement(b, 2), SEED3_MATCH, Slot::Team2),
            Feed::new(SlotSource::winner(SEED2_MATCH), PLAYOFF_MATCH, Slot::Team1),
            Feed::new(SlotSource::winner(SEED3_MATCH), PLAYOFF_MATCH, Slot::Team2),
            Feed::new(SlotSource::winner(SEMIFINAL), GRAND_FINAL, Slot::Team1),
            Feed::new(SlotSource::winner(PLAYOFF_MATCH), GRAND_FINAL, Slot::Team2),
        ];
        Self { feeds }
    }

    fn rounds(&self, settings: &BracketSettings) -> Vec<Round> {
        let bo = settings.best_of;
        vec![
            Round {
                id: "finalStage".to_string(),
                name: "Final Stage".to_string(),
                section: BracketSection::FinalStage,
                matches: vec![
                    GameMatch::new(SEMIFINAL, bo),
                    GameMatch::new(SEED2_MATCH, bo),
                    GameMatch::new(SEED3_MATCH, bo),
                ],
            },
            Round {
                id: "playoff".to_string(),
                name: "Playoff".to_string(),
                section: BracketSection::FinalStage,
                matches: vec![GameMatch::new(PLAYOFF_MATCH, bo)],
            },
            Round {
                id: GRAND_FINAL.to_string(),
                name: "Grand Final".to_string(),
                section: BracketSection::GrandFinal,
                matches: vec![GameMatch::new(GRAND_FINAL, settings.grand_final_best_of)],
            },
        ]
    }

    fn groups(&self) -> Vec<Group> {
        GROUP_IDS
            .iter()
            .zip(["Group A", "Group B"])
            .map(|(id, name)| Group {
                id: id.to_string(),
                name: name.to_string(),
                teams: Vec::new(),
                matches: Vec::new(),
                standings: Vec::new(),
            })
            .collect()
    }
}

impl Default for GroupStage {
    fn default() -> Self {
        Self::new()
    }
}

/// The topology for one bracket format.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Topology {
    DoubleElimination(DoubleElimination),
    GroupStage(GroupStage),
}

impl Topology {
    /// Topology for a format seating `team_count` teams.
    pub fn for_format(format: TournamentFormat, team_count: usize) -> Result<Self, ValidationError> {
        match format {
            TournamentFormat::DoubleElimination => {
                Ok(Topology::DoubleElimination(DoubleElimination::new(team_count)?))
            }
            TournamentFormat::GroupStage => Ok(Topology::GroupStage(GroupStage::new())),
        }
    }

    /// Recover the topology a document was built from.
    pub fn of(document: &BracketDocument) -> Result<Self, ValidationError> {
        let format = document.tournament.format;
        let size = match format {
            TournamentFormat::DoubleElimination => document
                .rounds
                .iter()
                .find(|r| r.section == BracketSection::Upper)
                .map(|r| r.matches.len() * 2)
                .unwrap_or(0),
            TournamentFormat::GroupStage => document.teams.len(),
        };
        Self::for_format(format, size)
    }

    pub fn format(&self) -> TournamentFormat {
        match self {
            Topology::DoubleElimination(_) => TournamentFormat::DoubleElimination,
            Topology::GroupStage(_) => TournamentFormat::GroupStage,
        }
    }

    pub fn feeds(&self) -> &[Feed] {
        match self {
            Topology::DoubleElimination(de) => &de.feeds,
            Topology::GroupStage(gs) => &gs.feeds,
        }
    }

    /// Entries feeding a given match.
    pub fn feeds_into<'a>(&'a self, match_id: &'a str) -> impl Iterator<Item = &'a Feed> + 'a {
        self.feeds().iter().filter(move |f| f.target == match_id)
    }

    /// Empty rounds and groups: every match pending with no teams.
    pub fn template(&self, settings: &BracketSettings) -> (Vec<Round>, Vec<Group>) {
        match self {
            Topology::DoubleElimination(de) => (de.rounds(settings), Vec::new()),
            Topology::GroupStage(gs) => (gs.rounds(settings), gs.groups()),
        }
    }
}

impl RoundLayout {
    fn to_round(&self, best_of: u32) -> Round {
        Round {
            id: self.id.clone(),
            name: self.name.clone(),
            section: self.section,
            matches: self.matches.iter().map(|id| GameMatch::new(id.as_str(), best_of)).collect(),
        }
    }
}

fn lower_ids(round: usize, count: usize, lower_rounds: usize) -> Vec<MatchId> {
    if round == lower_rounds {
        vec![LOWER_FINAL.to_string()]
    } else {
        (1..=count).map(|m| format!("lowerR{round}M{m}")).collect()
    }
}

fn upper_round_name(count: usize, round: usize) -> String {
    match count {
        1 => "Upper Final".to_string(),
        2 => "Upper Semifinals".to_string(),
        4 => "Upper Quarterfinals".to_string(),
        _ => format!("Upper Round {round}"),
    }
}

fn lower_round_name(round: usize, lower_rounds: usize) -> String {
    if round == lower_rounds {
        "Lower Final".to_string()
    } else {
        format!("Lower Round {round}")
    }
}
