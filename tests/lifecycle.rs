//! Integration tests for setup and teardown: initialize, reset, roster import, configuration.

use chrono::{DateTime, TimeZone, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tournament_bracket_web::{
    initialize, new_bracket, parse_roster_csv, report_result, reset, AppConfig, BracketDocument,
    BracketError, BracketSettings, MatchStatus, PreconditionError, ResultReport, TeamRef,
    TournamentFormat, TournamentStatus, ValidationError,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 9, 30, 0).unwrap()
}

fn teams(n: usize) -> Vec<TeamRef> {
    (1..=n).map(|i| TeamRef::new(format!("t{i}"), format!("Team {i}"))).collect()
}

fn empty(format: TournamentFormat) -> BracketDocument {
    new_bracket(format, &BracketSettings::default(), t0()).unwrap()
}

fn try_init(format: TournamentFormat, roster: Vec<TeamRef>) -> Result<BracketDocument, BracketError> {
    let mut doc = empty(format);
    initialize(&mut doc, roster, format, &BracketSettings::default(), t0())?;
    Ok(doc)
}

#[test]
fn template_is_pending_with_empty_slots() {
    let doc = empty(TournamentFormat::DoubleElimination);
    assert_eq!(doc.tournament.status, TournamentStatus::Pending);
    assert_eq!(doc.match_ids().len(), 14);
    assert!(doc.matches().all(|m| m.team1.is_none() && m.team2.is_none()));
    assert_eq!(doc.get_match("grandFinal").unwrap().best_of, 5);
    assert_eq!(doc.get_match("upperR1M1").unwrap().best_of, 3);
    assert_eq!(doc.round("upperR1").unwrap().name, "Upper Quarterfinals");
}

#[test]
fn group_template_starts_in_registration() {
    let doc = empty(TournamentFormat::GroupStage);
    assert_eq!(doc.tournament.status, TournamentStatus::Registration);
    assert_eq!(doc.groups.len(), 2);
    assert!(doc.get_match("semifinal").is_some());
    assert!(doc.get_match("playoffMatch").is_some());
}

#[test]
fn too_few_teams_is_rejected() {
    let err = try_init(TournamentFormat::DoubleElimination, teams(3)).unwrap_err();
    assert!(matches!(
        err,
        BracketError::Validation(ValidationError::NotEnoughTeams { required: 4, supplied: 3 })
    ));
    let err = try_init(TournamentFormat::GroupStage, teams(5)).unwrap_err();
    assert!(matches!(
        err,
        BracketError::Validation(ValidationError::NotEnoughTeams { required: 6, supplied: 5 })
    ));
}

#[test]
fn double_elimination_needs_power_of_two() {
    let err = try_init(TournamentFormat::DoubleElimination, teams(6)).unwrap_err();
    assert!(matches!(
        err,
        BracketError::Validation(ValidationError::UnsupportedTeamCount(6))
    ));
}

#[test]
fn more_teams_than_max_is_rejected() {
    let err = try_init(TournamentFormat::DoubleElimination, teams(16)).unwrap_err();
    assert!(matches!(
        err,
        BracketError::Validation(ValidationError::TooManyTeams { max: 8, supplied: 16 })
    ));
}

#[test]
fn duplicate_team_ids_are_rejected() {
    let mut roster = teams(4);
    roster[3] = TeamRef::new("t1", "Impostor");
    let err = try_init(TournamentFormat::DoubleElimination, roster).unwrap_err();
    assert!(matches!(
        err,
        BracketError::Validation(ValidationError::DuplicateTeam(ref id)) if id == "t1"
    ));
}

#[test]
fn initializing_twice_requires_reset() {
    let mut doc = try_init(TournamentFormat::DoubleElimination, teams(8)).unwrap();
    let before = doc.clone();
    let err = initialize(
        &mut doc,
        teams(8),
        TournamentFormat::DoubleElimination,
        &BracketSettings::default(),
        t0(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        BracketError::Precondition(PreconditionError::AlreadyInitialized)
    ));
    assert_eq!(doc, before);
}

#[test]
fn initialize_keeps_the_tournament_id() {
    let mut doc = empty(TournamentFormat::DoubleElimination);
    let id = doc.tournament.id;
    initialize(
        &mut doc,
        teams(8),
        TournamentFormat::DoubleElimination,
        &BracketSettings::default(),
        t0(),
    )
    .unwrap();
    assert_eq!(doc.tournament.id, id);

    reset(&mut doc, &BracketSettings::default(), t0()).unwrap();
    initialize(&mut doc, teams(4), TournamentFormat::DoubleElimination, &BracketSettings::default(), t0())
        .unwrap();
    assert_eq!(doc.tournament.id, id);
}

#[test]
fn reporting_before_initialize_is_rejected() {
    let mut doc = empty(TournamentFormat::DoubleElimination);
    let err = report_result(&mut doc, "upperR1M1", &ResultReport::new(2, 0), t0()).unwrap_err();
    assert!(matches!(
        err,
        BracketError::Precondition(PreconditionError::NotInitialized)
    ));
}

#[test]
fn reset_returns_to_the_empty_template() {
    let settings = BracketSettings::default();
    let mut doc = try_init(TournamentFormat::DoubleElimination, teams(8)).unwrap();
    let id = doc.tournament.id;
    report_result(&mut doc, "upperR1M1", &ResultReport::new(2, 1), t0()).unwrap();
    report_result(&mut doc, "upperR1M2", &ResultReport::new(0, 2), t0()).unwrap();

    reset(&mut doc, &settings, t0()).unwrap();
    let fresh = empty(TournamentFormat::DoubleElimination);
    assert_eq!(doc.tournament.status, TournamentStatus::Pending);
    assert_eq!(doc.tournament.id, id);
    assert!(doc.teams.is_empty());
    assert_eq!(doc.rounds, fresh.rounds);

    // A second reset changes nothing but the timestamp.
    let once = doc.clone();
    reset(&mut doc, &settings, t0()).unwrap();
    assert_eq!(doc, once);
}

#[test]
fn reset_keeps_a_four_team_bracket_at_four() {
    let mut doc = try_init(TournamentFormat::DoubleElimination, teams(4)).unwrap();
    reset(&mut doc, &BracketSettings::default(), t0()).unwrap();
    assert_eq!(doc.match_ids().len(), 6);
    assert!(doc.matches().all(|m| m.status == MatchStatus::Pending && m.team1.is_none()));
}

#[test]
fn reset_clears_group_stage() {
    let settings = BracketSettings::default();
    let mut doc = empty(TournamentFormat::GroupStage);
    initialize(&mut doc, teams(6), TournamentFormat::GroupStage, &settings, t0()).unwrap();
    reset(&mut doc, &settings, t0()).unwrap();
    assert_eq!(doc.tournament.status, TournamentStatus::Registration);
    assert!(doc.groups.iter().all(|g| g.teams.is_empty() && g.matches.is_empty()));
}

#[test]
fn roster_csv_keeps_file_order_and_optional_logo() {
    let csv = "id,name,logo\n t2 , Second ,\nt1,First,https://example.org/t1.png\n";
    let roster = parse_roster_csv(csv.as_bytes()).unwrap();
    assert_eq!(
        roster,
        vec![
            TeamRef::new("t2", "Second"),
            TeamRef::new("t1", "First").with_logo("https://example.org/t1.png"),
        ]
    );
}

#[test]
fn roster_csv_reports_the_bad_line() {
    let err = parse_roster_csv("id,name\nt1,First\nt2\n".as_bytes()).unwrap_err();
    assert!(matches!(err, ValidationError::MalformedRoster { line: 3, .. }));
}

fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, String> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn config_defaults_when_environment_is_empty() {
    let config = config_from(&[]).unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.format, TournamentFormat::DoubleElimination);
    assert_eq!(config.settings, BracketSettings::default());
    assert!(config.data_path.is_none());
    assert_eq!(config.poll_timeout, Duration::from_secs(25));
}

#[test]
fn config_reads_overrides() {
    let config = config_from(&[
        ("PORT", "9000"),
        ("TOURNAMENT_FORMAT", "group_stage"),
        ("TOURNAMENT_NAME", "Spring Cup"),
        ("TOURNAMENT_START_DATE", "2024-03-15"),
        ("MAX_TEAMS", "10"),
        ("BEST_OF", "5"),
        ("BRACKET_DATA_PATH", "/tmp/bracket.json"),
    ])
    .unwrap();
    assert_eq!(config.port, 9000);
    assert_eq!(config.format, TournamentFormat::GroupStage);
    assert_eq!(config.settings.name, "Spring Cup");
    assert_eq!(config.settings.start_date.unwrap().to_string(), "2024-03-15");
    assert_eq!(config.settings.max_teams, 10);
    assert_eq!(config.settings.best_of, 5);
    assert!(config.data_path.is_some());
}

#[test]
fn config_rejects_bad_values() {
    assert!(config_from(&[("BEST_OF", "4")]).is_err());
    assert!(config_from(&[("PORT", "eighty")]).is_err());
    assert!(config_from(&[("TOURNAMENT_FORMAT", "swiss")]).is_err());
    assert!(config_from(&[("TOURNAMENT_FORMAT", "group_stage"), ("MAX_TEAMS", "5")]).is_err());
}
