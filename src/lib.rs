//! Tournament bracket web app: library with models, progression engine, storage adapters, and
//! the HTTP routes the `web` binary serves.

pub mod api;
pub mod config;
pub mod logic;
pub mod models;
pub mod service;
pub mod store;

pub use api::ServerState;
pub use config::AppConfig;
pub use logic::{
    advance_stage, evaluate, initialize, new_bracket, propagate, report_result, required_wins,
    reset, ResultReport, Topology, Verdict,
};
pub use models::{
    parse_roster_csv, BracketDocument, BracketError, BracketSection, BracketSettings, GameMatch,
    Group, MatchId, MatchStatus, PreconditionError, Round, Slot, Standing, StoreError, TeamRef,
    Tournament, TournamentFormat, TournamentId, TournamentStatus, ValidationError,
};
pub use service::BracketService;
pub use store::{BracketStore, BroadcastNotifier, ChangeNotifier, JsonFileStore, MemoryStore, NoopNotifier};
