//! Bracket progression engine: evaluation, topology, propagation, lifecycle.

mod evaluator;
mod group_play;
mod propagation;
mod results;
mod setup;
mod standings;
mod topology;

pub use evaluator::{evaluate, required_wins, validate_best_of, Evaluation, Verdict};
pub use group_play::{advance_stage, unfinished_group_matches};
pub use propagation::propagate;
pub use results::{report_result, ResultReport};
pub use setup::{default_bracket_size, initialize, new_bracket, reset};
pub use standings::{compute_standings, placement, POINTS_PER_WIN};
pub use topology::{
    DoubleElimination, Feed, GroupStage, Outcome, SlotSource, Topology, GRAND_FINAL, GROUP_IDS,
    LOWER_FINAL, MAX_BRACKET_SIZE, PLAYOFF_MATCH, SEED2_MATCH, SEED3_MATCH, SEMIFINAL, UPPER_FINAL,
};
