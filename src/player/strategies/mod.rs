//! AI driving strategies: each holds the [`crate::analyzer::Analyzer`] of
//! the circuit it plays on and implements [`crate::player::Player`] by
//! searching or sampling over its move generation.
//!
//! Every strategy scores states on the same smaller-is-better scale: a
//! crash is the worst possible outcome, finishing is rewarded in
//! proportion to how few rounds it took, and a still-running state is
//! scored by its remaining distance to the finish - full laps left
//! converted to distance via the circuit's lap length, plus the distance
//! left in the current lap.
mod astar;
mod fixed_depth;
mod montecarlo;

pub use self::{astar::AStarPlayer, fixed_depth::FixedDepthPlayer, montecarlo::MonteCarloPlayer};

use crate::analyzer::Analyzer;
use crate::circuit::{State, Status};
use crate::config;

/// Remaining laps converted to remaining distance, plus the distance left
/// in the current lap. Smaller is better; used both for a still-running
/// state and as the base of a crashed state's penalty.
fn distance_score(analyzer: &Analyzer, state: State) -> f64 {
    let laps_left = (analyzer.circuit().laps() as i64 - state.lap - 1) as f64;
    laps_left * analyzer.lap_length() + state.distance_left
}

/// Scores a state that is either terminal or at a search horizon.
/// Smaller is better.
fn score_terminal(analyzer: &Analyzer, state: State) -> f64 {
    match state.status {
        Status::Crashed | Status::Disconnected => distance_score(analyzer, state) + config::CRASH_SCORE,
        Status::Finished => config::MINIMUM_SCORE + state.round,
        Status::Running => distance_score(analyzer, state),
    }
}
