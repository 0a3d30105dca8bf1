//! A fixed-depth minimax search: expands every legal move out to
//! [`config::FIXED_DEPTH_MAX_DEPTH`] plies and picks the move on the
//! best-scoring line. Since every player on a circuit is independently
//! trying to finish fastest, there is no adversarial minimizing player to
//! model: each ply simply keeps the best-scoring continuation.

use std::sync::Arc;

use crate::analyzer::Analyzer;
use crate::circuit::{State, Status};
use crate::config;

use super::super::player::Player;
use super::score_terminal;

pub struct FixedDepthPlayer {
    name: String,
    analyzer: Arc<Analyzer>,
}

impl FixedDepthPlayer {
    pub fn new(name: impl Into<String>, analyzer: Arc<Analyzer>) -> Self {
        FixedDepthPlayer { name: name.into(), analyzer }
    }
}

impl Player for FixedDepthPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_move(&self, allowed: &[State]) -> Option<State> {
        allowed
            .iter()
            .copied()
            .min_by(|a, b| search(&self.analyzer, *a, config::FIXED_DEPTH_MAX_DEPTH).total_cmp(&search(&self.analyzer, *b, config::FIXED_DEPTH_MAX_DEPTH)))
    }
}

/// Recursively scores `state`, expanding its own successors (ignoring any
/// other player) down to `depth_left` plies.
fn search(analyzer: &Analyzer, state: State, depth_left: u32) -> f64 {
    if state.status != Status::Running || depth_left == 0 {
        return score_terminal(analyzer, state);
    }
    let Ok(children) = analyzer.next_states(Some(state), &Default::default()) else {
        return score_terminal(analyzer, state);
    };
    if children.is_empty() {
        return score_terminal(analyzer, state);
    }
    children
        .into_iter()
        .map(|child| search(analyzer, child, depth_left - 1))
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::get_analyzer;

    #[test]
    fn picks_a_move_among_allowed() {
        let analyzer = get_analyzer(None).unwrap();
        let allowed = analyzer.next_states(None, &Default::default()).unwrap();
        let player = FixedDepthPlayer::new("fixed", Arc::clone(&analyzer));
        let chosen = player.choose_move(&allowed);
        assert!(chosen.is_some());
        assert!(allowed.iter().any(|s| s.xy == chosen.unwrap().xy));
    }
}
