//! A Hybrid-A* search: each open-list state is quantized into a coarse
//! bin of (cell, heading bucket, speed bucket) so that near-duplicate
//! states collapse into one node, bounding the search space. Stale
//! entries are detected lazily by comparing a popped node's cost against
//! the best cost recorded for its bin - the standard idiom for lazy
//! deletion with `BinaryHeap`, which supports no in-place decrease-key.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use indexmap::IndexMap;
use rand::seq::IndexedRandom;

use crate::analyzer::Analyzer;
use crate::circuit::{State, Status};
use crate::config;

use super::super::player::Player;

pub struct AStarPlayer {
    name: String,
    analyzer: Arc<Analyzer>,
}

impl AStarPlayer {
    pub fn new(name: impl Into<String>, analyzer: Arc<Analyzer>) -> Self {
        AStarPlayer { name: name.into(), analyzer }
    }
}

type Bin = (i64, i64, i64, i64);

fn bin_of(state: State) -> Bin {
    let yaw_bucket = (state.yaw * config::ASTAR_YAW_RESOLUTION).round() as i64;
    let speed_bucket = (state.speed * config::ASTAR_SPEED_RESOLUTION).round() as i64;
    (state.xy.0, state.xy.1, yaw_bucket, speed_bucket)
}

/// Remaining laps plus remaining distance, converted into an
/// equivalent-round estimate and scaled down by `ASTAR_FACTOR` so the
/// search stays loose (and fast) at the cost of optimality. A finished
/// state is valued by how far past the finish line its fractional round
/// landed, and a crashed state is infinitely bad.
fn heuristic(analyzer: &Analyzer, state: State) -> f64 {
    match state.status {
        Status::Finished => {
            let frac = state.round - state.round.trunc();
            if frac > config::ASTAR_EPSILON {
                frac - 1.0
            } else {
                0.0
            }
        }
        Status::Crashed => f64::INFINITY,
        _ => {
            let laps_left = (analyzer.circuit().laps() as i64 - state.lap).max(0) as f64;
            (laps_left + state.distance_left / analyzer.lap_length().max(1.0)) * config::ASTAR_LENGTH_TO_LAP_FACTOR
        }
    }
}

struct Node {
    priority: f64,
    cost_so_far: f64,
    depth: u32,
    state: State,
    first_move: State,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}
impl Eq for Node {}
impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Node {
    /// `BinaryHeap` is a max-heap; reversed so the lowest-priority node
    /// pops first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.priority.total_cmp(&self.priority)
    }
}

impl Player for AStarPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_move(&self, allowed: &[State]) -> Option<State> {
        if allowed.is_empty() {
            return None;
        }
        let analyzer = &*self.analyzer;
        let mut open = BinaryHeap::new();
        let mut best: IndexMap<Bin, f64> = IndexMap::new();

        for &candidate in allowed {
            let g = 1.0;
            best.insert(bin_of(candidate), g);
            open.push(Node { priority: g + heuristic(analyzer, candidate), cost_so_far: g, depth: 0, state: candidate, first_move: candidate });
        }

        let mut best_node: Option<Node> = None;

        while let Some(node) = open.pop() {
            let bin = bin_of(node.state);
            if best.get(&bin).copied() != Some(node.cost_so_far) {
                continue;
            }
            if node.state.status == Status::Finished || node.depth == config::ASTAR_MAX_DEPTH {
                best_node = Some(node);
                break;
            }
            if node.state.status != Status::Running {
                continue;
            }
            let Ok(children) = analyzer.next_states(Some(node.state), &Default::default()) else { continue };
            for child in children {
                let g = node.cost_so_far + 1.0;
                let child_bin = bin_of(child);
                if best.get(&child_bin).is_some_and(|&existing| existing <= g) {
                    continue;
                }
                best.insert(child_bin, g);
                open.push(Node { priority: g + heuristic(analyzer, child), cost_so_far: g, depth: node.depth + 1, state: child, first_move: node.first_move });
            }
        }

        match best_node {
            Some(node) => Some(node.first_move),
            None => {
                let mut rng = crate::utils::rand::thread_rng();
                allowed.choose(&mut rng).copied()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::get_analyzer;

    #[test]
    fn picks_a_move_among_allowed() {
        let analyzer = get_analyzer(None).unwrap();
        let allowed = analyzer.next_states(None, &Default::default()).unwrap();
        let player = AStarPlayer::new("astar", Arc::clone(&analyzer));
        let chosen = player.choose_move(&allowed);
        assert!(chosen.is_some());
        assert!(allowed.iter().any(|s| s.xy == chosen.unwrap().xy));
    }
}
