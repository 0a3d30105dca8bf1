//! A Monte Carlo strategy: [`config::MONTECARLO_NUM_THREADS`] worker
//! threads each run a batch of independent random rollouts, every rollout
//! picking its own root move uniformly at random, and each worker
//! remembers only the single best (smallest-scoring) sample it saw. The
//! move returned is whichever worker's best sample scored lowest overall
//! - a lucky-sample search rather than an averaging one, since a single
//! good rollout is a genuine witness that a move can lead somewhere good.

use std::sync::Arc;
use std::thread;

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::analyzer::Analyzer;
use crate::circuit::{State, Status};
use crate::config;
use crate::utils::rand::thread_rng;

use super::super::player::Player;
use super::score_terminal;

pub struct MonteCarloPlayer {
    name: String,
    analyzer: Arc<Analyzer>,
}

impl MonteCarloPlayer {
    pub fn new(name: impl Into<String>, analyzer: Arc<Analyzer>) -> Self {
        MonteCarloPlayer { name: name.into(), analyzer }
    }
}

impl Player for MonteCarloPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_move(&self, allowed: &[State]) -> Option<State> {
        if allowed.is_empty() {
            return None;
        }
        let analyzer = &self.analyzer;
        let samples: Vec<(f64, usize)> = thread::scope(|scope| {
            let handles: Vec<_> = (0..config::MONTECARLO_NUM_THREADS).map(|_| scope.spawn(|| best_of_rollouts(analyzer, allowed))).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        samples.into_iter().min_by(|a, b| a.0.total_cmp(&b.0)).map(|(_, index)| allowed[index])
    }
}

/// Runs `MONTECARLO_ROLLOUTS_PER_THREAD` rollouts, each from an
/// independently-chosen random root move, and returns the best
/// `(score, root_index)` seen across all of them.
fn best_of_rollouts(analyzer: &Analyzer, allowed: &[State]) -> (f64, usize) {
    let mut rng = thread_rng();
    let mut best: Option<(f64, usize)> = None;
    for _ in 0..config::MONTECARLO_ROLLOUTS_PER_THREAD {
        let index = rng.random_range(0..allowed.len());
        let score = rollout(analyzer, allowed[index], &mut rng);
        if best.as_ref().is_none_or(|(s, _)| score < *s) {
            best = Some((score, index));
        }
    }
    best.expect("allowed is non-empty")
}

/// Plays out one random continuation from `start`, up to
/// [`config::MONTECARLO_MAX_DEPTH`] moves or until the car stops running,
/// then scores wherever it landed.
fn rollout(analyzer: &Analyzer, start: State, rng: &mut impl Rng) -> f64 {
    let mut state = start;
    for _ in 0..config::MONTECARLO_MAX_DEPTH {
        if state.status != Status::Running {
            break;
        }
        let Ok(children) = analyzer.next_states(Some(state), &Default::default()) else { break };
        let Some(&next) = children.choose(rng) else { break };
        state = next;
    }
    score_terminal(analyzer, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::get_analyzer;

    #[test]
    fn picks_a_move_among_allowed() {
        let analyzer = get_analyzer(None).unwrap();
        let allowed = analyzer.next_states(None, &Default::default()).unwrap();
        let player = MonteCarloPlayer::new("mc", Arc::clone(&analyzer));
        let chosen = player.choose_move(&allowed[..allowed.len().min(3)]);
        assert!(chosen.is_some());
    }
}
