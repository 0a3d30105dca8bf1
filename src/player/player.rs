//! Shared player state and the strategy interface that chooses moves.

use std::collections::VecDeque;

use crate::circuit::State;
use crate::race::lock::RwLock;

/// How many recent states [`PlayerState::trajectory`] returns.
const TRAJECTORY_WINDOW: usize = 6;

#[derive(Debug, Clone, Default)]
struct PlayerData {
    current: Option<State>,
    allowed_moves: Vec<State>,
    trajectory: VecDeque<State>,
    done: bool,
}

/// The race engine's view of one player: its last committed state, the
/// moves it may currently choose from, a short trajectory history, and
/// whether it is done (crashed, finished or disconnected). Every access
/// goes through a promotable reader/writer lock so the engine can inspect
/// and then commit a turn as one atomic step.
pub struct PlayerState {
    data: RwLock<PlayerData>,
}

impl PlayerState {
    pub fn new() -> Self {
        PlayerState { data: RwLock::new(PlayerData::default()) }
    }

    /// Replaces the moves this player may choose from this turn.
    pub fn set_allowed_moves(&self, moves: Vec<State>) {
        self.data.write().allowed_moves = moves;
    }

    pub fn allowed_moves(&self) -> Vec<State> {
        self.data.read().allowed_moves.clone()
    }

    /// Commits `state` as the outcome of this turn.
    pub fn commit(&self, state: State, done: bool) {
        let mut w = self.data.write();
        w.current = Some(state);
        w.trajectory.push_back(state);
        while w.trajectory.len() > TRAJECTORY_WINDOW {
            w.trajectory.pop_front();
        }
        w.done = done;
    }

    pub fn current(&self) -> Option<State> {
        self.data.read().current
    }

    /// The last [`TRAJECTORY_WINDOW`] committed states, oldest first.
    pub fn trajectory(&self) -> Vec<State> {
        self.data.read().trajectory.iter().copied().collect()
    }

    pub fn is_done(&self) -> bool {
        self.data.read().done
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new()
    }
}

/// The strategy a player uses to pick its next move. A human player blocks
/// waiting for input; a computer player searches synchronously. Either way
/// the engine calls this once per turn and commits whatever comes back.
pub trait Player: Send + Sync {
    fn name(&self) -> &str;

    /// Picks the next state out of `allowed`, or `None` if no move arrived
    /// (a human timing out) or none was needed.
    fn choose_move(&self, allowed: &[State]) -> Option<State>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Status;

    fn dummy_state(round: f64) -> State {
        State::new((0, 0), 0.0, 1.0, round, 0, 10.0, Status::Running)
    }

    #[test]
    fn trajectory_keeps_only_the_last_window() {
        let player = PlayerState::new();
        for i in 0..10 {
            player.commit(dummy_state(i as f64), false);
        }
        assert_eq!(player.trajectory().len(), TRAJECTORY_WINDOW);
        assert_eq!(player.trajectory().last().unwrap().round, 9.0);
    }

    #[test]
    fn done_flag_is_sticky_until_reset() {
        let player = PlayerState::new();
        player.commit(dummy_state(1.0), true);
        assert!(player.is_done());
    }
}
