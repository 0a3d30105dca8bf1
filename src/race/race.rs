//! The turn-based race engine: drives every seat through the analyzer's
//! move generation and its player's chosen strategy, one round at a time,
//! on a dedicated thread.
//!
//! Lock ordering, to avoid deadlock between the turn loop and callers
//! polling for a snapshot or asking the race to stop: the `must_stop`
//! flag first, then the snapshot (each seat's [`PlayerState`] lock) last.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use rand::seq::SliceRandom;

use crate::analyzer::Analyzer;
use crate::circuit::{Circuit, State, Status};
use crate::geom::Cell;
use crate::player::{Player, PlayerState};
use crate::utils::rand::thread_rng;
use crate::{log_additional, log_main};

/// One seat at the race: a strategy plus its shared, lock-guarded state.
pub struct Seat {
    pub player: Arc<dyn Player>,
    pub state: Arc<PlayerState>,
}

impl Seat {
    pub fn new(player: Arc<dyn Player>) -> Self {
        Seat { player, state: Arc::new(PlayerState::new()) }
    }
}

/// A snapshot of every seat's current state and completion flag, plus
/// what the engine needs to render the player currently due to move.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub states: Vec<(String, Option<State>, bool)>,
    /// The seat index currently due to move, or `None` if the race hasn't
    /// started or has finished.
    pub playing: Option<usize>,
    /// The currently-playing seat's allowed moves, scaled for display.
    pub moves: Vec<State>,
    /// Each seat's last-six-states trajectory, scaled for display.
    pub trajectories: Vec<(String, Vec<State>)>,
}

/// Owns the circuit's analyzer and every seat, and drives rounds on a
/// dedicated thread until every player is done.
pub struct Race {
    analyzer: Arc<Analyzer>,
    seats: Vec<Seat>,
    /// Seat indices in turn-taking order, shuffled once at [`Race::start`].
    /// `seats` itself stays in registration order so callers can identify
    /// seats stably across a snapshot.
    order: Mutex<Vec<usize>>,
    /// The seat currently due to move, by index into `seats`.
    playing: Mutex<Option<usize>>,
    must_stop: Mutex<bool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Race {
    pub fn new(analyzer: Arc<Analyzer>, seats: Vec<Seat>) -> Arc<Self> {
        let order = (0..seats.len()).collect();
        Arc::new(Race { analyzer, seats, order: Mutex::new(order), playing: Mutex::new(None), must_stop: Mutex::new(false), handle: Mutex::new(None) })
    }

    pub fn circuit(&self) -> &Circuit {
        self.analyzer.circuit()
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Shuffles the turn order and starts the turn-loop thread. A second
    /// call while already running is a no-op.
    pub fn start(self: &Arc<Self>) {
        let mut handle = self.handle.lock().unwrap();
        if handle.is_some() {
            return;
        }
        self.order.lock().unwrap().shuffle(&mut thread_rng());
        let race = Arc::clone(self);
        *handle = Some(thread::spawn(move || race.run()));
    }

    /// Signals the turn loop to stop after its current turn and blocks
    /// until it has.
    pub fn stop(&self) {
        *self.must_stop.lock().unwrap() = true;
        if let Some(handle) = self.handle.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let states = self.seats.iter().map(|seat| (seat.player.name().to_string(), seat.state.current(), seat.state.is_done())).collect();
        let circuit = self.circuit();
        let trajectories = self.seats.iter().map(|seat| (seat.player.name().to_string(), seat.state.trajectory().into_iter().map(|s| circuit.scale_state(s)).collect())).collect();
        let playing = *self.playing.lock().unwrap();
        let moves = playing.map(|i| self.seats[i].state.allowed_moves().into_iter().map(|s| circuit.scale_state(s)).collect()).unwrap_or_default();
        Snapshot { states, playing, moves, trajectories }
    }

    fn should_stop(&self) -> bool {
        *self.must_stop.lock().unwrap()
    }

    fn run(self: Arc<Self>) {
        log_main!(crate::verbose::EVENT_RACE_START, "race started", seats = self.seats.len());
        let order = self.order.lock().unwrap().clone();
        let n = order.len();

        if n > 0 {
            let mut pos = 0;
            'turns: loop {
                if self.should_stop() {
                    break;
                }

                let origin = pos;
                while self.seats[order[pos]].state.is_done() {
                    pos = (pos + 1) % n;
                    if pos == origin {
                        *self.must_stop.lock().unwrap() = true;
                        break 'turns;
                    }
                }

                let seat_index = order[pos];
                let seat = &self.seats[seat_index];
                *self.playing.lock().unwrap() = Some(seat_index);

                let current = seat.state.current();
                let next_round = current.map(|s| s.round + 1.0).unwrap_or(1.0);
                let exclude: HashSet<Cell> = self
                    .seats
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != seat_index)
                    .filter_map(|(_, peer)| peer.state.current().filter(|s| s.round == next_round).map(|s| s.xy))
                    .collect();

                let allowed = self.analyzer.next_states(current, &exclude).unwrap_or_default();
                seat.state.set_allowed_moves(allowed.clone());

                let next = if allowed.is_empty() { None } else { seat.player.choose_move(&allowed) };

                match next {
                    Some(chosen) => {
                        let done = chosen.status != Status::Running;
                        log_additional!(crate::verbose::EVENT_TURN_PLAY, "player moved", player = seat.player.name(), done = done);
                        seat.state.commit(chosen, done);
                    }
                    None => {
                        log_additional!(crate::verbose::EVENT_TURN_DISCONNECT, "player produced no move", player = seat.player.name());
                        let fallback = current.unwrap_or_else(|| State::new((0, 0), 0.0, 0.0, 0.0, 0, 0.0, Status::Disconnected));
                        seat.state.commit(State { status: Status::Disconnected, ..fallback }, true);
                    }
                }

                pos = (pos + 1) % n;
            }
        }

        *self.playing.lock().unwrap() = None;
        log_main!(crate::verbose::EVENT_RACE_STOP, "race finished", seats = self.seats.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::get_analyzer;
    use crate::player::build_computer_player;

    #[test]
    fn race_runs_to_completion_with_computer_players() {
        let analyzer = get_analyzer(None).unwrap();
        let seats = vec![
            Seat::new(build_computer_player("AStarPlayer", "a", Arc::clone(&analyzer)).unwrap()),
            Seat::new(build_computer_player("FixedDepthPlayer", "b", Arc::clone(&analyzer)).unwrap()),
        ];
        let race = Race::new(Arc::clone(&analyzer), seats);
        race.start();
        race.stop();
        let snapshot = race.snapshot();
        assert_eq!(snapshot.states.len(), 2);
    }
}
