//! The human player: blocks waiting for an externally submitted move,
//! polling for a timeout so a stalled client doesn't wedge the race.

use std::fmt;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::circuit::State;
use crate::config;

use super::player::Player;

/// Errors raised while submitting a human's chosen move.
#[derive(Debug)]
pub enum HumanPlayError {
    /// The submitted destination is not among the currently allowed moves.
    IllegalMove,
    /// The move was submitted outside this human's turn window: nobody
    /// is currently waiting on [`HumanPlayer::choose_move`] for it.
    HumanNotPlaying,
}

impl fmt::Display for HumanPlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HumanPlayError::IllegalMove => write!(f, "submitted move is not among the allowed moves"),
            HumanPlayError::HumanNotPlaying => write!(f, "it is not this player's turn"),
        }
    }
}

impl std::error::Error for HumanPlayError {}

/// A player driven by an external client. [`choose_move`](Player::choose_move)
/// blocks until [`HumanPlayer::submit_move`] is called from another thread,
/// waking periodically to check [`config::HUMAN_TURN_TIMEOUT_SECS`] has not
/// elapsed. A player who times out is treated as disconnected by the race
/// engine. A move submitted while nobody is waiting - before the turn
/// starts, or after it has already ended - is rejected rather than
/// buffered for the next turn.
pub struct HumanPlayer {
    name: String,
    pending: Mutex<Option<State>>,
    is_playing: Mutex<bool>,
    submitted: Condvar,
}

impl HumanPlayer {
    pub fn new(name: impl Into<String>) -> Self {
        HumanPlayer { name: name.into(), pending: Mutex::new(None), is_playing: Mutex::new(false), submitted: Condvar::new() }
    }

    /// Submits the human's chosen destination for the current turn.
    pub fn submit_move(&self, chosen: State, allowed: &[State]) -> Result<(), HumanPlayError> {
        if !*self.is_playing.lock().unwrap() {
            return Err(HumanPlayError::HumanNotPlaying);
        }
        if !allowed.iter().any(|s| s.xy == chosen.xy) {
            return Err(HumanPlayError::IllegalMove);
        }
        *self.pending.lock().unwrap() = Some(chosen);
        self.submitted.notify_all();
        Ok(())
    }
}

impl Player for HumanPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn choose_move(&self, _allowed: &[State]) -> Option<State> {
        let poll = Duration::from_secs(config::HUMAN_POLL_INTERVAL_SECS);
        let mut elapsed = Duration::ZERO;
        let timeout = Duration::from_secs(config::HUMAN_TURN_TIMEOUT_SECS);

        *self.is_playing.lock().unwrap() = true;
        let mut guard = self.pending.lock().unwrap();
        let result = loop {
            if let Some(state) = guard.take() {
                break Some(state);
            }
            if elapsed >= timeout {
                break None;
            }
            let (next, _) = self.submitted.wait_timeout(guard, poll).unwrap();
            guard = next;
            elapsed += poll;
        };
        drop(guard);
        *self.is_playing.lock().unwrap() = false;
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Status;
    use std::sync::Arc;
    use std::thread;

    fn state_at(xy: (i64, i64)) -> State {
        State::new(xy, 0.0, 1.0, 1.0, 0, 10.0, Status::Running)
    }

    #[test]
    fn submitted_move_is_returned_immediately() {
        let player = Arc::new(HumanPlayer::new("alice"));
        let allowed = vec![state_at((1, 0)), state_at((0, 1))];

        // Mark the turn as already open so the mover thread's submit can't
        // race choose_move setting is_playing.
        *player.is_playing.lock().unwrap() = true;
        let mover = Arc::clone(&player);
        let handle = thread::spawn(move || {
            mover.submit_move(state_at((1, 0)), &[state_at((1, 0))]).unwrap();
        });
        let chosen = player.choose_move(&allowed);
        handle.join().unwrap();
        assert_eq!(chosen.unwrap().xy, (1, 0));
    }

    #[test]
    fn illegal_move_is_rejected() {
        let player = HumanPlayer::new("bob");
        *player.is_playing.lock().unwrap() = true;
        let err = player.submit_move(state_at((9, 9)), &[state_at((1, 0))]).unwrap_err();
        assert!(matches!(err, HumanPlayError::IllegalMove));
    }

    #[test]
    fn move_submitted_outside_turn_window_is_rejected() {
        let player = HumanPlayer::new("carol");
        let err = player.submit_move(state_at((1, 0)), &[state_at((1, 0))]).unwrap_err();
        assert!(matches!(err, HumanPlayError::HumanNotPlaying));
    }
}
