//! # Player Module
//!
//! The turn-taking interface the race engine drives, plus the human
//! player and the computer strategy registry.
//!
//! ## Components
//!
//! - [`Player`] - the strategy trait; [`PlayerState`] - shared lock-guarded
//!   per-player state.
//! - [`HumanPlayer`] - blocks on externally submitted moves.
//! - [`registry::build_computer_player`] - builds a named AI strategy.
//! - [`strategies`] - `FixedDepthPlayer`, `MonteCarloPlayer`, `AStarPlayer`.
mod human;
mod player;
mod registry;
pub mod strategies;

pub use self::{human::*, player::*, registry::*};
