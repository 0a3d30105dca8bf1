//! # Circuit Module
//!
//! The circuit: its drivable road, starting line, and the pure move
//! generation geometry (`NextStates`, `OnRoad`, `CrossingLine`) a player's
//! car obeys turn to turn. Distance-to-finish, which requires the circuit
//! analyzer's triangulation, is intentionally kept out of this module -
//! see [`crate::analyzer`] for the piece that completes move generation.
//!
//! ## Components
//!
//! - [`State`] - a car's position, heading, speed, lap/round counters and
//!   status.
//! - [`Status`] - `Running` / `Crashed` / `Finished` / `Disconnected`.
//! - [`Circuit`] - road polygon, starting line, and cached geometry
//!   queries.
//! - [`format`] - the `.ckt` circuit file format and the built-in Patatoid
//!   circuit.
mod circuit;
mod format;
mod state;

pub use self::{circuit::*, format::*, state::*};
