//! # Grid Racetrack Core
//!
//! A multiplayer turn-based grid racetrack game's core library: circuit
//! geometry, shortest-path analysis, move generation and the AI drivers
//! and turn-based race engine that drive it.
//!
//! ## Modules
//!
//! - [`geom`] - lattice cells, angle normalization and the road polygon.
//! - [`circuit`] - a circuit's drivable area, starting line and the pure
//!   geometry of move generation.
//! - [`analyzer`] - triangulated distance-to-finish map completing move
//!   generation, and a process-wide cache of built analyzers.
//! - [`player`] - the turn-taking strategy interface, the human player and
//!   the AI strategy registry.
//! - [`race`] - the promotable reader/writer lock and the turn-loop engine.
//! - [`config`] - named constants governing geometry, search and
//!   concurrency tuning.
//! - [`verbose`] - structured logging levels and macros.
//! - [`utils`] - small cross-cutting helpers, such as a deterministic RNG
//!   for tests.

pub mod analyzer;
pub mod circuit;
pub mod config;
pub mod geom;
pub mod player;
pub mod race;
pub mod utils;
pub mod verbose;

pub use verbose::ensure_logger_init;
