//! # Utils Module
//!
//! Small cross-cutting helpers shared by the AI strategies.
//!
//! - [`rand::thread_rng`] - deterministic RNG for reproducible tests.
pub mod rand;
