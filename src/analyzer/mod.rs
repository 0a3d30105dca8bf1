//! # Circuit Analyzer Module
//!
//! Completes move generation with the one thing raw circuit geometry
//! cannot provide: distance-to-finish for every reachable lattice point.
//! An [`Analyzer`] owns its [`Circuit`](crate::circuit::Circuit), cuts the
//! road's annulus open at the starting line, triangulates it, and builds a
//! shortest-path tree of triangles rooted at the finish so that the
//! funnel algorithm can pull a taut path (and thus a distance) from any
//! point to the finish.
//!
//! ## Components
//!
//! - [`Analyzer`] - distance map, move generation entry point.
//! - [`registry::get_analyzer`] - process-wide cache of built analyzers,
//!   keyed by circuit name.
mod funnel;
mod registry;
mod triangulate;

pub use self::{registry::*, triangulate::*};
