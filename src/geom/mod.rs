//! # Geometry Module
//!
//! Planar geometry primitives for the circuit: an integer lattice [`Cell`]
//! type, and a [`Road`] wrapper around the drivable polygon backed by the
//! [`geo`] crate's point-in-polygon and segment-intersection predicates.
//!
//! ## Components
//!
//! - [`Cell`] - an `(x, y)` integer lattice position.
//! - [`Road`] - the drivable area (outer border with an inner-border hole)
//!   plus the starting line, wrapped for fast repeated containment checks.
//! - [`normalize_angle`] - wraps an angle into `(-pi, pi]`.
//!
//! ## Usage
//!
//! ```rust
//! use grid_racetrack_core::geom::Road;
//!
//! let outer = vec![(0, 0), (10, 0), (10, 10), (0, 10)];
//! let inner = vec![(2, 2), (8, 2), (8, 8), (2, 8)];
//! let road = Road::new(&outer, &inner).unwrap();
//! assert!(road.contains_cell((1, 1)));
//! assert!(!road.contains_cell((5, 5)));
//! ```
mod cell;
mod road;

pub use self::{cell::*, road::*};

/// Wraps `angle` into `(-pi, pi]`, matching the circuit's yaw convention.
pub fn normalize_angle(mut angle: f64) -> f64 {
    use std::f64::consts::PI;
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}
